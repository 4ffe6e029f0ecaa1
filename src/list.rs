// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Singly linked, prepend only lists with pool allocated nodes.
//!
//! Lists never remove elements, in keeping with the pools they are allocated from never freeing
//! anything.

use crate::{alloc::Arena, error::XpmError};
use log::warn;

/// One link of a [`List`].
pub struct ListNode<'a, T> {
    data: &'a mut T,
    next: Option<&'a mut ListNode<'a, T>>,
}

/// A singly linked list of references to pool allocated values.
pub struct List<'a, T> {
    root: Option<&'a mut ListNode<'a, T>>,
    pool: &'a dyn Arena,
}

impl<'a, T> List<'a, T> {
    /// Allocates a new empty list from `pool`. Nodes added later come from the same pool.
    pub fn new_in(pool: &'a dyn Arena) -> Result<&'a mut Self, XpmError> {
        pool.alloc(Self { root: None, pool })
    }

    /// Links `data` in at the head of the list.
    ///
    /// If the node can't be allocated the list is left as it was.
    pub fn prepend(&mut self, data: &'a mut T) -> Result<(), XpmError> {
        let node = self.pool.alloc_with(|| ListNode {
            data,
            next: self.root.take(),
        })?;
        self.root = Some(node);
        Ok(())
    }

    /// Returns the most recently prepended element.
    pub fn first(&self) -> Option<&T> {
        self.root.as_deref().map(|node| &*node.data)
    }

    /// Returns the most recently prepended element, mutably.
    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.root.as_deref_mut().map(|node| &mut *node.data)
    }

    /// Returns the element which was prepended first. This walks the whole list.
    pub fn last(&self) -> Option<&T> {
        self.iter().last()
    }

    /// Returns the number of elements. This walks the whole list.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns an iterator from the most recently prepended element to the oldest.
    pub fn iter(&self) -> Iter<'_, 'a, T> {
        Iter {
            next: self.root.as_deref(),
        }
    }

    /// Returns a mutable iterator from the most recently prepended element to the oldest.
    pub fn iter_mut(&mut self) -> IterMut<'_, 'a, T> {
        IterMut {
            next: self.root.as_deref_mut(),
        }
    }
}

/// Iterates over `list` if it exists, or logs a warning and iterates over nothing if it doesn't.
pub fn iter_or_warn<'l, 'a, T>(list: Option<&'l List<'a, T>>) -> Iter<'l, 'a, T> {
    match list {
        Some(list) => list.iter(),
        None => {
            warn!("Iterating over a list which was never created");
            Iter { next: None }
        }
    }
}

/// Iterator over the elements of a [`List`].
pub struct Iter<'l, 'a, T> {
    next: Option<&'l ListNode<'a, T>>,
}

impl<'l, T> Iterator for Iter<'l, '_, T> {
    type Item = &'l T;

    fn next(&mut self) -> Option<&'l T> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &*node.data
        })
    }
}

/// Mutable iterator over the elements of a [`List`].
pub struct IterMut<'l, 'a, T> {
    next: Option<&'l mut ListNode<'a, T>>,
}

impl<'l, T> Iterator for IterMut<'l, '_, T> {
    type Item = &'l mut T;

    fn next(&mut self) -> Option<&'l mut T> {
        self.next.take().map(|node| {
            let ListNode { data, next } = node;
            self.next = next.as_deref_mut();
            &mut **data
        })
    }
}
