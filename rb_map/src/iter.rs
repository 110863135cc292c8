use core::fmt;
use core::iter::FusedIterator;
use std::vec;

use slab::Slab;

use crate::map::RbMap;
use crate::node::{Node, NodeId};

/// In-order iterator over the entries of an [`RbMap`].
///
/// Created by [`RbMap::iter`].
pub struct Iter<'a, K, V> {
    map: &'a RbMap<K, V>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    // Both ends walk the same sequence, this stops them from crossing.
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(map: &'a RbMap<K, V>) -> Self {
        Self {
            map,
            front: map.first_node(),
            back: map.last_node(),
            remaining: map.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.remaining -= 1;
        self.front = self.map.next_node(id);
        Some(self.map.entry(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.remaining -= 1;
        self.back = self.map.prev_node(id);
        Some(self.map.entry(id))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Keys of an [`RbMap`] in order. Created by [`RbMap::keys`].
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Values of an [`RbMap`] in key order. Created by [`RbMap::values`].
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Owning in-order iterator. Created by [`RbMap::into_iter`](IntoIterator::into_iter).
///
/// Entries not yet yielded are dropped with the iterator.
pub struct IntoIter<K, V> {
    nodes: Slab<Node<K, V>>,
    order: vec::IntoIter<NodeId>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(map: RbMap<K, V>) -> Self {
        let mut order = Vec::with_capacity(map.len());
        let mut current = map.first_node();
        while let Some(id) = current {
            order.push(id);
            current = map.next_node(id);
        }
        Self {
            nodes: map.nodes,
            order: order.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.order.next()?;
        let node = self.nodes.try_remove(id)?;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.order.next_back()?;
        let node = self.nodes.try_remove(id)?;
        Some((node.key, node.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Preorder iterator: node, then its left subtree, then its right subtree.
///
/// Created by [`RbMap::preorder`].
pub struct Preorder<'a, K, V> {
    map: &'a RbMap<K, V>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Preorder<'a, K, V> {
    pub(crate) fn new(map: &'a RbMap<K, V>) -> Self {
        let mut stack = Vec::new();
        stack.extend(map.root);
        Self {
            map,
            stack,
            remaining: map.len(),
        }
    }
}

impl<'a, K, V> Iterator for Preorder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.map.nodes[id];
        // right first so the left subtree comes off the stack first
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Preorder<'_, K, V> {}
impl<K, V> FusedIterator for Preorder<'_, K, V> {}

impl<K, V> Clone for Preorder<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
