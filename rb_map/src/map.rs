use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::ops::Index;

use slab::Slab;

use crate::iter::{IntoIter, Iter, Keys, Preorder, Values};
use crate::node::{Color, Node, NodeId, NodePos};
use crate::{Error, Result};

/// An ordered map backed by a red-black tree.
///
/// Nodes live in a slab and link to each other by key, so rotations are
/// plain index reassignment and dropping the map frees everything at once.
///
/// Keys are unique. [`insert`](Self::insert) never overwrites an existing value,
/// use [`get_or_insert_with`](Self::get_or_insert_with) or
/// [`at_mut`](Self::at_mut) to change one.
#[derive(Clone)]
pub struct RbMap<K, V> {
    pub(crate) nodes: Slab<Node<K, V>>,
    pub(crate) root: Option<NodeId>,
}

/// Outcome of a key descent.
pub(crate) enum Search {
    Found(NodeId),
    /// Key is absent. A new node would hang from `parent` on `side`,
    /// or become the root if `parent` is `None`.
    Vacant {
        parent: Option<NodeId>,
        side: NodePos,
    },
}

impl<K, V> RbMap<K, V> {
    pub const fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Entry with the smallest key.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the map is empty.
    pub fn min(&self) -> Result<(&K, &V)> {
        let root = self.root.ok_or(Error::EmptyTree)?;
        Ok(self.entry(self.min_of(root)))
    }

    /// Entry with the largest key.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the map is empty.
    pub fn max(&self) -> Result<(&K, &V)> {
        let root = self.root.ok_or(Error::EmptyTree)?;
        Ok(self.entry(self.max_of(root)))
    }

    /// Iterates over the entries in key order. The iterator is double ended, so
    /// `.rev()` walks from the maximum down.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Iterates over the entries in preorder: node, left subtree, right subtree.
    ///
    /// This is the order [`export`](Self::export) writes by default. Every node
    /// comes before its subtrees, so reinserting the entries in this order fills
    /// the tree top down.
    pub fn preorder(&self) -> Preorder<'_, K, V> {
        Preorder::new(self)
    }

    /// Calls `f` on every entry in key order, with mutable access to the value.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        let mut current = self.first_node();
        while let Some(id) = current {
            let next = self.next_node(id);
            let node = &mut self.nodes[id];
            f(&node.key, &mut node.value);
            current = next;
        }
    }

    #[inline]
    pub(crate) fn entry(&self, id: NodeId) -> (&K, &V) {
        let node = &self.nodes[id];
        (&node.key, &node.value)
    }

    /// Absent nodes count as black.
    #[inline]
    pub(crate) fn color_of(&self, id: Option<NodeId>) -> Color {
        id.map_or(Color::Black, |id| self.nodes[id].color)
    }

    pub(crate) fn pos(&self, id: NodeId) -> NodePos {
        match self.nodes[id].parent {
            None => NodePos::Root,
            Some(parent) => {
                if self.nodes[parent].left == Some(id) {
                    NodePos::Left
                } else {
                    debug_assert_eq!(self.nodes[parent].right, Some(id));
                    NodePos::Right
                }
            }
        }
    }

    pub(crate) fn min_of(&self, root: NodeId) -> NodeId {
        let mut x = root;
        while let Some(left) = self.nodes[x].left {
            x = left;
        }
        x
    }

    pub(crate) fn max_of(&self, root: NodeId) -> NodeId {
        let mut x = root;
        while let Some(right) = self.nodes[x].right {
            x = right;
        }
        x
    }

    pub(crate) fn first_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.min_of(root))
    }

    pub(crate) fn last_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.max_of(root))
    }

    /// In-order successor of `id`, `None` if `id` holds the maximum.
    pub(crate) fn next_node(&self, id: NodeId) -> Option<NodeId> {
        // With a right subtree the successor is its minimum. Otherwise climb until
        // we arrive from a left child; that parent is the first larger key.
        if let Some(right) = self.nodes[id].right {
            return Some(self.min_of(right));
        }

        let mut node = id;
        while let Some(parent) = self.nodes[node].parent {
            if self.nodes[parent].left == Some(node) {
                return Some(parent);
            }
            node = parent;
        }
        None
    }

    /// In-order predecessor of `id`, `None` if `id` holds the minimum.
    pub(crate) fn prev_node(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[id].left {
            return Some(self.max_of(left));
        }

        let mut node = id;
        while let Some(parent) = self.nodes[node].parent {
            if self.nodes[parent].right == Some(node) {
                return Some(parent);
            }
            node = parent;
        }
        None
    }
}

impl<K, V> RbMap<K, V>
where
    K: Ord,
{
    /// Inserts `key` with `value` if `key` is not in the map yet.
    ///
    /// Returns `None` when the entry was inserted. If the key already exists the
    /// map is left untouched and the rejected pair is handed back as
    /// `Some((key, value))`.
    ///
    /// # Time Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        match self.search(&key) {
            Search::Found(_) => Some((key, value)),
            Search::Vacant { parent, side } => {
                self.link_new(key, value, parent, side);
                None
            }
        }
    }

    /// Returns the value of `key`, inserting `f()` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let id = match self.search(&key) {
            Search::Found(id) => id,
            Search::Vacant { parent, side } => self.link_new(key, f(), parent, side),
        };
        &mut self.nodes[id].value
    }

    /// Returns the value of `key`, inserting `V::default()` first if the key is absent.
    pub fn get_or_insert(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Removes `key` from the map and returns its entry.
    ///
    /// Erasing a key that is not present, or erasing from an empty map, does nothing.
    ///
    /// # Time Complexity
    ///
    /// O(log n)
    pub fn erase<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(id) => {
                let node = self.remove_node(id);
                Some((node.key, node.value))
            }
            Search::Vacant { .. } => None,
        }
    }

    /// Looks up the entry of `key`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the map is empty, [`Error::KeyNotFound`] if `key`
    /// is not in it.
    pub fn lookup<Q>(&self, key: &Q) -> Result<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|id| self.entry(id))
    }

    /// Value of `key`, see [`lookup`](Self::lookup) for the errors.
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|id| &self.nodes[id].value)
    }

    /// Mutable value of `key`, see [`lookup`](Self::lookup) for the errors.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(key)?;
        Ok(&mut self.nodes[id].value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.at(key).ok()
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.at_mut(key).ok()
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.lookup(key).ok()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        matches!(self.search(key), Search::Found(_))
    }

    /// Entry with the largest key smaller than `key`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] or [`Error::KeyNotFound`] if `key` itself is not in the
    /// map, [`Error::NoPredecessor`] if it is the minimum.
    pub fn predecessor<Q>(&self, key: &Q) -> Result<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(key)?;
        self.prev_node(id)
            .map(|prev| self.entry(prev))
            .ok_or(Error::NoPredecessor)
    }

    /// Entry with the smallest key larger than `key`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] or [`Error::KeyNotFound`] if `key` itself is not in the
    /// map, [`Error::NoSuccessor`] if it is the maximum.
    pub fn successor<Q>(&self, key: &Q) -> Result<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_node(key)?;
        self.next_node(id)
            .map(|next| self.entry(next))
            .ok_or(Error::NoSuccessor)
    }

    pub(crate) fn search<Q>(&self, key: &Q) -> Search
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut current) = self.root else {
            return Search::Vacant {
                parent: None,
                side: NodePos::Root,
            };
        };

        loop {
            let node = &self.nodes[current];
            let side = match key.cmp(node.key.borrow()) {
                Ordering::Less => NodePos::Left,
                Ordering::Greater => NodePos::Right,
                Ordering::Equal => return Search::Found(current),
            };
            match node.child(side) {
                Some(child) => current = child,
                None => {
                    return Search::Vacant {
                        parent: Some(current),
                        side,
                    }
                }
            }
        }
    }

    fn find_node<Q>(&self, key: &Q) -> Result<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(id) => Ok(id),
            Search::Vacant { parent: None, .. } => Err(Error::EmptyTree),
            Search::Vacant { .. } => Err(Error::KeyNotFound),
        }
    }
}

impl<K, V> Default for RbMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for RbMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Entries<'a, K, V>(&'a RbMap<K, V>);

        impl<K, V> fmt::Debug for Entries<'_, K, V>
        where
            K: fmt::Debug,
            V: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map().entries(self.0.iter()).finish()
            }
        }

        f.debug_struct("RbMap")
            .field("len", &self.len())
            .field("root", &self.root.map(|root| &self.nodes[root].key))
            .field("entries", &Entries(self))
            .finish()
    }
}

impl<K, V> PartialEq for RbMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for RbMap<K, V>
where
    K: Eq,
    V: Eq,
{
}

impl<K, Q, V> Index<&Q> for RbMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V> Extend<(K, V)> for RbMap<K, V>
where
    K: Ord,
{
    /// Inserts every pair. The first occurrence of a key wins.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RbMap<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a RbMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for RbMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
