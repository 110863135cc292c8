/// Key of a node in the map's [`Slab`](slab::Slab).
pub(crate) type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    pub(crate) fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    pub(crate) fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

/// Where a node hangs from its parent. Also used as a rotation direction, where
/// only `Left` and `Right` are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodePos {
    Root,
    Left,
    Right,
}

impl NodePos {
    #[inline]
    pub(crate) fn opposite(self) -> Self {
        match self {
            Self::Root => Self::Root,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    /// New nodes are always red leaves.
    pub(crate) fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: NodePos) -> Option<NodeId> {
        match side {
            NodePos::Root => None,
            NodePos::Left => self.left,
            NodePos::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: NodePos, child: Option<NodeId>) {
        match side {
            NodePos::Root => unreachable!("a node has no root child"),
            NodePos::Left => self.left = child,
            NodePos::Right => self.right = child,
        }
    }
}
