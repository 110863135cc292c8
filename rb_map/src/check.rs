use crate::error::Violation;
use crate::map::RbMap;
use crate::node::NodeId;

impl<K, V> RbMap<K, V> {
    /// Number of nodes on the longest path from the root down, 0 for an empty map.
    ///
    /// A red-black tree with `n` entries is never taller than `2 * log2(n + 1)`.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = Vec::new();
        stack.extend(self.root.map(|root| (root, 1)));
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[id];
            stack.extend(node.left.map(|left| (left, depth + 1)));
            stack.extend(node.right.map(|right| (right, depth + 1)));
        }
        height
    }
}

impl<K, V> RbMap<K, V>
where
    K: Ord,
{
    /// Walks the whole tree and reports the first broken structural property.
    ///
    /// Checks the key order, the coloring rules, that every child links back to
    /// its parent and that every stored entry is reachable from the root. A map
    /// built only through the public API always passes.
    ///
    /// # Errors
    ///
    /// The [`Violation`] found first.
    pub fn check_invariants(&self) -> Result<(), Violation> {
        let mut reachable = 0;
        if let Some(root) = self.root {
            let node = self.nodes.get(root).ok_or(Violation::BrokenParentLink)?;
            if node.parent.is_some() {
                return Err(Violation::BrokenParentLink);
            }
            if node.color.is_red() {
                return Err(Violation::RedRoot);
            }
            self.check_subtree(root, None, None, &mut reachable)?;
        }

        if reachable != self.len() {
            return Err(Violation::CountMismatch {
                stored: self.len(),
                reachable,
            });
        }
        Ok(())
    }

    /// Returns the black height of the subtree, not counting empty links.
    fn check_subtree(
        &self,
        id: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        count: &mut usize,
    ) -> Result<usize, Violation> {
        let node = &self.nodes[id];
        *count += 1;

        if lower.is_some_and(|lower| node.key <= *lower)
            || upper.is_some_and(|upper| node.key >= *upper)
        {
            return Err(Violation::UnorderedKeys);
        }

        if node.color.is_red()
            && (self.color_of(node.left).is_red() || self.color_of(node.right).is_red())
        {
            return Err(Violation::RedRedEdge);
        }

        let mut heights = [0; 2];
        for (height, (child, lower, upper)) in heights.iter_mut().zip([
            (node.left, lower, Some(&node.key)),
            (node.right, Some(&node.key), upper),
        ]) {
            let Some(child) = child else {
                continue;
            };
            // A dangling id or a child that points elsewhere. Also rules out cycles.
            match self.nodes.get(child) {
                Some(c) if c.parent == Some(id) => {}
                _ => return Err(Violation::BrokenParentLink),
            }
            *height = self.check_subtree(child, lower, upper, count)?;
        }

        let [left, right] = heights;
        if left != right {
            return Err(Violation::BlackHeightMismatch { left, right });
        }
        Ok(left + usize::from(node.color.is_black()))
    }
}
