//! Structural mutation of the tree and the fixups that restore the red-black
//! properties afterwards:
//!
//! 1. every node is red or black,
//! 2. the root is black,
//! 3. a red node has no red children,
//! 4. every path from a node down to an empty link has the same number of black nodes.

use core::mem;

use log::trace;

use crate::error::RotationError;
use crate::map::RbMap;
use crate::node::{Color, Node, NodeId, NodePos};

impl<K, V> RbMap<K, V> {
    /// Attaches a new red leaf at the slot found by a search and rebalances.
    /// Returns the id of the new node, which stays valid through the fixup.
    pub(crate) fn link_new(
        &mut self,
        key: K,
        value: V,
        parent: Option<NodeId>,
        side: NodePos,
    ) -> NodeId {
        let id = self.nodes.insert(Node::new(key, value, parent));
        match parent {
            None => {
                self.nodes[id].color = Color::Black;
                self.root = Some(id);
            }
            Some(parent) => {
                self.nodes[parent].set_child(side, Some(id));
                if self.nodes[parent].color.is_red() {
                    self.insert_fixup(id);
                }
            }
        }
        id
    }

    /// Rotates the subtree rooted at `node` in `direction`.
    ///
    /// ```text
    ///    p                       p
    ///    |        left           |
    /// +-node-+    -->        +-right-+
    /// |      |               |       |
    /// a  +-right-+       +-node-+    c
    ///    |       |       |      |
    ///    b       c       a      b
    /// ```
    ///
    /// A right rotation is the mirror image, lifting the left child. `a`, `b` and
    /// `c` can be any subtrees. Colors are left alone. Returns the node that took
    /// the place of `node`.
    pub(crate) fn rotate(
        &mut self,
        node: NodeId,
        direction: NodePos,
    ) -> Result<NodeId, RotationError> {
        if !self.nodes.contains(node) {
            return Err(RotationError::NullRotationTarget);
        }
        if direction == NodePos::Root {
            return Err(RotationError::InvalidDirection);
        }
        let lifted_side = direction.opposite();
        let Some(lifted) = self.nodes[node].child(lifted_side) else {
            return Err(RotationError::RotationImpossible { direction });
        };

        // attach b to node
        let inner = self.nodes[lifted].child(direction);
        self.nodes[node].set_child(lifted_side, inner);
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(node);
        }

        // attach lifted to the parent of node
        self.replace_subtree(node, Some(lifted));

        // attach node to lifted
        self.nodes[lifted].set_child(direction, Some(node));
        self.nodes[node].parent = Some(lifted);
        Ok(lifted)
    }

    /// Rotation inside a fixup, where the shape has already been checked.
    #[track_caller]
    fn must_rotate(&mut self, node: NodeId, direction: NodePos) -> NodeId {
        match self.rotate(node, direction) {
            Ok(lifted) => lifted,
            Err(err) => panic!("red-black tree is corrupted: {err}"),
        }
    }

    /// Makes the parent of `old` point to `new` instead, and `new` point back to
    /// that parent. If `old` was the root, `new` becomes the root.
    fn replace_subtree(&mut self, old: NodeId, new: Option<NodeId>) {
        let parent = self.nodes[old].parent;
        match (self.pos(old), parent) {
            (NodePos::Root, _) | (_, None) => self.root = new,
            (side, Some(parent)) => self.nodes[parent].set_child(side, new),
        }
        if let Some(new) = new {
            self.nodes[new].parent = parent;
        }
    }

    fn insert_fixup(&mut self, new_node: NodeId) {
        let mut node = new_node;
        loop {
            let Some(mut parent) = self.nodes[node].parent else {
                break;
            };
            if self.nodes[parent].color.is_black() {
                break;
            }

            // Red parent with a red child is the only violation. The parent cannot be
            // the root because the root is black, so the grandparent exists.
            let grand_parent = self.nodes[parent]
                .parent
                .expect("a red node is never the root");
            let parent_pos = self.pos(parent);
            let uncle = self.nodes[grand_parent].child(parent_pos.opposite());

            match uncle {
                Some(uncle) if self.nodes[uncle].color.is_red() => {
                    //     +--- gp:b ---+               +--- gp:r ---+
                    //     |            |               |            |
                    //  + p:r +      + u:r +   -->   + p:b +      + u:b +
                    //  |     |      |     |         |     |      |     |
                    // n:r   a:b    b:b   c:b       n:r   a:b    b:b   c:b
                    //
                    // Black height is unchanged, but gp may now have a red parent.
                    // Repeat from gp.
                    trace!("insert fixup: red uncle, recolor and move up");
                    self.nodes[parent].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[grand_parent].color = Color::Red;
                    node = grand_parent;
                }
                _ => {
                    if self.pos(node) != parent_pos {
                        //       +-- gp:b --+                 +-- gp:b --+
                        //       |          |                 |          |
                        //  +-- p:r --+    u:b  -->       +- n:r --+    u:b
                        //  |         |                   |        |
                        // a:b    +- n:r -+           +- p:r -+   c:b
                        //        |       |           |       |
                        //       b:b     c:b         a:b     b:b
                        //
                        // Rotate the inner child to the outside and swap the roles of
                        // node and parent so the case below applies.
                        trace!("insert fixup: black uncle, inner child");
                        self.must_rotate(parent, parent_pos);
                        mem::swap(&mut parent, &mut node);
                    }

                    //           +-- gp:b --+            +----- p:b -----+
                    //           |          |            |               |
                    //      +-- p:r --+    u:b  -->   +- n:r -+     +- gp:r -+
                    //      |         |               |       |     |        |
                    //  +- n:r -+    c:b             a:b     b:b   c:b      u:b
                    //  |       |
                    // a:b     b:b
                    //
                    // The subtree root is black again and the black height of every
                    // path is the same as before. Done.
                    trace!("insert fixup: black uncle, outer child");
                    self.must_rotate(grand_parent, parent_pos.opposite());
                    self.nodes[parent].color = Color::Black;
                    self.nodes[grand_parent].color = Color::Red;
                    break;
                }
            }
        }

        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }
    }

    /// Unlinks `id` from the tree, rebalances and frees its slot.
    ///
    /// The returned node carries the key and value that were stored at `id` when
    /// this was called, though not necessarily its links or color.
    pub(crate) fn remove_node(&mut self, id: NodeId) -> Node<K, V> {
        let mut target = id;
        if let (Some(left), Some(_)) = (self.nodes[id].left, self.nodes[id].right) {
            // Two children. The in-order predecessor is the maximum of the left
            // subtree, so it has no right child. Move its entry up into `id` and
            // unlink the predecessor's node instead.
            let predecessor = self.max_of(left);
            self.swap_entries(id, predecessor);
            target = predecessor;
        }

        let node = &self.nodes[target];
        let color = node.color;
        match node.left.or(node.right) {
            None if self.root == Some(target) => self.root = None,
            None => {
                // Fix the tree while the leaf is still linked, the fixup needs its
                // parent and sibling. Rotations never give it children.
                if color.is_black() {
                    self.resolve_deficit(target);
                }
                let side = self.pos(target);
                if let Some(parent) = self.nodes[target].parent {
                    self.nodes[parent].set_child(side, None);
                }
            }
            Some(child) => {
                self.replace_subtree(target, Some(child));
                if color.is_black() {
                    if self.nodes[child].color.is_red() {
                        // the red child absorbs the missing black
                        self.nodes[child].color = Color::Black;
                    } else {
                        self.resolve_deficit(child);
                    }
                }
            }
        }

        match self.nodes.try_remove(target) {
            Some(node) => node,
            None => unreachable!("removed node {target:?} was not in the slab"),
        }
    }

    fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        let (a, b) = self
            .nodes
            .get2_mut(a, b)
            .expect("swap needs two distinct live nodes");
        mem::swap(&mut a.key, &mut b.key);
        mem::swap(&mut a.value, &mut b.value);
    }

    /// Restores the black height after the paths through `x` lost one black node.
    ///
    /// `x` itself is black. The "double black" of the textbook version is the loop
    /// variable here: whichever node `x` names carries the deficit.
    fn resolve_deficit(&mut self, mut x: NodeId) {
        loop {
            let Some(parent) = self.nodes[x].parent else {
                // Case 1: every path lost one black, which is still uniform.
                trace!("delete fixup: deficit reached the root");
                self.nodes[x].color = Color::Black;
                break;
            };

            let side = self.pos(x);
            let far_side = side.opposite();
            // The paths through x still have at least one black node, so the
            // other side of the parent cannot be empty.
            let sibling = self.nodes[parent]
                .child(far_side)
                .expect("a node short of one black has a sibling");

            if self.nodes[sibling].color.is_red() {
                //       +--- p:b ---+                     +---- s:b ----+
                //       |           |                     |             |
                //      x:b     +-- s:r --+     -->   +-- p:r --+       d:b
                //              |         |           |         |
                //             c:b       d:b         x:b       c:b
                //
                // Turns the sibling black without fixing anything yet: x now has
                // a black sibling (c) and a red parent, which the cases below handle.
                trace!("delete fixup case 2: red sibling");
                self.must_rotate(parent, side);
                self.nodes[sibling].color = self.nodes[parent].color;
                self.nodes[parent].color = Color::Red;
                continue;
            }

            let near = self.nodes[sibling].child(side);
            let far = self.nodes[sibling].child(far_side);

            if let Some(far) = far.filter(|far| self.nodes[*far].color.is_red()) {
                //       +--- p:? ---+                     +---- s:? ----+
                //       |           |                     |             |
                //      x:b     +-- s:b --+     -->   +-- p:b --+       d:b
                //              |         |           |         |
                //             c:?       d:r         x:b       c:?
                //
                // x gains a black ancestor, d makes up for the black that moved off
                // its path, and the subtree root keeps its old color. Done.
                trace!("delete fixup case 6: far nephew red");
                self.must_rotate(parent, side);
                self.nodes[sibling].color = self.nodes[parent].color;
                self.nodes[parent].color = Color::Black;
                self.nodes[far].color = Color::Black;
                break;
            }

            if let Some(near) = near.filter(|near| self.nodes[*near].color.is_red()) {
                //       +--- p:? ---+                 +--- p:? ---+
                //       |           |                 |           |
                //      x:b     +-- s:b --+   -->     x:b     +-- c:b --+
                //              |         |                   |         |
                //             c:r       d:b                 .       s:r --+
                //                                                         |
                //                                                        d:b
                //
                // Moves the red nephew to the far side, next round is case 6.
                trace!("delete fixup case 5: near nephew red");
                self.nodes[near].color = Color::Black;
                self.nodes[sibling].color = Color::Red;
                self.must_rotate(sibling, far_side);
                continue;
            }

            // Both nephews black: take one black off the sibling's side too.
            self.nodes[sibling].color = Color::Red;
            if self.nodes[parent].color.is_red() {
                // Case 4: the red parent turns black and pays for both sides.
                trace!("delete fixup case 4: black sibling, red parent");
                self.nodes[parent].color = Color::Black;
                break;
            }

            // Case 3: the whole subtree under the parent is now one black short.
            trace!("delete fixup case 3: black sibling, black parent, move up");
            x = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Color::{Black, Red};

    /// Renders a subtree as `key color (left, right)`, `-` for an empty link.
    fn render(map: &RbMap<i32, ()>) -> String {
        fn inner(map: &RbMap<i32, ()>, id: Option<NodeId>, out: &mut String) {
            let Some(id) = id else {
                out.push('-');
                return;
            };
            let node = &map.nodes[id];
            let color = if node.color.is_red() { 'R' } else { 'B' };
            out.push_str(&format!("{}{}", node.key, color));
            if node.left.is_some() || node.right.is_some() {
                out.push('(');
                inner(map, node.left, out);
                out.push(',');
                inner(map, node.right, out);
                out.push(')');
            }
        }

        let mut out = String::new();
        inner(map, map.root, &mut out);
        out
    }

    /// Hand-builds a tree without any balancing.
    fn attach(
        map: &mut RbMap<i32, ()>,
        key: i32,
        color: Color,
        parent: Option<(NodeId, NodePos)>,
    ) -> NodeId {
        let mut node = Node::new(key, (), parent.map(|(p, _)| p));
        node.color = color;
        let id = map.nodes.insert(node);
        match parent {
            Some((parent, side)) => map.nodes[parent].set_child(side, Some(id)),
            None => map.root = Some(id),
        }
        id
    }

    fn insert_all(keys: &[i32]) -> RbMap<i32, ()> {
        let mut map = RbMap::new();
        for key in keys {
            map.insert(*key, ());
        }
        map
    }

    fn find(map: &RbMap<i32, ()>, key: i32) -> NodeId {
        match map.search(&key) {
            crate::map::Search::Found(id) => id,
            _ => panic!("{key} is not in the tree"),
        }
    }

    #[test]
    fn rotate_roundtrip() {
        let mut map = RbMap::new();
        let root = attach(&mut map, 12, Black, None);
        attach(&mut map, 9, Black, Some((root, NodePos::Left)));
        let right = attach(&mut map, 15, Black, Some((root, NodePos::Right)));
        attach(&mut map, 14, Black, Some((right, NodePos::Left)));
        attach(&mut map, 16, Black, Some((right, NodePos::Right)));
        let expected0 = "12B(9B,15B(14B,16B))";
        assert_eq!(render(&map), expected0);

        assert_eq!(map.rotate(root, NodePos::Left), Ok(right));
        let expected1 = "15B(12B(9B,14B),16B)";
        assert_eq!(render(&map), expected1);
        assert_eq!(map.root, Some(right));
        assert_eq!(map.nodes[right].parent, None);

        map.rotate(map.root.unwrap(), NodePos::Left).unwrap();
        let expected2 = "16B(15B(12B(9B,14B),-),-)";
        assert_eq!(render(&map), expected2);

        map.rotate(find(&map, 12), NodePos::Left).unwrap();
        assert_eq!(render(&map), "16B(15B(14B(12B(9B,-),-),-),-)");
        assert_eq!(map.nodes[find(&map, 12)].parent, Some(find(&map, 14)));

        map.rotate(find(&map, 14), NodePos::Right).unwrap();
        assert_eq!(render(&map), expected2);

        map.rotate(map.root.unwrap(), NodePos::Right).unwrap();
        assert_eq!(render(&map), expected1);

        map.rotate(map.root.unwrap(), NodePos::Right).unwrap();
        assert_eq!(render(&map), expected0);
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn rotate_errors() {
        let mut map = RbMap::new();
        let root = attach(&mut map, 50, Black, None);
        let left = attach(&mut map, 10, Red, Some((root, NodePos::Left)));

        assert_eq!(
            map.rotate(root, NodePos::Left),
            Err(RotationError::RotationImpossible {
                direction: NodePos::Left
            })
        );
        assert_eq!(
            map.rotate(left, NodePos::Right),
            Err(RotationError::RotationImpossible {
                direction: NodePos::Right
            })
        );
        assert_eq!(
            map.rotate(root, NodePos::Root),
            Err(RotationError::InvalidDirection)
        );

        map.nodes[root].left = None;
        map.nodes.remove(left);
        assert_eq!(
            map.rotate(left, NodePos::Right),
            Err(RotationError::NullRotationTarget)
        );

        // nothing changed along the way
        assert_eq!(render(&map), "50B");
    }

    #[test]
    #[should_panic(expected = "red-black tree is corrupted")]
    fn must_rotate_panics() {
        let mut map = RbMap::new();
        let root = attach(&mut map, 1, Black, None);
        map.must_rotate(root, NodePos::Right);
    }

    #[test]
    fn insert_into_empty_is_black_root() {
        let map = insert_all(&[17]);
        assert_eq!(render(&map), "17B");
    }

    #[test]
    fn insert_red_uncle() {
        /* Update colors when parent and uncle nodes are red.
            [17B]                  [17B]
             /  \                  /   \
          [09B] [19B] -------->  [09B] [19R] <- Updated
                /   \                   /  \
              [18R] [75R]  Updated -> [18B] [75B] <- Updated
                      \                       \
                      [81R]                  [81R]
        */
        let mut map = insert_all(&[17, 19, 9, 18, 75]);
        assert_eq!(render(&map), "17B(9B,19B(18R,75R))");
        map.insert(81, ());
        assert_eq!(render(&map), "17B(9B,19R(18B,75B(-,81R)))");
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn insert_black_uncle_inner_child() {
        /* Parent is red, uncle is black (absent), new node is an inner grandchild.
                   [17B]
                   /   \
                [09B] [24B]
                      /   \
                    [19R] [75R]
        */
        let map = insert_all(&[17, 9, 19, 75, 24]);
        assert_eq!(render(&map), "17B(9B,24B(19R,75R))");
        let map = insert_all(&[17, 9, 19, 15, 18]);
        assert_eq!(render(&map), "17B(9B(-,15R),19B(18R,-))");
        let map = insert_all(&[30, 10, 20]);
        assert_eq!(render(&map), "20B(10R,30R)");
    }

    #[test]
    fn insert_black_uncle_outer_child() {
        let map = insert_all(&[10, 20, 30]);
        assert_eq!(render(&map), "20B(10R,30R)");
        let map = insert_all(&[30, 20, 10]);
        assert_eq!(render(&map), "20B(10R,30R)");
    }

    #[test]
    fn insert_scenario_shape() {
        let map = insert_all(&[10, 20, 30, 15, 5, 1]);
        assert_eq!(render(&map), "20B(10R(5B(1R,-),15B),30B)");
    }

    #[test]
    fn erase_two_children_uses_predecessor() {
        let mut map = insert_all(&[10, 20, 30, 15, 5, 1]);
        let root = map.root.unwrap();
        map.erase(&20);
        // 15 moved up into the root slot, the far red nephew fixed the deficit
        assert_eq!(render(&map), "15B(5R(1B,10B),30B)");
        assert_eq!(map.root, Some(root));
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn erase_red_leaf() {
        let mut map = insert_all(&[10, 5, 15]);
        map.erase(&15);
        assert_eq!(render(&map), "10B(5R,-)");
        map.erase(&10);
        assert_eq!(render(&map), "5B");
        map.erase(&5);
        assert_eq!(render(&map), "-");
        assert!(map.is_empty());
    }

    #[test]
    fn erase_black_with_red_child() {
        let mut map = insert_all(&[10, 5, 15, 20]);
        assert_eq!(render(&map), "10B(5B,15B(-,20R))");
        map.erase(&15);
        assert_eq!(render(&map), "10B(5B,20B)");
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn erase_black_with_black_child_splices_and_fixes() {
        // Not reachable in a valid tree, a black node with a single black child
        // already breaks the black height. The fixup still repairs the spliced child.
        let mut map = RbMap::new();
        let root = attach(&mut map, 10, Black, None);
        let left = attach(&mut map, 5, Black, Some((root, NodePos::Left)));
        attach(&mut map, 2, Black, Some((left, NodePos::Left)));
        let right = attach(&mut map, 20, Black, Some((root, NodePos::Right)));
        attach(&mut map, 15, Black, Some((right, NodePos::Left)));
        attach(&mut map, 25, Black, Some((right, NodePos::Right)));

        map.erase(&5);
        assert_eq!(render(&map), "10B(2B,20R(15B,25B))");
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn delete_sibling_red() {
        /* Delete 09B
               [17B]                [19B]
               /   \                /   \
            [09B] [19R]       -> [17B] [75B]
                  /   \             \
               [18B] [75B]         [18R]
        */
        let mut map = RbMap::new();
        let root = attach(&mut map, 17, Black, None);
        attach(&mut map, 9, Black, Some((root, NodePos::Left)));
        let right = attach(&mut map, 19, Red, Some((root, NodePos::Right)));
        attach(&mut map, 18, Black, Some((right, NodePos::Left)));
        attach(&mut map, 75, Black, Some((right, NodePos::Right)));
        assert_eq!(map.check_invariants(), Ok(()));

        map.erase(&9);
        assert_eq!(render(&map), "19B(17B(-,18R),75B)");
        assert_eq!(map.root, Some(right));
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn delete_sibling_black_with_red_parent() {
        /* Delete 75B
                  [17B]                   [17B]
                 /    \                  /   \
             [09B]     [19R]    ->   [09B]    [19B]
             /   \     /   \         /   \     /
           [03R][12R][18B][75B]    [03R][12R][18R]
        */
        let mut map = RbMap::new();
        let root = attach(&mut map, 17, Black, None);
        let left = attach(&mut map, 9, Black, Some((root, NodePos::Left)));
        let right = attach(&mut map, 19, Red, Some((root, NodePos::Right)));
        attach(&mut map, 3, Red, Some((left, NodePos::Left)));
        attach(&mut map, 12, Red, Some((left, NodePos::Right)));
        attach(&mut map, 18, Black, Some((right, NodePos::Left)));
        attach(&mut map, 75, Black, Some((right, NodePos::Right)));

        map.erase(&75);
        assert_eq!(render(&map), "17B(9B(3R,12R),19B(18R,-))");
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn delete_sibling_black_with_black_parent() {
        /* Delete 18B
                  [17B]                   [17B]
                 /    \                  /   \
             [09B]     [19B]    ->   [09R]    [19B]
             /   \     /   \         /   \        \
           [03B][12B][18B][75B]    [03B][12B]    [75R]
        */
        let mut map = RbMap::new();
        let root = attach(&mut map, 17, Black, None);
        let left = attach(&mut map, 9, Black, Some((root, NodePos::Left)));
        let right = attach(&mut map, 19, Black, Some((root, NodePos::Right)));
        attach(&mut map, 3, Black, Some((left, NodePos::Left)));
        attach(&mut map, 12, Black, Some((left, NodePos::Right)));
        attach(&mut map, 18, Black, Some((right, NodePos::Left)));
        attach(&mut map, 75, Black, Some((right, NodePos::Right)));

        map.erase(&18);
        assert_eq!(render(&map), "17B(9R(3B,12B),19B(-,75R))");
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn delete_sibling_black_with_red_near_nephew() {
        /* Delete 18B
           [17B]            [17B]
           /   \            /   \
        [09B][19R]    ->  [09B][24R]
             /   \             /   \
           [18B][75B]       [19B] [75B]
                /
             [24R]
        */
        let mut map = RbMap::new();
        let root = attach(&mut map, 17, Black, None);
        attach(&mut map, 9, Black, Some((root, NodePos::Left)));
        let right = attach(&mut map, 19, Red, Some((root, NodePos::Right)));
        attach(&mut map, 18, Black, Some((right, NodePos::Left)));
        let right_r = attach(&mut map, 75, Black, Some((right, NodePos::Right)));
        attach(&mut map, 24, Red, Some((right_r, NodePos::Left)));

        map.erase(&18);
        assert_eq!(render(&map), "17B(9B,24R(19B,75B))");
    }

    #[test]
    fn delete_sibling_black_with_red_far_nephew() {
        /* Delete 18B
           [17B]            [17B]
           /   \            /   \
        [09B][19R]    ->  [09B][75R]
             /   \             /   \
           [18B][75B]       [19B] [81B]
                /  \            \
             [24R][81R]        [24R]
        */
        let mut map = RbMap::new();
        let root = attach(&mut map, 17, Black, None);
        attach(&mut map, 9, Black, Some((root, NodePos::Left)));
        let right = attach(&mut map, 19, Red, Some((root, NodePos::Right)));
        attach(&mut map, 18, Black, Some((right, NodePos::Left)));
        let right_r = attach(&mut map, 75, Black, Some((right, NodePos::Right)));
        attach(&mut map, 24, Red, Some((right_r, NodePos::Left)));
        attach(&mut map, 81, Red, Some((right_r, NodePos::Right)));

        map.erase(&18);
        assert_eq!(render(&map), "17B(9B,75R(19B(-,24R),81B))");
    }

    #[test]
    fn delete_mirrored_cases() {
        // right-hand versions of the cases above, the deficit sits on the right
        let mut map = insert_all(&[20, 10, 30, 5]);
        assert_eq!(render(&map), "20B(10B(5R,-),30B)");
        map.erase(&30);
        assert_eq!(render(&map), "10B(5B,20B)");

        let mut map = insert_all(&[20, 10, 30, 15]);
        map.erase(&30);
        assert_eq!(render(&map), "15B(10B,20B)");

        let mut map = insert_all(&[20, 10, 30]);
        map.erase(&30);
        assert_eq!(render(&map), "20B(10R,-)");
        assert_eq!(map.check_invariants(), Ok(()));
    }

    #[test]
    fn remove_node_returns_entry() {
        let mut map = insert_all(&[4, 2, 6, 1, 3, 5, 7]);
        let id = find(&map, 4);
        let node = map.remove_node(id);
        assert_eq!(node.key, 4);
        assert_eq!(map.len(), 6);
        assert_eq!(map.check_invariants(), Ok(()));
    }

    mod fuzz {
        use rand::seq::SliceRandom;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        use super::*;

        #[cfg(not(miri))]
        const ROUNDS: u64 = 50;
        #[cfg(miri)]
        const ROUNDS: u64 = 2;

        #[test]
        fn height_stays_logarithmic() {
            for seed in 0..ROUNDS {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut keys: Vec<i32> = (0..2000).collect();
                keys.shuffle(&mut rng);

                let mut map = RbMap::new();
                for key in &keys {
                    map.insert(*key, ());
                }
                assert_eq!(map.check_invariants(), Ok(()));
                // 2 * log2(n + 1)
                assert!(map.height() <= 22, "height {}", map.height());

                keys.shuffle(&mut rng);
                for key in &keys[..1000] {
                    assert!(map.erase(key).is_some());
                }
                assert_eq!(map.check_invariants(), Ok(()));
                assert!(map.height() <= 20, "height {}", map.height());
            }
        }

        #[test]
        fn sorted_inserts_stay_balanced() {
            let mut map = RbMap::new();
            for key in 0..4096 {
                map.insert(key, ());
            }
            assert_eq!(map.check_invariants(), Ok(()));
            assert!(map.height() <= 24);
            for key in (0..4096).rev().step_by(2) {
                map.erase(&key);
            }
            assert_eq!(map.check_invariants(), Ok(()));
            assert_eq!(map.len(), 2048);
        }
    }
}
