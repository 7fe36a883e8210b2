use alloc::vec::Vec;
use core::{borrow::Borrow, cmp::Ordering, mem};

/// Sentinel index standing in for an absent node. Always reads as black.
pub(crate) const NIL: usize = usize::MAX;

/// Largest tree that is fully re-verified after every mutation in debug builds.
/// Bigger trees skip the O(n) walk so that large debug workloads stay O(log n).
#[cfg(any(test, debug_assertions))]
pub(crate) const DEBUG_VERIFY_MAX_LEN: usize = 1 << 12;

/// Red-Black tree node colors used to maintain tree balance properties.
///
/// Red-Black trees maintain balance by ensuring:
/// - Red nodes have black children
/// - All paths from a node to the leaves below it have equal black node counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    /// Red node - must have black children, cannot be adjacent to other red nodes
    Red,
    /// Black node - can have children of any color, contributes to black height
    Black,
}

/// A node in the Red-Black tree containing one entry and its structural links.
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    /// Ordering key
    key: K,

    /// Payload associated with the key
    value: V,

    /// Index of parent node in the arena (NIL if this is root)
    parent: usize,

    /// Index of left child node in the arena (NIL if no left child)
    left: usize,

    /// Index of right child node in the arena (NIL if no right child)
    right: usize,

    /// Color of this node used for Red-Black tree balancing
    color: Color,
}

impl<K, V> Node<K, V> {
    const fn new(key: K, value: V, parent: usize, color: Color) -> Self {
        Self {
            key,
            value,
            parent,
            left: NIL,
            right: NIL,
            color,
        }
    }
}

/// An arena backed Red-Black tree mapping keys to values.
///
/// Nodes are stored contiguously in a `Vec` and refer to each other by index.
/// Child links own their subtrees, the `parent` index is only a back-reference
/// used by the fixups and the in-order walks. The arena is kept dense: when a
/// node is released the last node of the arena moves into its slot.
#[derive(Debug, Clone)]
pub(crate) struct RbTree<K, V> {
    /// Every live node, in no particular order
    nodes: Vec<Node<K, V>>,

    /// Index of the root node in the arena
    /// Equal to NIL when tree is empty
    root: usize,
}

impl<K, V> RbTree<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NIL,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity < NIL,
            "Capacity too large - collides with the nil sentinel"
        );

        Self {
            nodes: Vec::with_capacity(capacity),
            root: NIL,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.root == NIL
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = NIL;
    }

    #[cfg(test)]
    const fn root(&self) -> usize {
        self.root
    }

    #[inline]
    const fn node_at(&self, idx: usize) -> &Node<K, V> {
        &self.nodes.as_slice()[idx]
    }

    #[inline]
    const fn node_at_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        &mut self.nodes.as_mut_slice()[idx]
    }

    #[cfg(test)]
    const fn key_at(&self, idx: usize) -> &K {
        &self.node_at(idx).key
    }

    #[inline]
    pub(crate) const fn entry_at(&self, idx: usize) -> (&K, &V) {
        let node = self.node_at(idx);
        (&node.key, &node.value)
    }

    #[inline]
    pub(crate) const fn value_at_mut(&mut self, idx: usize) -> &mut V {
        &mut self.node_at_mut(idx).value
    }

    #[inline]
    const fn get_color(&self, idx: usize) -> Color {
        if idx == NIL {
            Color::Black
        } else {
            self.node_at(idx).color
        }
    }

    #[inline]
    const fn set_color(&mut self, idx: usize, color: Color) {
        if idx != NIL {
            self.node_at_mut(idx).color = color;
        }
    }

    #[inline]
    const fn is_red(&self, idx: usize) -> bool {
        matches!(self.get_color(idx), Color::Red)
    }

    #[inline]
    const fn is_black(&self, idx: usize) -> bool {
        matches!(self.get_color(idx), Color::Black)
    }

    #[inline]
    const fn get_parent(&self, idx: usize) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).parent
        }
    }

    #[inline]
    const fn get_left(&self, idx: usize) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).left
        }
    }

    #[inline]
    const fn get_right(&self, idx: usize) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).right
        }
    }

    const fn find_minimum(&self, mut idx: usize) -> usize {
        while idx != NIL {
            let left = self.node_at(idx).left;
            if left == NIL {
                break;
            }
            idx = left;
        }
        idx
    }

    const fn find_maximum(&self, mut idx: usize) -> usize {
        while idx != NIL {
            let right = self.node_at(idx).right;
            if right == NIL {
                break;
            }
            idx = right;
        }
        idx
    }

    pub(crate) fn first(&self) -> Option<usize> {
        (self.root != NIL).then(|| self.find_minimum(self.root))
    }

    pub(crate) fn last(&self) -> Option<usize> {
        (self.root != NIL).then(|| self.find_maximum(self.root))
    }

    /// In-order previous node, walking up through parents when there is no
    /// left subtree.
    pub(crate) fn predecessor(&self, idx: usize) -> Option<usize> {
        if idx == NIL {
            return None;
        }

        let left = self.node_at(idx).left;
        if left != NIL {
            return Some(self.find_maximum(left));
        }

        let mut child = idx;
        let mut parent = self.node_at(idx).parent;
        while parent != NIL && child == self.node_at(parent).left {
            child = parent;
            parent = self.node_at(parent).parent;
        }
        (parent != NIL).then_some(parent)
    }

    /// In-order next node. Mirror of [`RbTree::predecessor`].
    pub(crate) fn successor(&self, idx: usize) -> Option<usize> {
        if idx == NIL {
            return None;
        }

        let right = self.node_at(idx).right;
        if right != NIL {
            return Some(self.find_minimum(right));
        }

        let mut child = idx;
        let mut parent = self.node_at(idx).parent;
        while parent != NIL && child == self.node_at(parent).right {
            child = parent;
            parent = self.node_at(parent).parent;
        }
        (parent != NIL).then_some(parent)
    }

    /// Walks the entries in ascending key order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        let mut next = self.first();
        core::iter::from_fn(move || {
            let idx = next?;
            next = self.successor(idx);
            Some(self.entry_at(idx))
        })
    }

    /// Points `parent`'s link that referred to `old` at `new`, or the root when
    /// `parent` is NIL.
    const fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == NIL {
            self.root = new;
        } else if self.node_at(parent).left == old {
            self.node_at_mut(parent).left = new;
        } else {
            self.node_at_mut(parent).right = new;
        }
    }

    //    p               p
    //    |               |
    //    x               y
    //   / \             / \
    //  a   y    ==>    x   c
    //     / \         / \
    //    b   c       a   b
    //
    // y inherits x's color and x turns red.
    const fn rotate_left(&mut self, x: usize) {
        if x == NIL {
            return;
        }

        let y = self.node_at(x).right;
        if y == NIL {
            return;
        }

        let y_left = self.node_at(y).left;
        self.node_at_mut(x).right = y_left;
        if y_left != NIL {
            self.node_at_mut(y_left).parent = x;
        }

        let x_parent = self.node_at(x).parent;
        self.node_at_mut(y).parent = x_parent;
        self.replace_child(x_parent, x, y);

        self.node_at_mut(y).left = x;
        self.node_at_mut(x).parent = y;

        let x_color = self.node_at(x).color;
        self.node_at_mut(y).color = x_color;
        self.node_at_mut(x).color = Color::Red;
    }

    //      p             p
    //      |             |
    //      y             x
    //     / \           / \
    //    x   c   ==>   a   y
    //   / \               / \
    //  a   b             b   c
    //
    // x inherits y's color and y turns red.
    const fn rotate_right(&mut self, y: usize) {
        if y == NIL {
            return;
        }

        let x = self.node_at(y).left;
        if x == NIL {
            return;
        }

        let x_right = self.node_at(x).right;
        self.node_at_mut(y).left = x_right;
        if x_right != NIL {
            self.node_at_mut(x_right).parent = y;
        }

        let y_parent = self.node_at(y).parent;
        self.node_at_mut(x).parent = y_parent;
        self.replace_child(y_parent, y, x);

        self.node_at_mut(x).right = y;
        self.node_at_mut(y).parent = x;

        let y_color = self.node_at(y).color;
        self.node_at_mut(x).color = y_color;
        self.node_at_mut(y).color = Color::Red;
    }

    /// Splits a temporary 4-node: `idx` turns red, both children black.
    const fn flip_colors(&mut self, idx: usize) {
        let (left, right) = {
            let node = self.node_at(idx);
            (node.left, node.right)
        };
        debug_assert!(left != NIL && right != NIL, "flip_colors needs two children");

        self.set_color(idx, Color::Red);
        self.set_color(left, Color::Black);
        self.set_color(right, Color::Black);
    }

    fn fix_insertion_violations(&mut self, mut node: usize) {
        while self.is_red(self.get_parent(node)) {
            let parent = self.get_parent(node);
            let grandparent = self.get_parent(parent);

            if parent == self.get_left(grandparent) {
                let uncle = self.get_right(grandparent);

                if self.is_red(uncle) {
                    log::trace!("insert fixup: red uncle, splitting 4-node at {grandparent}");
                    self.flip_colors(grandparent);
                    node = grandparent;
                } else {
                    if node == self.get_right(parent) {
                        node = parent;
                        self.rotate_left(node);
                    }
                    log::trace!("insert fixup: black uncle, rotating right");
                    self.rotate_right(self.get_parent(self.get_parent(node)));
                }
            } else {
                let uncle = self.get_left(grandparent);

                if self.is_red(uncle) {
                    log::trace!("insert fixup: red uncle, splitting 4-node at {grandparent}");
                    self.flip_colors(grandparent);
                    node = grandparent;
                } else {
                    if node == self.get_left(parent) {
                        node = parent;
                        self.rotate_right(node);
                    }
                    log::trace!("insert fixup: black uncle, rotating left");
                    self.rotate_left(self.get_parent(self.get_parent(node)));
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }

    /// Restores black height around `node`, a black leaf that is about to be
    /// detached. `node` must still be linked into the tree.
    fn fix_deletion_violations(&mut self, mut node: usize) {
        while node != self.root && self.is_black(node) {
            let parent = self.get_parent(node);

            if node == self.get_left(parent) {
                let mut sibling = self.get_right(parent);

                if self.is_red(sibling) {
                    log::trace!("remove fixup: red sibling, rotating left at {parent}");
                    self.rotate_left(parent);
                    sibling = self.get_right(self.get_parent(node));
                }

                if self.is_black(self.get_left(sibling)) && self.is_black(self.get_right(sibling))
                {
                    self.set_color(sibling, Color::Red);
                    node = self.get_parent(node);
                } else {
                    if self.is_black(self.get_right(sibling)) {
                        self.rotate_right(sibling);
                        sibling = self.get_right(self.get_parent(node));
                    }
                    log::trace!("remove fixup: borrowing from right sibling {sibling}");
                    self.rotate_left(self.get_parent(node));
                    self.set_color(self.get_parent(node), Color::Black);
                    self.set_color(self.get_right(sibling), Color::Black);
                    node = self.root;
                }
            } else {
                let mut sibling = self.get_left(parent);

                if self.is_red(sibling) {
                    log::trace!("remove fixup: red sibling, rotating right at {parent}");
                    self.rotate_right(parent);
                    sibling = self.get_left(self.get_parent(node));
                }

                if self.is_black(self.get_right(sibling)) && self.is_black(self.get_left(sibling))
                {
                    self.set_color(sibling, Color::Red);
                    node = self.get_parent(node);
                } else {
                    if self.is_black(self.get_left(sibling)) {
                        self.rotate_left(sibling);
                        sibling = self.get_left(self.get_parent(node));
                    }
                    log::trace!("remove fixup: borrowing from left sibling {sibling}");
                    self.rotate_right(self.get_parent(node));
                    self.set_color(self.get_parent(node), Color::Black);
                    self.set_color(self.get_left(sibling), Color::Black);
                    node = self.root;
                }
            }
        }
        self.set_color(node, Color::Black);
    }

    /// Detaches `idx`, which has at most one child, from the tree.
    fn unlink(&mut self, idx: usize) {
        let (parent, left, right) = {
            let node = self.node_at(idx);
            (node.parent, node.left, node.right)
        };
        debug_assert!(left == NIL || right == NIL, "unlinked node has two children");
        let child = if left != NIL { left } else { right };

        if child != NIL {
            if self.is_black(idx) {
                self.set_color(child, Color::Black);
            }
            self.node_at_mut(child).parent = parent;
            self.replace_child(parent, idx, child);
        } else if parent == NIL {
            log::trace!("removed the last node, tree is empty");
            self.root = NIL;
        } else {
            if self.is_black(idx) {
                self.fix_deletion_violations(idx);
            }
            // rotations in the fixup may have moved the leaf under a new parent
            let parent = self.node_at(idx).parent;
            self.replace_child(parent, idx, NIL);
        }

        let node = self.node_at_mut(idx);
        node.parent = NIL;
        node.left = NIL;
        node.right = NIL;
    }

    /// Takes a detached node out of the arena. The last node of the arena is
    /// moved into the freed slot and its neighbours are re-pointed.
    fn release(&mut self, idx: usize) -> Node<K, V> {
        let removed = self.nodes.swap_remove(idx);

        let moved_from = self.nodes.len();
        if idx < moved_from {
            let (parent, left, right) = {
                let moved = self.node_at(idx);
                (moved.parent, moved.left, moved.right)
            };
            self.replace_child(parent, moved_from, idx);
            if left != NIL {
                self.node_at_mut(left).parent = idx;
            }
            if right != NIL {
                self.node_at_mut(right).parent = idx;
            }
        }

        removed
    }

    /// Exchanges key and value of two distinct nodes, leaving links and colors.
    fn swap_payload(&mut self, a: usize, b: usize) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        let (lo_node, hi_node) = (&mut head[lo], &mut tail[0]);
        mem::swap(&mut lo_node.key, &mut hi_node.key);
        mem::swap(&mut lo_node.value, &mut hi_node.value);
    }
}

impl<K: Ord, V> RbTree<K, V> {
    pub(crate) fn find_node<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;

        while current != NIL {
            let node = self.node_at(current);
            match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(current),
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        None
    }

    /// Descends from a non-empty root. Returns the matching node with
    /// `Ordering::Equal`, or the parent to attach under together with the side.
    fn find_insertion_point(&self, key: &K) -> (usize, Ordering) {
        debug_assert!(self.root != NIL);

        let mut current = self.root;
        loop {
            let node = self.node_at(current);
            let ordering = key.cmp(&node.key);
            let next = match ordering {
                Ordering::Equal => return (current, ordering),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
            if next == NIL {
                return (current, ordering);
            }
            current = next;
        }
    }

    /// Inserts `key`, or overwrites the value in place when the key is present.
    /// Returns the previous value on overwrite.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.root == NIL {
            debug_assert!(self.nodes.is_empty());
            self.nodes.push(Node::new(key, value, NIL, Color::Black));
            self.root = 0;
            return None;
        }

        let (parent, ordering) = self.find_insertion_point(&key);
        if ordering == Ordering::Equal {
            return Some(mem::replace(self.value_at_mut(parent), value));
        }

        let new_idx = self.nodes.len();
        self.nodes.push(Node::new(key, value, parent, Color::Red));
        if ordering == Ordering::Less {
            self.node_at_mut(parent).left = new_idx;
        } else {
            self.node_at_mut(parent).right = new_idx;
        }

        self.fix_insertion_violations(new_idx);

        #[cfg(debug_assertions)]
        if self.debug_verify_due() {
            debug_assert!(
                self.verify_rb_invariants(),
                "RB tree invariants violated after insertion"
            );
        }

        None
    }

    /// Removes the entry holding `key` and returns it.
    ///
    /// A node with two children keeps its place in the tree and takes over the
    /// payload of its in-order predecessor, which is the node actually unlinked.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find_node(key)?;

        let left = self.node_at(target).left;
        let right = self.node_at(target).right;
        let replacement = if left != NIL && right != NIL {
            self.find_maximum(left)
        } else if left != NIL {
            left
        } else if right != NIL {
            right
        } else {
            target
        };

        if replacement != target {
            self.swap_payload(target, replacement);
        }

        self.unlink(replacement);
        let node = self.release(replacement);

        #[cfg(debug_assertions)]
        if self.debug_verify_due() {
            debug_assert!(
                self.verify_rb_invariants(),
                "RB tree invariants violated after removal"
            );
        }

        Some((node.key, node.value))
    }

    #[cfg(any(test, debug_assertions))]
    const fn debug_verify_due(&self) -> bool {
        self.nodes.len() <= DEBUG_VERIFY_MAX_LEN
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn verify_rb_invariants(&self) -> bool {
        if self.root == NIL {
            return self.nodes.is_empty();
        }

        if !self.is_black(self.root) || self.node_at(self.root).parent != NIL {
            return false;
        }

        match self.verify_subtree(self.root, None, None) {
            Some((_, count)) => count == self.nodes.len(),
            None => false,
        }
    }

    /// Black height of the whole tree, counting the nil leaves.
    #[cfg(test)]
    pub(crate) fn black_height(&self) -> Option<usize> {
        self.verify_subtree(self.root, None, None)
            .map(|(height, _)| height)
    }

    /// Returns `(black height, node count)` of the subtree at `idx`, or `None`
    /// if any invariant is broken below it. Keys must lie strictly between
    /// `lower` and `upper`.
    #[cfg(any(test, debug_assertions))]
    fn verify_subtree(
        &self,
        idx: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Option<(usize, usize)> {
        if idx == NIL {
            return Some((1, 0));
        }

        let node = self.node_at(idx);

        if lower.is_some_and(|lower| node.key <= *lower)
            || upper.is_some_and(|upper| node.key >= *upper)
        {
            return None;
        }

        for child in [node.left, node.right] {
            if child != NIL && self.node_at(child).parent != idx {
                return None;
            }
        }

        if self.is_red(idx) && (self.is_red(node.left) || self.is_red(node.right)) {
            return None;
        }

        let (left_height, left_count) = self.verify_subtree(node.left, lower, Some(&node.key))?;
        let (right_height, right_count) =
            self.verify_subtree(node.right, Some(&node.key), upper)?;

        if left_height != right_height {
            return None;
        }

        let height = if self.is_black(idx) {
            left_height + 1
        } else {
            left_height
        };
        Some((height, left_count + right_count + 1))
    }
}
