// =====================================================================
// File: index/node.rs
// Author: Bob Jack
// Date: Sept 21, 2025 - Reworked Oct. 6, 2025
//
// Description:
//   Defines the core B-tree node (`BTreeNode`) used by the index.
//   A node is either a leaf or an internal node:
//
//   - `Leaf`     : ordered key–value entries only.
//   - `Internal` : ordered key–value entries plus `entries.len() + 1`
//                  owned children.
//
// Notes:
//   * Leaf vs. internal is part of the type, so asking a leaf for a
//     child is a broken invariant and panics instead of returning junk.
//   * The node never validates itself. Size and ordering rules are
//     kept by `tree.rs` and `rebalance.rs`.
// =====================================================================

use std::borrow::Borrow;


/// Basic foundational B-tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BTreeNode<K, V> {
    /// Bottom level node, holds entries only.
    Leaf { entries: Vec<(K, V)> },
    /// Separator entries and the subtrees between them.
    /// Box allows the tree to own its children recursively - Heap
    Internal {
        entries: Vec<(K, V)>,
        children: Vec<Box<BTreeNode<K, V>>>,
    },
}


/// Panics with a uniform message for a broken structural invariant.
#[cold]
#[track_caller]
pub(crate) fn violation(msg: &str) -> ! {
    panic!("B-tree consistency violation: {msg}")
}


impl<K, V> BTreeNode<K, V> {
    /// Creates a new empty leaf.
    ///
    /// # Example
    /// ```
    /// use btree_index::BTreeNode;
    /// let leaf: BTreeNode<u32, ()> = BTreeNode::new_leaf();
    /// assert!(leaf.is_leaf());
    /// assert!(leaf.is_empty());
    /// ```
    pub fn new_leaf() -> Self {
        BTreeNode::Leaf { entries: Vec::new() }
    }


    /// Creates a leaf holding a single entry. Used for the first insert.
    pub fn leaf_with(key: K, value: V) -> Self {
        BTreeNode::Leaf { entries: vec![(key, value)] }
    }


    /// Creates a key-less internal node over a single child.
    ///
    /// This is only a valid node for the instant between growing the
    /// root and splitting its child.
    pub(crate) fn internal_over(child: Box<Self>) -> Self {
        BTreeNode::Internal {
            entries: Vec::new(),
            children: vec![child],
        }
    }


    pub fn is_leaf(&self) -> bool {
        matches!(self, BTreeNode::Leaf { .. })
    }


    /// The ordered entries stored in this node.
    pub fn entries(&self) -> &[(K, V)] {
        match self {
            BTreeNode::Leaf { entries } | BTreeNode::Internal { entries, .. } => entries,
        }
    }


    pub(crate) fn entries_mut(&mut self) -> &mut Vec<(K, V)> {
        match self {
            BTreeNode::Leaf { entries } | BTreeNode::Internal { entries, .. } => entries,
        }
    }


    /// Child links of this node; always empty for a leaf.
    pub fn children(&self) -> &[Box<Self>] {
        match self {
            BTreeNode::Leaf { .. } => &[],
            BTreeNode::Internal { children, .. } => children,
        }
    }


    /// Number of keys held by this node (not the subtree).
    pub fn len(&self) -> usize {
        self.entries().len()
    }


    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }


    /// Iterates the keys of this node in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries().iter().map(|(k, _)| k)
    }


    /// Child at `idx`. Panics when called on a leaf.
    #[track_caller]
    pub(crate) fn child(&self, idx: usize) -> &Self {
        match self {
            BTreeNode::Internal { children, .. } => &children[idx],
            BTreeNode::Leaf { .. } => violation("leaf node has no children"),
        }
    }


    /// Mutable child at `idx`. Panics when called on a leaf.
    #[track_caller]
    pub(crate) fn child_mut(&mut self, idx: usize) -> &mut Self {
        match self {
            BTreeNode::Internal { children, .. } => &mut children[idx],
            BTreeNode::Leaf { .. } => violation("leaf node has no children"),
        }
    }


    /// Removes the first entry, and for internal nodes the first child.
    #[track_caller]
    pub(crate) fn pop_first(&mut self) -> ((K, V), Option<Box<Self>>) {
        match self {
            BTreeNode::Leaf { entries } if !entries.is_empty() => (entries.remove(0), None),
            BTreeNode::Internal { entries, children } if !entries.is_empty() => {
                (entries.remove(0), Some(children.remove(0)))
            }
            _ => violation("cannot take an entry from an empty node"),
        }
    }


    /// Removes the last entry, and for internal nodes the last child.
    #[track_caller]
    pub(crate) fn pop_last(&mut self) -> ((K, V), Option<Box<Self>>) {
        match self {
            BTreeNode::Leaf { entries } => match entries.pop() {
                Some(entry) => (entry, None),
                None => violation("cannot take an entry from an empty node"),
            },
            BTreeNode::Internal { entries, children } => match entries.pop() {
                Some(entry) => (entry, children.pop()),
                None => violation("cannot take an entry from an empty node"),
            },
        }
    }


    /// Prepends an entry, and for internal nodes the child left of it.
    #[track_caller]
    pub(crate) fn push_front(&mut self, entry: (K, V), child: Option<Box<Self>>) {
        match (self, child) {
            (BTreeNode::Leaf { entries }, None) => entries.insert(0, entry),
            (BTreeNode::Internal { entries, children }, Some(child)) => {
                entries.insert(0, entry);
                children.insert(0, child);
            }
            _ => violation("sibling nodes are at different heights"),
        }
    }


    /// Appends an entry, and for internal nodes the child right of it.
    #[track_caller]
    pub(crate) fn push_back(&mut self, entry: (K, V), child: Option<Box<Self>>) {
        match (self, child) {
            (BTreeNode::Leaf { entries }, None) => entries.push(entry),
            (BTreeNode::Internal { entries, children }, Some(child)) => {
                entries.push(entry);
                children.push(child);
            }
            _ => violation("sibling nodes are at different heights"),
        }
    }


    /// Number of levels in this subtree, counting this node.
    pub fn height(&self) -> usize {
        // Every leaf sits at the same depth, so the leftmost path is enough
        let mut levels = 1;
        let mut current_node = self;
        while let BTreeNode::Internal { children, .. } = current_node {
            current_node = &children[0];
            levels += 1;
        }
        levels
    }


    /// Collects all keys stored in this subtree and appends them to the
    /// provided output vector in sorted (in-order) order.
    ///
    /// # Example
    /// ```
    /// use btree_index::BTreeNode;
    ///
    /// let node = BTreeNode::leaf_with("a".to_string(), 1);
    /// let mut out = Vec::new();
    /// node.collect_keys(&mut out);
    ///
    /// assert_eq!(out, vec!["a".to_string()]);
    /// ```
    pub fn collect_keys(&self, out: &mut Vec<K>)
    where
        K: Clone,
    {
        match self {
            BTreeNode::Leaf { entries } => {
                // Push ONLY keys
                out.extend(entries.iter().map(|(k, _)| k.clone()));
            }
            BTreeNode::Internal { entries, children } => {
                // Internal node: in-order traversal
                for (i, (k, _)) in entries.iter().enumerate() {
                    // Left subtree, then the separator
                    children[i].collect_keys(out);
                    out.push(k.clone());
                }

                // Last child (rightmost subtree)
                children[entries.len()].collect_keys(out);
            }
        }
    }
}


impl<K: Ord, V> BTreeNode<K, V> {
    /// Binary search helper: returns the index of the key if found,
    /// or the position where it should be inserted otherwise.
    ///
    /// # Returns
    ///
    /// The index of the first key that is >= `key`.
    /// If all stored keys are less than `key`, returns the length
    /// (i.e., the "end" position, also the rightmost child).
    ///
    /// # Example
    /// ```
    /// use btree_index::BTreeNode;
    ///
    /// let node = BTreeNode::Leaf {
    ///     entries: vec![("cat".to_string(), 1), ("dog".to_string(), 2)],
    /// };
    ///
    /// assert_eq!(node.lower_bound("ant"), 0);
    /// assert_eq!(node.lower_bound("dog"), 1);
    /// assert_eq!(node.lower_bound("elephant"), 2);
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries()
            .binary_search_by(|(k, _)| k.borrow().cmp(key))
            .unwrap_or_else(|pos| pos)
    }


    /// Returns `(idx, true)` when `key` is stored at `idx` in this node,
    /// otherwise `(lower_bound, false)`.
    pub(crate) fn locate<Q>(&self, key: &Q) -> (usize, bool)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.lower_bound(key);
        let found = self
            .entries()
            .get(idx)
            .is_some_and(|(k, _)| k.borrow() == key);
        (idx, found)
    }
}
