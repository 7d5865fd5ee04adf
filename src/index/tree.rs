// =====================================================================
// File: index/tree.rs
// Author: Bob Jack
// Date: Sept 21, 2025 - Reworked Oct. 7, 2025
//
// Description:
//   Implements the B-tree index (`BTreeIndex`) that manages insertion,
//   search, and deletion over `BTreeNode` structures. This is the
//   ordered map the word index is built on.
//
// Features:
//   - `insert`: Adds a key–value pair. Existing keys are never
//               overwritten (first write wins), use `search_mut` to
//               update a stored value in place.
//   - `search`: Standard B-tree search; returns the value for a key.
//   - `delete`: Removes keys while preserving B-tree invariants.
//   - `validate`: Full structural check, used by tests and `CHECK`.
//
// Notes:
//   * Node restructuring lives in `rebalance.rs`.
//   * The minimum degree `t` determines the branching factor: every
//     node except the root holds between `t - 1` and `2t - 1` keys.
//   * An empty tree has no root at all.
// =====================================================================
use std::borrow::Borrow;

use tracing::debug;

use super::node::BTreeNode;
use super::rebalance;
use crate::error::{Error, Result};

/// BTree Index: the minimum degree (t) and the root node, if any.
#[derive(Debug, Clone)]
pub struct BTreeIndex<K, V> {
    t: usize,
    root: Option<Box<BTreeNode<K, V>>>,
    len: usize,
}


// BTree Referencing:
// https://build-your-own.org/database/
// https://www.geeksforgeeks.org/dsa/introduction-of-b-tree-2/
impl<K, V> BTreeIndex<K, V> {
    /// Create a new empty B-tree with minimum degree `t`.
    ///
    /// # Errors
    /// [`Error::InvalidConfiguration`] when `t < 2`.
    ///
    /// # Example
    /// ```
    /// use btree_index::BTreeIndex;
    ///
    /// let tree: BTreeIndex<u32, String> = BTreeIndex::new(3).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BTreeIndex::<u32, String>::new(1).is_err());
    /// ```
    pub fn new(t: usize) -> Result<Self> {
        if t < 2 {
            return Err(Error::InvalidConfiguration {
                reason: format!("B-tree minimum degree must be >= 2, got {t}"),
            });
        }
        Ok(Self {
            t,
            root: None,
            len: 0,
        })
    }


    /// Wraps a hand-built node graph, unchecked. Test-only.
    #[cfg(test)]
    pub(crate) fn from_root(t: usize, root: BTreeNode<K, V>) -> Self {
        fn count<K, V>(node: &BTreeNode<K, V>) -> usize {
            node.len() + node.children().iter().map(|c| count(c.as_ref())).sum::<usize>()
        }
        Self {
            t,
            len: count(&root),
            root: Some(Box::new(root)),
        }
    }


    pub fn min_degree(&self) -> usize {
        self.t
    }


    /// Most keys a node may hold: `2t - 1`.
    pub fn max_keys(&self) -> usize {
        2 * self.t - 1
    }


    /// Fewest keys a non-root node may hold: `t - 1`.
    pub fn min_keys(&self) -> usize {
        self.t - 1
    }


    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }


    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }


    /// Number of levels; 0 for an empty tree, 1 for a lone leaf root.
    pub fn height(&self) -> usize {
        self.root.as_deref().map_or(0, BTreeNode::height)
    }


    /// Read-only access to the root node.
    pub fn root(&self) -> Option<&BTreeNode<K, V>> {
        self.root.as_deref()
    }


    /// All keys in ascending order (in-order traversal).
    ///
    /// Diagnostic helper, allocates a fresh vector on every call.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = &self.root {
            root.collect_keys(&mut out);
        }
        out
    }
}


impl<K: Ord, V> BTreeIndex<K, V> {
    /// Search for a key in the B-tree.
    ///
    /// Traverses the tree from the root, descending into child nodes as
    /// needed, to locate the target key.
    ///
    /// # Returns
    /// * `Some(&V)` if the key exists.
    /// * `None` if the key is not in the tree (always for an empty tree).
    ///
    /// # Example
    /// ```
    /// use btree_index::BTreeIndex;
    /// let mut t = BTreeIndex::new(2).unwrap();
    /// t.insert("dog".to_string(), "bark");
    /// assert_eq!(t.search("dog"), Some(&"bark"));
    /// assert_eq!(t.search("cat"), None);
    /// ```
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.as_deref()?;
        loop {
            let (idx, found) = node.locate(key);

            // Base case - found the key in the current node
            if found {
                return Some(&node.entries()[idx].1);
            }
            // No key here and nowhere left to look
            if node.is_leaf() {
                return None;
            }
            node = node.child(idx);
        }
    }


    /// Like [`search`](Self::search) but hands out the stored value for
    /// in-place updates. The key itself cannot be changed.
    ///
    /// # Example
    /// ```
    /// use btree_index::BTreeIndex;
    /// let mut t = BTreeIndex::new(2).unwrap();
    /// t.insert("dog".to_string(), 1);
    /// if let Some(count) = t.search_mut("dog") {
    ///     *count += 1;
    /// }
    /// assert_eq!(t.search("dog"), Some(&2));
    /// ```
    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.as_deref_mut()?;
        loop {
            let (idx, found) = node.locate(key);
            if found {
                return Some(&mut node.entries_mut()[idx].1);
            }
            if node.is_leaf() {
                return None;
            }
            node = node.child_mut(idx);
        }
    }


    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }


    /// Insert a key-value pair into the B-tree.
    ///
    /// - If the key already exists anywhere in the tree nothing changes
    ///   and `false` is returned (first write wins).
    /// - Otherwise the pair is inserted at its sorted position and
    ///   `true` is returned.
    /// - If the root node is full, the tree grows in height by splitting
    ///   the root. This is the only way the tree gets taller.
    ///
    /// # Example
    /// ```
    /// use btree_index::BTreeIndex;
    ///
    /// let mut index = BTreeIndex::new(2).unwrap();
    /// assert!(index.insert("dog".to_string(), "bark"));
    /// assert!(index.insert("cat".to_string(), "meow"));
    ///
    /// // Existing keys are left alone
    /// assert!(!index.insert("dog".to_string(), "woof"));
    /// assert_eq!(index.search("dog"), Some(&"bark"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        // Duplicate check happens before any node is touched
        if self.contains_key(&key) {
            return false;
        }
        let t = self.t;

        let mut root = match self.root.take() {
            // First ever entry - a lone leaf root
            None => {
                self.root = Some(Box::new(BTreeNode::leaf_with(key, value)));
                self.len = 1;
                return true;
            }
            Some(root) => root,
        };

        if root.len() == self.max_keys() {
            // Create a new root and hang the old root under it
            let mut new_root = Box::new(BTreeNode::internal_over(root));
            // Split old root (now child 0 of new_root)
            rebalance::split_child(new_root.as_mut(), 0, t);
            root = new_root;
            debug!(height = root.height(), "root split, tree grew");
        }

        Self::insert_non_full(&mut root, t, key, value);
        self.root = Some(root);
        self.len += 1;
        true
    }


    /// Delete `key` from the tree.
    ///
    /// Returns `true` if the key was present and removed, `false` if it
    /// was not in the tree (the tree is untouched in that case).
    ///
    /// # Example
    /// ```
    /// use btree_index::BTreeIndex;
    /// let mut index = BTreeIndex::new(2).unwrap();
    /// index.insert("dog".to_string(), "bark");
    /// assert!(index.delete("dog"));
    /// assert!(!index.delete("dog"));
    /// assert_eq!(index.search("dog"), None);
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q> + Clone,
        Q: Ord + ?Sized,
    {
        self.remove(key).is_some()
    }


    /// Remove `key` and return its value.
    ///
    /// Same algorithm as [`delete`](Self::delete), keeping the removed
    /// payload. `K: Clone` is needed because an internal key is replaced
    /// by its predecessor or successor, whose key is then deleted from
    /// the child subtree by value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q> + Clone,
        Q: Ord + ?Sized,
    {
        // Existence check happens before any node is touched
        if !self.contains_key(key) {
            return None;
        }
        let t = self.t;
        let min_keys = self.min_keys();

        let mut root = self.root.take()?;
        if rebalance::root_needs_collapse(root.as_ref(), min_keys) {
            root = rebalance::collapse_root(root, t);
            debug!(height = root.height(), "root collapsed, tree shrank");
        }

        let removed = Self::delete_internal(&mut root, t, key);
        debug_assert!(removed.is_some(), "present key was not removed");

        // A leaf root that lost its last entry means the tree is empty
        if !root.is_empty() {
            self.root = Some(root);
        }
        if removed.is_some() {
            self.len -= 1;
        }
        removed.map(|(_, v)| v)
    }


    // =========================
    // Insertion helpers
    // =========================

    /// Inserts a key-value pair into the subtree rooted at `node`, which
    /// is known not to be full and not to contain `key`.
    ///
    /// # Behavior
    /// - **Leaf node**: insert `(key, value)` at the sorted position.
    /// - **Internal node**: split the target child first if it is full,
    ///   then recurse into the correct child.
    fn insert_non_full(node: &mut BTreeNode<K, V>, t: usize, key: K, value: V) {
        let mut idx = node.lower_bound(&key);

        // Base case - leaf insert, room is guaranteed by pre-splitting
        if node.is_leaf() {
            rebalance::insert_entry(node, idx, (key, value));
            return;
        }

        // Recurse case: make sure the child has room before descending
        if node.child(idx).len() == 2 * t - 1 {
            rebalance::split_child(node, idx, t);

            // After split decide which child to descend into
            if key > node.entries()[idx].0 {
                idx += 1;
            }
        }
        Self::insert_non_full(node.child_mut(idx), t, key, value);
    }


    // =========================
    // Deletion helpers
    // =========================

    /// Recursive helper for deleting a key from a B-tree node.
    ///
    /// # Behavior
    ///
    /// 1. **Key found in this node**
    ///    - Leaf: remove the entry directly.
    ///    - Internal:
    ///       * Right child has more than `t - 1` keys: replace with the
    ///         successor, then delete the successor from that child.
    ///       * Else left child has more than `t - 1` keys: replace with
    ///         the predecessor, then delete it from that child.
    ///       * Otherwise merge the two children around the key and retry
    ///         on this node.
    ///
    /// 2. **Key not found in this node**
    ///    - Leaf: the key is not present, nothing is done.
    ///    - Internal: a child with only `t - 1` keys is fattened first
    ///      (borrow from left, borrow from right, else merge), then the
    ///      delete continues from this node or descends.
    ///
    /// The root collapse case is handled by [`remove`](Self::remove)
    /// before this is called, so `node` is never a one-key root over two
    /// minimal children.
    fn delete_internal<Q>(node: &mut BTreeNode<K, V>, t: usize, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q> + Clone,
        Q: Ord + ?Sized,
    {
        let min_keys = t - 1;
        let (idx, found) = node.locate(key);

        // Leaf - either the entry is here or it is nowhere
        if node.is_leaf() {
            return found.then(|| rebalance::remove_entry(node, idx));
        }

        // First case - key is in this internal node
        if found {
            if node.child(idx + 1).len() > min_keys {
                // Replace with successor
                let succ_key = rebalance::successor(node, idx).0.clone();
                let succ = Self::delete_internal::<K>(node.child_mut(idx + 1), t, &succ_key)?;
                return Some(std::mem::replace(&mut node.entries_mut()[idx], succ));
            }
            if node.child(idx).len() > min_keys {
                // Replace with predecessor
                let pred_key = rebalance::predecessor(node, idx).0.clone();
                let pred = Self::delete_internal::<K>(node.child_mut(idx), t, &pred_key)?;
                return Some(std::mem::replace(&mut node.entries_mut()[idx], pred));
            }
            // Merge children[idx] + key + children[idx+1], then retry here
            rebalance::merge_children(node, idx, t);
            return Self::delete_internal(node, t, key);
        }

        // Next case - key is below, check the child can afford a removal
        if node.child(idx).len() == min_keys {
            if !rebalance::borrow_from_prev(node, idx, min_keys)
                && !rebalance::borrow_from_next(node, idx, min_keys)
            {
                // Merge with the right sibling, or the left one for the last child
                if idx == node.len() {
                    rebalance::merge_children(node, idx - 1, t);
                } else {
                    rebalance::merge_children(node, idx, t);
                }
            }
            // Positions may have shifted - retry from this node
            return Self::delete_internal(node, t, key);
        }

        Self::delete_internal(node.child_mut(idx), t, key)
    }


    // =========================
    // Consistency checks
    // =========================

    /// Walks the whole tree and reports the first broken invariant.
    ///
    /// Checked for every node: keys strictly increasing, key count within
    /// `t - 1 ..= 2t - 1` (root: `1 ..= 2t - 1`), `children == keys + 1`
    /// for internal nodes, separator ordering against both subtrees, and
    /// equal depth of every leaf. The entry count must match `len()`.
    ///
    /// # Errors
    /// [`Error::ConsistencyViolation`] describing the first problem.
    pub fn validate(&self) -> Result<()>
    where
        K: std::fmt::Debug,
    {
        let Some(root) = &self.root else {
            if self.len != 0 {
                return Err(violation(format!("empty tree reports {} entries", self.len)));
            }
            return Ok(());
        };

        let mut leaf_depth = None;
        let counted = self.check_node(root, true, None, None, 0, &mut leaf_depth)?;
        if counted != self.len {
            return Err(violation(format!(
                "tree holds {counted} entries but reports {}",
                self.len
            )));
        }
        Ok(())
    }


    /// Panics with the violation found by [`validate`](Self::validate).
    #[track_caller]
    pub fn assert_invariants(&self)
    where
        K: std::fmt::Debug,
    {
        if let Err(e) = self.validate() {
            panic!("{e}");
        }
    }


    /// Checks one subtree; returns its entry count.
    fn check_node(
        &self,
        node: &BTreeNode<K, V>,
        is_root: bool,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize>
    where
        K: std::fmt::Debug,
    {
        let n = node.len();
        let min = if is_root { 1 } else { self.min_keys() };
        if n < min || n > self.max_keys() {
            return Err(violation(format!(
                "node at depth {depth} holds {n} keys, allowed {min}..={}",
                self.max_keys()
            )));
        }

        let keys: Vec<&K> = node.keys().collect();
        if let Some(w) = keys.windows(2).find(|w| w[0] >= w[1]) {
            return Err(violation(format!(
                "keys out of order at depth {depth}: {:?} before {:?}",
                w[0], w[1]
            )));
        }
        let first_below = lower.is_some_and(|lo| keys[0] <= lo);
        let last_above = upper.is_some_and(|hi| keys[n - 1] >= hi);
        if first_below || last_above {
            return Err(violation(format!(
                "keys {:?}..{:?} at depth {depth} escape separator bounds {lower:?}..{upper:?}",
                keys[0],
                keys[n - 1]
            )));
        }

        let children = node.children();
        if node.is_leaf() {
            return match *leaf_depth {
                Some(d) if d != depth => Err(violation(format!(
                    "leaf at depth {depth}, expected every leaf at depth {d}"
                ))),
                _ => {
                    *leaf_depth = Some(depth);
                    Ok(n)
                }
            };
        }
        if children.len() != n + 1 {
            return Err(violation(format!(
                "internal node at depth {depth} has {n} keys but {} children",
                children.len()
            )));
        }

        let mut total = n;
        for (i, child) in children.iter().enumerate() {
            let lo = if i == 0 { lower } else { Some(keys[i - 1]) };
            let hi = if i == n { upper } else { Some(keys[i]) };
            total += self.check_node(child, false, lo, hi, depth + 1, leaf_depth)?;
        }
        Ok(total)
    }
}


fn violation(msg: String) -> Error {
    Error::ConsistencyViolation(msg)
}

