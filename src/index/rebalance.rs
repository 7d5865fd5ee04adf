// =====================================================================
// File: index/rebalance.rs
// Author: Bob Jack
// Date: Oct. 7, 2025
//
// Description:
//   Node-local restructuring used by the insert and delete paths of
//   `BTreeIndex`. Every routine here works on a parent node and one or
//   two of its children and never looks further up the tree:
//
//   - `split_child`      : full child -> two halves + promoted median.
//   - `merge_children`   : left + separator + right -> one child.
//   - `borrow_from_prev` : rotate one entry right through the parent.
//   - `borrow_from_next` : rotate one entry left through the parent.
//   - `predecessor` / `successor` : in-order neighbours of a separator.
//   - `collapse_root`    : the only way the tree loses height.
//
// Notes:
//   * Preconditions (full child before split, spare entries before a
//     borrow, small enough halves before a merge) are kept by the call
//     order in `tree.rs`. They are only re-checked by debug assertions.
// =====================================================================

use std::mem;

use tracing::trace;

use super::node::{violation, BTreeNode};


/// Insert an entry into a leaf at `idx`.
pub(crate) fn insert_entry<K, V>(leaf: &mut BTreeNode<K, V>, idx: usize, entry: (K, V)) {
    debug_assert!(leaf.is_leaf(), "entries are only added at leaf level");
    leaf.entries_mut().insert(idx, entry);
}


/// Remove the entry at `idx` from a leaf.
pub(crate) fn remove_entry<K, V>(leaf: &mut BTreeNode<K, V>, idx: usize) -> (K, V) {
    debug_assert!(leaf.is_leaf(), "entries are only removed at leaf level");
    leaf.entries_mut().remove(idx)
}


/// Split a full child node during insertion.
///
/// When `parent.children[idx]` holds the maximum number of keys
/// (`2t - 1`), it is split in two and the middle entry is bumped into
/// the parent.
///
/// # Behavior
/// - The left child keeps the first `t - 1` entries.
/// - The right child receives the last `t - 1` entries.
/// - The median entry (index `t - 1`) moves into the parent at `idx`.
/// - If the full child is internal, its children are split `t` / `t`.
pub(crate) fn split_child<K, V>(parent: &mut BTreeNode<K, V>, idx: usize, t: usize) {
    let BTreeNode::Internal { entries, children } = parent else {
        violation("split requires an internal parent");
    };
    debug_assert!(entries.len() < 2 * t - 1, "split into a full parent");

    // We are here because child node is full
    let full_child = &mut children[idx];
    debug_assert_eq!(full_child.len(), 2 * t - 1, "split of a non-full child");

    let (middle, right) = match full_child.as_mut() {
        BTreeNode::Leaf { entries: left } => {
            // Right node gets t-1 largest entries, middle is popped off left
            let right = left.split_off(t);
            (left.pop(), BTreeNode::Leaf { entries: right })
        }
        BTreeNode::Internal { entries: left, children: left_children } => {
            // Left keeps children [0..t), right takes [t..]
            let right = left.split_off(t);
            let right_children = left_children.split_off(t);
            (
                left.pop(),
                BTreeNode::Internal {
                    entries: right,
                    children: right_children,
                },
            )
        }
    };
    let Some(middle) = middle else {
        violation("split of an empty child");
    };

    trace!(idx, "split full child");
    // Insert middle into parent and link new right child
    entries.insert(idx, middle);
    children.insert(idx + 1, Box::new(right));
}


/// Merge `parent.children[idx]`, the separating parent entry, and
/// `parent.children[idx + 1]` into a single child at `idx`.
///
/// The right child is dropped; the parent loses one entry and one child.
pub(crate) fn merge_children<K, V>(parent: &mut BTreeNode<K, V>, idx: usize, t: usize) {
    let BTreeNode::Internal { entries, children } = parent else {
        violation("merge requires an internal parent");
    };

    let right = children.remove(idx + 1);
    let separator = entries.remove(idx);
    let left = &mut children[idx];
    debug_assert!(
        left.len() + right.len() < 2 * t - 1,
        "merged node would overflow"
    );

    trace!(idx, left = left.len(), right = right.len(), "merge children");
    absorb(left.as_mut(), separator, *right);
}


/// Append `separator` and everything in `right` to `left`.
fn absorb<K, V>(left: &mut BTreeNode<K, V>, separator: (K, V), right: BTreeNode<K, V>) {
    match (left, right) {
        (BTreeNode::Leaf { entries }, BTreeNode::Leaf { entries: rhs }) => {
            entries.push(separator);
            entries.extend(rhs);
        }
        (
            BTreeNode::Internal { entries, children },
            BTreeNode::Internal {
                entries: rhs,
                children: rhs_children,
            },
        ) => {
            entries.push(separator);
            entries.extend(rhs);
            children.extend(rhs_children);
        }
        _ => violation("sibling nodes are at different heights"),
    }
}


/// Borrows an entry from the left sibling of `parent.children[idx]`.
///
/// # Behavior
/// - The separator `parent.entries[idx - 1]` becomes the first entry
///   of the needy child.
/// - The left sibling's last entry replaces the separator.
/// - For internal nodes the sibling's last child moves to the front of
///   the needy child.
///
/// Returns `false` (and changes nothing) when there is no left sibling
/// or it has no entry to spare.
pub(crate) fn borrow_from_prev<K, V>(
    parent: &mut BTreeNode<K, V>,
    idx: usize,
    min_keys: usize,
) -> bool {
    if idx == 0 || parent.child(idx - 1).len() <= min_keys {
        return false;
    }
    let BTreeNode::Internal { entries, children } = parent else {
        violation("borrow requires an internal parent");
    };

    let (left_slice, right_slice) = children.split_at_mut(idx);
    let left = &mut left_slice[idx - 1];
    let child = &mut right_slice[0];

    // Left's last entry goes up, parent separator comes down
    let (moved_up, moved_child) = left.pop_last();
    let separator = mem::replace(&mut entries[idx - 1], moved_up);
    child.push_front(separator, moved_child);

    trace!(idx, "borrowed entry from left sibling");
    true
}


/// Borrows an entry from the right sibling of `parent.children[idx]`.
///
/// Mirror image of [`borrow_from_prev`]: the separator
/// `parent.entries[idx]` is appended to the needy child and the right
/// sibling's first entry (and first child, if internal) moves over.
pub(crate) fn borrow_from_next<K, V>(
    parent: &mut BTreeNode<K, V>,
    idx: usize,
    min_keys: usize,
) -> bool {
    if idx + 1 >= parent.children().len() || parent.child(idx + 1).len() <= min_keys {
        return false;
    }
    let BTreeNode::Internal { entries, children } = parent else {
        violation("borrow requires an internal parent");
    };

    let (left_slice, right_slice) = children.split_at_mut(idx + 1);
    let child = &mut left_slice[idx];
    let right = &mut right_slice[0];

    // Right's first entry goes up, parent separator comes down
    let (moved_up, moved_child) = right.pop_first();
    let separator = mem::replace(&mut entries[idx], moved_up);
    child.push_back(separator, moved_child);

    trace!(idx, "borrowed entry from right sibling");
    true
}


/// Rightmost leaf entry of `node.children[idx]`, i.e. the in-order
/// predecessor of `node.entries[idx]`.
pub(crate) fn predecessor<K, V>(node: &BTreeNode<K, V>, idx: usize) -> &(K, V) {
    let mut current_node = node.child(idx);
    while !current_node.is_leaf() {
        current_node = current_node.child(current_node.len());
    }
    match current_node.entries().last() {
        Some(entry) => entry,
        None => violation("empty leaf below a separator"),
    }
}


/// Leftmost leaf entry of `node.children[idx + 1]`, i.e. the in-order
/// successor of `node.entries[idx]`.
pub(crate) fn successor<K, V>(node: &BTreeNode<K, V>, idx: usize) -> &(K, V) {
    let mut current_node = node.child(idx + 1);
    while !current_node.is_leaf() {
        current_node = current_node.child(0);
    }
    match current_node.entries().first() {
        Some(entry) => entry,
        None => violation("empty leaf below a separator"),
    }
}


/// True when `root` holds a single separator over two minimal children,
/// the one shape in which a delete must shrink the tree.
pub(crate) fn root_needs_collapse<K, V>(root: &BTreeNode<K, V>, min_keys: usize) -> bool {
    !root.is_leaf()
        && root.len() == 1
        && root.child(0).len() == min_keys
        && root.child(1).len() == min_keys
}


/// Merge the root's two children around its only separator and return
/// the merged node as the new root. Height decreases by one.
pub(crate) fn collapse_root<K, V>(mut root: Box<BTreeNode<K, V>>, t: usize) -> Box<BTreeNode<K, V>> {
    debug_assert_eq!(root.len(), 1, "collapse of a root with several keys");
    merge_children(root.as_mut(), 0, t);

    let BTreeNode::Internal { mut children, .. } = *root else {
        violation("collapse of a leaf root");
    };
    match (children.pop(), children.is_empty()) {
        (Some(merged), true) => merged,
        _ => violation("root kept more than one child after collapse"),
    }
}
