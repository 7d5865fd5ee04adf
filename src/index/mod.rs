// =====================================================================
// File: index/mod.rs
// Author: Bob Jack
// Date: Sept 22, 2025 - Reworked Oct. 7, 2025
//
//! The `index` module contains the B-tree implementation used as the
//! ordered map behind the word index.
//!
//! Structure:
//! - `node.rs`      : Defines the [`BTreeNode`] leaf/internal variants.
//! - `rebalance.rs` : Split, merge, borrow and root collapse helpers.
//! - `tree.rs`      : Defines the [`BTreeIndex`] and its algorithms
//!                    (insert, search, delete).
//! - `tests.rs`     : Unit tests for the B-tree (compiled only in test mode).
// =====================================================================

pub mod node;
mod rebalance;
pub mod tree;

pub use self::node::BTreeNode;
pub use self::tree::BTreeIndex;
