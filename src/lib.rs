//! Indexable ordered collections for Rust.
//!
//! This crate provides [`RankTreeMap`] and [`RankTreeSet`], sorted
//! collections built on a B+-tree whose internal nodes carry subtree entry
//! counts. The count augmentation makes *positional* operations logarithmic
//! alongside the usual keyed ones:
//!
//! - [`get_at`](RankTreeMap::get_at) / indexing by [`Rank`] - the entry at a
//!   given sorted position
//! - [`index_of`](RankTreeMap::index_of) - the sorted position of a key
//! - [`remove_at`](RankTreeMap::remove_at) - removal by position
//!
//! Two configuration axes set these collections apart from their std
//! counterparts. The ordering is a per-instance [`Comparator`] (defaulting
//! to [`NaturalOrder`], i.e. `Ord`), and **duplicate keys** may be enabled
//! at runtime, turning the collections into multimaps/multisets. While
//! duplicates are enabled, a per-operation [`Bias`] chooses which end of a
//! run of equal keys an insert, lookup, or removal targets.
//!
//! # Example
//!
//! ```
//! use rank_tree::{Rank, RankTreeMap};
//!
//! let mut scores = RankTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Keyed operations work as in a BTreeMap.
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//!
//! // Positional operations are O(log n).
//! let (name, _) = scores.get_at(1).unwrap();
//! assert_eq!(*name, "Bob");
//! assert_eq!(scores.index_of(&"Carol"), Some(2));
//! assert_eq!(scores[Rank(0)], 100);
//!
//! // Ordered range traversal, both directions.
//! let tail: Vec<_> = scores.range_from(&"Bob").map(|(&k, _)| k).collect();
//! assert_eq!(tail, ["Bob", "Carol"]);
//! ```
//!
//! # Implementation
//!
//! All entries live in leaves; internal nodes hold min-of-child separator
//! keys. Leaves are threaded into a doubly-linked chain, so range iteration
//! is a pointer walk after one logarithmic descent. Node order (per-node
//! capacity) is chosen at construction, default 128.
//!
//! The collections are `no_std` (only `alloc` is required) and single-owner:
//! there is no internal synchronization, and iterators borrow the container
//! for their whole lifetime, so mutation during iteration is rejected by the
//! borrow checker rather than at runtime.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod bias;
mod compare;
mod error;
mod rank;
mod raw;

pub mod tree_map;
pub mod tree_set;

pub use bias::Bias;
pub use compare::{Comparator, NaturalOrder};
pub use error::{Result, TreeError};
pub use rank::Rank;
pub use tree_map::RankTreeMap;
pub use tree_set::RankTreeSet;
