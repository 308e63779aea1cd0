//! Graph store adapters.
//!
//! This module provides implementations of the [`PropertyGraphStore`] trait.
//!
//! # Available Adapters
//!
//! | Adapter | Backed by |
//! |---------|-----------|
//! | [`TripleGraphStore`] | Any [`TripleBackend`](crate::storage::TripleBackend) |

mod triple_store;

pub use triple_store::TripleGraphStore;

// Re-export trait for convenience
pub use crate::storage::traits::PropertyGraphStore;
