//! Query pipeline over in-memory collections.
//!
//! # Responsibility
//! - Turn flat request parameters into field filters and sort keys.
//! - Apply filters (AND) and a chained multi-key stable sort.
//!
//! # Invariants
//! - Unrecognized field names are dropped, never reported.
//! - Filtering always runs before sorting.

pub mod compare;
pub mod matcher;
pub mod params;
pub mod query;
