//! Record model and per-collection model descriptors.
//!
//! # Responsibility
//! - Define the open record shape persisted in collection files.
//! - Define the descriptor contract each collection type supplies.
//!
//! # Invariants
//! - A persisted record carries an integer `Id` assigned by the store.
//! - Only descriptor-recognized fields take part in filtering and sorting.

pub mod descriptor;
pub mod record;
