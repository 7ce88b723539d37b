//! Collection persistence.
//!
//! # Responsibility
//! - Define the record CRUD contract used by API layers.
//! - Keep file layout and JSON encoding inside the store.
//!
//! # Invariants
//! - Writes run the model validity predicate before any mutation.
//! - Every committed mutation rewrites the whole collection file.

pub mod collection_store;
