//! JSON-file record repository.
//! Collections of `Id`-keyed records stored as whole-file JSON arrays, with
//! wildcard field filters and chained multi-key sorting.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::descriptor::{FieldModel, ModelDescriptor};
pub use model::record::{Record, RecordId, CONFLICT_FIELD, ID_FIELD};
pub use repo::collection_store::{
    AddOutcome, JsonCollectionStore, RecordRepository, StoreError, StoreResult, UpdateResult,
};
pub use search::compare::SortKey;
pub use search::params::{ParamValue, QueryParams};
pub use search::query::{parse_query, ParsedQuery, QueryEngine, SearchKey};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
