//! File-backed collection store.
//!
//! # Responsibility
//! - Hold one collection in memory, hydrated lazily from its JSON file.
//! - Assign record ids and enforce key-field uniqueness on writes.
//! - Rewrite the whole file after every committed mutation.
//!
//! # Invariants
//! - After a successful mutation, memory and file hold the same records.
//! - `Id` values are unique; key-field values are unique when a key is declared.
//! - Validation, conflict and not-found outcomes are values, never errors.
//! - Reads never write.
//! - A file that failed its first load is never overwritten; mutations are
//!   refused until a later `load()` succeeds.

use crate::config::StoreConfig;
use crate::model::descriptor::ModelDescriptor;
use crate::model::record::{Record, RecordId};
use crate::search::params::QueryParams;
use crate::search::query::{parse_query, QueryEngine};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Load/persist failure for a collection file.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File content is not a JSON array of objects.
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    Serialize(serde_json::Error),
    /// The file failed to load and nothing valid is held in memory.
    Unreadable { path: PathBuf },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Malformed { path, source } => {
                write!(f, "malformed collection file `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize collection: {err}"),
            Self::Unreadable { path } => write!(
                f,
                "collection file `{}` failed to load; refusing to overwrite it",
                path.display()
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::Unreadable { .. } => None,
        }
    }
}

/// Outcome of [`RecordRepository::add`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// Stored record with its assigned `Id`.
    Added(Record),
    /// Candidate returned unchanged apart from the conflict marker.
    Conflict(Record),
    Invalid,
}

impl AddOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Added(record) | Self::Conflict(record) => Some(record),
            Self::Invalid => None,
        }
    }
}

/// Outcome of [`RecordRepository::update`], mapped to a status by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    Ok,
    Conflict,
    NotFound,
    Invalid,
}

impl UpdateResult {
    /// Stable numeric code: ok=0, conflict=1, notFound=2, invalid=3.
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Conflict => 1,
            Self::NotFound => 2,
            Self::Invalid => 3,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Invalid => "invalid",
        }
    }
}

/// CRUD contract over one collection.
pub trait RecordRepository {
    /// `1 + max(Id)`, or `1` for an empty collection.
    fn next_id(&mut self) -> RecordId;
    fn add(&mut self, candidate: Record) -> AddOutcome;
    /// Replaces the record identified by `candidate`'s `Id` in place.
    fn update(&mut self, candidate: Record) -> UpdateResult;
    /// Removes the first record with `id`; returns whether one was removed.
    fn remove(&mut self, id: RecordId) -> bool;
    /// Removes records at zero-based positions; returns how many were removed.
    fn remove_batch(&mut self, positions: &[usize]) -> usize;
    /// First record whose `field` equals `value`, skipping `excluded_id`.
    fn find_by_field(
        &mut self,
        field: &str,
        value: &Value,
        excluded_id: Option<RecordId>,
    ) -> Option<&Record>;
    fn get(&mut self, id: RecordId) -> Option<Record>;
    /// Full collection for empty `params`, otherwise the query result.
    fn get_all(&mut self, params: &QueryParams) -> Vec<Record>;
}

type Enrichment = Box<dyn Fn(&Record) -> Record + Send + Sync>;

/// Collection persisted as a single JSON array file.
pub struct JsonCollectionStore<M: ModelDescriptor> {
    model: M,
    name: String,
    path: PathBuf,
    pretty: bool,
    records: Option<Vec<Record>>,
    /// Set when the first load failed; cleared by a successful `load()`.
    unreadable: bool,
    enrichment: Option<Enrichment>,
}

impl<M: ModelDescriptor> JsonCollectionStore<M> {
    /// Creates a store for `model`. Nothing is read until first access.
    pub fn new(model: M, config: &StoreConfig) -> Self {
        let name = model.collection_name();
        let path = config.collection_path(&name);
        Self {
            model,
            name,
            path,
            pretty: config.pretty,
            records: None,
            unreadable: false,
            enrichment: None,
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.records.is_some()
    }

    /// Registers the hook applied to every record returned by `get`/`get_all`.
    pub fn set_enrichment(&mut self, hook: impl Fn(&Record) -> Record + Send + Sync + 'static) {
        self.enrichment = Some(Box::new(hook));
    }

    pub fn clear_enrichment(&mut self) {
        self.enrichment = None;
    }

    /// Records in collection order, loading the file on first access.
    pub fn objects(&mut self) -> &[Record] {
        self.records_mut().as_slice()
    }

    /// Reads the backing file into memory.
    ///
    /// A missing file yields an empty collection and `Ok`. On any other
    /// failure the error is logged and returned: records from an earlier
    /// successful load are kept, otherwise the collection reads as empty and
    /// refuses mutations.
    pub fn load(&mut self) -> StoreResult<()> {
        let started_at = Instant::now();
        match read_collection(&self.path) {
            Ok(Some(records)) => {
                info!(
                    "event=collection_load module=repo status=ok collection={} records={} duration_ms={}",
                    self.name,
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                self.records = Some(records);
                self.unreadable = false;
                Ok(())
            }
            Ok(None) => {
                warn!(
                    "event=collection_load module=repo status=missing collection={} path={}",
                    self.name,
                    self.path.display()
                );
                self.records = Some(Vec::new());
                self.unreadable = false;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=collection_load module=repo status=error collection={} error={}",
                    self.name, err
                );
                if self.records.is_none() {
                    self.records = Some(Vec::new());
                    self.unreadable = true;
                }
                Err(err)
            }
        }
    }

    /// Rewrites the backing file with the full in-memory collection.
    ///
    /// Not atomic: a crash mid-write can leave a truncated file.
    pub fn persist(&self) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = if self.unreadable {
            Err(StoreError::Unreadable {
                path: self.path.clone(),
            })
        } else {
            self.write_file()
        };
        match &result {
            Ok(()) => debug!(
                "event=collection_persist module=repo status=ok collection={} records={} duration_ms={}",
                self.name,
                self.records.as_ref().map_or(0, Vec::len),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=collection_persist module=repo status=error collection={} error={}",
                self.name, err
            ),
        }
        result
    }

    fn write_file(&self) -> StoreResult<()> {
        let records = self.records.as_deref().unwrap_or(&[]);
        let serialized = if self.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        };
        let bytes = serialized.map_err(StoreError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, bytes).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn write_through(&self) {
        // Failure is logged by `persist`; memory stays ahead of disk.
        let _ = self.persist();
    }

    fn records_mut(&mut self) -> &mut Vec<Record> {
        if !self.is_loaded() {
            let _ = self.load();
        }
        self.records.get_or_insert_with(Vec::new)
    }

    fn ensure_writable(&mut self, operation: &str) -> bool {
        if !self.is_loaded() {
            let _ = self.load();
        }
        if self.unreadable {
            error!(
                "event={} module=repo status=refused collection={} reason=unreadable_file path={}",
                operation,
                self.name,
                self.path.display()
            );
        }
        !self.unreadable
    }

    fn enrich_all(&self, records: Vec<Record>) -> Vec<Record> {
        match &self.enrichment {
            Some(hook) => records.iter().map(|record| hook(record)).collect(),
            None => records,
        }
    }

    fn enrich(&self, record: &Record) -> Record {
        match &self.enrichment {
            Some(hook) => hook(record),
            None => record.clone(),
        }
    }

    fn has_key_conflict(&mut self, candidate: &Record, excluded_id: Option<RecordId>) -> bool {
        let Some(key_field) = self.model.key_field().map(str::to_string) else {
            return false;
        };
        let value = candidate.get(&key_field).cloned().unwrap_or(Value::Null);
        self.find_by_field(&key_field, &value, excluded_id).is_some()
    }
}

impl<M: ModelDescriptor> RecordRepository for JsonCollectionStore<M> {
    fn next_id(&mut self) -> RecordId {
        self.objects()
            .iter()
            .filter_map(Record::id)
            .max()
            .map_or(1, |max_id| max_id + 1)
    }

    fn add(&mut self, mut candidate: Record) -> AddOutcome {
        if !self.ensure_writable("record_add") {
            return AddOutcome::Invalid;
        }
        if !self.model.is_valid(&candidate) {
            debug!(
                "event=record_add module=repo status=invalid collection={}",
                self.name
            );
            return AddOutcome::Invalid;
        }
        if self.has_key_conflict(&candidate, None) {
            debug!(
                "event=record_add module=repo status=conflict collection={}",
                self.name
            );
            candidate.mark_conflict();
            return AddOutcome::Conflict(candidate);
        }

        let id = self.next_id();
        candidate.set_id(id);
        self.records_mut().push(candidate.clone());
        self.write_through();
        info!(
            "event=record_add module=repo status=ok collection={} id={}",
            self.name, id
        );
        AddOutcome::Added(candidate)
    }

    fn update(&mut self, candidate: Record) -> UpdateResult {
        let id = candidate.id();
        let writable = self.ensure_writable("record_update");
        let result = if !writable || !self.model.is_valid(&candidate) {
            UpdateResult::Invalid
        } else if self.has_key_conflict(&candidate, id) {
            UpdateResult::Conflict
        } else {
            let position = id.and_then(|id| {
                self.objects()
                    .iter()
                    .position(|record| record.id() == Some(id))
            });
            match position {
                Some(position) => {
                    self.records_mut()[position] = candidate;
                    self.write_through();
                    UpdateResult::Ok
                }
                None => UpdateResult::NotFound,
            }
        };
        debug!(
            "event=record_update module=repo status={} collection={} id={}",
            result.as_str(),
            self.name,
            id.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        result
    }

    fn remove(&mut self, id: RecordId) -> bool {
        if !self.ensure_writable("record_remove") {
            return false;
        }
        let Some(position) = self
            .objects()
            .iter()
            .position(|record| record.id() == Some(id))
        else {
            return false;
        };
        self.records_mut().remove(position);
        self.write_through();
        info!(
            "event=record_remove module=repo status=ok collection={} id={}",
            self.name, id
        );
        true
    }

    fn remove_batch(&mut self, positions: &[usize]) -> usize {
        if positions.is_empty() || !self.ensure_writable("record_remove_batch") {
            return 0;
        }
        let mut ordered = positions.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let records = self.records_mut();
        let len = records.len();
        let mut removed = 0;
        for position in ordered.into_iter().rev().filter(|position| *position < len) {
            records.remove(position);
            removed += 1;
        }
        if removed > 0 {
            self.write_through();
        }
        info!(
            "event=record_remove_batch module=repo status=ok collection={} requested={} removed={}",
            self.name,
            positions.len(),
            removed
        );
        removed
    }

    fn find_by_field(
        &mut self,
        field: &str,
        value: &Value,
        excluded_id: Option<RecordId>,
    ) -> Option<&Record> {
        if field.is_empty() {
            return None;
        }
        self.objects().iter().find(|record| {
            let same_value = record.get(field).map_or(value.is_null(), |held| held == value);
            same_value && (excluded_id.is_none() || record.id() != excluded_id)
        })
    }

    fn get(&mut self, id: RecordId) -> Option<Record> {
        let record = self
            .objects()
            .iter()
            .find(|record| record.id() == Some(id))?
            .clone();
        Some(self.enrich(&record))
    }

    fn get_all(&mut self, params: &QueryParams) -> Vec<Record> {
        let loaded = self.objects().to_vec();
        let records = self.enrich_all(loaded);
        if params.is_empty() {
            return records;
        }

        let model = &self.model;
        let query = parse_query(params, &|name: &str| model.has_field(name));
        let results = QueryEngine::apply(records, &query);
        debug!(
            "event=collection_query module=repo status=ok collection={} search_keys={} sort_keys={} results={}",
            self.name,
            query.search_keys.len(),
            query.sort_keys.len(),
            results.len()
        );
        results
    }
}

fn read_collection(path: &Path) -> StoreResult<Option<Vec<Record>>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}
