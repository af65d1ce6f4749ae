mod memory;

pub use memory::MemStore;

use crate::value::Value;
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;
use time::OffsetDateTime;
use ulid::Ulid;

/// Persisted attribute set handed to the store. Virtual fields never
/// appear here; absent values are omitted rather than encoded as null.
pub type Attributes = BTreeMap<&'static str, Value>;

///
/// RecordId
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RecordId(Ulid);

impl RecordId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    #[must_use]
    pub const fn inner(&self) -> &Ulid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// Record
/// One saved row as returned by the store. The id and both timestamps are
/// store-assigned; the form assigns them back onto the result it returns.
///

#[derive(Clone, Debug)]
pub struct Record {
    pub id: RecordId,
    pub attributes: Attributes,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Record {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

///
/// StoreFailure
///
/// `Constraint` carries a field-name hint and is reported through the
/// form's field errors, on the same channel as a validation failure.
/// `Fatal` has no mapping and propagates to the caller.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreFailure {
    #[error("constraint violation on '{field}': {message}")]
    Constraint { field: String, message: String },

    #[error("store failure: {message}")]
    Fatal { message: String },
}

///
/// RecordStore
///
/// The persistence boundary. The single call inside Saving is the only
/// operation in the pipeline expected to block; retry and timeout policy
/// belong entirely to the implementation behind this trait.
///

pub trait RecordStore {
    fn insert(&mut self, attributes: Attributes) -> Result<Record, StoreFailure>;

    fn update_by_identity(
        &mut self,
        id: &RecordId,
        attributes: Attributes,
    ) -> Result<Record, StoreFailure>;
}
