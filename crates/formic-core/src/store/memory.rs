use crate::store::{Attributes, Record, RecordId, RecordStore, StoreFailure};
use std::collections::{BTreeMap, BTreeSet};
use time::OffsetDateTime;

///
/// MemStore
///
/// In-process reference store with optional per-field unique constraints.
/// Backs the integration tests and doubles as a worked example of the
/// `RecordStore` contract, including the field-hinted constraint channel.
///

#[derive(Debug, Default)]
pub struct MemStore {
    rows: BTreeMap<RecordId, Record>,
    unique: BTreeSet<&'static str>,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a unique constraint on a field name.
    #[must_use]
    pub fn unique_on(mut self, field: &'static str) -> Self {
        self.unique.insert(field);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.rows.get(id)
    }

    fn check_unique(
        &self,
        attributes: &Attributes,
        skip: Option<&RecordId>,
    ) -> Result<(), StoreFailure> {
        for &field in &self.unique {
            let Some(candidate) = attributes.get(field) else {
                continue;
            };
            for (id, row) in &self.rows {
                if Some(id) == skip {
                    continue;
                }
                if row.attributes.get(field) == Some(candidate) {
                    return Err(StoreFailure::Constraint {
                        field: field.to_string(),
                        message: "has already been taken".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl RecordStore for MemStore {
    fn insert(&mut self, attributes: Attributes) -> Result<Record, StoreFailure> {
        self.check_unique(&attributes, None)?;

        let now = OffsetDateTime::now_utc();
        let record = Record {
            id: RecordId::generate(),
            attributes,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(record.id, record.clone());

        Ok(record)
    }

    fn update_by_identity(
        &mut self,
        id: &RecordId,
        attributes: Attributes,
    ) -> Result<Record, StoreFailure> {
        self.check_unique(&attributes, Some(id))?;

        // A vanished id has no field to blame; that is a fatal condition.
        let Some(row) = self.rows.get_mut(id) else {
            return Err(StoreFailure::Fatal {
                message: format!("no record with id {id}"),
            });
        };

        for (name, value) in attributes {
            row.attributes.insert(name, value);
        }
        row.updated_at = OffsetDateTime::now_utc();

        Ok(row.clone())
    }
}
