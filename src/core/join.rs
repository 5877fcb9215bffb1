use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::types::{Key, Record};
use crate::error::{ChartError, ChartResult};

/// Anything the joiner can read a previously bound record from.
pub trait BoundRecord {
    fn bound_record(&self) -> &Record;
}

impl BoundRecord for Record {
    fn bound_record(&self) -> &Record {
        self
    }
}

/// Key that appears only in the next snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterEntry {
    pub key: Key,
    pub index: usize,
    pub record: Record,
}

/// Key present in both snapshots, carrying the old and the new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntry {
    pub key: Key,
    pub index: usize,
    pub previous: Record,
    pub record: Record,
}

/// Key that disappears from the next snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitEntry {
    pub key: Key,
    pub record: Record,
}

/// Enter/update/exit partition of one join.
///
/// `enter` and `update` follow the order of the next snapshot, `exit` follows
/// the order of the previous collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinResult {
    pub enter: Vec<EnterEntry>,
    pub update: Vec<UpdateEntry>,
    pub exit: Vec<ExitEntry>,
}

impl JoinResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.enter.len() + self.update.len() + self.exit.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when nothing enters or exits.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }

    pub fn enter_keys(&self) -> impl Iterator<Item = &Key> {
        self.enter.iter().map(|entry| &entry.key)
    }

    pub fn update_keys(&self) -> impl Iterator<Item = &Key> {
        self.update.iter().map(|entry| &entry.key)
    }

    pub fn exit_keys(&self) -> impl Iterator<Item = &Key> {
        self.exit.iter().map(|entry| &entry.key)
    }
}

/// Reconciles a keyed element collection against a new dataset snapshot.
///
/// Pure classification: nothing is created, animated or removed here.
pub struct DatasetJoiner;

impl DatasetJoiner {
    /// Splits `previous` and `next` into enter/update/exit by key.
    ///
    /// Keys must be unique within `next`; a repeated key is rejected with
    /// [`ChartError::DuplicateKey`] instead of silently shadowing the earlier
    /// record.
    pub fn join<V, F>(
        previous: &IndexMap<Key, V>,
        next: &[Record],
        key_fn: F,
    ) -> ChartResult<JoinResult>
    where
        V: BoundRecord,
        F: Fn(&Record, usize) -> Key,
    {
        let mut seen: HashMap<Key, usize> = HashMap::with_capacity(next.len());
        let mut result = JoinResult::default();

        for (index, record) in next.iter().enumerate() {
            let key = key_fn(record, index);
            if let Some(&first_index) = seen.get(&key) {
                warn!(%key, first_index, duplicate_index = index, "duplicate key in dataset");
                return Err(ChartError::DuplicateKey {
                    key: key.to_string(),
                    first_index,
                    duplicate_index: index,
                });
            }
            seen.insert(key.clone(), index);

            match previous.get(&key) {
                Some(bound) => result.update.push(UpdateEntry {
                    key,
                    index,
                    previous: *bound.bound_record(),
                    record: *record,
                }),
                None => result.enter.push(EnterEntry {
                    key,
                    index,
                    record: *record,
                }),
            }
        }

        result.exit = previous
            .iter()
            .filter(|(key, _)| !seen.contains_key(*key))
            .map(|(key, bound)| ExitEntry {
                key: key.clone(),
                record: *bound.bound_record(),
            })
            .collect();

        trace!(
            enter = result.enter.len(),
            update = result.update.len(),
            exit = result.exit.len(),
            "dataset joined"
        );
        Ok(result)
    }
}
