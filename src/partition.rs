use std::collections::BTreeMap;

use crate::log_record::LogRecord;

/// Status code a record is bucketed under.
pub type PartitionKey = u16;

/// Records grouped by status code. Keys are discovered from the data,
/// never declared up front; within a bucket input order is preserved.
/// Built fresh per batch and read-only afterwards.
#[derive(Debug, Default)]
pub struct PartitionedStore {
    buckets: BTreeMap<PartitionKey, Vec<LogRecord>>,
}

impl PartitionedStore {
    pub fn build(records: &[LogRecord]) -> PartitionedStore {
        let mut buckets: BTreeMap<PartitionKey, Vec<LogRecord>> = BTreeMap::new();
        for record in records {
            buckets.entry(record.status).or_default().push(record.clone());
        }
        PartitionedStore { buckets }
    }

    /// Total number of records across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Discovered status codes, ascending.
    pub fn statuses(&self) -> impl Iterator<Item = PartitionKey> + '_ {
        self.buckets.keys().copied()
    }

    pub fn bucket(&self, status: PartitionKey) -> Option<&[LogRecord]> {
        self.buckets.get(&status).map(Vec::as_slice)
    }

    /// Buckets in ascending status order.
    pub fn iter(&self) -> impl Iterator<Item = (PartitionKey, &[LogRecord])> {
        self.buckets
            .iter()
            .map(|(status, records)| (*status, records.as_slice()))
    }
}
