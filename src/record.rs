//! The unit of ingestion: [Record], and its cross-reference type [Pos].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SourceId;

/// Monotonically increasing position of a record within its chunk. Dense
/// from the chunk's starting offset upward once the chunk is sealed.
pub type Pos = u64;

/// A single ingested log record.
///
/// `attrs` keys are unique per record (enforced by the `BTreeMap`) and keep
/// the case they were ingested with; indexers are responsible for any
/// case-folding. `raw_bytes` is treated as an opaque byte string — it may
/// contain invalid UTF-8 or embedded NULs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub ingest_ts: DateTime<Utc>,
    pub source_id: Option<SourceId>,
    pub attrs: BTreeMap<String, String>,
    pub raw_bytes: Vec<u8>,
}

impl Record {
    pub fn new(raw_bytes: impl Into<Vec<u8>>) -> Record {
        Record {
            ingest_ts: Utc::now(),
            source_id: None,
            attrs: BTreeMap::new(),
            raw_bytes: raw_bytes.into(),
        }
    }

    pub fn with_ts(mut self, ts: DateTime<Utc>) -> Record {
        self.ingest_ts = ts;
        self
    }

    pub fn with_source(mut self, source_id: SourceId) -> Record {
        self.source_id = Some(source_id);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Record {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// A record together with the position it was assigned on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub record: Record,
    pub pos: Pos,
}
