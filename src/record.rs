use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog entry.
///
/// The contract requires `id`, `name` and `price`; everything else the caller
/// supplies round-trips untouched through the flattened `extra` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub name: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The caller-supplied shape for creation — no `id`, the store assigns one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    pub name: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewRecord {
    pub(crate) fn into_record(self, id: u64) -> Record {
        Record {
            id,
            name: self.name,
            price: self.price,
            extra: self.extra,
        }
    }
}
