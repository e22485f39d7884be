//! Domain types shared by the decoder, the pipeline and the stores.

use serde::{Deserialize, Serialize};

/// A batch of ports as handed to a sink.
pub type Ports = Vec<Port>;

/// One port entry from the catalog.
///
/// Every field is defaulted so a sparse payload still decodes; the `id` in
/// particular may be absent because the container key is authoritative and
/// overwrites it during decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    pub id: String,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
    /// `[lat, lon]` pair; empty when the source omits it.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coordinates: Vec<f64>,
    pub province: String,
    pub timezone: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unlocs: Vec<String>,
    pub code: String,
}
