use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};
use crate::render::Renderer;

use super::{PlotSnapshot, PlotSurface};

pub const PLOT_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: PlotSnapshot,
}

impl PlotSnapshot {
    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PlotError::InvalidData(format!("failed to serialize snapshot json: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> PlotResult<String> {
        let payload = PlotSnapshotJsonContractV1 {
            schema_version: PLOT_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            PlotError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts both a bare snapshot and a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> PlotResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<PlotSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: PlotSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            PlotError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != PLOT_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(PlotError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl<R: Renderer> PlotSurface<R> {
    pub fn snapshot_json_contract_v1_pretty(&self) -> PlotResult<String> {
        self.snapshot()?.to_json_contract_v1_pretty()
    }
}
