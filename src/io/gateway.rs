use std::path::PathBuf;

use crate::io::lock::LockError;
use crate::model::profile::{NormalOrderItem, PinnedOrderItem, Profile};

/// Error type for persistence operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("could not read profile library at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write profile library at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("profile library is not valid JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("lock error: {0}")]
    Lock(#[from] LockError),
    /// An order batch referenced a profile the store no longer has in
    /// that group. The whole batch is rejected so the caller reloads.
    #[error("order batch is stale at profile {0}")]
    StaleOrder(String),
    #[error("save rejected: {0}")]
    Rejected(String),
}

/// Persistence boundary of the ordering engine.
///
/// `load_all` returns the full canonical profile set; the save methods
/// write one group's ranks as a batch, all-or-nothing. The engine never
/// sees a storage format, only these three calls.
pub trait OrderGateway {
    fn load_all(&mut self) -> Result<Vec<Profile>, GatewayError>;
    fn save_normal_order(&mut self, items: &[NormalOrderItem]) -> Result<(), GatewayError>;
    fn save_pinned_order(&mut self, items: &[PinnedOrderItem]) -> Result<(), GatewayError>;
}
