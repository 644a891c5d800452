//! Resource version snapshot for client polling

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response of `GET /api/sync/versions`
///
/// Clients compare `versions` with what they last saw and only re-fetch the
/// resources that moved. A changed `epoch` means the server restarted and
/// every cached resource is stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Server instance id, generated at startup
    pub epoch: String,
    pub versions: HashMap<String, u64>,
}
