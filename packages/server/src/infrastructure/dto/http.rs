//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDto {
    /// Sessions currently in the room
    pub sessions: usize,
    /// Tasks alive on the server runtime
    pub tasks: usize,
}
