//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{
    domain::DisplayNameFactory,
    relay::{Room, SessionConfig},
};

/// Shared application state
pub struct AppState {
    /// The single room every session joins
    pub room: Arc<Room>,
    /// Display names for accepted connections
    pub names: DisplayNameFactory,
    /// Settings applied to every new session
    pub session_config: SessionConfig,
}
