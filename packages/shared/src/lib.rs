//! Utilities shared by the Hiroba binaries.

pub mod logger;
