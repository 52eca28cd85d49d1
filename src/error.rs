//! Error types
//!
//! Re-exports the shared error crate so callers only depend on `pwmfan`.

pub use pf_error::{FileOp, PwmFanError, Result};
