//! Library interface for the steep package installer
//!
//! Exposes the pipeline stages (descriptor loading, download,
//! extraction, runtime environment, verification) for testing and
//! embedding.

pub mod descriptor;
pub mod download;
pub mod error;
pub mod extract;
pub mod receipt;
pub mod runtime;
pub mod store;
pub mod verify;
pub mod workspace;

pub use descriptor::{Descriptor, TestSpec};
pub use error::{Result, SteepError};
