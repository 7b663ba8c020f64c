//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits, wraps lopdf documents
//! and wires up services.

pub mod di;
pub mod pdf;
pub mod traits;
