//! Service layer for the comparison core.
//!
//! Keeps filesystem and renderer work out of the state types so both can be
//! tested on their own.

pub mod capture_service;
pub mod resolver_service;

pub use capture_service::{CaptureProgress, CaptureService, FrameSource};
pub use resolver_service::{BatchKind, DisplayUpdate, ResolverService};
