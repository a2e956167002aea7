//! State management for the comparison core.

pub mod capture;
pub mod navigation;

pub use capture::{CaptureAction, CaptureEvent, CaptureSession, CaptureState, FrameContext};
pub use navigation::{ComparisonMode, NavCommand, NavigationSession};
