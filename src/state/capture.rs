//! Capture state machine.
//!
//! A capture session walks the displayed image list one frame at a time:
//! request a render, wait for the renderer to report the frame, write it,
//! then request the next one. The state enum only admits one frame between
//! request and write, so two captures can never overlap.

use crate::config::WriteErrorPolicy;
use crate::file_utils::base_name;
use std::path::PathBuf;

/// What the renderer reports once it has drawn the frame to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameContext {
    /// Display names of every image in the comparison, in display order.
    pub all_images: Vec<String>,
    pub selected_index: usize,
    /// Set by the slider view, which shows two images in one frame.
    pub selected_overlay_index: Option<usize>,
}

impl FrameContext {
    pub fn new(all_images: Vec<String>, selected_index: usize) -> Self {
        Self {
            all_images,
            selected_index,
            selected_overlay_index: None,
        }
    }

    pub fn slider(all_images: Vec<String>, selected_index: usize, overlay_index: usize) -> Self {
        Self {
            all_images,
            selected_index,
            selected_overlay_index: Some(overlay_index),
        }
    }

    /// `<index+1>_<name>` or, for the slider, `<index+1>_<name>_<overlay>`.
    ///
    /// `None` when an index points outside `all_images`.
    pub fn file_name(&self) -> Option<String> {
        let image = self.all_images.get(self.selected_index)?;
        let mut name = format!("{}_{}", self.selected_index + 1, base_name(image));
        if let Some(overlay_index) = self.selected_overlay_index {
            let overlay = self.all_images.get(overlay_index)?;
            name.push('_');
            name.push_str(base_name(overlay));
        }
        Some(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSession {
    pub output_dir: PathBuf,
    pub selected_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    AwaitingRender(CaptureSession),
    Capturing {
        session: CaptureSession,
        last_index: usize,
        /// Slider frames end the session after one write.
        single_frame: bool,
    },
}

#[derive(Debug, Clone)]
pub enum CaptureEvent<'a> {
    /// Begin a session writing into this (already created) directory.
    Start(PathBuf),
    FrameRendered(&'a FrameContext),
    WriteSucceeded,
    WriteFailed,
}

/// Side effect the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureAction {
    /// Ask the renderer to show and report the image at this index.
    RequestRender(usize),
    /// Capture the current frame and write it to this path.
    WriteFrame(PathBuf),
    /// The session completed.
    Finished(PathBuf),
    /// A write failed and the session was dropped.
    Aborted(PathBuf),
    /// The event does not apply to the current state; nothing changed.
    Rejected(String),
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        match self {
            Self::Idle => None,
            Self::AwaitingRender(session) | Self::Capturing { session, .. } => Some(session),
        }
    }

    /// Applies `event` and returns the next state with the action to run.
    pub fn on(self, event: CaptureEvent<'_>, policy: WriteErrorPolicy) -> (Self, CaptureAction) {
        match (self, event) {
            (Self::Idle, CaptureEvent::Start(output_dir)) => (
                Self::AwaitingRender(CaptureSession {
                    output_dir,
                    selected_index: 0,
                }),
                CaptureAction::RequestRender(0),
            ),
            (busy, CaptureEvent::Start(_)) => (
                busy,
                CaptureAction::Rejected("a capture is already in progress".to_string()),
            ),
            (Self::AwaitingRender(session), CaptureEvent::FrameRendered(frame)) => {
                let Some(file_name) = frame.file_name() else {
                    let reason = format!(
                        "frame index {} (overlay {:?}) outside {} images",
                        frame.selected_index,
                        frame.selected_overlay_index,
                        frame.all_images.len()
                    );
                    return (Self::AwaitingRender(session), CaptureAction::Rejected(reason));
                };
                let path = session.output_dir.join(file_name);
                (
                    Self::Capturing {
                        session: CaptureSession {
                            output_dir: session.output_dir,
                            selected_index: frame.selected_index,
                        },
                        last_index: frame.all_images.len() - 1,
                        single_frame: frame.selected_overlay_index.is_some(),
                    },
                    CaptureAction::WriteFrame(path),
                )
            }
            (
                Self::Capturing {
                    session,
                    last_index,
                    single_frame,
                },
                CaptureEvent::WriteSucceeded,
            ) => Self::advance(session, last_index, single_frame),
            (
                Self::Capturing {
                    session,
                    last_index,
                    single_frame,
                },
                CaptureEvent::WriteFailed,
            ) => match policy {
                WriteErrorPolicy::Abort => {
                    (Self::Idle, CaptureAction::Aborted(session.output_dir))
                }
                WriteErrorPolicy::SkipAndContinue => {
                    Self::advance(session, last_index, single_frame)
                }
            },
            (state, event) => {
                let reason = format!("{:?} does not apply while {}", event, state.label());
                (state, CaptureAction::Rejected(reason))
            }
        }
    }

    fn advance(
        session: CaptureSession,
        last_index: usize,
        single_frame: bool,
    ) -> (Self, CaptureAction) {
        if !single_frame && session.selected_index < last_index {
            let next = session.selected_index + 1;
            (
                Self::AwaitingRender(CaptureSession {
                    output_dir: session.output_dir,
                    selected_index: next,
                }),
                CaptureAction::RequestRender(next),
            )
        } else {
            (Self::Idle, CaptureAction::Finished(session.output_dir))
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingRender(_) => "awaiting render",
            Self::Capturing { .. } => "capturing",
        }
    }
}
