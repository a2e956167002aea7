//! Service driving screen capture sessions.
//!
//! The renderer is an external collaborator reached through [`FrameSource`].
//! Decisions live in [`CaptureState`]; this service performs the directory,
//! capture and disk work each transition asks for.

use crate::config::{CAPTURE_DIR_PREFIX, CAPTURE_TIMESTAMP_FORMAT, CaptureConfig};
use crate::error::{AppError, Result};
use crate::file_utils::PathExt;
use crate::state::{CaptureAction, CaptureEvent, CaptureState, FrameContext};
use chrono::{DateTime, Local};
use image::{DynamicImage, ImageFormat};
use log::{debug, error, info, warn};
use std::fs;
use std::future::Future;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

/// The renderer side of a capture session.
pub trait FrameSource {
    /// Asks the renderer to display the image at `index`. The renderer
    /// answers later through [`CaptureService::frame_rendered`].
    fn request_render(&mut self, index: usize);

    /// Grabs the frame currently on screen.
    fn capture_frame(&mut self) -> impl Future<Output = Result<DynamicImage>>;
}

/// Outcome of handling one rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureProgress {
    /// No session was waiting for this frame.
    Ignored,
    /// The frame was stored and the next image was requested.
    Advanced(usize),
    /// The frame was stored and the session is over.
    Finished(PathBuf),
}

/// Creates `capture-<timestamp>` under `root`, adding `-2`, `-3`, ... when a
/// session with the same timestamp already exists.
pub fn create_session_dir(root: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    let base = format!("{}{}", CAPTURE_DIR_PREFIX, now.format(CAPTURE_TIMESTAMP_FORMAT));
    let mut candidate = root.join(&base);
    let mut suffix = 1;

    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                suffix += 1;
                candidate = root.join(format!("{}-{}", base, suffix));
            }
            Err(source) => {
                return Err(AppError::CaptureDirectory {
                    path: candidate,
                    source,
                });
            }
        }
    }
}

/// Runs capture sessions against a [`FrameSource`].
pub struct CaptureService<S> {
    source: S,
    config: CaptureConfig,
    state: CaptureState,
}

impl<S: FrameSource> CaptureService<S> {
    pub fn new(source: S, config: CaptureConfig) -> Self {
        Self {
            source,
            config,
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Creates a fresh session directory and requests the first frame.
    ///
    /// Fails if a session is already running or the directories cannot be
    /// created.
    pub fn start(&mut self) -> Result<PathBuf> {
        if !self.state.is_idle() {
            return Err(AppError::CaptureRejected(
                "a capture is already in progress".to_string(),
            ));
        }

        fs::create_dir_all(&self.config.root).map_err(|source| AppError::CaptureDirectory {
            path: self.config.root.clone(),
            source,
        })?;
        let output_dir = create_session_dir(&self.config.root, Local::now())?;
        info!("Capture session started in {}", output_dir.format_for_log());

        match self.transition(CaptureEvent::Start(output_dir.clone())) {
            CaptureAction::RequestRender(index) => {
                self.source.request_render(index);
                Ok(output_dir)
            }
            other => Err(AppError::CaptureRejected(format!(
                "unexpected action on start: {:?}",
                other
            ))),
        }
    }

    /// Handles the renderer's report that `frame` is on screen.
    ///
    /// Works for both the overlay walk and the single slider frame. Under
    /// [`WriteErrorPolicy::Abort`](crate::config::WriteErrorPolicy::Abort) a
    /// failed write ends the session and is returned as the error.
    pub async fn frame_rendered(&mut self, frame: &FrameContext) -> Result<CaptureProgress> {
        let path = match self.transition(CaptureEvent::FrameRendered(frame)) {
            CaptureAction::WriteFrame(path) => path,
            CaptureAction::Rejected(reason) => {
                warn!("Ignoring rendered frame: {}", reason);
                return Ok(CaptureProgress::Ignored);
            }
            other => {
                return Err(AppError::CaptureRejected(format!(
                    "unexpected action for rendered frame: {:?}",
                    other
                )));
            }
        };

        let written = self.write_frame(&path).await;
        let event = match &written {
            Ok(()) => CaptureEvent::WriteSucceeded,
            Err(e) => {
                error!("Failed to save capture {}: {}", path.format_for_log(), e);
                CaptureEvent::WriteFailed
            }
        };

        match self.transition(event) {
            CaptureAction::RequestRender(index) => {
                self.source.request_render(index);
                Ok(CaptureProgress::Advanced(index))
            }
            CaptureAction::Finished(output_dir) => {
                info!("Capture session finished: {}", output_dir.format_for_log());
                Ok(CaptureProgress::Finished(output_dir))
            }
            CaptureAction::Aborted(output_dir) => {
                warn!("Capture session aborted: {}", output_dir.format_for_log());
                written.map(|()| CaptureProgress::Finished(output_dir))
            }
            other => Err(AppError::CaptureRejected(format!(
                "unexpected action after write: {:?}",
                other
            ))),
        }
    }

    fn transition(&mut self, event: CaptureEvent<'_>) -> CaptureAction {
        let state = std::mem::take(&mut self.state);
        let (next, action) = state.on(event, self.config.on_write_error);
        debug!("Capture transition -> {:?} ({:?})", next, action);
        self.state = next;
        action
    }

    async fn write_frame(&mut self, path: &Path) -> Result<()> {
        let frame = self.source.capture_frame().await?;

        let mut bytes = Vec::new();
        frame.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

        async_std::fs::write(path, &bytes)
            .await
            .map_err(|source| AppError::CaptureWrite {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Saved capture {} ({} bytes)", path.format_for_log(), bytes.len());
        Ok(())
    }
}
