//! Headless front end wiring the core to stdin/stdout.
//!
//! Display updates go to stdout as JSON lines. The "renderer" used for
//! captures decodes the displayed asset itself, since there is no window.

use crate::cli::Command;
use anyhow::{Result, bail};
use img_ab::config::CaptureConfig;
use img_ab::error::AppError;
use img_ab::image_loader::ImageAsset;
use img_ab::services::{CaptureProgress, CaptureService, DisplayUpdate, FrameSource, ResolverService};
use img_ab::state::{FrameContext, NavCommand, NavigationSession};
use image::DynamicImage;
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;

/// Frame source that "renders" an image by decoding its inline payload.
#[derive(Default)]
pub struct HeadlessRenderer {
    shown: Vec<ImageAsset>,
    current: usize,
    /// Set by a render request until the viewer answers it.
    pending: Option<usize>,
}

impl FrameSource for HeadlessRenderer {
    fn request_render(&mut self, index: usize) {
        self.current = index;
        self.pending = Some(index);
    }

    async fn capture_frame(&mut self) -> img_ab::Result<DynamicImage> {
        let index = self.current;
        let bytes = self
            .shown
            .get(index)
            .and_then(ImageAsset::bytes)
            .ok_or_else(|| AppError::FrameCapture(format!("no image at index {}", index)))?;
        image::load_from_memory(&bytes).map_err(|e| AppError::FrameCapture(e.to_string()))
    }
}

/// Everything the headless viewer keeps between commands.
pub struct Viewer<W> {
    session: NavigationSession,
    resolver: ResolverService,
    capture: CaptureService<HeadlessRenderer>,
    displayed: Vec<ImageAsset>,
    out: W,
}

impl<W: Write> Viewer<W> {
    pub fn new(capture_config: CaptureConfig, out: W) -> Self {
        Self {
            session: NavigationSession::new(),
            resolver: ResolverService::new(),
            capture: CaptureService::new(HeadlessRenderer::default(), capture_config),
            displayed: Vec::new(),
            out,
        }
    }

    pub fn displayed(&self) -> &[ImageAsset] {
        &self.displayed
    }

    /// Handles one command. Returns `false` once the viewer should close.
    pub fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Open(paths) => self.open(&paths)?,
            Command::Navigate(NavCommand::Close) => return Ok(false),
            Command::Navigate(nav) => {
                if let Some(update) = self.resolver.navigate(&mut self.session, nav) {
                    self.emit(update)?;
                }
            }
            Command::Capture => self.capture_all()?,
            Command::CaptureSlider { image, overlay } => self.capture_slider(image, overlay)?,
            Command::Reset => {
                self.resolver.reset(&mut self.session);
                self.emit(DisplayUpdate::Replace(Vec::new()))?;
            }
        }
        Ok(true)
    }

    /// Resolves a batch of paths and shows the result.
    pub fn open(&mut self, paths: &[PathBuf]) -> Result<()> {
        match self.resolver.resolve(&mut self.session, paths) {
            Ok(Some(update)) => self.emit(update)?,
            Ok(None) => info!("Nothing to show for {} paths", paths.len()),
            Err(e) => warn!("Failed to open paths: {}", e),
        }
        Ok(())
    }

    fn emit(&mut self, update: DisplayUpdate) -> Result<()> {
        match &update {
            DisplayUpdate::Replace(images) => self.displayed = images.clone(),
            DisplayUpdate::Append(images) => self.displayed.extend(images.iter().cloned()),
        }
        serde_json::to_writer(&mut self.out, &update)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        self.displayed
            .iter()
            .map(|image| image.display_name.clone())
            .collect()
    }

    fn capture_all(&mut self) -> Result<()> {
        if self.displayed.is_empty() {
            warn!("Nothing displayed to capture");
            return Ok(());
        }
        self.capture.source_mut().shown = self.displayed.clone();
        self.capture.start()?;

        let names = self.names();
        while let Some(index) = self.capture.source_mut().pending.take() {
            let frame = FrameContext::new(names.clone(), index);
            if let CaptureProgress::Finished(dir) =
                async_std::task::block_on(self.capture.frame_rendered(&frame))?
            {
                info!("Captures written to {}", dir.display());
            }
        }
        Ok(())
    }

    fn capture_slider(&mut self, image: usize, overlay: usize) -> Result<()> {
        // A frame the renderer cannot show would leave the session waiting
        // forever, so indices are checked before any directory is created.
        let shown = self.displayed.len();
        if image >= shown || overlay >= shown {
            bail!(
                "slider capture of {} over {} needs both indices below {}",
                image,
                overlay,
                shown
            );
        }
        self.capture.source_mut().shown = self.displayed.clone();
        self.capture.start()?;
        let renderer = self.capture.source_mut();
        renderer.pending = None;
        renderer.current = image;

        let frame = FrameContext::slider(self.names(), image, overlay);
        match async_std::task::block_on(self.capture.frame_rendered(&frame))? {
            CaptureProgress::Finished(dir) => info!("Slider capture written to {}", dir.display()),
            other => warn!("Slider capture ended unexpectedly: {:?}", other),
        }
        Ok(())
    }
}
