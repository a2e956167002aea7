//! Navigation state for stepping through several folders in lockstep.

use crate::image_loader::ImageAsset;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Which kind of batch was resolved last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    #[default]
    None,
    Files,
    Folders,
}

/// A navigation request coming from the keyboard or a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Home,
    Previous,
    Next,
    End,
    Clear,
    /// Closing the window is the platform's job; the session ignores it.
    Close,
}

impl NavCommand {
    /// Maps a platform key name to a command.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Home" => Some(Self::Home),
            "PageUp" | "ArrowUp" => Some(Self::Previous),
            "PageDown" | "ArrowDown" => Some(Self::Next),
            "End" => Some(Self::End),
            "c" => Some(Self::Clear),
            "Escape" => Some(Self::Close),
            _ => None,
        }
    }
}

/// Folders being compared, their assets, and the shared cursor.
///
/// Owned by whoever drives the comparison. Folders are only ever appended
/// until [`NavigationSession::reset`] is called.
#[derive(Debug, Default)]
pub struct NavigationSession {
    mode: ComparisonMode,
    folders: Vec<PathBuf>,
    folder_images: HashMap<PathBuf, Vec<ImageAsset>>,
    current_index: usize,
    last_index: usize,
}

impl NavigationSession {
    /// Creates a new empty navigation session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn is_folder_mode(&self) -> bool {
        self.mode == ComparisonMode::Folders
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn images_in(&self, folder: &Path) -> Option<&[ImageAsset]> {
        self.folder_images.get(folder).map(Vec::as_slice)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn last_index(&self) -> usize {
        self.last_index
    }

    /// Installs a freshly scanned folder set and rewinds the cursor.
    pub(crate) fn replace_folders(
        &mut self,
        folders: Vec<PathBuf>,
        folder_images: HashMap<PathBuf, Vec<ImageAsset>>,
    ) {
        self.last_index = folders
            .iter()
            .filter_map(|folder| folder_images.get(folder))
            .map(|images| images.len().saturating_sub(1))
            .max()
            .unwrap_or(0);
        self.folders = folders;
        self.folder_images = folder_images;
        self.current_index = 0;
        self.mode = ComparisonMode::Folders;

        debug!(
            "Folder set now has {} folders, last index {}",
            self.folders.len(),
            self.last_index
        );
    }

    /// Marks a file batch as the latest input. Folder state is kept.
    pub(crate) fn enter_file_mode(&mut self) {
        self.mode = ComparisonMode::Files;
    }

    /// Applies a navigation command.
    ///
    /// Returns the list that replaces what is on screen, or `None` when the
    /// command produces no output.
    pub fn apply(&mut self, command: NavCommand) -> Option<Vec<ImageAsset>> {
        match command {
            NavCommand::Clear => return Some(Vec::new()),
            NavCommand::Close => return None,
            _ if !self.is_folder_mode() => return None,
            NavCommand::Home => self.current_index = 0,
            NavCommand::Previous => self.current_index = self.current_index.saturating_sub(1),
            NavCommand::Next => {
                if self.current_index < self.last_index {
                    self.current_index += 1;
                }
            }
            NavCommand::End => self.current_index = self.last_index,
        }

        debug!("{:?} -> index {}", command, self.current_index);
        Some(self.snapshot())
    }

    /// The asset at the cursor for every folder that has one, in folder order.
    pub fn snapshot(&self) -> Vec<ImageAsset> {
        self.folders
            .iter()
            .filter_map(|folder| self.folder_images.get(folder)?.get(self.current_index))
            .cloned()
            .collect()
    }

    /// Forgets every folder and returns to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
