//! Service turning dropped or launched paths into display updates.
//!
//! A batch is either all folders or all files. Folders join the navigation
//! session and are stepped through together; files are simply added to
//! whatever is already on screen.

use crate::config::ASSET_CACHE_CAPACITY;
use crate::error::Result;
use crate::file_utils::{self, PathExt};
use crate::image_cache::AssetCache;
use crate::image_loader::ImageAsset;
use crate::state::{NavCommand, NavigationSession};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What the presentation layer should do with its displayed image set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "images", rename_all = "kebab-case")]
pub enum DisplayUpdate {
    /// Show exactly these images.
    Replace(Vec<ImageAsset>),
    /// Add these images after the ones already shown.
    Append(Vec<ImageAsset>),
}

impl DisplayUpdate {
    pub fn images(&self) -> &[ImageAsset] {
        match self {
            Self::Replace(images) | Self::Append(images) => images,
        }
    }
}

/// How a batch of paths was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Folders,
    Files,
    /// Empty, mixed, or containing a path that does not exist.
    Invalid,
}

/// Classifies a batch. Every path must exist and all must be of one kind.
pub fn classify(paths: &[PathBuf]) -> BatchKind {
    if paths.is_empty() {
        return BatchKind::Invalid;
    }

    let mut all_dirs = true;
    let mut all_files = true;
    for path in paths {
        let is_dir = path.is_dir();
        let is_file = path.is_file();
        debug!("{} exists: {}, folder: {}", path.format_for_log(), is_dir || is_file, is_dir);
        all_dirs &= is_dir;
        all_files &= is_file;
    }

    match (all_dirs, all_files) {
        (true, _) => BatchKind::Folders,
        (_, true) => BatchKind::Files,
        _ => BatchKind::Invalid,
    }
}

/// Resolves path batches against a [`NavigationSession`].
pub struct ResolverService {
    cache: AssetCache,
}

impl ResolverService {
    /// Creates a new resolver with the default cache size.
    pub fn new() -> Self {
        Self::with_cache_capacity(ASSET_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: AssetCache::new(capacity),
        }
    }

    /// Classifies `paths` and builds the matching display update.
    ///
    /// Returns `Ok(None)` when the batch is empty or invalid; the session is
    /// not touched in that case. Unreadable images are skipped. A folder
    /// that cannot be listed fails the whole call and leaves the session as
    /// it was.
    pub fn resolve(
        &mut self,
        session: &mut NavigationSession,
        paths: &[PathBuf],
    ) -> Result<Option<DisplayUpdate>> {
        if paths.is_empty() {
            debug!("Empty path batch ignored");
            return Ok(None);
        }

        match classify(paths) {
            BatchKind::Folders => self.resolve_folders(session, paths).map(Some),
            BatchKind::Files => Ok(Some(self.resolve_files(session, paths))),
            BatchKind::Invalid => {
                warn!(
                    "Ignoring batch of {} paths: not uniformly existing files or folders",
                    paths.len()
                );
                Ok(None)
            }
        }
    }

    fn resolve_folders(
        &mut self,
        session: &mut NavigationSession,
        paths: &[PathBuf],
    ) -> Result<DisplayUpdate> {
        let start = std::time::Instant::now();
        let folders: Vec<PathBuf> = session
            .folders()
            .iter()
            .chain(paths)
            .cloned()
            .collect();

        let mut listings: Vec<(&PathBuf, Vec<PathBuf>)> = Vec::with_capacity(folders.len());
        for folder in &folders {
            if listings.iter().any(|(listed, _)| *listed == folder) {
                continue;
            }
            listings.push((folder, file_utils::scan_directory(folder)?));
        }
        self.cache
            .ensure_capacity(listings.iter().map(|(_, files)| files.len()).sum());

        let folder_images: HashMap<PathBuf, Vec<ImageAsset>> = listings
            .into_iter()
            .map(|(folder, files)| (folder.clone(), self.read_folder(folder, &files)))
            .collect();

        session.replace_folders(folders, folder_images);
        let snapshot = session.snapshot();
        info!(
            "Folder mode: {} folders scanned in {:?}, sending {} images",
            session.folders().len(),
            start.elapsed(),
            snapshot.len()
        );
        Ok(DisplayUpdate::Replace(snapshot))
    }

    fn read_folder(&mut self, folder: &Path, files: &[PathBuf]) -> Vec<ImageAsset> {
        let images: Vec<ImageAsset> = files.iter().filter_map(|path| self.cache.load(path)).collect();
        debug!(
            "{}: {} of {} images readable",
            folder.format_for_log(),
            images.len(),
            files.len()
        );
        images
    }

    fn resolve_files(&mut self, session: &mut NavigationSession, paths: &[PathBuf]) -> DisplayUpdate {
        let images: Vec<ImageAsset> = paths
            .iter()
            .filter(|path| path.is_file())
            .filter_map(|path| self.cache.load(path))
            .collect();

        session.enter_file_mode();
        info!("File mode: sending {} of {} images", images.len(), paths.len());
        DisplayUpdate::Append(images)
    }

    /// Starts a new comparison: forgets every folder and cached asset.
    pub fn reset(&mut self, session: &mut NavigationSession) {
        session.reset();
        self.cache.clear();
        info!("Comparison reset");
    }

    /// Applies a navigation command and wraps its output for display.
    pub fn navigate(
        &self,
        session: &mut NavigationSession,
        command: NavCommand,
    ) -> Option<DisplayUpdate> {
        session.apply(command).map(DisplayUpdate::Replace)
    }
}

impl Default for ResolverService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ComparisonMode;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn folder_with(root: &TempDir, name: &str, files: &[&str]) -> PathBuf {
        let dir = root.path().join(name);
        fs::create_dir(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), file.as_bytes()).unwrap();
        }
        dir
    }

    fn names(update: &DisplayUpdate) -> Vec<&str> {
        update
            .images()
            .iter()
            .map(|a| a.display_name.as_str())
            .collect()
    }

    #[test]
    fn folder_batch_sets_bounds_and_replaces() {
        let root = tempdir().unwrap();
        let a = folder_with(&root, "A", &["a1.png", "a2.jpg", "a3.gif"]);
        let b = folder_with(&root, "B", &["b1.webp", "skip.txt"]);

        let mut session = NavigationSession::new();
        let mut resolver = ResolverService::new();
        let update = resolver
            .resolve(&mut session, &[a.clone(), b.clone()])
            .unwrap()
            .unwrap();

        assert!(matches!(update, DisplayUpdate::Replace(_)));
        assert_eq!(names(&update), vec!["a1.png", "b1.webp"]);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.last_index(), 2);

        let at_one = resolver.navigate(&mut session, NavCommand::Next).unwrap();
        assert_eq!(names(&at_one), vec!["a2.jpg"]);
        let at_two = resolver.navigate(&mut session, NavCommand::End).unwrap();
        assert_eq!(names(&at_two), vec!["a3.gif"]);
    }

    #[test]
    fn folders_accumulate_across_batches_and_cursor_resets() {
        let root = tempdir().unwrap();
        let a = folder_with(&root, "A", &["1.png", "2.png"]);
        let b = folder_with(&root, "B", &["1.png", "2.png", "3.png", "4.png"]);

        let mut session = NavigationSession::new();
        let mut resolver = ResolverService::new();
        resolver.resolve(&mut session, &[a.clone()]).unwrap();
        resolver.navigate(&mut session, NavCommand::End);
        assert_eq!(session.current_index(), 1);

        let update = resolver.resolve(&mut session, &[b.clone()]).unwrap().unwrap();
        assert_eq!(session.folders(), &[a, b]);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.last_index(), 3);
        assert_eq!(update.images().len(), 2);
    }

    #[test]
    fn mixed_or_missing_batches_change_nothing() {
        let root = tempdir().unwrap();
        let a = folder_with(&root, "A", &["1.png", "2.png"]);
        let file = root.path().join("x.png");
        fs::write(&file, b"x").unwrap();

        let mut session = NavigationSession::new();
        let mut resolver = ResolverService::new();
        resolver.resolve(&mut session, &[a.clone()]).unwrap();
        resolver.navigate(&mut session, NavCommand::Next);

        let mixed = resolver.resolve(&mut session, &[a.clone(), file.clone()]).unwrap();
        assert_eq!(mixed, None);
        let missing = resolver
            .resolve(&mut session, &[root.path().join("nope")])
            .unwrap();
        assert_eq!(missing, None);
        let partly_missing = resolver
            .resolve(&mut session, &[file, root.path().join("nope.png")])
            .unwrap();
        assert_eq!(partly_missing, None);

        assert_eq!(session.folders(), &[a]);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.mode(), ComparisonMode::Folders);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut session = NavigationSession::new();
        assert_eq!(ResolverService::new().resolve(&mut session, &[]).unwrap(), None);
        assert_eq!(session.mode(), ComparisonMode::None);
    }

    #[test]
    fn file_batch_appends_supported_images_only() {
        let root = tempdir().unwrap();
        let paths: Vec<PathBuf> = ["x.jpg", "y.txt", "z.png"]
            .iter()
            .map(|name| {
                let path = root.path().join(name);
                fs::write(&path, name.as_bytes()).unwrap();
                path
            })
            .collect();

        let mut session = NavigationSession::new();
        let update = ResolverService::new()
            .resolve(&mut session, &paths)
            .unwrap()
            .unwrap();

        assert!(matches!(update, DisplayUpdate::Append(_)));
        assert_eq!(names(&update), vec!["x.jpg", "z.png"]);
        assert!(session.folders().is_empty());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.mode(), ComparisonMode::Files);
    }

    #[test]
    fn file_batch_keeps_folder_state() {
        let root = tempdir().unwrap();
        let a = folder_with(&root, "A", &["1.png", "2.png"]);
        let file = root.path().join("x.png");
        fs::write(&file, b"x").unwrap();

        let mut session = NavigationSession::new();
        let mut resolver = ResolverService::new();
        resolver.resolve(&mut session, &[a.clone()]).unwrap();
        resolver.navigate(&mut session, NavCommand::Next);
        resolver.resolve(&mut session, &[file]).unwrap();

        assert_eq!(session.folders(), &[a]);
        assert_eq!(session.current_index(), 1);
        assert_eq!(resolver.navigate(&mut session, NavCommand::Home), None);
    }

    #[test]
    fn clear_is_available_in_every_mode() {
        let mut session = NavigationSession::new();
        let resolver = ResolverService::new();
        assert_eq!(
            resolver.navigate(&mut session, NavCommand::Clear),
            Some(DisplayUpdate::Replace(Vec::new()))
        );
    }

    #[test]
    fn rescan_picks_up_new_files() {
        let root = tempdir().unwrap();
        let a = folder_with(&root, "A", &["1.png"]);
        let b = folder_with(&root, "B", &["1.png"]);

        let mut session = NavigationSession::new();
        let mut resolver = ResolverService::new();
        resolver.resolve(&mut session, &[a.clone()]).unwrap();
        assert_eq!(session.last_index(), 0);

        fs::write(a.join("2.png"), b"2").unwrap();
        resolver.resolve(&mut session, &[b]).unwrap();
        assert_eq!(session.images_in(&a).unwrap().len(), 2);
        assert_eq!(session.last_index(), 1);
    }

    #[test]
    fn rescans_beyond_default_capacity_reuse_cached_assets() {
        let root = tempdir().unwrap();
        let a = folder_with(&root, "A", &["1.png", "2.png", "3.png"]);
        let b = folder_with(&root, "B", &["1.png", "2.png", "3.png"]);
        let c = folder_with(&root, "C", &["1.png"]);

        let mut session = NavigationSession::new();
        let mut resolver = ResolverService::with_cache_capacity(2);
        resolver.resolve(&mut session, &[a.clone(), b.clone()]).unwrap();
        assert!(resolver.cache.capacity() >= 6);

        resolver.resolve(&mut session, &[c]).unwrap();
        for folder in [&a, &b] {
            for name in ["1.png", "2.png", "3.png"] {
                assert!(resolver.cache.contains(&folder.join(name)));
            }
        }
    }

    #[test]
    fn reset_forgets_folders_and_cache() {
        let root = tempdir().unwrap();
        let a = folder_with(&root, "A", &["1.png"]);

        let mut session = NavigationSession::new();
        let mut resolver = ResolverService::new();
        resolver.resolve(&mut session, &[a.clone()]).unwrap();
        assert!(resolver.cache.contains(&a.join("1.png")));

        resolver.reset(&mut session);
        assert!(session.folders().is_empty());
        assert!(!resolver.cache.contains(&a.join("1.png")));
        assert_eq!(resolver.navigate(&mut session, NavCommand::Next), None);
    }

    #[test]
    fn vanished_folder_fails_without_touching_state() {
        let root = tempdir().unwrap();
        let a = folder_with(&root, "A", &["1.png"]);
        let b = folder_with(&root, "B", &["1.png", "2.png"]);

        let mut session = NavigationSession::new();
        let mut resolver = ResolverService::new();
        resolver.resolve(&mut session, &[a.clone()]).unwrap();
        fs::remove_dir_all(&a).unwrap();

        assert!(resolver.resolve(&mut session, &[b]).is_err());
        assert_eq!(session.folders(), &[a]);
        assert_eq!(session.last_index(), 0);
    }

    #[test]
    fn replace_serializes_as_tagged_json() {
        let update = DisplayUpdate::Replace(vec![ImageAsset::from_bytes("a.png", b"").unwrap()]);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["kind"], "replace");
        assert_eq!(json["images"][0]["displayName"], "a.png");
    }
}
