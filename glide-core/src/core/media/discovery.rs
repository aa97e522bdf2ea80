use directories::UserDirs;
use log::{debug, trace};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The video file extensions which are discovered by default.
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mkv", "avi", "mov", "webm", "flv"];

/// Get the default library root, being the home directory of the user.
pub fn default_library_root() -> Option<PathBuf> {
    UserDirs::new().map(|e| PathBuf::from(e.home_dir()))
}

/// Discover the video files within the given root directory.
/// Entries which can't be read are skipped.
///
/// # Arguments
///
/// * `root` - The directory to search recursively.
/// * `extensions` - The accepted file extensions, matched case-insensitively.
///
/// # Returns
///
/// It returns the discovered video files in sorted order.
pub fn discover_videos<P: AsRef<Path>, S: AsRef<str>>(root: P, extensions: &[S]) -> Vec<PathBuf> {
    let root = root.as_ref();
    let extensions: Vec<String> = extensions
        .iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
        .collect();

    debug!("Discovering videos within {:?}", root);
    let mut videos: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                trace!("Skipping unreadable library entry, {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.contains(&ext.to_lowercase()))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    videos.sort();
    debug!("Discovered {} videos within {:?}", videos.len(), root);
    videos
}
