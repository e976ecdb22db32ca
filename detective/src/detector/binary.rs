//! Binary classification by file extension.

use std::path::Path;

/// Extensions classified as binary without reading content.
pub const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "ico", "tif", "tiff",
    // video
    "mp4", "webm", "avi", "mov", "mkv", "m4v",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar", "whl",
    // documents, fonts and compiled objects
    "pdf", "woff", "woff2", "ttf", "otf", "exe", "dll", "so", "dylib", "wasm", "class",
];

/// Returns `true` when `path` has an allowlisted binary extension.
///
/// Matching is case-insensitive; content is never inspected.
pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            BINARY_EXTENSIONS.contains(&ext.as_str())
        })
}
