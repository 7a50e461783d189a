// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use url::Url;

/// Extension of the final video artifact
pub const VIDEO_EXTENSION: &str = "mp4";

/// Fallback for a feed whose title sanitizes to nothing
const DEFAULT_DIR_NAME: &str = "podcast";

/// Rewrite URL-encoded spaces to underscores
pub fn sanitize_path_str(s: &str) -> String {
    s.replace("%20", "_")
}

/// Apply [`sanitize_path_str`] to the file name of a path
///
/// Parent directories are left as given.
pub fn sanitize_path(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(sanitize_path_str(&name.to_string_lossy())),
        None => path.to_path_buf(),
    }
}

/// Last path segment of a URL, with `%20` rewritten to `_`
///
/// Query string and fragment are ignored. Returns `None` for URLs whose
/// path ends in a slash.
pub fn url_file_name(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(sanitize_path_str)
}

/// File name of the final video for an episode's audio file name
///
/// `my-ep_name.mp3` becomes `my-ep_name.mp4`.
pub fn video_file_name(audio_file_name: &str) -> String {
    let stem = Path::new(audio_file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "episode".to_string());
    format!("{}.{}", stem, VIDEO_EXTENSION)
}

/// Directory name for a podcast's videos: spaces become underscores
pub fn output_dir_name(feed_title: &str) -> String {
    let underscored = feed_title.trim().replace(' ', "_");
    let sanitized = sanitize_filename::sanitize(underscored);

    if sanitized.is_empty() {
        DEFAULT_DIR_NAME.to_string()
    } else {
        sanitized
    }
}
