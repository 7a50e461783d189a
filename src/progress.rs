// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// External tool stages of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resize,
    Encode,
    Mux,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Resize => "Resizing artwork",
            Stage::Encode => "Rendering silent video",
            Stage::Mux => "Adding audio",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Resize => "resize",
            Stage::Encode => "encode",
            Stage::Mux => "mux",
        })
    }
}

/// Events emitted during a feed run for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Feed is being fetched from URL
    FetchingFeed { url: String },

    /// Feed is being parsed (from URL bytes or local file)
    ParsingFeed { source: String },

    /// Feed has been parsed successfully
    FeedParsed {
        podcast_title: String,
        total_episodes: usize,
        to_process: usize,
        output_dir: PathBuf,
    },

    /// An episode conversion is starting
    EpisodeStarting {
        episode_title: String,
        /// Index of this episode in the processing queue
        episode_index: usize,
        /// Total number of episodes to process
        total_to_process: usize,
    },

    /// The final video already exists, nothing to do
    EpisodeSkipped {
        episode_title: String,
        output_path: PathBuf,
    },

    /// A resource download is starting
    Downloading { url: String },

    /// A resource was not downloaded because the file is already present
    DownloadSkipped { path: PathBuf },

    /// A download failed; the file will be missing
    DownloadFailed { url: String, error: String },

    /// An external tool stage is starting
    StageStarting { episode_title: String, stage: Stage },

    /// The silent video from an earlier attempt is reused
    SilentVideoReused { path: PathBuf },

    /// An episode was converted successfully
    EpisodeCompleted {
        episode_title: String,
        output_path: PathBuf,
    },

    /// An episode could not be converted
    EpisodeFailed { episode_title: String, error: String },

    /// A workspace could not be removed
    WorkspaceCleanupFailed { path: PathBuf, error: String },

    /// Run completed
    RunCompleted {
        converted_count: usize,
        skipped_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events during a run.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
