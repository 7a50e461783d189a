// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use crate::convert::{ConvertOptions, ConvertOutcome, MediaTools, convert};
use crate::episode::{ConversionJob, output_dir_name};
use crate::error::{FeedError, RunError};
use crate::feed::{Podcast, fetch_feed_bytes, is_url, parse_feed, read_feed_file};
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Options for a feed run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Convert every entry instead of only the newest
    pub process_all: bool,
    /// Directory the podcast's output directory is created in
    pub output_root: PathBuf,
    /// Per-episode conversion settings
    pub convert: ConvertOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            process_all: false,
            output_root: PathBuf::from("."),
            convert: ConvertOptions::default(),
        }
    }
}

/// Result of a feed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Directory the videos were written to
    pub output_dir: PathBuf,
    /// Number of episodes converted in this run
    pub converted: usize,
    /// Number of episodes whose video already existed
    pub skipped: usize,
    /// Number of episodes that could not be converted
    pub failed: usize,
    /// Details of failed episodes (title, error message)
    pub failed_episodes: Vec<(String, String)>,
}

impl RunSummary {
    /// True when episodes were attempted and every one of them failed
    pub fn all_failed(&self) -> bool {
        self.failed > 0 && self.converted == 0 && self.skipped == 0
    }
}

/// Convert the newest (or every) episode of a feed into videos
///
/// This is the main entry point for the library. It:
/// 1. Fetches and parses the feed (URL or local file)
/// 2. Creates `{output_root}/{feed_title_with_underscores}`
/// 3. Converts the selected entries one after another, in feed order
///
/// Only feed and output directory problems fail the run; a failing episode
/// is reported and recorded in the summary, and the next one is processed.
pub async fn run<C: HttpClient, T: MediaTools>(
    client: &C,
    tools: &T,
    feed_source: &str,
    options: &RunOptions,
    reporter: SharedProgressReporter,
) -> Result<RunSummary, RunError> {
    let podcast = load_feed(client, feed_source, &reporter).await?;

    let output_dir = options.output_root.join(output_dir_name(&podcast.title));
    std::fs::create_dir_all(&output_dir).map_err(|e| RunError::CreateOutputDirFailed {
        path: output_dir.clone(),
        source: e,
    })?;

    let selected = if options.process_all {
        &podcast.episodes[..]
    } else {
        &podcast.episodes[..podcast.episodes.len().min(1)]
    };
    let total_to_process = selected.len();

    reporter.report(ProgressEvent::FeedParsed {
        podcast_title: podcast.title.clone(),
        total_episodes: podcast.episodes.len(),
        to_process: total_to_process,
        output_dir: output_dir.clone(),
    });

    let channel_image = podcast.image_url.as_ref().map(|url| url.as_str());

    let mut summary = RunSummary {
        output_dir: output_dir.clone(),
        converted: 0,
        skipped: 0,
        failed: 0,
        failed_episodes: Vec::new(),
    };

    for (episode_index, episode) in selected.iter().enumerate() {
        reporter.report(ProgressEvent::EpisodeStarting {
            episode_title: episode.title.clone(),
            episode_index,
            total_to_process,
        });

        let result = match ConversionJob::from_episode(
            episode,
            &podcast.title,
            channel_image,
            &output_dir,
            options.convert.frame,
        ) {
            Ok(job) => convert(client, tools, &job, &options.convert, &reporter)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(ConvertOutcome::Converted(output_path)) => {
                reporter.report(ProgressEvent::EpisodeCompleted {
                    episode_title: episode.title.clone(),
                    output_path,
                });
                summary.converted += 1;
            }
            Ok(ConvertOutcome::AlreadyExists(_)) => summary.skipped += 1,
            Err(error) => {
                reporter.report(ProgressEvent::EpisodeFailed {
                    episode_title: episode.title.clone(),
                    error: error.clone(),
                });
                summary.failed += 1;
                summary.failed_episodes.push((episode.title.clone(), error));
            }
        }
    }

    reporter.report(ProgressEvent::RunCompleted {
        converted_count: summary.converted,
        skipped_count: summary.skipped,
        failed_count: summary.failed,
    });

    Ok(summary)
}

/// Fetch and parse the feed with granular progress reporting
async fn load_feed<C: HttpClient>(
    client: &C,
    feed_source: &str,
    reporter: &SharedProgressReporter,
) -> Result<Podcast, FeedError> {
    let bytes = if is_url(feed_source) {
        reporter.report(ProgressEvent::FetchingFeed {
            url: feed_source.to_string(),
        });
        fetch_feed_bytes(client, feed_source).await?.to_vec()
    } else {
        read_feed_file(Path::new(feed_source))?
    };

    reporter.report(ProgressEvent::ParsingFeed {
        source: feed_source.to_string(),
    });
    parse_feed(&bytes)
}
