// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use url::Url;

use crate::convert::FrameSize;
use crate::error::{DurationError, JobError};
use crate::feed::Episode;

use super::duration::parse_duration;
use super::filename::{url_file_name, video_file_name};
use super::image::resolve_image;

/// Workspace name for artwork whose URL has no usable file name
const DEFAULT_ARTWORK_NAME: &str = "artwork";

/// Everything needed to turn one feed entry into a video
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub podcast_name: String,
    pub episode_title: String,
    pub audio_url: Url,
    pub image_url: String,
    pub duration_secs: u64,
    pub output_dir: PathBuf,
}

impl ConversionJob {
    /// Build a job from a feed entry
    ///
    /// Fails if the entry has no enclosure, the enclosure is not a URL, or
    /// the duration cannot be normalized.
    pub fn from_episode(
        episode: &Episode,
        podcast_name: &str,
        channel_image: Option<&str>,
        output_dir: &Path,
        frame: FrameSize,
    ) -> Result<Self, JobError> {
        let audio_url = episode
            .enclosure_url()
            .ok_or_else(|| JobError::MissingEnclosure {
                title: episode.title.clone(),
            })?;
        let audio_url = Url::parse(audio_url).map_err(|e| JobError::InvalidAudioUrl {
            url: audio_url.to_string(),
            source: e,
        })?;

        let duration = episode.duration.as_deref().ok_or(DurationError::Missing)?;
        let duration_secs = parse_duration(duration)?;

        Ok(Self {
            podcast_name: podcast_name.to_string(),
            episode_title: episode.title.clone(),
            audio_url,
            image_url: resolve_image(episode, channel_image, podcast_name, frame),
            duration_secs,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Workspace file name for the downloaded audio
    pub fn audio_file_name(&self) -> String {
        url_file_name(&self.audio_url).unwrap_or_else(|| "episode.mp3".to_string())
    }

    /// Workspace file name for the downloaded artwork
    pub fn image_file_name(&self) -> String {
        Url::parse(&self.image_url)
            .ok()
            .as_ref()
            .and_then(url_file_name)
            .unwrap_or_else(|| DEFAULT_ARTWORK_NAME.to_string())
    }

    /// File name of the finished video, shared with the silent intermediate
    pub fn video_file_name(&self) -> String {
        video_file_name(&self.audio_file_name())
    }

    /// Where the finished video ends up
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.video_file_name())
    }
}
