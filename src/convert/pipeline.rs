// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use crate::episode::{ConversionJob, fetch};
use crate::error::ConvertError;
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter, Stage};

use super::tools::{FrameSize, MediaTools};
use super::workspace::Workspace;

/// Workspace file name of the artwork after fitting it to the frame
const FRAME_FILE_NAME: &str = "frame.png";

/// Prefix of the audio-less intermediate video in the workspace
const SILENT_PREFIX: &str = "silent_";

/// Options for converting a single episode
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Frame the artwork is fitted into
    pub frame: FrameSize,
    /// Where workspaces are created (None = system temp directory)
    pub workspace_root: Option<PathBuf>,
}

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// The video was already in the output directory; nothing was done
    AlreadyExists(PathBuf),
    /// The video was produced
    Converted(PathBuf),
}

/// Convert one episode into a video in its output directory
///
/// Does nothing if the video already exists. Otherwise all intermediate
/// files live in a fresh [`Workspace`] that is removed before returning,
/// whether the conversion succeeded or not.
pub async fn convert<C: HttpClient, T: MediaTools>(
    client: &C,
    tools: &T,
    job: &ConversionJob,
    options: &ConvertOptions,
    reporter: &SharedProgressReporter,
) -> Result<ConvertOutcome, ConvertError> {
    let output_path = job.output_path();

    if output_path.exists() {
        reporter.report(ProgressEvent::EpisodeSkipped {
            episode_title: job.episode_title.clone(),
            output_path: output_path.clone(),
        });
        return Ok(ConvertOutcome::AlreadyExists(output_path));
    }

    let workspace = Workspace::create(options.workspace_root.as_deref())
        .map_err(ConvertError::WorkspaceFailed)?;

    let result = run_stages(client, tools, job, options, &workspace, &output_path, reporter).await;

    let workspace_path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        reporter.report(ProgressEvent::WorkspaceCleanupFailed {
            path: workspace_path,
            error: e.to_string(),
        });
    }

    result.map(|()| ConvertOutcome::Converted(output_path))
}

async fn run_stages<C: HttpClient, T: MediaTools>(
    client: &C,
    tools: &T,
    job: &ConversionJob,
    options: &ConvertOptions,
    workspace: &Workspace,
    output_path: &Path,
    reporter: &SharedProgressReporter,
) -> Result<(), ConvertError> {
    let image_path = fetch_required(
        client,
        &job.image_url,
        &workspace.file(&job.image_file_name()),
        "artwork",
        reporter,
    )
    .await?;

    let frame_path = workspace.file(FRAME_FILE_NAME);
    stage_starting(reporter, job, Stage::Resize);
    tools
        .resize(&image_path, &frame_path, options.frame)
        .await
        .map_err(|source| ConvertError::Tool {
            stage: Stage::Resize,
            source,
        })?;

    let audio_path = fetch_required(
        client,
        job.audio_url.as_str(),
        &workspace.file(&job.audio_file_name()),
        "audio",
        reporter,
    )
    .await?;

    let silent_path = workspace.file(&format!("{}{}", SILENT_PREFIX, job.video_file_name()));
    if silent_path.exists() {
        reporter.report(ProgressEvent::SilentVideoReused {
            path: silent_path.clone(),
        });
    } else {
        stage_starting(reporter, job, Stage::Encode);
        tools
            .encode_silent(&frame_path, job.duration_secs, &silent_path)
            .await
            .map_err(|source| ConvertError::Tool {
                stage: Stage::Encode,
                source,
            })?;
    }

    // Mux next to the final file, then move it into place
    let partial_path = partial_video_path(output_path);
    stage_starting(reporter, job, Stage::Mux);
    if let Err(source) = tools.mux(&silent_path, &audio_path, &partial_path).await {
        let _ = tokio::fs::remove_file(&partial_path).await;
        return Err(ConvertError::Tool {
            stage: Stage::Mux,
            source,
        });
    }

    tokio::fs::rename(&partial_path, output_path)
        .await
        .map_err(|e| ConvertError::FinalizeFailed {
            path: output_path.to_path_buf(),
            source: e,
        })
}

/// Fetch into the workspace and insist that the file is there afterwards
async fn fetch_required<C: HttpClient>(
    client: &C,
    url: &str,
    destination: &Path,
    what: &'static str,
    reporter: &SharedProgressReporter,
) -> Result<PathBuf, ConvertError> {
    let (path, _) = fetch(client, url, destination, reporter).await;

    if path.exists() {
        Ok(path)
    } else {
        Err(ConvertError::MissingInput {
            what,
            url: url.to_string(),
            path,
        })
    }
}

fn stage_starting(reporter: &SharedProgressReporter, job: &ConversionJob, stage: Stage) {
    reporter.report(ProgressEvent::StageStarting {
        episode_title: job.episode_title.clone(),
        stage,
    });
}

/// `dir/name.mp4` becomes `dir/name.partial.mp4`, keeping the container
/// extension for the muxer
fn partial_video_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = output_path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_path.with_file_name(format!("{}.partial.{}", stem, extension))
}
