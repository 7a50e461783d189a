// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

use crate::progress::Stage;

/// Errors that can occur when fetching or parsing RSS feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} while fetching feed from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors that can occur while downloading a resource to disk
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed for {url}: {source}")]
    HttpFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to create file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream error while downloading {url}: {source}")]
    StreamFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors produced while normalizing an episode duration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DurationError {
    #[error("Episode has no duration")]
    Missing,

    #[error("Invalid duration component '{component}' in '{raw}'")]
    InvalidComponent { raw: String, component: String },

    #[error("Duration '{raw}' has more than hours, minutes and seconds")]
    TooManyComponents { raw: String },

    #[error("Duration '{raw}' is too large")]
    Overflow { raw: String },
}

/// Errors reported by the external image and video tools
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to launch {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Errors that prevent a feed entry from becoming a conversion job
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Episode '{title}' has no enclosure (audio file)")]
    MissingEnclosure { title: String },

    #[error("Invalid audio URL '{url}': {source}")]
    InvalidAudioUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unusable duration: {0}")]
    Duration(#[from] DurationError),
}

/// Errors that abort the conversion of a single episode
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Failed to create workspace: {0}")]
    WorkspaceFailed(#[source] std::io::Error),

    #[error("Missing {what} at {path} after downloading {url}")]
    MissingInput {
        what: &'static str,
        url: String,
        path: PathBuf,
    },

    #[error("{stage} failed: {source}")]
    Tool {
        stage: Stage,
        #[source]
        source: ToolError,
    },

    #[error("Failed to move finished video to {path}: {source}")]
    FinalizeFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level errors for a feed run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Failed to create output directory {path}: {source}")]
    CreateOutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
