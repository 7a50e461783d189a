// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::FetchError;
use crate::http::HttpClient;
use crate::progress::{ProgressEvent, SharedProgressReporter};

use super::filename::sanitize_path;

/// Suffix for a download that has not completed yet
const PARTIAL_SUFFIX: &str = "partial";

/// Outcome of a best-effort fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The file was already present and left untouched
    AlreadyPresent,
    /// The file was downloaded; carries the byte count
    Downloaded(u64),
    /// The download failed and no file was written
    Failed(FetchError),
}

/// Download `url` to `destination`, skipping if the file already exists
///
/// `%20` in the destination file name is rewritten to `_` first; the path actually
/// used is returned alongside the outcome. Transport failures are reported
/// and returned as [`FetchOutcome::Failed`], never raised: callers find out
/// by checking whether the file exists.
pub async fn fetch<C: HttpClient>(
    client: &C,
    url: &str,
    destination: &Path,
    reporter: &SharedProgressReporter,
) -> (PathBuf, FetchOutcome) {
    let destination = sanitize_path(destination);

    if destination.exists() {
        reporter.report(ProgressEvent::DownloadSkipped {
            path: destination.clone(),
        });
        return (destination, FetchOutcome::AlreadyPresent);
    }

    reporter.report(ProgressEvent::Downloading {
        url: url.to_string(),
    });

    let outcome = match download(client, url, &destination).await {
        Ok(bytes) => FetchOutcome::Downloaded(bytes),
        Err(e) => {
            reporter.report(ProgressEvent::DownloadFailed {
                url: url.to_string(),
                error: e.to_string(),
            });
            FetchOutcome::Failed(e)
        }
    };

    (destination, outcome)
}

/// Stream `url` into `output_path`, via a `.partial` sibling
///
/// Returns the number of bytes written. The partial file is removed on
/// failure so no truncated download is left behind.
pub async fn download<C: HttpClient>(
    client: &C,
    url: &str,
    output_path: &Path,
) -> Result<u64, FetchError> {
    let partial_path = partial_path_for(output_path);

    let result = download_to(client, url, &partial_path).await;
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&partial_path, output_path)
        .await
        .map_err(|e| FetchError::FileWriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes)
}

async fn download_to<C: HttpClient>(
    client: &C,
    url: &str,
    output_path: &Path,
) -> Result<u64, FetchError> {
    // Get streaming response
    let response = client
        .get_stream(url)
        .await
        .map_err(|e| FetchError::HttpFailed {
            url: url.to_string(),
            source: e,
        })?;

    if !response.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    let mut file =
        File::create(output_path)
            .await
            .map_err(|e| FetchError::FileCreateFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;

    // Stream body to file
    let mut bytes_downloaded: u64 = 0;
    let mut stream = response.body;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::StreamFailed {
            url: url.to_string(),
            source: e,
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| FetchError::FileWriteFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        bytes_downloaded += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    file.flush()
        .await
        .map_err(|e| FetchError::FileWriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes_downloaded)
}

fn partial_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopReporter;
    use crate::test_support::MockHttpClient;

    use tempfile::tempdir;

    #[tokio::test]
    async fn fetch_writes_file() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("episode.mp3");
        let client = MockHttpClient::new().with("https://example.com/episode.mp3", "test audio content");

        let (path, outcome) = fetch(
            &client,
            "https://example.com/episode.mp3",
            &output_path,
            &NoopReporter::shared(),
        )
        .await;

        assert_eq!(path, output_path);
        assert!(matches!(outcome, FetchOutcome::Downloaded(18)));
        assert_eq!(std::fs::read(&path).unwrap(), b"test audio content");
        assert!(!partial_path_for(&path).exists());
    }

    #[tokio::test]
    async fn fetch_skips_existing_file() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("episode.mp3");
        std::fs::write(&output_path, b"already here").unwrap();
        let client = MockHttpClient::new().with("https://example.com/episode.mp3", "new content");

        let (_, outcome) = fetch(
            &client,
            "https://example.com/episode.mp3",
            &output_path,
            &NoopReporter::shared(),
        )
        .await;

        assert!(matches!(outcome, FetchOutcome::AlreadyPresent));
        assert!(client.requests().is_empty());
        assert_eq!(std::fs::read(&output_path).unwrap(), b"already here");
    }

    #[tokio::test]
    async fn fetch_reports_http_error_without_writing() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("episode.mp3");
        let client = MockHttpClient::new();

        let (path, outcome) = fetch(
            &client,
            "https://example.com/episode.mp3",
            &output_path,
            &NoopReporter::shared(),
        )
        .await;

        match outcome {
            FetchOutcome::Failed(FetchError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected HttpStatus failure, got {:?}", other),
        }
        assert!(!path.exists());
        assert!(!partial_path_for(&path).exists());
    }

    #[tokio::test]
    async fn fetch_rewrites_encoded_spaces_in_destination() {
        let dir = tempdir().unwrap();
        let requested = dir.path().join("my-ep%20name.mp3");
        let client = MockHttpClient::new().with("https://example.com/my-ep%20name.mp3", "audio");

        let (path, _) = fetch(
            &client,
            "https://example.com/my-ep%20name.mp3",
            &requested,
            &NoopReporter::shared(),
        )
        .await;

        assert_eq!(path, dir.path().join("my-ep_name.mp3"));
        assert!(path.exists());
        assert!(!requested.exists());
    }

    #[tokio::test]
    async fn download_fails_on_http_error() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("episode.mp3");
        let client = MockHttpClient::new();

        let result = download(&client, "https://example.com/missing.mp3", &output_path).await;

        match result.unwrap_err() {
            FetchError::HttpStatus { status, .. } => assert_eq!(status, 404),
            _ => panic!("Expected HttpStatus error"),
        }
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path_for(Path::new("/tmp/ep.mp3")),
            PathBuf::from("/tmp/ep.mp3.partial")
        );
    }
}
