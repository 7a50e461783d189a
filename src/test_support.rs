// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory stand-ins for the network and the external tools.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::convert::{FrameSize, MediaTools};
use crate::error::ToolError;
use crate::http::{ByteStream, HttpClient, HttpResponse};
use crate::progress::Stage;

/// Serves canned bodies by URL; anything unknown is a 404
#[derive(Default)]
pub struct MockHttpClient {
    responses: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl AsRef<[u8]>) -> Self {
        self.responses
            .insert(url.to_string(), body.as_ref().to_vec());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> (u16, Vec<u8>) {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(body) => (200, body.clone()),
            None => (404, b"Not Found".to_vec()),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get_stream(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let (status, data) = self.lookup(url);

        let body: ByteStream =
            Box::pin(futures::stream::once(async move { Ok(Bytes::from(data)) }));

        Ok(HttpResponse { status, body })
    }

    async fn get_bytes(&self, url: &str) -> Result<(u16, Bytes), reqwest::Error> {
        let (status, data) = self.lookup(url);
        Ok((status, Bytes::from(data)))
    }
}

/// One recorded external tool invocation
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub stage: Stage,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Records invocations and writes placeholder outputs
#[derive(Default)]
pub struct MockTools {
    fail_on: Option<Stage>,
    calls: Mutex<Vec<ToolCall>>,
}

impl MockTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(stage: Stage) -> Self {
        Self {
            fail_on: Some(stage),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.calls().into_iter().map(|call| call.stage).collect()
    }

    fn invoke(&self, stage: Stage, inputs: &[&Path], output: &Path) -> Result<(), ToolError> {
        self.calls.lock().unwrap().push(ToolCall {
            stage,
            inputs: inputs.iter().map(|p| p.to_path_buf()).collect(),
            output: output.to_path_buf(),
        });

        if self.fail_on == Some(stage) {
            return Err(ToolError::Failed {
                program: "mock".to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("{:?} refused", stage),
            });
        }

        std::fs::write(output, format!("{:?}", stage)).map_err(|e| ToolError::SpawnFailed {
            program: "mock".to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl MediaTools for MockTools {
    async fn resize(&self, input: &Path, output: &Path, _frame: FrameSize) -> Result<(), ToolError> {
        self.invoke(Stage::Resize, &[input], output)
    }

    async fn encode_silent(
        &self,
        image: &Path,
        _duration_secs: u64,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.invoke(Stage::Encode, &[image], output)
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), ToolError> {
        self.invoke(Stage::Mux, &[video, audio], output)
    }
}
