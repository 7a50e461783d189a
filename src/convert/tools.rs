// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::ToolError;

/// Bytes of stderr kept in a tool failure
const STDERR_TAIL: usize = 2000;

/// Size of the video frame the artwork is fitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FrameSize {
    /// 1280x720
    #[value(name = "720p")]
    Hd720,
    /// 1920x1080
    #[default]
    #[value(name = "1080p")]
    Hd1080,
}

impl FrameSize {
    /// Width and height in pixels
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            FrameSize::Hd720 => (1280, 720),
            FrameSize::Hd1080 => (1920, 1080),
        }
    }

    /// `WIDTHxHEIGHT` geometry string
    pub fn geometry(self) -> String {
        let (width, height) = self.dimensions();
        format!("{}x{}", width, height)
    }
}

/// The external image and video operations a conversion relies on
///
/// Implementations must honour the transforms documented on each method;
/// the pipeline depends only on these contracts, not on tool syntax.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Fit `input` into `frame` and write the result to `output`.
    ///
    /// Images larger than the frame are scaled down preserving aspect
    /// ratio; smaller images keep their size. The image is centred on a
    /// black canvas of exactly the frame size.
    async fn resize(&self, input: &Path, output: &Path, frame: FrameSize)
    -> Result<(), ToolError>;

    /// Loop `image` into an H.264 video with no audio track, exactly
    /// `duration_secs` long, in yuv420p.
    async fn encode_silent(
        &self,
        image: &Path,
        duration_secs: u64,
        output: &Path,
    ) -> Result<(), ToolError>;

    /// Combine the video stream of `video` (copied as-is) with the audio
    /// of `audio` (encoded to AAC) into `output`.
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), ToolError>;
}

/// [`MediaTools`] backed by ImageMagick and ffmpeg executables
#[derive(Debug, Clone)]
pub struct ExternalTools {
    convert_bin: OsString,
    ffmpeg_bin: OsString,
}

impl ExternalTools {
    /// Use the given ImageMagick `convert` and `ffmpeg` executables
    pub fn new(convert_bin: impl Into<OsString>, ffmpeg_bin: impl Into<OsString>) -> Self {
        Self {
            convert_bin: convert_bin.into(),
            ffmpeg_bin: ffmpeg_bin.into(),
        }
    }

    async fn run(&self, program: &OsString, args: Vec<OsString>) -> Result<(), ToolError> {
        let name = program.to_string_lossy().into_owned();

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ToolError::SpawnFailed {
                program: name.clone(),
                source: e,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ToolError::Failed {
            program: name,
            status: output.status.to_string(),
            stderr: tail(stderr.trim(), STDERR_TAIL).to_string(),
        })
    }
}

impl Default for ExternalTools {
    fn default() -> Self {
        Self::new("convert", "ffmpeg")
    }
}

#[async_trait]
impl MediaTools for ExternalTools {
    async fn resize(
        &self,
        input: &Path,
        output: &Path,
        frame: FrameSize,
    ) -> Result<(), ToolError> {
        self.run(&self.convert_bin, resize_args(input, output, frame))
            .await
    }

    async fn encode_silent(
        &self,
        image: &Path,
        duration_secs: u64,
        output: &Path,
    ) -> Result<(), ToolError> {
        self.run(&self.ffmpeg_bin, encode_args(image, duration_secs, output))
            .await
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), ToolError> {
        self.run(&self.ffmpeg_bin, mux_args(video, audio, output))
            .await
    }
}

/// `convert IN -resize WxH> -background black -gravity center -extent WxH OUT`
fn resize_args(input: &Path, output: &Path, frame: FrameSize) -> Vec<OsString> {
    let geometry = frame.geometry();
    let mut args: Vec<OsString> = vec![input.into()];
    args.extend(
        [
            "-resize".to_string(),
            format!("{}>", geometry),
            "-background".to_string(),
            "black".to_string(),
            "-gravity".to_string(),
            "center".to_string(),
            "-extent".to_string(),
            geometry,
        ]
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

/// `ffmpeg -loop 1 -i IMAGE -c:v libx264 -t SECS -pix_fmt yuv420p OUT`
fn encode_args(image: &Path, duration_secs: u64, output: &Path) -> Vec<OsString> {
    let mut args = ffmpeg_prelude();
    args.extend(["-loop", "1", "-i"].map(OsString::from));
    args.push(image.into());
    args.extend(["-c:v", "libx264", "-t"].map(OsString::from));
    args.push(duration_secs.to_string().into());
    args.extend(["-pix_fmt", "yuv420p"].map(OsString::from));
    args.push(output.into());
    args
}

/// `ffmpeg -i VIDEO -i AUDIO -map 0:v:0 -map 1:a:0 -c:v copy -c:a aac OUT`
fn mux_args(video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    let mut args = ffmpeg_prelude();
    args.push("-i".into());
    args.push(video.into());
    args.push("-i".into());
    args.push(audio.into());
    args.extend(
        [
            "-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a", "aac",
        ]
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

fn ffmpeg_prelude() -> Vec<OsString> {
    ["-hide_banner", "-loglevel", "error", "-nostdin", "-y"]
        .map(OsString::from)
        .to_vec()
}

/// Last `max` bytes of `s`, cut on a char boundary
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
