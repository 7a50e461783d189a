pub mod convert;
pub mod episode;
pub mod error;
pub mod feed;
pub mod http;
pub mod process;
pub mod progress;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use convert::{ConvertOptions, ConvertOutcome, ExternalTools, FrameSize, MediaTools, convert};
pub use episode::{ConversionJob, parse_duration, resolve_image};
pub use error::{ConvertError, DurationError, FeedError, FetchError, JobError, RunError, ToolError};
pub use feed::{Episode, Link, Podcast, is_url, parse_feed};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use process::{RunOptions, RunSummary, run};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter, Stage};
