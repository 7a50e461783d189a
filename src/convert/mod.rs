mod pipeline;
mod tools;
mod workspace;

pub use pipeline::{ConvertOptions, ConvertOutcome, convert};
pub use tools::{ExternalTools, FrameSize, MediaTools};
pub use workspace::Workspace;
