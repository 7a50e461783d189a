mod download;
mod duration;
mod filename;
mod image;
mod job;

pub use download::{FetchOutcome, download, fetch};
pub use duration::parse_duration;
pub use filename::{output_dir_name, sanitize_path, url_file_name, video_file_name};
pub use image::{placeholder_image_url, resolve_image};
pub use job::ConversionJob;
