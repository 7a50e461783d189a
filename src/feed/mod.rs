mod fetch;
mod parse;

pub use fetch::{fetch_feed_bytes, is_url, read_feed_file};
pub use parse::{ENCLOSURE_REL, Episode, Link, Podcast, parse_feed};
