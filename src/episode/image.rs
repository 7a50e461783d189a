// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::convert::FrameSize;
use crate::feed::Episode;

/// Service that renders a text placeholder image of arbitrary size
const PLACEHOLDER_BASE: &str = "https://placehold.co";

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("Invalid img selector"));

/// Bare image URLs in raw content (png or jpg)
static IMAGE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s"'<>]+?\.(?:png|jpg)"#).expect("Invalid image URL pattern")
});

/// Pick the artwork for an episode
///
/// Tries, in order: the entry's own image, the first `<img>` in its content,
/// the first bare png/jpg URL in its content, the channel image, and finally
/// a generated placeholder labelled with `placeholder_seed`.
pub fn resolve_image(
    episode: &Episode,
    channel_image: Option<&str>,
    placeholder_seed: &str,
    frame: FrameSize,
) -> String {
    episode
        .image
        .clone()
        .filter(|url| !url.is_empty())
        .or_else(|| first_img_src(&episode.content))
        .or_else(|| first_image_url(&episode.content))
        .or_else(|| {
            channel_image
                .filter(|url| !url.is_empty())
                .map(String::from)
        })
        .unwrap_or_else(|| placeholder_image_url(placeholder_seed, frame))
}

/// `src` of the first `<img>` tag across the content blocks
fn first_img_src(content: &[String]) -> Option<String> {
    content.iter().find_map(|body| {
        let fragment = Html::parse_fragment(body);
        fragment
            .select(&IMG_SELECTOR)
            .find_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(String::from)
    })
}

/// First png/jpg URL appearing anywhere in the raw content blocks
fn first_image_url(content: &[String]) -> Option<String> {
    content.iter().find_map(|body| {
        IMAGE_URL_PATTERN
            .find(body)
            .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
    })
}

/// Placeholder artwork sized to the frame, showing `seed` as its text
pub fn placeholder_image_url(seed: &str, frame: FrameSize) -> String {
    let (width, height) = frame.dimensions();
    let mut url = Url::parse(PLACEHOLDER_BASE).expect("Invalid placeholder base URL");
    url.set_path(&format!("{}x{}/000000/FFFFFF/png", width, height));
    url.query_pairs_mut().append_pair("text", seed);
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(image: Option<&str>, content: &[&str]) -> Episode {
        Episode {
            title: "Episode".to_string(),
            image: image.map(String::from),
            content: content.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn entry_image_wins_over_content_image() {
        let ep = episode(
            Some("https://cdn.example.com/entry.jpg"),
            &[r#"<p><img src="https://cdn.example.com/content.png"></p>"#],
        );

        assert_eq!(
            resolve_image(&ep, Some("https://example.com/channel.jpg"), "Show", FrameSize::Hd1080),
            "https://cdn.example.com/entry.jpg"
        );
    }

    #[test]
    fn img_tag_is_used_without_entry_image() {
        let ep = episode(
            None,
            &[
                "<p>No pictures here, see https://example.com/raw.png</p>",
                r#"<div><img alt="cover" src="https://cdn.example.com/tag.jpeg"/></div>"#,
            ],
        );

        assert_eq!(
            resolve_image(&ep, None, "Show", FrameSize::Hd1080),
            "https://cdn.example.com/tag.jpeg"
        );
    }

    #[test]
    fn first_img_tag_across_blocks_wins() {
        let ep = episode(
            None,
            &[
                r#"<img src="https://example.com/first.png">"#,
                r#"<img src="https://example.com/second.png">"#,
            ],
        );

        assert_eq!(
            resolve_image(&ep, None, "Show", FrameSize::Hd1080),
            "https://example.com/first.png"
        );
    }

    #[test]
    fn img_tag_without_src_is_ignored() {
        let ep = episode(
            None,
            &[r#"<img alt="broken"> artwork: https://example.com/art.jpg"#],
        );

        assert_eq!(
            resolve_image(&ep, None, "Show", FrameSize::Hd1080),
            "https://example.com/art.jpg"
        );
    }

    #[test]
    fn bare_url_in_content_is_matched() {
        let ep = episode(
            None,
            &["Cover art at https://example.com/art/cover.png?size=large&amp;v=2 enjoy"],
        );

        assert_eq!(
            resolve_image(&ep, None, "Show", FrameSize::Hd1080),
            "https://example.com/art/cover.png"
        );
    }

    #[test]
    fn bare_url_decodes_entities() {
        let ep = episode(None, &["see http://example.com/a&amp;b.jpg"]);

        assert_eq!(
            resolve_image(&ep, None, "Show", FrameSize::Hd1080),
            "http://example.com/a&b.jpg"
        );
    }

    #[test]
    fn channel_image_is_used_when_entry_has_none() {
        let ep = episode(None, &["<p>Just words</p>"]);

        assert_eq!(
            resolve_image(&ep, Some("https://example.com/channel.jpg"), "Show", FrameSize::Hd1080),
            "https://example.com/channel.jpg"
        );
    }

    #[test]
    fn empty_entry_image_falls_through() {
        let ep = episode(Some(""), &[]);

        assert_eq!(
            resolve_image(&ep, Some("https://example.com/channel.jpg"), "Show", FrameSize::Hd1080),
            "https://example.com/channel.jpg"
        );
    }

    #[test]
    fn placeholder_contains_podcast_name() {
        let ep = episode(None, &[]);

        let url = resolve_image(&ep, None, "My Show", FrameSize::Hd720);
        assert!(url.starts_with("https://placehold.co/1280x720/"));
        assert!(url.contains("text=My+Show"));
    }

    #[test]
    fn placeholder_matches_frame_size() {
        let url = placeholder_image_url("Show", FrameSize::Hd1080);
        assert_eq!(url, "https://placehold.co/1920x1080/000000/FFFFFF/png?text=Show");
    }
}
