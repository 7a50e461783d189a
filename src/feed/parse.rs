// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

use crate::error::FeedError;

/// Relation of the link that carries an episode's media attachment
pub const ENCLOSURE_REL: &str = "enclosure";

/// Represents a parsed podcast feed
#[derive(Debug, Clone)]
pub struct Podcast {
    pub title: String,
    pub image_url: Option<Url>,
    pub episodes: Vec<Episode>,
}

/// Represents a single feed entry, in feed order
#[derive(Debug, Clone, Default)]
pub struct Episode {
    pub title: String,
    pub duration: Option<String>,
    pub links: Vec<Link>,
    /// Entry-level artwork reference
    pub image: Option<String>,
    /// Raw HTML/text bodies, `content:encoded` first, then `description`
    pub content: Vec<String>,
}

/// A link attached to an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }
}

impl Episode {
    /// URL of the media attachment; the last enclosure link wins
    pub fn enclosure_url(&self) -> Option<&str> {
        self.links
            .iter()
            .rev()
            .find(|link| link.rel == ENCLOSURE_REL)
            .map(|link| link.href.as_str())
    }
}

/// Parse RSS 2.0 (or, failing that, Atom) feed bytes into a Podcast struct
pub fn parse_feed(xml_bytes: &[u8]) -> Result<Podcast, FeedError> {
    let channel = match rss::Channel::read_from(xml_bytes) {
        Ok(channel) => channel,
        // Not RSS 2.0; Atom (and RSS 1.0) go through feed-rs. The RSS
        // error is kept since it describes the expected format.
        Err(rss_error) => {
            return feed_rs::parser::parse(xml_bytes)
                .map(podcast_from_feed)
                .map_err(|_| FeedError::ParseFailed(rss_error));
        }
    };

    let episodes = channel.items().iter().map(parse_episode).collect();

    let image_url = channel
        .image()
        .and_then(|img| Url::parse(img.url()).ok())
        .or_else(|| {
            channel
                .itunes_ext()
                .and_then(|ext| ext.image())
                .and_then(|url| Url::parse(url).ok())
        });

    Ok(Podcast {
        title: channel.title().to_string(),
        image_url,
        episodes,
    })
}

fn parse_episode(item: &rss::Item) -> Episode {
    let title = item
        .title()
        .map(String::from)
        .unwrap_or_else(|| "Untitled Episode".to_string());

    let mut links = Vec::new();
    if let Some(link) = item.link().filter(|l| !l.is_empty()) {
        links.push(Link::new("alternate", link));
    }
    if let Some(enclosure) = item.enclosure().filter(|e| !e.url().is_empty()) {
        links.push(Link::new(ENCLOSURE_REL, enclosure.url()));
    }

    let content = [item.content(), item.description()]
        .into_iter()
        .flatten()
        .filter(|body| !body.trim().is_empty())
        .map(String::from)
        .collect();

    let itunes = item.itunes_ext();

    Episode {
        title,
        duration: itunes.and_then(|ext| ext.duration().map(String::from)),
        links,
        image: itunes
            .and_then(|ext| ext.image())
            .filter(|url| !url.is_empty())
            .map(String::from),
        content,
    }
}

fn podcast_from_feed(feed: feed_rs::model::Feed) -> Podcast {
    let image_url = feed
        .logo
        .iter()
        .chain(feed.icon.iter())
        .find_map(|img| Url::parse(&img.uri).ok());

    Podcast {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        image_url,
        episodes: feed.entries.into_iter().map(episode_from_entry).collect(),
    }
}

fn episode_from_entry(entry: feed_rs::model::Entry) -> Episode {
    let title = entry
        .title
        .map(|t| t.content)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled Episode".to_string());

    let links = entry
        .links
        .into_iter()
        .filter(|l| !l.href.is_empty())
        .map(|l| Link::new(l.rel.as_deref().unwrap_or("alternate"), l.href))
        .collect();

    let content = [
        entry.content.and_then(|c| c.body),
        entry.summary.map(|t| t.content),
    ]
    .into_iter()
    .flatten()
    .filter(|body| !body.trim().is_empty())
    .collect();

    let duration = entry.media.iter().find_map(|m| {
        m.duration
            .or_else(|| m.content.iter().find_map(|c| c.duration))
            .map(|d| d.as_secs().to_string())
    });

    let image = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.clone())
        .find(|uri| !uri.is_empty());

    Episode {
        title,
        duration,
        links,
        image,
        content,
    }
}
