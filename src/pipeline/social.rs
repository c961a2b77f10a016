use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::ValidationRule;
use super::link::normalize_url;

static YOUTUBE_VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id pattern is valid"));
static YOUTUBE_CHANNEL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("channel id pattern is valid"));
static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?[A-Za-z0-9_.-]{1,39}$").expect("handle pattern is valid"));

/// Sites whose profile URLs get their own validation chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SocialPlatform {
    YouTubeChannel,
    YouTubeVideo,
    Twitter,
    LinkedIn,
    Instagram,
    Facebook,
    GitHub,
    TikTok,
}

impl SocialPlatform {
    pub fn label(self) -> &'static str {
        match self {
            Self::YouTubeChannel | Self::YouTubeVideo => "YouTube",
            Self::Twitter => "Twitter/X",
            Self::LinkedIn => "LinkedIn",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::GitHub => "GitHub",
            Self::TikTok => "TikTok",
        }
    }

    fn hosts(self) -> &'static [&'static str] {
        match self {
            Self::YouTubeChannel | Self::YouTubeVideo => &["youtube.com", "youtu.be"],
            Self::Twitter => &["twitter.com", "x.com"],
            Self::LinkedIn => &["linkedin.com"],
            Self::Instagram => &["instagram.com"],
            Self::Facebook => &["facebook.com", "fb.com"],
            Self::GitHub => &["github.com"],
            Self::TikTok => &["tiktok.com"],
        }
    }

    pub fn matches_host(self, url: &Url) -> bool {
        site_host(url).is_some_and(|host| self.hosts().contains(&host.as_str()))
    }

    /// Whether `url` points at the kind of page this platform expects.
    pub fn accepts(self, url: &Url) -> bool {
        if !self.matches_host(url) {
            return false;
        }
        let segments = segments(url);
        match self {
            Self::YouTubeChannel => is_youtube_channel(url),
            Self::YouTubeVideo => is_youtube_video(url),
            Self::Twitter => match segments.as_slice() {
                [handle] => HANDLE.is_match(handle) && !is_reserved(handle, TWITTER_RESERVED),
                _ => false,
            },
            Self::LinkedIn => matches!(
                segments.as_slice(),
                ["in" | "company" | "school", slug] if !slug.is_empty()
            ),
            Self::Instagram => match segments.as_slice() {
                [handle] => HANDLE.is_match(handle) && !is_reserved(handle, INSTAGRAM_RESERVED),
                _ => false,
            },
            Self::Facebook => match segments.as_slice() {
                ["profile.php"] => url.query_pairs().any(|(key, value)| key == "id" && !value.is_empty()),
                [name] => HANDLE.is_match(name),
                _ => false,
            },
            Self::GitHub => match segments.as_slice() {
                [user] => HANDLE.is_match(user) && !user.starts_with('@'),
                _ => false,
            },
            Self::TikTok => match segments.as_slice() {
                [handle] => handle.len() > 1 && handle.starts_with('@') && HANDLE.is_match(handle),
                _ => false,
            },
        }
    }

    /// Whether `url` is a deeper page on the right site (a post, a
    /// repository, a video) rather than the profile itself.
    fn is_sub_path(self, url: &Url) -> bool {
        let segments = segments(url);
        match self {
            Self::YouTubeChannel => is_youtube_video(url),
            Self::YouTubeVideo => is_youtube_channel(url),
            Self::LinkedIn => segments.len() > 2,
            _ => segments.len() > 1,
        }
    }

    fn sub_path_error(self) -> &'static str {
        match self {
            Self::YouTubeChannel => "Please enter a channel URL, not a video URL",
            Self::YouTubeVideo => "Please enter a video URL, not a channel URL",
            Self::Twitter | Self::Instagram | Self::Facebook => {
                "Please enter a profile URL, not a link to a post"
            }
            Self::LinkedIn => "Please enter a profile URL, not a link to an activity page",
            Self::GitHub => "Please enter a profile URL, not a repository",
            Self::TikTok => "Please enter a profile URL, not a video",
        }
    }

    fn accept_error(self) -> &'static str {
        match self {
            Self::YouTubeChannel => "Please enter a valid YouTube channel URL",
            Self::YouTubeVideo => "Please enter a valid YouTube video URL",
            _ => "Please enter a valid profile URL",
        }
    }

    /// Platform check, then the disallowed sub-path, then the page shape.
    pub(crate) fn rules(self) -> Vec<ValidationRule> {
        vec![
            ValidationRule::new(move |value: &str| {
                normalize_url(value).is_some_and(|url| self.matches_host(&url))
            })
            .with_error(format!("Please enter a {} URL", self.label())),
            ValidationRule::new(move |value: &str| {
                normalize_url(value).is_some_and(|url| !self.is_sub_path(&url))
            })
            .with_error(self.sub_path_error()),
            ValidationRule::new(move |value: &str| {
                normalize_url(value).is_some_and(|url| self.accepts(&url))
            })
            .with_error(self.accept_error()),
        ]
    }
}

const TWITTER_RESERVED: &[&str] = &[
    "home", "explore", "i", "search", "settings", "messages", "notifications", "intent", "share",
    "login", "signup", "tos", "privacy",
];
const INSTAGRAM_RESERVED: &[&str] = &[
    "p", "reel", "reels", "explore", "stories", "accounts", "direct", "about", "tv",
];

fn is_reserved(segment: &str, reserved: &[&str]) -> bool {
    reserved.contains(&segment.to_ascii_lowercase().as_str())
}

/// Host with `www.`, `m.` and `mobile.` prefixes removed, lowercased.
fn site_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = ["www.", "m.", "mobile."]
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .map(str::to_string)
        .unwrap_or(host);
    Some(host)
}

fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default()
}

/// Watch pages, shorts, embeds, live streams, and `youtu.be` short links.
pub fn is_youtube_video(url: &Url) -> bool {
    let Some(host) = site_host(url) else {
        return false;
    };
    let segments = segments(url);
    match host.as_str() {
        "youtu.be" => matches!(segments.as_slice(), [id] if YOUTUBE_VIDEO_ID.is_match(id)),
        "youtube.com" => match segments.as_slice() {
            ["watch"] => url
                .query_pairs()
                .any(|(key, value)| key == "v" && YOUTUBE_VIDEO_ID.is_match(&value)),
            ["shorts" | "embed" | "live" | "v", id] => YOUTUBE_VIDEO_ID.is_match(id),
            _ => false,
        },
        _ => false,
    }
}

/// `/channel/UC…`, `/c/name`, `/user/name`, or `/@handle`, with nothing after.
pub fn is_youtube_channel(url: &Url) -> bool {
    if site_host(url).as_deref() != Some("youtube.com") {
        return false;
    }
    match segments(url).as_slice() {
        ["channel", id] => YOUTUBE_CHANNEL_ID.is_match(id),
        ["c" | "user", name] => !name.is_empty(),
        [handle] => handle.len() > 1 && handle.starts_with('@'),
        _ => false,
    }
}
