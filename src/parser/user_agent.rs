//! User-agent classification
//!
//! Maps a raw user-agent string to coarse OS and browser families with an
//! ordered, case-insensitive substring rule table (first match wins), and
//! recognises a couple of search-engine crawlers by their product token.

use serde::{Deserialize, Serialize};

pub const OS_UNKNOWN: &str = "Unknown";
pub const BROWSER_OTHER: &str = "Other";
/// Browser label for an empty user agent; unmatched non-empty ones get `Other`
pub const BROWSER_UNKNOWN: &str = "Unknown";

const OS_RULES: &[(&[&str], &str)] = &[
    (&["windows"], "Windows"),
    (&["macintosh", "mac os x"], "macOS"),
    (&["linux"], "Linux"),
    (&["android"], "Android"),
    (&["iphone", "ipad"], "iOS"),
];

/// OS and browser family derived from a user agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAgentFamilies {
    pub os: &'static str,
    pub browser: &'static str,
}

/// Classify a raw user-agent string. Never fails.
pub fn classify(raw: &str) -> UserAgentFamilies {
    if raw.is_empty() {
        return UserAgentFamilies {
            os: OS_UNKNOWN,
            browser: BROWSER_UNKNOWN,
        };
    }

    let lower = raw.to_lowercase();
    UserAgentFamilies {
        os: os_family(&lower),
        browser: browser_family(&lower),
    }
}

fn os_family(lower: &str) -> &'static str {
    OS_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, label)| *label)
        .unwrap_or(OS_UNKNOWN)
}

fn browser_family(lower: &str) -> &'static str {
    let chrome = lower.contains("chrome");

    if lower.contains("edg/") || lower.contains("edge") {
        "Edge"
    } else if lower.contains("firefox") {
        "Firefox"
    } else if chrome {
        "Chrome"
    } else if lower.contains("safari") {
        "Safari"
    } else if lower.contains("opera") || lower.contains("opr/") {
        "Opera"
    } else {
        BROWSER_OTHER
    }
}

/// Search-engine crawlers counted separately in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crawler {
    Googlebot,
    YandexBot,
}

impl Crawler {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Googlebot => "Googlebot",
            Self::YandexBot => "YandexBot",
        }
    }

    /// Identify a crawler from the product token in the user agent's
    /// comment, e.g. `Mozilla/5.0 (compatible; Googlebot/2.1; ...)`.
    pub fn detect(user_agent: &str) -> Option<Self> {
        match crawler_fragment(user_agent)? {
            "Googlebot" => Some(Self::Googlebot),
            "YandexBot" => Some(Self::YandexBot),
            _ => None,
        }
    }
}

/// Second `;`-separated element of the first parenthesised group, trimmed
/// and cut at its first `/`.
pub fn crawler_fragment(user_agent: &str) -> Option<&str> {
    let open = user_agent.find('(')?;
    let close = user_agent.find(')')?;
    let comment = user_agent.get(open + 1..close)?;

    let fragment = comment.split(';').nth(1)?.trim();
    match fragment.find('/') {
        Some(slash) if slash > 0 => Some(&fragment[..slash]),
        _ => Some(fragment),
    }
}
