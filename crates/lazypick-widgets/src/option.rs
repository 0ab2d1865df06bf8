//! Options and pages as the picker sees them, plus the provider's wire format.

use serde::de::IgnoredAny;
use serde::Deserialize;
use std::fmt;

/// Stable identity of an option. Providers send either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum OptionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionId::Number(n) => write!(f, "{n}"),
            OptionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for OptionId {
    fn from(n: i64) -> Self {
        OptionId::Number(n)
    }
}

impl From<&str> for OptionId {
    fn from(s: &str) -> Self {
        OptionId::Text(s.to_string())
    }
}

/// One selectable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: OptionId,
    /// Display label and the field the search term is matched against.
    pub name: String,
    pub episode_count: usize,
    /// Reference to the option's picture. Terminals cannot show it, so the
    /// row only carries it for hosts that can.
    pub image_url: String,
}

impl SelectOption {
    pub fn new(id: impl Into<OptionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            episode_count: 0,
            image_url: String::new(),
        }
    }

    pub fn with_episode_count(mut self, count: usize) -> Self {
        self.episode_count = count;
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }
}

/// One decoded page: its options in provider order and the cursor for the
/// page after it (`None` when this was the last one).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub options: Vec<SelectOption>,
    pub next: Option<String>,
}

impl Page {
    pub fn new(options: Vec<SelectOption>, next: Option<String>) -> Self {
        Self { options, next }
    }

    /// Decode a provider response body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let wire: WirePage = serde_json::from_slice(body)?;
        Ok(wire.into())
    }
}

#[derive(Deserialize)]
struct WirePage {
    info: WireInfo,
    #[serde(default)]
    results: Vec<WireOption>,
}

#[derive(Deserialize)]
struct WireInfo {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize)]
struct WireOption {
    id: OptionId,
    name: String,
    #[serde(default)]
    episode: Vec<IgnoredAny>,
    #[serde(default)]
    image: String,
}

impl From<WirePage> for Page {
    fn from(wire: WirePage) -> Self {
        let options = wire
            .results
            .into_iter()
            .map(|o| SelectOption {
                id: o.id,
                name: o.name,
                episode_count: o.episode.len(),
                image_url: o.image,
            })
            .collect();
        Page {
            options,
            next: wire.info.next,
        }
    }
}
