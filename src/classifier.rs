use crate::error::{ExportError, Result};
use scraper::{ElementRef, Selector};
use serde::Deserialize;

/// CSS selectors identifying the structural regions of a conversation page.
///
/// The host page changes its markup between releases, so these live in
/// configuration rather than in code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// One conversation turn each.
    pub container: String,
    /// Region holding a user turn's content.
    pub user: String,
    /// Any of these marks a rendered assistant turn.
    pub assistant: Vec<String>,
    /// The conversation title in the page chrome.
    pub title: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            container: "[data-test-render-count]".into(),
            user: r#"[data-testid="user-message"]"#.into(),
            assistant: vec![".standard-markdown".into(), ".progressive-markdown".into()],
            title: r#"[data-testid="chat-title"]"#.into(),
        }
    }
}

impl Markers {
    pub fn compile(&self) -> Result<CompiledMarkers> {
        let assistant = self
            .assistant
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        let assistant = if assistant.is_empty() {
            None
        } else {
            // A single selector list, so the first region in document order wins
            // whichever marker class it carries.
            Some(parse_selector("assistant", &assistant.join(", "))?)
        };

        Ok(CompiledMarkers {
            container: parse_selector("container", &self.container)?,
            user: parse_selector("user", &self.user)?,
            assistant,
            title: parse_selector("title", &self.title)?,
        })
    }
}

fn parse_selector(name: &'static str, selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| ExportError::InvalidMarker {
        name,
        selector: selector.to_string(),
    })
}

pub struct CompiledMarkers {
    pub container: Selector,
    pub user: Selector,
    pub assistant: Option<Selector>,
    pub title: Selector,
}

/// What a container turned out to hold, with the content region to convert.
#[derive(Debug, Clone, Copy)]
pub enum Classification<'a> {
    User(ElementRef<'a>),
    Assistant(ElementRef<'a>),
    None,
}

/// The user marker is checked first; a container carrying both markers is a user turn.
pub fn classify<'a>(container: ElementRef<'a>, markers: &CompiledMarkers) -> Classification<'a> {
    if let Some(region) = container.select(&markers.user).next() {
        return Classification::User(region);
    }
    if let Some(region) = markers
        .assistant
        .as_ref()
        .and_then(|sel| container.select(sel).next())
    {
        return Classification::Assistant(region);
    }
    Classification::None
}
