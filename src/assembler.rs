use crate::block::Block;
use crate::classifier::{Classification, CompiledMarkers, classify};
use crate::converter::{ExtractionMode, convert};
use crate::page::Page;
use chrono::{DateTime, FixedOffset};
use scraper::Selector;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub blocks: Vec<Block>,
    pub timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub title: String,
    pub exported_at: DateTime<FixedOffset>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssembleOptions {
    pub mode: ExtractionMode,
    /// Stamp each message with the extraction instant.
    pub message_timestamps: bool,
}

/// Walk every container in document order and build the conversation.
///
/// Containers carrying neither marker are skipped; they never fail the run.
pub fn assemble(
    page: &Page,
    markers: &CompiledMarkers,
    options: AssembleOptions,
    now: DateTime<FixedOffset>,
) -> ConversationRecord {
    let mut messages = Vec::new();
    let mut found = 0usize;

    for (index, container) in page.select(&markers.container).enumerate() {
        found += 1;
        let (role, region) = match classify(container, markers) {
            Classification::User(region) => (Role::User, region),
            Classification::Assistant(region) => (Role::Assistant, region),
            Classification::None => {
                debug!(index, "container has no message marker, skipping");
                continue;
            }
        };
        let blocks = convert(region, options.mode);
        debug!(index, ?role, blocks = blocks.len(), "extracted message");
        messages.push(Message {
            role,
            blocks,
            timestamp: options.message_timestamps.then_some(now),
        });
    }

    info!(
        containers = found,
        messages = messages.len(),
        "Found {} message containers, extracted {} messages",
        found,
        messages.len()
    );

    ConversationRecord {
        title: resolve_title(page, markers, now),
        exported_at: now,
        messages,
    }
}

/// Title marker, then `h1`, then anything styled as a title, then `<title>`.
pub fn resolve_title(page: &Page, markers: &CompiledMarkers, now: DateTime<FixedOffset>) -> String {
    let fallbacks = ["h1", r#"[class*="title"]"#]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect::<Vec<_>>();

    page.first_text(&markers.title)
        .or_else(|| fallbacks.iter().find_map(|sel| page.first_text(sel)))
        .or_else(|| page.document_title())
        .unwrap_or_else(|| format!("Conversation - {}", now.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Markers;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-14T09:30:00+00:00").unwrap()
    }

    fn run(html: &str, options: AssembleOptions) -> ConversationRecord {
        let markers = Markers::default().compile().unwrap();
        assemble(&Page::parse(html), &markers, options, now())
    }

    const PAGE: &str = r#"
        <html><head><title>Tab title</title></head><body>
        <div data-testid="chat-title">Planning</div>
        <div data-test-render-count="2"><div data-testid="user-message"><p>Hi</p></div></div>
        <div data-test-render-count="2"><span>toolbar</span></div>
        <div data-test-render-count="2"><div class="standard-markdown"><h2>Plan</h2><p>Step 1</p></div></div>
        <div data-test-render-count="2"><div data-testid="user-message"><p>Thanks</p></div></div>
        </body></html>"#;

    #[test]
    fn messages_follow_document_order() {
        let record = run(PAGE, AssembleOptions::default());
        let roles = record.messages.iter().map(|m| m.role).collect::<Vec<_>>();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(record.title, "Planning");
        assert_eq!(
            record.messages[1].blocks,
            vec![
                Block::heading(2, "Plan"),
                Block::Paragraph {
                    text: "Step 1".into()
                }
            ]
        );
    }

    #[test]
    fn timestamps_only_when_requested() {
        let record = run(PAGE, AssembleOptions::default());
        assert!(record.messages.iter().all(|m| m.timestamp.is_none()));

        let record = run(
            PAGE,
            AssembleOptions {
                message_timestamps: true,
                ..AssembleOptions::default()
            },
        );
        assert!(record.messages.iter().all(|m| m.timestamp == Some(now())));
    }

    #[test]
    fn empty_page_is_an_empty_conversation() {
        let record = run("<html><body></body></html>", AssembleOptions::default());
        assert!(record.messages.is_empty());
        assert_eq!(record.title, "Conversation - 2026-10-14");
    }

    #[test]
    fn title_falls_back_through_chain() {
        let markers = Markers::default().compile().unwrap();
        let cases = [
            ("<h1>Heading</h1><div class=\"page-title\">Styled</div>", "Heading"),
            ("<div class=\"page-title\">Styled</div>", "Styled"),
            ("<head><title>Doc</title></head><h1>  </h1>", "Doc"),
        ];
        for (html, expected) in cases {
            assert_eq!(resolve_title(&Page::parse(html), &markers, now()), expected);
        }
    }
}
