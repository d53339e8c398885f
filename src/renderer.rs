use crate::assembler::{ConversationRecord, Message, Role};
use crate::block::{ListStyle, flatten};
use crate::error::Result;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US", alias = "en")]
    EnUs,
    #[serde(rename = "pt-BR", alias = "pt")]
    PtBr,
}

impl Locale {
    fn timestamp_format(self) -> &'static str {
        match self {
            Locale::EnUs => "%-m/%-d/%Y, %-I:%M:%S %p",
            Locale::PtBr => "%d/%m/%Y, %H:%M:%S",
        }
    }

    fn exported_at(self) -> &'static str {
        match self {
            Locale::EnUs => "Exported at",
            Locale::PtBr => "Exportado em",
        }
    }

    fn user_label(self) -> &'static str {
        match self {
            Locale::EnUs => "**You**",
            Locale::PtBr => "**Você**",
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en_us" => Ok(Locale::EnUs),
            "pt" | "pt-br" | "pt_br" => Ok(Locale::PtBr),
            other => Err(format!("unknown locale {:?} (expected en-US or pt-BR)", other)),
        }
    }
}

/// Presentation settings for a renderer. The export instant comes from the record.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    pub locale: Locale,
    pub list_style: ListStyle,
    pub user_label: Option<String>,
    pub assistant_label: Option<String>,
}

impl RenderContext {
    fn role_label(&self, role: Role) -> &str {
        match role {
            Role::User => self
                .user_label
                .as_deref()
                .unwrap_or_else(|| self.locale.user_label()),
            Role::Assistant => self.assistant_label.as_deref().unwrap_or("**Claude**"),
        }
    }

    fn content(&self, message: &Message) -> String {
        flatten(&message.blocks, self.list_style)
    }
}

fn iso(ts: &DateTime<FixedOffset>) -> String {
    ts.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    title: &'a str,
    export_date: String,
    message_count: usize,
    messages: Vec<JsonMessage>,
}

#[derive(Serialize)]
struct JsonMessage {
    role: Role,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

pub fn render_json(record: &ConversationRecord, ctx: &RenderContext) -> Result<String> {
    let export = JsonExport {
        title: &record.title,
        export_date: iso(&record.exported_at),
        message_count: record.messages.len(),
        messages: record
            .messages
            .iter()
            .map(|m| JsonMessage {
                role: m.role,
                content: ctx.content(m),
                timestamp: m.timestamp.as_ref().map(iso),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

pub fn render_markdown(record: &ConversationRecord, ctx: &RenderContext) -> String {
    let mut md = format!(
        "# {}\n\n*{}: {}*\n\n---\n\n",
        record.title,
        ctx.locale.exported_at(),
        record.exported_at.format(ctx.locale.timestamp_format())
    );

    let sections = record
        .messages
        .iter()
        .map(|m| format!("### {}\n\n{}\n\n", ctx.role_label(m.role), ctx.content(m)))
        .collect::<Vec<_>>();
    md.push_str(&sections.join("---\n\n"));
    md
}

const PREVIEW_CHARS: usize = 100;
pub const DEFAULT_PREVIEW_MESSAGES: usize = 3;

/// Short human summary of the first `n` messages.
pub fn preview(record: &ConversationRecord, n: usize, style: ListStyle) -> String {
    let mut out = String::from("=== Conversation preview ===\n\n");
    out.push_str(&format!("Title: {}\n", record.title));
    out.push_str(&format!("Messages: {}\n\n", record.messages.len()));

    for msg in record.messages.iter().take(n) {
        let role = match msg.role {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        };
        let content = flatten(&msg.blocks, style);
        let head = content.chars().take(PREVIEW_CHARS).collect::<String>();
        out.push_str(&format!("{}: {}...\n", role, head));
    }

    out.push_str("\n=== End of preview ===\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-14T09:05:07-03:00").unwrap()
    }

    fn record() -> ConversationRecord {
        ConversationRecord {
            title: "Planning".into(),
            exported_at: now(),
            messages: vec![
                Message {
                    role: Role::User,
                    blocks: vec![Block::Paragraph { text: "Hi".into() }],
                    timestamp: None,
                },
                Message {
                    role: Role::Assistant,
                    blocks: vec![
                        Block::heading(2, "Plan"),
                        Block::Paragraph {
                            text: "Step 1".into(),
                        },
                    ],
                    timestamp: None,
                },
            ],
        }
    }

    #[test]
    fn json_has_stable_key_order_and_flat_content() {
        let json = render_json(&record(), &RenderContext::default()).unwrap();
        let expected = r###"{
  "title": "Planning",
  "exportDate": "2026-10-14T12:05:07.000Z",
  "messageCount": 2,
  "messages": [
    {
      "role": "user",
      "content": "Hi"
    },
    {
      "role": "assistant",
      "content": "## Plan\n\nStep 1"
    }
  ]
}"###;
        assert_eq!(json, expected);
    }

    #[test]
    fn json_includes_message_timestamp_when_present() {
        let mut rec = record();
        rec.messages[0].timestamp = Some(now());
        let json = render_json(&rec, &RenderContext::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["messages"][0]["timestamp"], "2026-10-14T12:05:07.000Z");
        assert!(value["messages"][1].get("timestamp").is_none());
    }

    #[test]
    fn markdown_layout() {
        let md = render_markdown(&record(), &RenderContext::default());
        let expected = "# Planning\n\n\
                        *Exported at: 10/14/2026, 9:05:07 AM*\n\n\
                        ---\n\n\
                        ### **You**\n\n\
                        Hi\n\n\
                        ---\n\n\
                        ### **Claude**\n\n\
                        ## Plan\n\nStep 1\n\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn markdown_is_deterministic() {
        let ctx = RenderContext::default();
        assert_eq!(render_markdown(&record(), &ctx), render_markdown(&record(), &ctx));
    }

    #[test]
    fn pt_br_locale_and_custom_labels() {
        let ctx = RenderContext {
            locale: Locale::PtBr,
            assistant_label: Some("**🤖 Claude**".into()),
            ..RenderContext::default()
        };
        let md = render_markdown(&record(), &ctx);
        assert!(md.contains("*Exportado em: 14/10/2026, 09:05:07*"));
        assert!(md.contains("### **Você**"));
        assert!(md.contains("### **🤖 Claude**"));
    }

    #[test]
    fn empty_record_renders_header_only() {
        let rec = ConversationRecord {
            messages: vec![],
            ..record()
        };
        let md = render_markdown(&rec, &RenderContext::default());
        assert!(md.ends_with("---\n\n"));
        assert!(!md.contains("###"));
        let json = render_json(&rec, &RenderContext::default()).unwrap();
        assert!(json.contains("\"messageCount\": 0"));
        assert!(json.contains("\"messages\": []"));
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let mut rec = record();
        rec.messages[0].blocks = vec![Block::Paragraph {
            text: "é".repeat(150),
        }];
        let out = preview(&rec, 1, ListStyle::Bullet);
        assert!(out.contains(&format!("USER: {}...", "é".repeat(100))));
        assert!(!out.contains("ASSISTANT"));
        assert!(out.contains("Messages: 2"));
    }

    #[test]
    fn locale_parses_loosely() {
        assert_eq!("pt-BR".parse::<Locale>(), Ok(Locale::PtBr));
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::EnUs));
        assert!("fr".parse::<Locale>().is_err());
    }
}
