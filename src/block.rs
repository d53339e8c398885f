use serde::Deserialize;

/// Marker used for unordered list items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    /// `• item`
    #[default]
    Bullet,
    /// `- item`
    Dash,
}

impl ListStyle {
    fn marker(self) -> &'static str {
        match self {
            ListStyle::Bullet => "•",
            ListStyle::Dash => "-",
        }
    }
}

/// One semantic unit of rendered message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph { text: String },
    Heading { level: u8, text: String },
    List { ordered: bool, items: Vec<String> },
    Code { language: String, code: String },
    Quote { lines: Vec<String> },
    /// Text of a node kind the converter has no dedicated arm for.
    PlainText { text: String },
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    pub fn to_markdown(&self, style: ListStyle) -> String {
        match self {
            Block::Paragraph { text } | Block::PlainText { text } => text.clone(),
            Block::Heading { level, text } => {
                format!("{} {}", "#".repeat(usize::from((*level).clamp(1, 6))), text)
            }
            Block::List { ordered, items } => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    if *ordered {
                        format!("{}. {}", i + 1, item)
                    } else {
                        format!("{} {}", style.marker(), item)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Code { language, code } => format!("```{}\n{}\n```", language, code),
            Block::Quote { lines } => lines
                .iter()
                .map(|line| format!("> {}", line))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Flatten a block sequence into one Markdown string, blocks separated by a blank line.
pub fn flatten(blocks: &[Block], style: ListStyle) -> String {
    blocks
        .iter()
        .map(|b| b.to_markdown(style))
        .collect::<Vec<_>>()
        .join("\n\n")
}
