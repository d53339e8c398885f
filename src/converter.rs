use crate::block::Block;
use crate::page::text_content;
use scraper::{ElementRef, Node};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Classify each child of the content region into a block.
    #[default]
    Structured,
    /// The whole region's text as one block.
    Flat,
}

/// The element kinds the converter recognizes. Anything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Paragraph,
    UnorderedList,
    OrderedList,
    Heading(u8),
    Preformatted,
    Blockquote,
    Strong,
    InlineCode,
    Other,
}

impl NodeKind {
    fn of(el: ElementRef<'_>) -> Self {
        match el.value().name() {
            "p" => NodeKind::Paragraph,
            "ul" => NodeKind::UnorderedList,
            "ol" => NodeKind::OrderedList,
            "h1" => NodeKind::Heading(1),
            "h2" => NodeKind::Heading(2),
            "h3" => NodeKind::Heading(3),
            "h4" => NodeKind::Heading(4),
            "h5" => NodeKind::Heading(5),
            "h6" => NodeKind::Heading(6),
            "pre" => NodeKind::Preformatted,
            "blockquote" => NodeKind::Blockquote,
            "strong" | "b" => NodeKind::Strong,
            "code" => NodeKind::InlineCode,
            _ => NodeKind::Other,
        }
    }
}

/// Convert one content region into its block sequence.
pub fn convert(region: ElementRef<'_>, mode: ExtractionMode) -> Vec<Block> {
    match mode {
        ExtractionMode::Structured => convert_children(region),
        ExtractionMode::Flat => {
            let text = text_content(region).trim().to_string();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![Block::PlainText { text }]
            }
        }
    }
}

fn convert_children(region: ElementRef<'_>) -> Vec<Block> {
    let mut blocks = Vec::new();
    // Bold spans, inline code and bare text between block children collect here
    // and become a single paragraph at the next block boundary.
    let mut inline = String::new();

    for child in region.children() {
        match child.value() {
            Node::Text(text) => inline.push_str(text),
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(child) else {
                    continue;
                };
                match NodeKind::of(el) {
                    NodeKind::Strong => push_inline(&mut inline, el, "**"),
                    NodeKind::InlineCode => push_inline(&mut inline, el, "`"),
                    kind => {
                        flush_inline(&mut inline, &mut blocks);
                        if let Some(block) = convert_block(el, kind) {
                            blocks.push(block);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    flush_inline(&mut inline, &mut blocks);
    blocks
}

/// Delimit the span's text, keeping its surrounding whitespace outside the markers.
fn push_inline(inline: &mut String, el: ElementRef<'_>, delimiter: &str) {
    let raw = text_content(el);
    let text = raw.trim();
    if text.is_empty() {
        inline.push_str(&raw);
        return;
    }
    let leading = &raw[..raw.len() - raw.trim_start().len()];
    let trailing = &raw[raw.trim_end().len()..];
    inline.push_str(leading);
    inline.push_str(delimiter);
    inline.push_str(text);
    inline.push_str(delimiter);
    inline.push_str(trailing);
}

fn flush_inline(inline: &mut String, blocks: &mut Vec<Block>) {
    let text = inline.trim();
    if !text.is_empty() {
        blocks.push(Block::Paragraph {
            text: text.to_string(),
        });
    }
    inline.clear();
}

/// `None` for children without text. Code is exempt: its raw text is kept untrimmed.
fn convert_block(el: ElementRef<'_>, kind: NodeKind) -> Option<Block> {
    if kind == NodeKind::Preformatted {
        return Some(code_block(el));
    }

    let text = trimmed_text(el);
    if text.is_empty() {
        return None;
    }

    let block = match kind {
        NodeKind::Paragraph => Block::Paragraph { text },
        NodeKind::UnorderedList | NodeKind::OrderedList => {
            let items = list_items(el);
            if items.is_empty() {
                return None;
            }
            Block::List {
                ordered: kind == NodeKind::OrderedList,
                items,
            }
        }
        NodeKind::Heading(level) => Block::heading(level, text),
        NodeKind::Blockquote => Block::Quote {
            lines: text.split('\n').map(|line| line.trim().to_string()).collect(),
        },
        NodeKind::Preformatted | NodeKind::Strong | NodeKind::InlineCode | NodeKind::Other => {
            Block::PlainText { text }
        }
    };
    Some(block)
}

fn trimmed_text(el: ElementRef<'_>) -> String {
    text_content(el).trim().to_string()
}

/// Direct `li` children only, so numbering follows each list's own items.
fn list_items(list: ElementRef<'_>) -> Vec<String> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(trimmed_text)
        .collect()
}

fn code_block(pre: ElementRef<'_>) -> Block {
    let code = pre
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "code");

    match code {
        Some(code) => Block::Code {
            language: code
                .value()
                .classes()
                .find_map(|class| class.strip_prefix("language-"))
                .unwrap_or_default()
                .to_string(),
            code: text_content(code),
        },
        None => Block::Code {
            language: String::new(),
            code: text_content(pre),
        },
    }
}
