use scraper::{ElementRef, Html, Selector};

/// Read-only snapshot of a saved conversation page.
///
/// Everything downstream queries this value; nothing reaches for a live document.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
        self.html.select(selector)
    }

    /// First element matching `selector` whose trimmed text is non-empty.
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.html
            .select(selector)
            .map(|el| text_content(el).trim().to_string())
            .find(|t| !t.is_empty())
    }

    pub fn document_title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.first_text(&selector)
    }
}

/// Concatenated text of every descendant text node, untrimmed.
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}
