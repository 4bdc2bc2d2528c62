use pulldown_cmark::{html, Event, Options, Parser};

/// Converts markdown documents to HTML fragments.
///
/// Raw HTML found in a document is escaped and shown as text unless
/// [`with_raw_html`](Self::with_raw_html) enables pass-through.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRenderer {
    allow_raw_html: bool,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_raw_html(mut self, enabled: bool) -> Self {
        self.allow_raw_html = enabled;
        self
    }

    /// Tables, footnotes, strikethrough, task lists, heading attributes and
    /// definition lists. Fenced code blocks are always on.
    pub fn parser_options(&self) -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
    }

    pub fn render(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, self.parser_options());
        let mut out = String::with_capacity(text.len() * 3 / 2);
        if self.allow_raw_html {
            html::push_html(&mut out, parser);
        } else {
            html::push_html(&mut out, parser.map(escape_raw_html));
        }
        out
    }
}

fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}
