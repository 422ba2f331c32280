use serde::Serialize;

/// A rendered report: an HTML body that later stages may extend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub html: String,
}

impl ReportDocument {
    pub fn new(html: String) -> Self {
        Self { html }
    }

    /// Append a titled block of free text. The text is escaped and shown with
    /// its line breaks preserved.
    pub fn append_section(&mut self, heading: &str, text: &str) {
        self.html.push_str("\n<br>\n<h3>");
        self.html.push_str(&escape_html(heading));
        self.html.push_str("</h3>\n<p style=\"white-space: pre-wrap;\">");
        self.html.push_str(&escape_html(text));
        self.html.push_str("</p>\n");
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
