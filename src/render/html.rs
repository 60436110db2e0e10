use super::{EMPTY_MESSAGE, Renderer, format_date};
use crate::storage::Problem;

/// Renders problems as the page markup used for HTML export. Every
/// user-controlled value is escaped.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    output: String,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_document(self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Practice problems</title></head>\n<body>\n<div id=\"outputArea\">\n{}</div>\n</body>\n</html>\n",
            self.output
        )
    }
}

impl Renderer for HtmlRenderer {
    fn render(&mut self, problems: &[Problem]) {
        self.output.clear();
        if problems.is_empty() {
            self.output.push_str(&format!("<p>{}</p>\n", EMPTY_MESSAGE));
            return;
        }

        for p in problems {
            let id = escape_html(&p.id);
            self.output.push_str("<div class=\"problem-item\">\n");
            self.output.push_str(&format!("  <p><b>Title:</b> {}</p>\n", escape_html(&p.title)));
            self.output.push_str(&format!("  <p><b>Topic:</b> {}</p>\n", escape_html(&p.topic)));
            self.output.push_str(&format!(
                "  <p><b>Difficulty:</b> {}</p>\n",
                escape_html(&p.difficulty)
            ));
            self.output.push_str(&format!(
                "  <p><b>Date:</b> {}</p>\n",
                escape_html(&format_date(&p.date))
            ));
            self.output.push_str(&format!("  <pre>{}</pre>\n", escape_html(&p.code)));
            self.output.push_str(&format!(
                "  <button class=\"editBtn\" data-id=\"{}\">Edit</button>\n",
                id
            ));
            self.output.push_str(&format!(
                "  <button class=\"deleteBtn\" data-id=\"{}\">Delete</button>\n",
                id
            ));
            self.output.push_str("</div>\n");
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
