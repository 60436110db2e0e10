pub mod html;
pub mod list_view;

pub use html::HtmlRenderer;
pub use list_view::{CardAction, ListView};

use crate::service::problem_service::parse_date;
use crate::storage::Problem;

/// Shown instead of cards when there is nothing to display.
pub const EMPTY_MESSAGE: &str = "No problems found!";

/// Replaces whatever is currently displayed with `problems`, in order.
pub trait Renderer {
    fn render(&mut self, problems: &[Problem]);
}

/// Human-readable local time; anything unparseable is shown as stored.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}

/// Terminal-safe single line: every control character (including newlines
/// and escape sequences) becomes U+FFFD.
pub fn neutralize_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect()
}

/// Terminal-safe block: keeps line structure, expands tabs, neutralizes the rest.
pub fn neutralize_block(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            neutralize_line(&line.replace('\t', "    "))
        })
        .collect()
}
