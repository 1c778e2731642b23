use std::fmt::Write as _;

use crate::domain::donation::RedactedDonation;

pub const DEFAULT_NOTIFICATION_TITLE: &str = "☕ *New Ko-fi donation*";
pub const DEFAULT_NOTIFICATION_FOOTER: &str = "Thanks for the support! ❤️";

/// Fixed lines wrapped around every donation summary. Both are sent as-is,
/// so they may carry Telegram Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub title: String,
    pub footer: String,
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            title: DEFAULT_NOTIFICATION_TITLE.to_owned(),
            footer: DEFAULT_NOTIFICATION_FOOTER.to_owned(),
        }
    }
}

#[must_use]
pub fn format_notification(donation: &RedactedDonation, template: &NotificationTemplate) -> String {
    let mut text = format!("{}\n\n", template.title);
    // Writing into a String cannot fail.
    let _ = writeln!(text, "*From*: {}", escape_markdown(donation.from_name()));
    let _ = writeln!(text, "*Type*: {}", escape_markdown(donation.kind()));
    let _ = writeln!(
        text,
        "*Amount*: {} {}",
        escape_markdown(&donation.amount()),
        escape_markdown(donation.currency())
    );
    if let Some(message) = donation.message() {
        let _ = writeln!(text, "*Message*: {}", escape_markdown(message));
    }
    text.push('\n');
    text.push_str(&template.footer);
    text
}

/// Escapes the entity markers of Telegram's legacy Markdown parse mode.
#[must_use]
pub fn escape_markdown(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
