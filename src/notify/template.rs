//! Fixed notification template.
//!
//! Renders one petition into the HTML-flavored rich text understood by the
//! delivery channel. User-controlled strings are escaped; long body text is
//! truncated at a word boundary.

use chrono::{DateTime, FixedOffset, Utc};

use crate::models::Petition;
use crate::utils::text::html_escape;

/// Display cap for the body preview, in characters.
pub const BODY_PREVIEW_CAP: usize = 600;

const ELLIPSIS: char = '…';

/// Kyiv standard time. The site publishes Kyiv-local dates, so the
/// "updated at" stamp uses the same fixed offset (DST is not modeled).
const KYIV_OFFSET_SECS: i32 = 2 * 3600;

/// Truncate to at most `cap` characters without splitting a word,
/// appending an ellipsis when anything was cut.
pub fn truncate_at_word(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }

    let head: String = text.chars().take(cap).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(index) => head[..index].trim_end(),
        // A single word longer than the cap cannot be broken cleanly.
        None => head.as_str(),
    };

    let mut out = cut.to_string();
    out.push(ELLIPSIS);
    out
}

/// Timestamp formatted in the fixed display timezone.
pub fn format_updated_at(ts: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(KYIV_OFFSET_SECS) {
        Some(offset) => ts.with_timezone(&offset).format("%d.%m.%Y %H:%M").to_string(),
        None => ts.format("%d.%m.%Y %H:%M").to_string(),
    }
}

/// Render the notification body for one petition.
pub fn render(petition: &Petition) -> String {
    let mut message = String::new();

    message.push_str(&format!("📄 {}\n\n", html_escape(&petition.tag)));
    message.push_str(&format!(
        "<b><a href=\"{}\">{}</a></b>\n\n",
        html_escape(&petition.link),
        html_escape(&petition.title)
    ));

    if let Some(body) = petition.body_text.as_deref().filter(|b| !b.is_empty()) {
        message.push_str(&format!(
            "<i>{}</i>\n\n",
            html_escape(&truncate_at_word(body, BODY_PREVIEW_CAP))
        ));
    }

    message.push_str(&format!(
        "Номер петиції: <b>{}</b>\n",
        html_escape(&petition.number)
    ));
    message.push_str(&format!("Статус: <b>{}</b>\n", html_escape(&petition.status)));
    message.push_str(&format!(
        "Кількість голосів: <b>{}</b>\n",
        html_escape(&petition.vote_count)
    ));

    if let Some(creator) = petition.creator.as_deref().filter(|c| !c.is_empty()) {
        message.push_str(&format!("Ініціатор: <b>{}</b>\n", html_escape(creator)));
    }

    message.push_str(&format!(
        "Дата оприлюднення: {}\n",
        html_escape(&petition.published_at)
    ));

    if let Some(countdown) = petition.countdown.as_deref().filter(|c| !c.is_empty()) {
        message.push_str(&format!("{}\n", html_escape(countdown)));
    }
    if let Some(answered_at) = petition.answered_at.as_deref().filter(|a| !a.is_empty()) {
        message.push_str(&format!("Дата відповіді: {}\n", html_escape(answered_at)));
    }

    message.push_str(&format!(
        "\n<i>Дата оновлення: {}</i>",
        format_updated_at(petition.updated_at)
    ));

    message
}
