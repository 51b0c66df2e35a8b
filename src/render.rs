//! Plain-text views of AniList media records.
//!
//! Every field is optional. A missing field drops its line or segment, and a
//! section with nothing to show is left out entirely.

use crate::models::{GraphQlResponse, Media, MediaData, MediaTag, PageData, PageInfo};

pub const WRAP_WIDTH: usize = 80;
/// Characters of description kept before the ellipsis is appended.
pub const DESCRIPTION_LIMIT: usize = 300;
pub const ELLIPSIS: &str = "...";
pub const TOP_TAG_COUNT: usize = 3;
const DETAIL_GENRE_COUNT: usize = 5;
const CARD_GENRE_COUNT: usize = 3;
const BANNER_WIDTH: usize = 50;

pub fn format_detail(media: &Media) -> String {
    let mut lines = title_lines(media);

    if let Some(title) = &media.title
        && let Some(english) = &title.english
        && media.headline_title() != Some(english.as_str())
    {
        lines.push(format!("   English: {}", english));
    }

    if let Some(description) = media.description.as_deref().and_then(format_description) {
        lines.push(format!("\n📝 {}", description));
    }

    let mut facts = Vec::new();
    if let Some(episodes) = media.episodes {
        facts.push(format!("Episodes: {}", episodes));
    }
    if let Some(duration) = media.duration {
        facts.push(format!("Duration: {}min", duration));
    }
    if let Some(status) = &media.status {
        facts.push(format!("Status: {}", status));
    }
    if !facts.is_empty() {
        lines.push(format!("\n🔍 {}", facts.join(" | ")));
    }

    let mut dates = Vec::new();
    if let Some(start) = media.start_date.as_ref().and_then(|d| d.display()) {
        dates.push(format!("Start: {}", start));
    }
    if let Some(end) = media.end_date.as_ref().and_then(|d| d.display()) {
        dates.push(format!("End: {}", end));
    }
    if !dates.is_empty() {
        lines.push(format!("📅 {}", dates.join(" | ")));
    }

    let mut season_format = Vec::new();
    if let (Some(season), Some(year)) = (&media.season, media.season_year) {
        season_format.push(format!("{} {}", season, year));
    }
    if let Some(format) = &media.format {
        season_format.push(format.clone());
    }
    if !season_format.is_empty() {
        lines.push(format!("🗓️ {}", season_format.join(" | ")));
    }

    if let Some(genres) = genre_list(media, DETAIL_GENRE_COUNT) {
        lines.push(format!("🏷️ {}", genres));
    }

    let tags = media
        .tags
        .as_deref()
        .map(|tags| top_tags(tags, TOP_TAG_COUNT))
        .unwrap_or_default();
    if !tags.is_empty() {
        lines.push(format!("🔖 {}", tags.join(", ")));
    }

    let mut ratings = Vec::new();
    if let Some(score) = media.average_score {
        ratings.push(format!("Score: {}/100", score));
    }
    if let Some(popularity) = media.popularity {
        ratings.push(format!("Popularity: {}", popularity));
    }
    if !ratings.is_empty() {
        lines.push(format!("⭐ {}", ratings.join(" | ")));
    }

    let studios = media.studio_names();
    if !studios.is_empty() {
        lines.push(format!("🏢 {}", studios.join(", ")));
    }

    lines.join("\n")
}

/// The compact view used for list results.
pub fn format_card(media: &Media) -> String {
    let mut lines = title_lines(media);

    let mut facts = Vec::new();
    if let Some(episodes) = media.episodes {
        facts.push(format!("Ep: {}", episodes));
    }
    if let Some(format) = &media.format {
        facts.push(format.clone());
    }
    if let Some(year) = media.season_year {
        facts.push(year.to_string());
    }
    if let Some(score) = media.average_score {
        facts.push(format!("⭐ {}/100", score));
    }
    if !facts.is_empty() {
        lines.push(format!("🔍 {}", facts.join(" | ")));
    }

    if let Some(genres) = genre_list(media, CARD_GENRE_COUNT) {
        lines.push(format!("🏷️ {}", genres));
    }

    lines.join("\n")
}

fn title_lines(media: &Media) -> Vec<String> {
    let mut lines = Vec::new();
    let headline = media.headline_title();

    match (headline, media.id) {
        (Some(title), Some(id)) => lines.push(format!("📺 {} ({})", title, id)),
        (Some(title), None) => lines.push(format!("📺 {}", title)),
        (None, Some(id)) => lines.push(format!("📺 ({})", id)),
        (None, None) => {}
    }

    if let Some(native) = media.title.as_ref().and_then(|t| t.native.as_deref())
        && headline != Some(native)
    {
        lines.push(format!("   {}", native));
    }

    lines
}

fn genre_list(media: &Media, limit: usize) -> Option<String> {
    let genres = media.genres.as_deref()?;
    if genres.is_empty() {
        return None;
    }
    Some(
        genres
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Names of the `n` highest-ranked tags. Equal ranks keep their original
/// order, and tags without a rank sort last.
pub fn top_tags(tags: &[MediaTag], n: usize) -> Vec<&str> {
    let mut ranked: Vec<&MediaTag> = tags.iter().filter(|t| t.name.is_some()).collect();
    ranked.sort_by(|a, b| b.rank.cmp(&a.rank));
    ranked
        .into_iter()
        .take(n)
        .filter_map(|t| t.name.as_deref())
        .collect()
}

/// Strips inline markup, cuts to [`DESCRIPTION_LIMIT`] characters, then wraps
/// to [`WRAP_WIDTH`]. The result never exceeds `DESCRIPTION_LIMIT + ELLIPSIS.len()`
/// characters.
pub fn format_description(raw: &str) -> Option<String> {
    let text = normalize_markup(raw);
    if text.is_empty() {
        return None;
    }

    let (kept, truncated) = truncate_chars(&text, DESCRIPTION_LIMIT);
    let mut wrapped = wrap_text(kept.trim_end(), WRAP_WIDTH);
    if truncated {
        wrapped.push_str(ELLIPSIS);
    }
    Some(wrapped)
}

/// Replaces `<br>` with a space, drops italic tags and collapses whitespace.
pub fn normalize_markup(raw: &str) -> String {
    let replaced = raw
        .replace("<br />", " ")
        .replace("<br/>", " ")
        .replace("<br>", " ")
        .replace("<i>", "")
        .replace("</i>", "");
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Greedy word wrap. A word wider than `width` gets a line of its own.
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

/// `Found N results. Page x/y.` with whichever parts are known.
pub fn format_page_summary(info: &PageInfo) -> Option<String> {
    let total = info.total?;
    let mut summary = format!("Found {} results.", total);
    if let (Some(current), Some(last)) = (info.current_page, info.last_page) {
        summary.push_str(&format!(" Page {}/{}.", current, last));
    }
    Some(summary)
}

pub fn banner(title: &str) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    format!("\n{}\n{}\n{}", rule, title, rule)
}

/// Detail view of a `Media` lookup, or the first service error.
pub fn render_details(response: &GraphQlResponse<MediaData>) -> String {
    if let Some(error) = response.first_error() {
        return format!("Error: {}", error.message);
    }
    match response.data.as_ref().and_then(|d| d.media.as_ref()) {
        Some(media) => format_detail(media),
        None => "No media found.".to_string(),
    }
}

/// Summary plus one card per result, each under `--- {label} i ---`.
pub fn render_page(response: &GraphQlResponse<PageData>, label: &str) -> String {
    if let Some(error) = response.first_error() {
        return format!("Error: {}", error.message);
    }
    let Some(page) = response.data.as_ref().and_then(|d| d.page.as_ref()) else {
        return "No results found.".to_string();
    };

    let mut out = Vec::new();
    if let Some(summary) = page.page_info.as_ref().and_then(format_page_summary) {
        out.push(summary);
    }
    if page.media.is_empty() {
        out.push("No results found.".to_string());
    }
    for (i, media) in page.media.iter().enumerate() {
        out.push(format!("\n--- {} {} ---", label, i + 1));
        out.push(format_card(media));
    }
    out.join("\n")
}
