//! Terminal table for the scan history.
//!
//! One row per code, most recent first:
//! - short id (enough to pass back to show/open/delete/export)
//! - scan time in the local offset
//! - content, truncated to fit a line

use chrono::FixedOffset;

use super::format_timestamp;
use crate::store::ScannedCode;

const ID_WIDTH: usize = 8;
const CONTENT_WIDTH: usize = 60;

pub fn render<'a>(codes: impl IntoIterator<Item = &'a ScannedCode>, offset: FixedOffset) -> String {
    let mut rows = codes.into_iter().peekable();
    if rows.peek().is_none() {
        return String::from("No codes scanned yet.\n");
    }

    let mut output = format!("{:<ID_WIDTH$}  {:<19}  {}\n", "ID", "Scanned", "Content");
    output.push_str(&"-".repeat(ID_WIDTH + 2 + 19 + 2 + CONTENT_WIDTH));
    output.push('\n');

    for code in rows {
        output.push_str(&format!(
            "{:<ID_WIDTH$}  {:<19}  {}\n",
            code.short_id(),
            format_timestamp(code.timestamp, offset),
            truncate(&single_line(&code.content), CONTENT_WIDTH)
        ));
    }

    output
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shortens `s` to `max_len` characters, keeping both ends.
fn truncate(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        return s.to_string();
    }

    let keep = max_len - 3;
    let head: String = s.chars().take(keep - keep / 2).collect();
    let tail: String = s.chars().skip(count - keep / 2).collect();
    format!("{head}...{tail}")
}
