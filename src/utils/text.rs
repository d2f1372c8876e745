//! Plain-text rendering helpers for chat replies.

/// Discord rejects messages longer than this.
#[cfg_attr(not(feature = "discord"), allow(dead_code))]
pub const MESSAGE_LIMIT: usize = 2000;

/// Wraps `text` in a fenced code block, optionally tagged with a language
/// for syntax highlighting.
pub fn codeblock_wrap(text: &str, lang: &str) -> String {
    format!("```{}\n{}\n```", lang, text)
}

/// Pads a table of cells into fixed-width rows.
///
/// Every column except the last is padded to its widest cell plus `gap`
/// spaces, so rows line up on column boundaries. Each row starts with
/// `row_prefix`.
pub fn generate_text_grid<S: AsRef<str>>(data: &[Vec<S>], gap: usize, row_prefix: &str) -> Vec<String> {
    let column_count = data.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; column_count];

    for row in data {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.as_ref().chars().count());
        }
    }

    data.iter()
        .map(|row| {
            let mut line = String::from(row_prefix);
            for (col, cell) in row.iter().enumerate() {
                let cell = cell.as_ref();
                if col + 1 < column_count {
                    line.push_str(&format!("{:<width$}", cell, width = widths[col] + gap));
                } else {
                    line.push_str(cell);
                }
            }
            line
        })
        .collect()
}

/// Shortens `text` to at most `max_len` bytes, breaking at a newline when
/// one is available and keeping an open code fence closed.
#[cfg_attr(not(feature = "discord"), allow(dead_code))]
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    const MARKER: &str = "\n... (truncated)";
    let mut cut = max_len.saturating_sub(MARKER.len() + 4);
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let head = &text[..cut];
    let head = match head.rfind('\n') {
        Some(pos) => &head[..pos],
        None => head,
    };

    if head.matches("```").count() % 2 == 1 {
        format!("{}{}\n```", head, MARKER)
    } else {
        format!("{}{}", head, MARKER)
    }
}
