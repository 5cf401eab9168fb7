//! Text rendering utilities for human-friendly error messages.
//!
//! Token names are free-form labels chosen by the application, so the
//! helpers here work on plain strings and know nothing about the container.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use sijill_support::rendering::render_chain;
///
/// let chain = vec!["Processor", "Logger", "Sink", "Processor"];
/// assert_eq!(render_chain(&chain), "Processor → Logger → Sink → Processor");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use sijill_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("my_app::storage::FileStorage"), "FileStorage");
/// assert_eq!(shorten_type_name("dyn my_app::traits::Logger"), "dyn Logger");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut rest = full_name;

    // Delimiters are ASCII, so `pos + 1` stays on a char boundary.
    while let Some(pos) = rest.find(is_type_delimiter) {
        result.push_str(last_path_segment(&rest[..pos]));
        result.push_str(&rest[pos..pos + 1]);
        rest = &rest[pos + 1..];
    }

    result.push_str(last_path_segment(rest));
    result
}

fn is_type_delimiter(ch: char) -> bool {
    matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '&' | '[' | ']' | ';')
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Suggests registered names that look like `requested`.
///
/// Matching is case-insensitive. Equal names rank first (a different token
/// may carry the same label), then substring hits, then names sharing a
/// prefix of at least three characters, then names of similar length with
/// most characters in the same positions (typos).
///
/// ```
/// use sijill_support::rendering::suggest_similar;
///
/// let found = suggest_similar("Storge", &["Storage", "Logger"], 3);
/// assert_eq!(found, vec!["Storage".to_string()]);
/// ```
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let wanted = requested.to_lowercase();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter_map(|&name| {
            let candidate = name.to_lowercase();

            if candidate == wanted {
                return Some((name, 200));
            }

            if candidate.contains(&wanted) || wanted.contains(&candidate) {
                return Some((name, 100));
            }

            let prefix = candidate
                .chars()
                .zip(wanted.chars())
                .take_while(|(a, b)| a == b)
                .count();
            if prefix >= 3 {
                return Some((name, 50 + prefix));
            }

            if is_close(&candidate, &wanted) {
                return Some((name, 40));
            }

            None
        })
        .collect();

    // Stable sort keeps registration order among equal scores.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Lengths within 3 and at least 60% of positions equal.
fn is_close(a: &str, b: &str) -> bool {
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    if a_len.abs_diff(b_len) > 3 {
        return false;
    }

    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return true;
    }

    let common = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    common * 100 / max_len >= 60
}
