use std::collections::HashSet;

/// Turns a free-form collection name into a SQL-safe table name.
///
/// Spaces and dashes become underscores, every other character outside
/// `[A-Za-z0-9_]` is dropped, and a leading digit gets a `t_` prefix.
/// Applying it twice gives the same result as applying it once.
pub fn table_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('_'),
            c if c.is_ascii_alphanumeric() || c == '_' => Some(c),
            _ => None,
        })
        .collect();

    match cleaned.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("t_{cleaned}"),
        _ => cleaned,
    }
}

/// Table name used for a playlist's tracks.
pub fn playlist_table_name(playlist_name: &str) -> String {
    table_name(&format!("playlist_{playlist_name}"))
}

/// Keeps the first occurrence of every ID, preserving order.
pub fn remove_duplicate_ids(ids: &mut Vec<String>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// Rounds to two decimals, the precision statistics are reported with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
