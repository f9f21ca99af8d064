//! Canonical column names.
//!
//! Raw headers such as `" Retention Rate (%) "` become `Retention_rate`. The
//! result only ever holds ASCII letters, digits and single inner underscores.

/// Rewrite one raw header into its canonical column name.
pub fn normalize_header(raw: &str) -> String {
    let capitalized = capitalize(raw.trim());

    let mut out = String::with_capacity(capitalized.len());
    for c in capitalized.chars() {
        let c = if c == ' ' { '_' } else { c };
        if matches!(c, '(' | ')' | '%') {
            continue;
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.strip_prefix('_').unwrap_or(&out);
    let trimmed = trimmed.strip_suffix('_').unwrap_or(trimmed);

    // Capitalize again: the leading character may have been stripped, and an
    // uppercased first letter may have expanded (`ß` → `SS`, title case `Ss`).
    ascii_capitalize(trimmed)
}

/// Normalize a full header row. Repeated raw headers get a `.N` suffix first,
/// so `a,a` ends up as `A`, `A1`.
pub fn normalize_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    raw.into_iter()
        .map(|header| {
            let count = seen.entry(header.to_string()).or_insert(0);
            let deduped = if *count == 0 {
                header.to_string()
            } else {
                format!("{header}.{count}")
            };
            *count += 1;
            normalize_header(&deduped)
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn ascii_capitalize(s: &str) -> String {
    let mut out = s.to_ascii_lowercase();
    if let Some(first) = out.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    out
}
