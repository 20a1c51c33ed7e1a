use unicode_normalization::UnicodeNormalization;

#[must_use]
pub fn fold_text(input: &str) -> String {
    // Case-insensitive matching policy: NFKC + Unicode lowercase.
    input.nfkc().collect::<String>().to_lowercase()
}

/// Text form of a real number for substring matching. Both catalogs go
/// through this, so `2.0` reads as `2` everywhere.
#[must_use]
pub fn real_text(value: f64) -> String {
    value.to_string()
}

/// Splits a comma-separated parameter value into trimmed, non-empty,
/// first-occurrence-deduplicated entries.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let item = part.trim();
        if item.is_empty() || out.iter().any(|x| x == item) {
            continue;
        }
        out.push(item.to_string());
    }
    out
}

#[must_use]
pub fn join_list(items: &[String]) -> String {
    items.join(",")
}

#[must_use]
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        match c {
            '!' | '%' | '_' => {
                out.push('!');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
