use super::patterns::{LIST_ITEM_MARKER, RECOMMENDATIONS_END, RECOMMENDATIONS_HEADER};

/// Numbered items from the first recommendations section.
///
/// An item starts at a `1.` or `1)` marker followed by whitespace, on its own
/// line or inline, and runs to the next marker or a blank line. Wrapped
/// continuation lines are joined with a single space.
pub(crate) fn recommendations(text: &str) -> Vec<String> {
    let Some(section) = recommendations_section(text) else {
        return Vec::new();
    };
    let Some(marker) = LIST_ITEM_MARKER.as_ref() else {
        return Vec::new();
    };

    let markers: Vec<_> = marker.find_iter(section).collect();
    markers
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let end = markers.get(i + 1).map_or(section.len(), |next| next.start());
            clean_item(&section[m.end()..end])
        })
        .collect()
}

fn clean_item(raw: &str) -> Option<String> {
    let paragraph = raw
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");
    let item = paragraph.trim_matches(|c: char| c.is_whitespace() || c == '*');
    if item.is_empty() {
        None
    } else {
        Some(item.to_string())
    }
}

fn recommendations_section(text: &str) -> Option<&str> {
    let start = RECOMMENDATIONS_HEADER.as_ref()?.find(text)?.end();
    let end = RECOMMENDATIONS_END
        .as_ref()
        .and_then(|re| re.find_at(text, start))
        .map_or(text.len(), |m| m.start());
    Some(&text[start..end])
}
