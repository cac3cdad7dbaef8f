//! Cue normalization shared by all strategies.

/// Join caption cues into sentence-like prose.
///
/// Each cue is trimmed and has internal whitespace collapsed; blank cues are dropped;
/// a `.` is appended unless the cue already ends in `.`, `!` or `?`. Cues are joined
/// with a single space.
pub fn normalize_cues<I, S>(cues: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cues.into_iter()
        .filter_map(|cue| {
            let cue = cue.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
            if cue.is_empty() {
                return None;
            }
            if cue.ends_with(['.', '!', '?']) {
                Some(cue)
            } else {
                Some(format!("{}.", cue))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode the HTML entities that show up in caption payloads.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
