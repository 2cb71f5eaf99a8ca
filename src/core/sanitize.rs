// src/core/sanitize.rs

// Mis-decoded sequences the board emits, applied in order.
const TITLE_FIXES: [(&str, &str); 7] = [
    ("Ă¤", "ä"),
    ("ĂĽ", "ü"),
    ("&#39;", "'"),
    ("Ă¶", "ö"),
    ("&quot;", "\""),
    ("Ăź", "ß"),
    ("Ăś", "Ü"),
];

const BODY_FIXES: [(&str, &str); 4] = [
    ("â€“", "-"),
    ("Ă„", "Ä"),
    ("Ă§", "c"),
    ("Ă˘", "a"),
];

fn apply(mut s: String, fixes: &[(&str, &str)]) -> String {
    for (from, to) in fixes {
        if s.contains(from) {
            s = s.replace(from, to);
        }
    }
    s
}

pub fn fix_title_chars(s: &str) -> String {
    apply(s!(s), &TITLE_FIXES)
}

pub fn fix_body_chars(s: &str) -> String {
    apply(fix_title_chars(s), &BODY_FIXES)
}

/// Roster cell cleanup: trim, drop a leading dash and, when one was dropped and
/// the text also ends in a dash, the last two characters.
pub fn trim_dashes(s: &str) -> String {
    let s = s.trim();
    let Some(rest) = s.strip_prefix('-') else {
        return s!(s);
    };
    let rest = if rest.ends_with('-') {
        let mut chars = rest.chars();
        chars.next_back();
        chars.next_back();
        chars.as_str()
    } else {
        rest
    };
    s!(rest.trim())
}
