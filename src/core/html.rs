// src/core/html.rs
//! Line-level slicing for the forum markup. The board's templates emit one
//! field per line, so everything here works on a single `&str` line.

/// Text between the first `open` and the first `close` after it.
pub fn slice_between<'a>(s: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = s.find(open)? + open.len();
    let len = s[start..].find(close)?;
    Some(&s[start..start + len])
}

/// Text inside the first pair of `quote` characters after `marker`.
pub fn quoted_after<'a>(s: &'a str, marker: &str, quote: char) -> Option<&'a str> {
    let from = s.find(marker)?;
    let open = s[from..].find(quote)? + from + quote.len_utf8();
    let len = s[open..].find(quote)?;
    Some(&s[open..open + len])
}

/// Remove every `<tag>` and `</tag>` occurrence, leaving other markup alone.
pub fn strip_tag(s: &str, tag: &str) -> String {
    s.replace(&join!("<", tag, ">"), "").replace(&join!("</", tag, ">"), "")
}

/// Index of the first line at or after `from` that contains `needle`.
pub fn find_line(lines: &[String], from: usize, needle: &str) -> Option<usize> {
    lines.iter().skip(from).position(|l| l.contains(needle)).map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_title_between_strong_tags() {
        let line = r#"<td class='tbl2 forum_thread_title'><!--forum_thread_title--><strong>[Co30] Operation Kaputt</strong></td>"#;
        assert_eq!(slice_between(line, "<strong>", "</strong>"), Some("[Co30] Operation Kaputt"));
        assert_eq!(slice_between(line, "<em>", "</em>"), None);
    }

    #[test]
    fn quoted_after_marker_takes_first_pair() {
        let line = r#"<a href='viewthread.php?thread_id=1234' title='x'>Title</a>"#;
        assert_eq!(quoted_after(line, "<a href=", '\''), Some("viewthread.php?thread_id=1234"));
    }

    #[test]
    fn strip_tag_keeps_other_markup() {
        assert_eq!(strip_tag("<strong>Altis</strong> <br />", "strong"), "Altis <br />");
    }

    #[test]
    fn find_line_is_offset_aware() {
        let lines: Vec<String> = ["a", "mark", "b", "mark"].iter().map(|s| s!(*s)).collect();
        assert_eq!(find_line(&lines, 0, "mark"), Some(1));
        assert_eq!(find_line(&lines, 2, "mark"), Some(3));
        assert_eq!(find_line(&lines, 4, "mark"), None);
    }
}
