// src/specs/thread.rs
//! Structural anchors of a thread page.

use thiserror::Error;

use crate::config::consts::*;
use crate::core::html::{find_line, slice_between};
use crate::core::sanitize::fix_title_chars;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThreadError {
    #[error("no title line")]
    MissingTitle,
    #[error("no creator on line {0}")]
    MissingCreator(usize),
    #[error("no opening post id on line {0}")]
    MissingPostId(usize),
    #[error("bad opening post id '{0}'")]
    BadPostId(String),
    #[error("first post never ends")]
    MissingBodyEnd,
    #[error("bad slot number '{0}'")]
    BadSlotNumber(String),
}

/// Where the first post sits and what the fixed template lines say.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadAnchors {
    pub title_idx: usize,
    /// Title with mis-decoded characters repaired.
    pub title: String,
    pub creator_idx: usize,
    pub creator: String,
    pub post_id: u32,
    /// Line holding the end-of-post marker. The body is `creator_idx + 1 ..= body_end`.
    pub body_end: usize,
}

impl ThreadAnchors {
    /// The first post's body lines, end marker line included.
    pub fn body<'a>(&self, lines: &'a [String]) -> &'a [String] {
        &lines[self.creator_idx + 1..=self.body_end]
    }

    /// The "posted at" line carrying the year of the opening post.
    pub fn posted_at<'a>(&self, lines: &'a [String]) -> Option<&'a str> {
        lines.get(self.title_idx + POSTED_AT_OFFSET).map(String::as_str)
    }
}

pub fn locate(lines: &[String]) -> Result<ThreadAnchors, ThreadError> {
    let title_idx = find_line(lines, 0, TITLE_MARKER).ok_or(ThreadError::MissingTitle)?;
    let title = slice_between(&lines[title_idx], "<strong>", "</strong>").ok_or(ThreadError::MissingTitle)?;
    let title = fix_title_chars(title);

    let creator_idx = title_idx + CREATOR_OFFSET;
    let creator = lines
        .get(creator_idx)
        .and_then(|l| slice_between(l, CREATOR_MARKER, "</td>"))
        .ok_or(ThreadError::MissingCreator(creator_idx))?;
    let creator = if creator.contains(ANONYMOUS_USER) { s!(UNKNOWN_PLAYER) } else { s!(creator) };

    let post_idx = creator_idx + POST_OFFSET;
    let raw_post = lines
        .get(post_idx)
        .and_then(|l| slice_between(l, POST_MARKER, POST_END))
        .ok_or(ThreadError::MissingPostId(post_idx))?;
    let post_id = raw_post.parse().map_err(|_| ThreadError::BadPostId(s!(raw_post)))?;

    let body_end = find_line(lines, creator_idx + 1, BODY_END).ok_or(ThreadError::MissingBodyEnd)?;

    Ok(ThreadAnchors { title_idx, title, creator_idx, creator, post_id, body_end })
}


#[cfg(test)]
mod tests {
    use super::fixtures::page;
    use super::*;

    #[test]
    fn anchors_follow_the_template_offsets() {
        let lines = page("[Co30] Operation Kaputt", "Zabuza", "Map: Altis<br />");
        let a = locate(&lines).unwrap();
        assert_eq!(a.title_idx, 4);
        assert_eq!(a.title, "[Co30] Operation Kaputt");
        assert_eq!(a.creator, "Zabuza");
        assert_eq!(a.post_id, 48213);
        assert!(lines[a.body_end].contains(BODY_END));
        assert_eq!(a.posted_at(&lines), Some("Geschrieben am 12.09.2014 19:22</span>"));
    }

    #[test]
    fn body_ends_at_the_first_marker_after_the_creator() {
        let lines = page("[Co30] X", "Zabuza", "Map: Altis<br />");
        let a = locate(&lines).unwrap();
        let body = a.body(&lines);
        assert!(body.last().unwrap().contains(BODY_END));
        assert!(body.iter().any(|l| l == "Map: Altis<br />"));
        assert_eq!(body.iter().filter(|l| l.contains(BODY_END)).count(), 1);
        assert!(lines[a.body_end + 1..].iter().all(|l| !l.contains("Map:")));
    }

    #[test]
    fn anonymous_creator_is_unknown() {
        let lines = page("[Co30] X", "Anonymer Benutzer", "");
        assert_eq!(locate(&lines).unwrap().creator, UNKNOWN_PLAYER);
    }

    #[test]
    fn title_characters_are_repaired() {
        let lines = page("[Co30] HĂ¤userkampf", "Zabuza", "");
        assert_eq!(locate(&lines).unwrap().title, "[Co30] Häuserkampf");
    }

    #[test]
    fn structural_misses_are_errors() {
        let lines: Vec<String> = vec![s!("<html>"), s!("</html>")];
        assert_eq!(locate(&lines), Err(ThreadError::MissingTitle));

        let lines: Vec<String> = page("[Co30] X", "Zabuza", "")
            .into_iter()
            .map(|l| l.replace(">#1</a>", "></a>"))
            .collect();
        assert_eq!(locate(&lines), Err(ThreadError::MissingPostId(12)));

        let lines: Vec<String> = page("[Co30] X", "Zabuza", "")
            .into_iter()
            .map(|l| l.replace("id='post_48213'", "id='post_x'"))
            .collect();
        assert_eq!(locate(&lines), Err(ThreadError::BadPostId(s!("x"))));
    }
}
