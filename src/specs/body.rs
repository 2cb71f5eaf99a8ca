// src/specs/body.rs
//! Opening-post heuristics: start time and map. Also the thread id, which
//! comes from the location rather than the page.

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::consts::UNKNOWN_MAP;
use crate::core::html::strip_tag;
use crate::diag::{Extracted, Warning};
use crate::tables::Tables;

static START_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^[\s]*(<(strong|i)>)?(Eventbeginn|Beginn|Eventstart|Treffen im (Teamspeak|TS)|Start|Treffen)",
        r"(</(strong|i)>)?:(</(strong|i)>)?",
        r"(\s|&gt;|-|ab)*(<strong>)?",
        r"(?P<time>[0-9]{2}[\.:]?[0-9]{2})",
        r"[\s]*(Uhr|h)?(</strong>)?(\s|&lt;)*<br[\s]?/>",
    ))
    .expect("valid start time pattern")
});

static MAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)((Map)|(Karte))[\s]?:[\s]?(.+)<").expect("valid map pattern"));

static THREAD_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"id=([\d]+)").expect("valid thread id pattern"));

// Answers like "Map: ja, wird noch bekannt gegeben" are not maps.
const MAP_REJECT: &str = "JA";

/// Start time from the first line announcing it, e.g. `Eventbeginn: 19:30 Uhr<br />`.
pub fn start_time(body: &[String], title: &str) -> Extracted<Option<NaiveTime>> {
    for line in body {
        let line = line.replace("â€", "-");
        let Some(c) = START_TIME.captures(&line) else {
            continue;
        };
        let digits: String = c["time"].chars().filter(|ch| ch.is_ascii_digit()).collect();
        let (h, m) = digits.split_at(2);
        let time = h.parse().ok().zip(m.parse().ok()).and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0));
        return match time {
            Some(t) => Extracted::clean(Some(t)),
            None => Extracted::warned(None, Warning::UnparsedTime(s!(title))),
        };
    }
    Extracted::warned(None, Warning::UnparsedTime(s!(title)))
}

/// Map name, normalized through the alias table; `Unknown` when never announced.
pub fn map(body: &[String], tables: &Tables) -> String {
    let found = body.iter().find_map(|line| {
        let c = MAP.captures(line)?;
        let value = c.get(4)?.as_str();
        (!value.trim().to_uppercase().contains(MAP_REJECT)).then(|| s!(value))
    });
    match found {
        Some(raw) => {
            let raw = strip_tag(&raw, "strong");
            s!(tables.resolve_map(raw.trim()))
        }
        None => s!(UNKNOWN_MAP),
    }
}

pub fn thread_id(url: &str) -> Extracted<Option<u32>> {
    match THREAD_ID.captures(url).and_then(|c| c[1].parse().ok()) {
        Some(id) => Extracted::clean(Some(id)),
        None => Extracted::warned(None, Warning::UnparsedThreadId(s!(url))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| s!(*l)).collect()
    }

    fn tables() -> Tables {
        Tables::embedded().unwrap()
    }

    fn hm(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn start_time_variants() {
        let cases = [
            ("Eventbeginn: 19:30 Uhr<br />", hm(19, 30)),
            ("<strong>Beginn:</strong> 2000h<br />", hm(20, 0)),
            ("  Treffen im TS: ab 19.45<br/>", hm(19, 45)),
            ("<i>Start</i>: &gt; <strong>2015</strong> &lt;<br />", hm(20, 15)),
            ("Eventstart: â€ 18:00 Uhr<br />", hm(18, 0)),
        ];
        for (line, want) in cases {
            let got = start_time(&body(&["Map: Altis<br />", line]), "T");
            assert_eq!(got.value, want, "{line}");
            assert!(got.is_clean());
        }
    }

    #[test]
    fn start_time_must_lead_the_line() {
        let got = start_time(&body(&["Wir treffen uns. Beginn: 19:30<br />"]), "[Co30] X");
        assert_eq!(got.value, None);
        assert_eq!(got.warnings, vec![Warning::UnparsedTime(s!("[Co30] X"))]);
    }

    #[test]
    fn impossible_start_time_is_a_warning() {
        let got = start_time(&body(&["Beginn: 25:00<br />"]), "T");
        assert_eq!(got.value, None);
        assert_eq!(got.warnings.len(), 1);
    }

    #[test]
    fn map_takes_the_first_real_answer() {
        let t = tables();
        let lines = body(&[
            "Mods: ja<br />",
            "Karte: ja, steht noch aus<br />",
            "<strong>Map:</strong> <strong>Stratis</strong><br />",
            "Map: Altis<br />",
        ]);
        assert_eq!(map(&lines, &t), "Stratis");
        assert_eq!(map(&body(&["Kein Hinweis<br />"]), &t), UNKNOWN_MAP);
    }

    #[test]
    fn map_aliases_apply() {
        assert_eq!(map(&body(&["Map: Imrali<br />"]), &tables()), "Imrali Island");
    }

    #[test]
    fn thread_id_from_location() {
        assert_eq!(thread_id("http://www.gruppe-w.de/forum/viewthread.php?thread_id=1234").value, Some(1234));
        let got = thread_id("http://www.gruppe-w.de/forum/");
        assert_eq!(got.value, None);
        assert!(!got.is_clean());
    }
}
