// src/specs/title.rs
//! Title heuristics: name, size, type and date.
//!
//! Every field first consults the literal per-title overrides, then walks its
//! ordered rule list (first match wins), then falls back to a sentinel plus a
//! warning.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::consts::{DATE_FMT, EARLIEST_YEAR};
use crate::diag::{Extracted, Warning};
use crate::model::EventType;
use crate::tables::TitleOverrides;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).expect("valid title pattern")).collect()
}

/* ---------------- Name ---------------- */

// Name characters.
const N: &str = r"[A-Za-züäöÜÄÖ\s\-',\.!:ß]";

static NAME_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let rules = [
        format!(r"[A-Za-züäöÜÄÖ\s\+ß]+[\d]{{1,2}}[\s]+[-]?[\s]{{0,2}}({N}+)$"),
        format!(r#"["']({N}+)["']"#),
        format!(r"[A-Za-züäöÜÄÖ\s\+ß]+[\d]{{1,2}}[\s]+[-]?[\s]{{0,2}}({N}+)[\d]{{0,2}}[vV][\.]?[\d]{{1,2}}$"),
        format!(r"- ({N}+)[\s]?[\[,]"),
        format!(r"[A-Za-züäöÜÄÖ\s\+]+[\d]{{1,2}}[\s]+[-]?[\s]{{0,2}}({N}+)[\d]\.[\d]$"),
        format!(r"[A-Za-züäöÜÄÖ\s\+]+[\d]{{1,2}}[\s]+[-]?[\s]{{0,2}}({N}+)\("),
        format!(r"- ({N}+)$"),
        format!(r"^({N}+)$"),
        format!(r"[A-Za-züäöÜÄÖ\s\+\-]+[\d]{{1,2}}[\s]+[-]?[\s]{{0,2}}({N}+)\["),
        format!(r"\] ({N}+)$"),
        format!(r"- ({N}+) - [\d]"),
        format!(r"[\d]+[\s]+({N}+)$"),
        format!(r"[A-Za-züäöÜÄÖ\s\+]+[\d]{{1,2}}[\s]+[-]?[\s]{{0,2}}({N}+)[\d]+$"),
        format!(r"[\d]+ ({N}+)$"),
        format!(r"[\d]+[\.]? ({N}+)\["),
        format!(r"[\d]+[\.]? ({N}+) - [\d]"),
        format!(r"[\d]+[\.]? ({N}+)[\d]+"),
        format!(r"[\d]+[\.]? ({N}+)$"),
    ];
    rules.iter().map(|p| Regex::new(p).expect("valid name pattern")).collect()
});

/// Event name; the whole title when no rule applies.
pub fn name(title: &str, overrides: &TitleOverrides) -> Extracted<String> {
    if let Some(n) = overrides.name(title) {
        return Extracted::clean(s!(n));
    }
    for re in NAME_RULES.iter() {
        if let Some(c) = re.captures(title) {
            return Extracted::clean(s!(c[1].trim()));
        }
    }
    Extracted::warned(s!(title), Warning::UnparsedName(s!(title)))
}

/* ---------------- Size ---------------- */

static SIZE_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"[A-Za-z]+[\+\s]?(\d\d)[\s\]]",
        r"[A-Za-z]{2}\+ (\d\d)\s",
        r"\s[A-Za-z]{2}(\d\d)",
        r"\s[A-Za-z]{4}[\s]?-[\s]?(\d\d)",
        r"\s[A-Za-z]{2}(\d)\s",
        r"\s[A-Za-z]{4}(\d)\s",
        r"\s[A-Za-z]{2}\s(\d)\s",
        r"\s[A-Za-z]{4}\s(\d\d)",
        r"\s[A-Za-z]{3}(\d\d)\+",
    ])
});

/// Planned player count, the number right after the type tag.
pub fn size(title: &str, overrides: &TitleOverrides) -> Extracted<Option<u32>> {
    if let Some(n) = overrides.size(title) {
        return Extracted::clean(Some(n));
    }
    for re in SIZE_RULES.iter() {
        if let Some(n) = re.captures(title).and_then(|c| c[1].parse().ok()) {
            return Extracted::clean(Some(n));
        }
    }
    Extracted::warned(None, Warning::UnparsedSize(s!(title)))
}

/* ---------------- Type ---------------- */

static TYPE_RULES: Lazy<Vec<(EventType, Regex)>> = Lazy::new(|| {
    [
        (EventType::Coop, r"((CO)|(COOP))[\s]?[\d]"),
        (EventType::CoopPlus, r"((CO)|(COOP))\+[\s]?[\d]"),
        (EventType::Tvt, r"(TVT[\s\+]{0,2}[\d])|(TVT-EVENT)|(TVT [A-Za-z])|(S-PVP)"),
        (EventType::Blackbox, r"((BB)|(BLACKBOX))[\s]?[\d]"),
        (EventType::Competition, r"COMP[\s]?[\d]"),
        (EventType::Milsim, r"((MILSIM)|(MIL)|(MILSIM\+))[\s]?[\d]"),
        (EventType::Orga, r"(ORG[A\s\-]{0,4}[\dX])|(TRAINING)|(ÜBUNG)|(THEORIE)|(VORTRAG)"),
    ]
    .into_iter()
    .map(|(t, p)| (t, Regex::new(&join!("(?i)", p)).expect("valid type pattern")))
    .collect()
});

pub fn event_type(title: &str, overrides: &TitleOverrides) -> Extracted<EventType> {
    if let Some(t) = overrides.event_type(title) {
        return Extracted::clean(t);
    }
    match TYPE_RULES.iter().find(|(_, re)| re.is_match(title)) {
        Some((t, _)) => Extracted::clean(*t),
        None => Extracted::warned(EventType::NoType, Warning::UnparsedType(s!(title))),
    }
}

/* ---------------- Date ---------------- */

static MONTHS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("Januar", "01"), ("Februar", "02"), ("März", "03"), ("April", "04"),
        ("Mai", "05"), ("Juni", "06"), ("Juli", "07"), ("August", "08"),
        ("September", "09"), ("Oktober", "10"), ("November", "11"), ("Dezember", "12"),
        ("Jan", "01"), ("Feb", "02"), ("Mär", "03"), ("Apr", "04"),
        ("Mai", "05"), ("Jun", "06"), ("Jul", "07"), ("Aug", "08"),
        ("Sep", "09"), ("Okt", "10"), ("Nov", "11"), ("Dez", "12"),
    ]
    .into_iter()
    .map(|(m, n)| (Regex::new(&format!(r"[\s]?({m})[\.]?")).expect("valid month pattern"), n))
    .collect()
});

/// Where the missing year comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Year {
    /// The title already carries one.
    InTitle,
    /// `yyyy` from the posted-at line, appended as is.
    Bare,
    /// `.yyyy` from the posted-at line.
    Dotted,
}

struct DateRule {
    pattern: Regex,
    /// Pads the captured text to `dd.mm.` / `dd.mm.yyyy` form.
    pad: fn(&str) -> String,
    year: Year,
}

fn keep(s: &str) -> String {
    s!(s)
}

fn zero_day(s: &str) -> String {
    join!("0", s)
}

/// `d.m.yyyy` → `0d.0m.yyyy`
fn zero_day_month_full(s: &str) -> String {
    let (dm, year) = s.split_at(s.len() - 6);
    format!("0{dm}0{year}")
}

/// `dd.mm.yy` → `dd.mm.20yy`
fn century(s: &str) -> String {
    let (dm, yy) = s.split_at(s.len() - 2);
    format!("{dm}20{yy}")
}

/// `dd.m` → `dd.0m`
fn zero_last(s: &str) -> String {
    let (head, m) = s.split_at(s.len() - 1);
    format!("{head}0{m}")
}

/// `dd.m.yyyy` → `dd.0m.yyyy`
fn zero_month_full(s: &str) -> String {
    let (head, tail) = s.split_at(s.len() - 6);
    format!("{head}0{tail}")
}

/// `dd.m.` → `dd.0m.`
fn zero_month_dotted(s: &str) -> String {
    let (head, tail) = s.split_at(s.len() - 2);
    format!("{head}0{tail}")
}

/// `d.m.yy` → `0d.0m.20yy`
fn zero_both_century(s: &str) -> String {
    zero_month_full(&zero_day(&century(s)))
}

/// `d.m` → `0d.0m`
fn zero_both(s: &str) -> String {
    zero_day(&zero_last(s))
}

/// `d.m.` → `0d.0m.`
fn zero_both_dotted(s: &str) -> String {
    zero_day(&zero_month_dotted(s))
}

static DATE_RULES: Lazy<Vec<DateRule>> = Lazy::new(|| {
    let rule = |p: &str, pad: fn(&str) -> String, year| DateRule {
        pattern: Regex::new(p).expect("valid date pattern"),
        pad,
        year,
    };
    vec![
        rule(r"(\d\d\.\d\d\.\d\d\d\d)", keep, Year::InTitle),
        rule(r"[^\d](\d\.\d\.\d\d\d\d)", zero_day_month_full, Year::InTitle),
        rule(r"(\d\d\.\d\d\.\d\d)", century, Year::InTitle),
        rule(r"(\d\.\d\d\.\d\d\d\d)", zero_day, Year::InTitle),
        rule(r"[^\d](\d\.\d\d\.)", zero_day, Year::Bare),
        rule(r"[^\d\.](\d\.\d\d)[^\d]", zero_day, Year::Dotted),
        rule(r"(\d\d\.\d\d)[^\.]", keep, Year::Dotted),
        rule(r"[^\.](\d\d\.\d\d\.)", keep, Year::Bare),
        rule(r"(\d\d\.\d\d\.)[^\d]", keep, Year::Bare),
        rule(r"(\d\d\.\d)[^\d\.]", zero_last, Year::Dotted),
        rule(r"(\d\d\.\d\.\d\d\d\d)", zero_month_full, Year::InTitle),
        rule(r"(\d\d\.\d\.)", zero_month_dotted, Year::Bare),
        rule(r"(\d\.\d\.\d\d)", zero_both_century, Year::InTitle),
        rule(r"(\d\.\d)[^\d\.]", zero_both, Year::Dotted),
        rule(r"(\d\.\d\.)", zero_both_dotted, Year::Bare),
    ]
});

static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d\d\d\d").expect("valid pattern"));
static DOTTED_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\d\d\d\d").expect("valid pattern"));

/// German month names → two-digit numbers, long names first.
pub fn replace_months(title: &str) -> String {
    let mut out = s!(title);
    for (re, num) in MONTHS.iter() {
        out = re.replace_all(&out, *num).into_owned();
    }
    out
}

/// `dd.mm.yyyy` text as far as the rules can build it.
fn date_text(title: &str, posted_at: Option<&str>, warnings: &mut Vec<Warning>) -> Option<String> {
    let title = replace_months(title);
    let (rule, found) = DATE_RULES
        .iter()
        .find_map(|r| r.pattern.captures(&title).map(|c| (r, s!(&c[1]))))?;

    let mut text = (rule.pad)(&found);
    let year_re = match rule.year {
        Year::InTitle => return Some(text),
        Year::Bare => &*BARE_YEAR,
        Year::Dotted => &*DOTTED_YEAR,
    };
    match posted_at.and_then(|l| year_re.find(l)) {
        Some(m) => text.push_str(m.as_str()),
        None => warnings.push(Warning::MissingPostedAtYear(title.clone())),
    }
    Some(text)
}

/// Range check on the digits: day 1-31, month 1-12, year from the first event
/// year up to `today`'s.
fn in_range(text: &str, today: NaiveDate) -> bool {
    let num = |r: std::ops::Range<usize>| text.get(r).and_then(|s| s.parse::<i32>().ok());
    match (num(0..2), num(3..5), text.get(6..).and_then(|s| s.parse::<i32>().ok())) {
        (Some(d), Some(m), Some(y)) => {
            (1..=31).contains(&d) && (1..=12).contains(&m) && (EARLIEST_YEAR..=today.year()).contains(&y)
        }
        _ => false,
    }
}

/// Event date. `None` means the thread cannot be dated at all.
pub fn date(
    title: &str,
    posted_at: Option<&str>,
    overrides: &TitleOverrides,
    today: NaiveDate,
) -> Extracted<Option<NaiveDate>> {
    if let Some(d) = overrides.date(title) {
        return Extracted::clean(Some(d));
    }

    let mut warnings = Vec::new();
    let Some(text) = date_text(title, posted_at, &mut warnings) else {
        return Extracted { value: None, warnings: vec![Warning::UnparsedDate(s!(title))] };
    };
    if !in_range(&text, today) {
        warnings.push(Warning::InvalidDate(text.clone()));
    }
    Extracted { value: NaiveDate::parse_from_str(&text, DATE_FMT).ok(), warnings }
}
