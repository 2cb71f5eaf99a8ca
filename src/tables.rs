// src/tables.rs
//! Literal lookup tables: role-label spellings, player and map aliases, ledger
//! exemptions and per-title overrides.
//!
//! The shipped tables live in `data/*.json` and are embedded at build time.
//! A directory holding files of the same names replaces them at runtime.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::consts::DATE_FMT;
use crate::model::{EventType, SlotType};

pub const SLOT_LABELS: &str = "slot_labels.json";
pub const PLAYER_ALIASES: &str = "player_aliases.json";
pub const LEDGER_EXEMPT: &str = "ledger_exempt.json";
pub const MAP_ALIASES: &str = "map_aliases.json";
pub const TITLE_OVERRIDES: &str = "title_overrides.json";

const EMBEDDED_SLOT_LABELS: &str = include_str!("../data/slot_labels.json");
const EMBEDDED_PLAYER_ALIASES: &str = include_str!("../data/player_aliases.json");
const EMBEDDED_LEDGER_EXEMPT: &str = include_str!("../data/ledger_exempt.json");
const EMBEDDED_MAP_ALIASES: &str = include_str!("../data/map_aliases.json");
const EMBEDDED_TITLE_OVERRIDES: &str = include_str!("../data/title_overrides.json");

#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot read table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("table {name} is not valid JSON: {source}")]
    Json {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("table {name}: bad date '{value}' for '{title}'")]
    BadDate { name: &'static str, title: String, value: String },
    #[error("table {name}: alias chain at '{from}' → '{to}'")]
    AliasChain { name: &'static str, from: String, to: String },
}

/// Per-title exceptions, each keyed by a title substring and checked in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TitleOverrides {
    pub not_events: Vec<String>,
    pub names: Vec<(String, String)>,
    pub sizes: Vec<(String, u32)>,
    pub types: Vec<(String, EventType)>,
    pub dates: Vec<(String, NaiveDate)>,
}

#[derive(Deserialize)]
struct RawTitleOverrides {
    not_events: Vec<String>,
    names: Vec<(String, String)>,
    sizes: Vec<(String, u32)>,
    types: Vec<(String, EventType)>,
    dates: Vec<(String, String)>,
}

impl TitleOverrides {
    fn lookup<'a, T>(list: &'a [(String, T)], title: &str) -> Option<&'a T> {
        let title = title.trim();
        list.iter().find(|(key, _)| title.contains(key.as_str())).map(|(_, v)| v)
    }

    pub fn is_not_event(&self, title: &str) -> bool {
        let title = title.trim();
        self.not_events.iter().any(|k| title.contains(k.as_str()))
    }

    pub fn name(&self, title: &str) -> Option<&str> {
        Self::lookup(&self.names, title).map(String::as_str)
    }

    pub fn size(&self, title: &str) -> Option<u32> {
        Self::lookup(&self.sizes, title).copied()
    }

    pub fn event_type(&self, title: &str) -> Option<EventType> {
        Self::lookup(&self.types, title).copied()
    }

    pub fn date(&self, title: &str) -> Option<NaiveDate> {
        Self::lookup(&self.dates, title).copied()
    }
}

/// All lookup tables of one run.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    /// Lower-cased label → role.
    slot_labels: HashMap<String, SlotType>,
    player_aliases: HashMap<String, String>,
    ledger_exempt: HashSet<String>,
    map_aliases: HashMap<String, String>,
    pub titles: TitleOverrides,
}

impl Tables {
    /// Tables compiled into the binary.
    pub fn embedded() -> Result<Self, TableError> {
        Self::from_sources(
            EMBEDDED_SLOT_LABELS,
            EMBEDDED_PLAYER_ALIASES,
            EMBEDDED_LEDGER_EXEMPT,
            EMBEDDED_MAP_ALIASES,
            EMBEDDED_TITLE_OVERRIDES,
        )
    }

    /// Tables read from `dir`; a file missing there falls back to the embedded copy.
    pub fn from_dir(dir: &Path) -> Result<Self, TableError> {
        let read = |name: &str, fallback: &'static str| -> Result<String, TableError> {
            let path = dir.join(name);
            if !path.exists() {
                return Ok(s!(fallback));
            }
            fs::read_to_string(&path).map_err(|source| TableError::Io { path, source })
        };
        Self::from_sources(
            &read(SLOT_LABELS, EMBEDDED_SLOT_LABELS)?,
            &read(PLAYER_ALIASES, EMBEDDED_PLAYER_ALIASES)?,
            &read(LEDGER_EXEMPT, EMBEDDED_LEDGER_EXEMPT)?,
            &read(MAP_ALIASES, EMBEDDED_MAP_ALIASES)?,
            &read(TITLE_OVERRIDES, EMBEDDED_TITLE_OVERRIDES)?,
        )
    }

    pub fn from_sources(
        slot_labels: &str,
        player_aliases: &str,
        ledger_exempt: &str,
        map_aliases: &str,
        title_overrides: &str,
    ) -> Result<Self, TableError> {
        let labels: Vec<(String, SlotType)> = parse(SLOT_LABELS, slot_labels)?;
        let players: Vec<(String, String)> = parse(PLAYER_ALIASES, player_aliases)?;
        let exempt: Vec<String> = parse(LEDGER_EXEMPT, ledger_exempt)?;
        let maps: Vec<(String, String)> = parse(MAP_ALIASES, map_aliases)?;
        let raw: RawTitleOverrides = parse(TITLE_OVERRIDES, title_overrides)?;

        let mut dates = Vec::with_capacity(raw.dates.len());
        for (title, value) in raw.dates {
            let date = NaiveDate::parse_from_str(&value, DATE_FMT).map_err(|_| TableError::BadDate {
                name: TITLE_OVERRIDES,
                title: title.clone(),
                value: value.clone(),
            })?;
            dates.push((title, date));
        }

        let player_aliases = alias_map(PLAYER_ALIASES, players)?;
        let map_aliases = alias_map(MAP_ALIASES, maps)?;

        Ok(Self {
            // Later spellings override earlier ones that differ only in case.
            slot_labels: labels.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect(),
            player_aliases,
            ledger_exempt: exempt.into_iter().collect(),
            map_aliases,
            titles: TitleOverrides {
                not_events: raw.not_events,
                names: raw.names,
                sizes: raw.sizes,
                types: raw.types,
                dates,
            },
        })
    }

    /// Exact, case-insensitive label lookup.
    pub fn slot_label(&self, label: &str) -> Option<SlotType> {
        self.slot_labels.get(&label.to_lowercase()).copied()
    }

    /// Canonical player name. Idempotent: canonical names are never alias keys.
    pub fn resolve_player<'a>(&'a self, player: &'a str) -> &'a str {
        self.player_aliases.get(player).map(String::as_str).unwrap_or(player)
    }

    pub fn resolve_map<'a>(&'a self, map: &'a str) -> &'a str {
        self.map_aliases.get(map).map(String::as_str).unwrap_or(map)
    }

    /// Players whose absence from the ledger is expected.
    pub fn is_ledger_exempt(&self, player: &str) -> bool {
        self.ledger_exempt.contains(player)
    }

    pub fn slot_label_count(&self) -> usize {
        self.slot_labels.len()
    }
}

fn parse<T: DeserializeOwned>(name: &'static str, text: &str) -> Result<T, TableError> {
    serde_json::from_str(text).map_err(|source| TableError::Json { name, source })
}

/// Alias pairs as a map. A target that is itself an alias key would make
/// resolution order-dependent, so it is rejected.
fn alias_map(name: &'static str, pairs: Vec<(String, String)>) -> Result<HashMap<String, String>, TableError> {
    let map: HashMap<String, String> = pairs.into_iter().collect();
    for (from, to) in &map {
        if map.contains_key(to) {
            return Err(TableError::AliasChain { name, from: from.clone(), to: to.clone() });
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Tables {
        Tables::embedded().expect("embedded tables parse")
    }

    #[test]
    fn embedded_tables_load() {
        let t = tables();
        assert!(t.slot_label_count() > 900);
        assert!(t.is_ledger_exempt("element_WSC"));
        assert_eq!(t.titles.not_events.len(), 7);
    }

    #[test]
    fn label_lookup_ignores_case() {
        let t = tables();
        assert_eq!(t.slot_label("ugv specialist"), Some(SlotType::Ugso));
        assert_eq!(t.slot_label("Zeus/CO+/etc."), Some(SlotType::ZcPlus));
        assert_eq!(t.slot_label("Kaffeekocher"), None);
    }

    #[test]
    fn player_alias_resolution_is_idempotent() {
        let t = tables();
        let once = t.resolve_player("Rallen95");
        assert_eq!(once, "Rallen");
        assert_eq!(t.resolve_player(once), once);
        assert_eq!(t.resolve_player("Zabuza"), "Zabuza");
    }

    #[test]
    fn title_overrides_match_by_substring() {
        let t = tables();
        assert_eq!(t.titles.size("[23.09.] - 1900 - JTAC-Training"), Some(13));
        assert_eq!(t.titles.event_type("  Mini Sylvester Event  "), Some(EventType::Blackbox));
        assert_eq!(
            t.titles.date("Mini Sylvester Event"),
            NaiveDate::from_ymd_opt(2013, 12, 31)
        );
        assert!(t.titles.is_not_event("[Alter Thread] WR2 - bitte ignorieren"));
    }

    #[test]
    fn alias_chains_are_rejected() {
        let err = Tables::from_sources(
            "[]",
            r#"[["a","b"],["b","c"]]"#,
            "[]",
            "[]",
            r#"{"not_events":[],"names":[],"sizes":[],"types":[],"dates":[]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TableError::AliasChain { .. }));
    }

    #[test]
    fn directory_overrides_single_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MAP_ALIASES), r#"[["Altis Island","Altis"]]"#).unwrap();
        let t = Tables::from_dir(dir.path()).unwrap();
        assert_eq!(t.resolve_map("Altis Island"), "Altis");
        assert_eq!(t.resolve_map("Imrali"), "Imrali");
        assert!(t.slot_label_count() > 900);
    }
}
