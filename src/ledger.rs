// src/ledger.rs
//! The attendance ledger: a `;`-separated sheet kept by hand, one column per
//! event and one row per player.
//!
//! ```text
//! Name;Reaktivierung;Registrierungsdatum;angeschrieben wegen Inaktivität;CO;TVT;
//! ;;;;21.07.2013;27.07.2013;
//! Rallen#;;01.03.2013;;a;x;
//! ```
//!
//! Reading never fails on content: odd cells become warnings. Only a sheet
//! without its two header rows is rejected.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::config::consts::DATE_FMT;
use crate::diag::{Extracted, Warning};
use crate::model::{EventList, EventType, SlotStatus};
use crate::registry::Registry;

pub const HEADER: &str = "Name;Reaktivierung;Registrierungsdatum;angeschrieben wegen Inaktivität";
const SEP: char = ';';
/// First event column.
const EVENT_COLUMN: usize = 4;
/// First player row.
const PLAYER_ROW: usize = 2;
const INACTIVITY_MARK: &str = "x";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger needs a type row and a date row, found {0} row(s)")]
    MissingHeader(usize),
}

/// One event column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEvent {
    pub event_type: EventType,
    pub date: NaiveDate,
    players: BTreeMap<String, SlotStatus>,
}

impl LedgerEvent {
    pub fn new(event_type: EventType, date: NaiveDate) -> Self {
        Self { event_type, date, players: BTreeMap::new() }
    }

    pub fn add_player(&mut self, player: impl Into<String>, status: SlotStatus) {
        self.players.insert(player.into(), status);
    }

    pub fn status(&self, player: &str) -> Option<SlotStatus> {
        self.players.get(player).copied()
    }

    pub fn players(&self) -> &BTreeMap<String, SlotStatus> {
        &self.players
    }
}

/// The leading columns of a player row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerPlayer {
    pub name: String,
    pub reactivation: Option<NaiveDate>,
    pub registration: Option<NaiveDate>,
    pub inactivity_notified: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    events: BTreeMap<NaiveDate, LedgerEvent>,
    /// Keyed by lower-cased name.
    players: BTreeMap<String, LedgerPlayer>,
}

/* ---------------- Codes ---------------- */

pub fn parse_type(code: &str) -> Option<EventType> {
    match code.trim().to_uppercase().as_str() {
        "CO" | "COOP" => Some(EventType::Coop),
        "SPVP" | "PVP" | "TVT" => Some(EventType::Tvt),
        "CO+" | "COOP+" => Some(EventType::CoopPlus),
        "BB" => Some(EventType::Blackbox),
        "ORG" | "ORGA" => Some(EventType::Orga),
        "MIL" | "MILSIM" => Some(EventType::Milsim),
        "COMP" | "COMPETITION" => Some(EventType::Competition),
        _ => None,
    }
}

/// Column code written on export. Zeus and untyped events have no ledger
/// spelling and keep their own name.
pub fn type_code(t: EventType) -> &'static str {
    match t {
        EventType::Coop => "COOP",
        EventType::CoopPlus => "CO+",
        EventType::Tvt => "TVT",
        EventType::Blackbox => "BB",
        EventType::Orga => "ORGA",
        EventType::Milsim => "MILSIM",
        EventType::Competition => "COMP",
        other => other.code(),
    }
}

pub fn parse_status(code: &str) -> Option<SlotStatus> {
    match code {
        "a" => Some(SlotStatus::Appeared),
        "x" => Some(SlotStatus::SignedOut),
        "s" => Some(SlotStatus::SignedOutLate),
        "n" => Some(SlotStatus::Absent),
        "t" => Some(SlotStatus::PreparedLate),
        _ => None,
    }
}

pub fn status_code(s: SlotStatus) -> &'static str {
    match s {
        SlotStatus::Appeared => "a",
        SlotStatus::SignedOut => "x",
        SlotStatus::SignedOutLate => "s",
        SlotStatus::Absent => "n",
        SlotStatus::PreparedLate => "t",
        SlotStatus::Unknown => "",
    }
}

/* ---------------- Reading ---------------- */

/// Cells of one row; trailing empty cells are dropped.
fn cells(line: &str) -> Vec<&str> {
    let mut row: Vec<&str> = line.split(SEP).collect();
    while row.last().is_some_and(|c| c.is_empty()) {
        row.pop();
    }
    row
}

fn player_name(cell: &str) -> &str {
    let name = cell.trim();
    name.strip_suffix('#').unwrap_or(name)
}

fn optional_date(cell: Option<&&str>, warnings: &mut Vec<Warning>) -> Option<NaiveDate> {
    let text = cell.map(|c| c.trim()).filter(|c| !c.is_empty())?;
    match NaiveDate::parse_from_str(text, DATE_FMT) {
        Ok(d) => Some(d),
        Err(_) => {
            warnings.push(Warning::UnparsedLedgerDate(s!(text)));
            None
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Extracted<Ledger>, LedgerError> {
        let rows: Vec<Vec<&str>> = text.lines().map(cells).collect();
        if rows.len() < PLAYER_ROW {
            return Err(LedgerError::MissingHeader(rows.len()));
        }
        let (types, dates) = (&rows[0], &rows[1]);
        let players = &rows[PLAYER_ROW..];

        let mut warnings = Vec::new();
        if types.len() != dates.len() {
            warnings.push(Warning::HeaderLengthMismatch { types: types.len(), dates: dates.len() });
        }

        let mut ledger = Ledger::new();
        for col in EVENT_COLUMN..types.len() {
            let event_type = parse_type(types[col]).unwrap_or_else(|| {
                warnings.push(Warning::UnknownEventType(s!(types[col].trim().to_uppercase())));
                EventType::NoType
            });
            let raw_date = dates.get(col).map_or("", |d| d.trim());
            let Ok(date) = NaiveDate::parse_from_str(raw_date, DATE_FMT) else {
                warnings.push(Warning::UnparsedLedgerDate(s!(raw_date)));
                continue;
            };

            let mut event = LedgerEvent::new(event_type, date);
            for row in players {
                // A row shorter than this column has no entry here or later.
                let (Some(name), Some(cell)) = (row.first(), row.get(col)) else {
                    continue;
                };
                let name = player_name(name);
                let code = cell.trim();
                if name.is_empty() || code.is_empty() {
                    continue;
                }
                let status = parse_status(code).unwrap_or_else(|| {
                    warnings.push(Warning::UnknownStatus { player: s!(name), code: s!(code) });
                    SlotStatus::Unknown
                });
                event.add_player(name, status);
            }
            ledger.events.insert(date, event);
        }

        for row in players {
            let Some(name) = row.first().map(|c| player_name(c)) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let reactivation = optional_date(row.get(1), &mut warnings);
            let registration = optional_date(row.get(2), &mut warnings);
            if registration.is_none() {
                warnings.push(Warning::MissingRegistrationDate(s!(name)));
            }
            let inactivity_notified = row.get(3).is_some_and(|c| !c.trim().is_empty());
            ledger.insert_player(LedgerPlayer {
                name: s!(name),
                reactivation,
                registration,
                inactivity_notified,
            });
        }

        Ok(Extracted { value: ledger, warnings })
    }

    /// Ledger columns rebuilt from crawled events: every slot holder and reserve
    /// player with their status. Of two events on one date the later one wins.
    pub fn from_events(events: &EventList) -> Self {
        let mut ledger = Ledger::new();
        for e in events {
            let mut col = LedgerEvent::new(e.event_type, e.date);
            for slot in e.roster.slots() {
                col.add_player(slot.player.as_str(), slot.status);
            }
            for (player, status) in e.roster.reserve() {
                col.add_player(player.as_str(), *status);
            }
            ledger.events.insert(e.date, col);
        }
        ledger
    }

    /// Take over the player columns of `other`, keeping entries already present.
    pub fn adopt_players(&mut self, other: &Ledger) {
        for (key, p) in &other.players {
            self.players.entry(key.clone()).or_insert_with(|| p.clone());
        }
    }

    pub fn insert_player(&mut self, player: LedgerPlayer) {
        self.players.insert(player.name.to_lowercase(), player);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&LedgerEvent> {
        self.events.get(&date)
    }

    /// Case-insensitive.
    pub fn player(&self, name: &str) -> Option<&LedgerPlayer> {
        self.players.get(&name.to_lowercase())
    }

    /// Events in date order.
    pub fn events(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.events.values()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /* ---------------- Writing ---------------- */

    /// The sheet format read by [`parse`](Self::parse). Only players known to
    /// `registered` and carrying player columns are written.
    pub fn export(&self, registered: &Registry<String>) -> String {
        let dates: Vec<NaiveDate> = self.events.keys().copied().collect();

        // lower-cased name → (name as first seen, date → status)
        let mut rows: BTreeMap<String, (&str, BTreeMap<NaiveDate, SlotStatus>)> = BTreeMap::new();
        for event in self.events.values() {
            for (player, status) in event.players() {
                if !matches!(registered.id_of(player), Some(id) if id > 0) {
                    continue;
                }
                rows.entry(player.to_lowercase())
                    .or_insert_with(|| (player.as_str(), BTreeMap::new()))
                    .1
                    .insert(event.date, *status);
            }
        }

        let mut lines = Vec::with_capacity(rows.len() + PLAYER_ROW);
        let mut types = s!(HEADER);
        let mut date_row = ";".repeat(EVENT_COLUMN - 1);
        for event in self.events.values() {
            types.push(SEP);
            types.push_str(type_code(event.event_type));
            date_row.push(SEP);
            date_row.push_str(&event.date.format(DATE_FMT).to_string());
        }
        types.push(SEP);
        date_row.push(SEP);
        lines.push(types);
        lines.push(date_row);

        for (key, (name, statuses)) in rows {
            let Some(p) = self.players.get(&key) else {
                logd!("Ledger export skips {name}: no player columns");
                continue;
            };
            let fmt = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FMT).to_string()).unwrap_or_default();
            let mut line = join!(
                name,
                ";",
                &fmt(p.reactivation),
                ";",
                &fmt(p.registration),
                ";",
                if p.inactivity_notified { INACTIVITY_MARK } else { "" }
            );
            for date in &dates {
                line.push(SEP);
                if let Some(status) = statuses.get(date) {
                    line.push_str(status_code(*status));
                }
            }
            line.push(SEP);
            lines.push(line);
        }
        lines.join("\n")
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::SHEET;
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reads_columns_and_player_rows() {
        let got = Ledger::parse(SHEET).unwrap();
        assert!(got.is_clean(), "{:?}", got.warnings);
        let l = got.value;
        assert_eq!(l.event_count(), 3);

        let coop = l.get(ymd(2013, 7, 21)).unwrap();
        assert_eq!(coop.event_type, EventType::Coop);
        assert_eq!(coop.status("Rallen"), Some(SlotStatus::Appeared));
        assert_eq!(coop.status("Ghost"), Some(SlotStatus::Absent));

        let tvt = l.get(ymd(2013, 7, 27)).unwrap();
        assert_eq!(tvt.event_type, EventType::Tvt);
        assert_eq!(tvt.players().len(), 1);

        let bb = l.get(ymd(2013, 8, 3)).unwrap();
        assert_eq!(bb.status("Zabuza"), Some(SlotStatus::Absent));
        assert_eq!(bb.status("Ghost"), None);

        let z = l.player("zabuza").unwrap();
        assert_eq!(z.reactivation, Some(ymd(2013, 6, 15)));
        assert!(z.inactivity_notified);
        assert!(!l.player("Rallen").unwrap().inactivity_notified);
    }

    #[test]
    fn odd_cells_are_warnings() {
        let text = "\
Name;Reaktivierung;Registrierungsdatum;angeschrieben wegen Inaktivität;CO;XYZ;
;;;;21.07.2013;
Rallen;;;;q;
";
        let got = Ledger::parse(text).unwrap();
        assert!(got.warnings.contains(&Warning::HeaderLengthMismatch { types: 6, dates: 5 }));
        assert!(got.warnings.contains(&Warning::UnknownEventType(s!("XYZ"))));
        assert!(got.warnings.contains(&Warning::UnparsedLedgerDate(s!(""))));
        assert!(got.warnings.contains(&Warning::UnknownStatus { player: s!("Rallen"), code: s!("q") }));
        assert!(got.warnings.contains(&Warning::MissingRegistrationDate(s!("Rallen"))));

        let l = got.value;
        assert_eq!(l.event_count(), 1);
        assert_eq!(l.get(ymd(2013, 7, 21)).unwrap().status("Rallen"), Some(SlotStatus::Unknown));
    }

    #[test]
    fn header_rows_are_required() {
        assert_eq!(Ledger::parse(HEADER), Err(LedgerError::MissingHeader(1)));
    }

    #[test]
    fn export_reads_back() {
        let l = Ledger::parse(SHEET).unwrap().value;
        let mut reg = Registry::new();
        for p in ["Rallen", "Zabuza"] {
            reg.ensure(&s!(p));
        }
        let out = l.export(&reg);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], format!("{HEADER};COOP;TVT;BB;"));
        assert_eq!(lines[1], ";;;;21.07.2013;27.07.2013;03.08.2013;");
        assert_eq!(lines[2], "Rallen;;01.03.2013;;a;x;;");
        assert_eq!(lines[3], "Zabuza;15.06.2013;01.01.2013;x;a;;n;");
        // Ghost has no registry id
        assert_eq!(lines.len(), 4);

        let back = Ledger::parse(&out).unwrap();
        assert!(back.is_clean());
        assert_eq!(back.value.get(ymd(2013, 7, 27)), l.get(ymd(2013, 7, 27)));
    }
}
