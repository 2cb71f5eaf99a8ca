// src/specs/roster.rs
//! Roster scan of the opening post.
//!
//! The scanner is a two-state machine. It first looks for one of the list-start
//! markers; once one is seen, every following line is tried against the slot
//! rules in order. Matched slots are reconciled with the ledger column of the
//! event's date, and ledger players never mentioned in the thread end up in the
//! reserve.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::classify;
use crate::config::consts::DATE_FMT;
use crate::core::sanitize::{fix_body_chars, trim_dashes};
use crate::diag::{Extracted, Warning};
use crate::ledger::LedgerEvent;
use crate::model::{EventType, Roster, Slot, SlotStatus};
use crate::specs::thread::ThreadError;
use crate::tables::Tables;

/* ---------------- Slot rules ---------------- */

const SLOT: &str = r"[A-Za-züäöÜÄÖ\s\+ß\-\(\)/\.0-9\?,\*]+";
const PLAYER: &str = r"[A-Za-züäöÜÄÖ\sß\-_0-9\?\.:]+";
const COLOR: &str = r"<span style='color:#[a-fA-F0-9]{6}'>";
const TAIL: &str = r"[\s]*( - nicht bestätigt)?<br[\s]?/>";
const HEAD_DASH: &str = r"#(?P<key>[\d]+)[\s]{1,3}-[\s]{1,3}";
const HEAD: &str = r"#(?P<key>[\d]+)[\s]{1,3}";

static SLOT_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let label = format!(r"({COLOR})?(?P<label>{SLOT})(</span>)?[\s]?(</strong></span>|</span></strong>)?[\s]{{0,3}}");
    // "[W]" clan tag in front of the player.
    let tagged = format!(r"{COLOR}(<strong>)?[\[]?W[\]]?[\s]?</span>[\s]?(</strong>[\s]?<strong>)?");

    let rules = [
        format!(r"{HEAD_DASH}{label}-[\s]{{0,3}}<strong>{tagged}(?P<player>{PLAYER})</strong>{TAIL}"),
        format!(r"{HEAD_DASH}{label}-[\s]{{0,3}}<strong>[\s]?(?P<player>{PLAYER})</strong>{TAIL}"),
        format!(r"{HEAD}{label}-[\s]{{0,3}}<strong>{tagged}(?P<player>{PLAYER})</strong>{TAIL}"),
        format!(r"{HEAD}{label}-[\s]{{0,3}}<strong>[\s]?(?P<player>{PLAYER})</strong>{TAIL}"),
        format!(r"{HEAD}{label}[\-]?[\s]{{0,3}}<strong>[\s]?{tagged}(?P<player>{PLAYER})</strong>{TAIL}"),
        format!(r"{HEAD}{label}[\-]?[\s]{{0,3}}<strong>[\s]?(?P<player>{PLAYER})</strong>{TAIL}"),
        format!(r"{HEAD_DASH}{label}[\-]?[\s]{{0,3}}<strong>[\s]?(?P<player>{PLAYER})(</strong>)?{TAIL}"),
        format!(
            r"{HEAD}{label}[\-]?[\s]{{0,3}}<strong>[\s]?[\[]?{COLOR}(<strong>)?[\[]?W[\]]?</span>[\]]?[\s]?(</strong>[\s]?<strong>)?(?P<player>{PLAYER})(</strong>)?{TAIL}"
        ),
        format!(r"{HEAD}{label}[\-]?[\s]{{0,3}}<strong>[\s]?(?P<player>{PLAYER})(</strong>)?{TAIL}"),
        format!(
            r"#(?P<key>[\d]+)[\s]{{0,3}}-[\s]{{1,3}}{label}[\-]?[\s]{{0,3}}{tagged}(<strong>)?(?P<player>{PLAYER})(</strong>)?{TAIL}"
        ),
        format!(
            r"({COLOR})?#(?P<key>[\d]+)[\s]{{0,3}}[\-]?[\s]{{1,3}}(?P<label>{SLOT})(</span>)?[\s]?(</strong></span>|</span></strong>)?[\s]{{0,3}}[\-]?[\s]{{0,3}}{tagged}(<strong>)?(?P<player>{PLAYER})(</strong>)?{TAIL}"
        ),
    ];
    rules
        .iter()
        .map(|p| Regex::new(&join!("(?i)", p)).expect("valid slot pattern"))
        .collect()
});

/* ---------------- List start ---------------- */

static LIST_START: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"((Slotliste)|(Slotdatenbank)|(Slotlist)|(Teilnehmer)|(Anmeldungen)|(Wer kommt\?)|(Interessierte)|(Dabei sind)|(Lernwillige Zöglinge)|(Die Auserwählten)|(lotliste)|(Zeitslots))[*:]?[\s]?(&lt;){0,3}</",
        r"<strong>Teilnehmer -",
        r"((Gruppe W - Die Herausforderer!)|(Slotliste - Server #1))[*:]?[\s]?(&lt;){0,3}</",
        r"Wo:</strong> Brigade2010<br />$",
        r"^SlotÂ´s<br />$",
        r" zu vergeben:<br />$",
        r"^<strong>Gruppe DELTA:<br />$",
        r"wer dabei ist.<br />$",
        r"^1.0 Slotliste:<br />$",
        r"^<i><strong>Godfather v3</strong></i><br />$",
        r"^So, hier nun die freien Slots:<br />$",
        r"Slotliste der Mission anzupassen...<br />$",
        r"^Folgende Plätze sind verfügbar:<br />$",
        r"^Missionsstart pünktlich 2000h<br />$",
        r"Flughafen einnehmen, Team Rot verteidigt!</strong><br />$",
    ]
    .iter()
    .map(|p| Regex::new(&join!("(?i)", p)).expect("valid list start pattern"))
    .collect()
});

/// One matched slot line before classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotLine {
    pub key: String,
    pub label: String,
    pub player: String,
}

/// First slot rule matching `line`, with label and player cleaned.
pub fn match_slot(line: &str) -> Option<SlotLine> {
    SLOT_RULES.iter().find_map(|re| {
        let c = re.captures(line)?;
        Some(SlotLine {
            key: s!(c["key"].trim()),
            label: trim_dashes(&c["label"]),
            player: trim_dashes(&c["player"]),
        })
    })
}

pub fn is_list_start(line: &str) -> bool {
    LIST_START.iter().any(|re| re.is_match(line))
}

/* ---------------- Scan ---------------- */

/// What the scan needs to know about the event.
#[derive(Clone, Copy, Debug)]
pub struct RosterContext<'a> {
    pub title: &'a str,
    pub size: Option<u32>,
    pub event_type: EventType,
    pub date: NaiveDate,
    /// Ledger column of the event's date, if the ledger has one.
    pub ledger: Option<&'a LedgerEvent>,
    pub tables: &'a Tables,
    pub today: NaiveDate,
}

/// Ledger side of the scan: a private copy of the column's players, drained
/// as the thread names them.
struct Reconciler<'a> {
    ctx: &'a RosterContext<'a>,
    pending: Vec<(String, SlotStatus)>,
    reported_event: bool,
}

impl<'a> Reconciler<'a> {
    fn new(ctx: &'a RosterContext<'a>) -> Self {
        let pending = ctx
            .ledger
            .map(|e| e.players().iter().map(|(p, s)| (p.clone(), *s)).collect())
            .unwrap_or_default();
        Self { ctx, pending, reported_event: false }
    }

    /// Status of `player` according to the ledger.
    fn status(&mut self, player: &str, warnings: &mut Vec<Warning>) -> SlotStatus {
        let ctx = self.ctx;
        let mut status = SlotStatus::Unknown;
        match ctx.ledger {
            Some(col) if col.event_type == ctx.event_type => match col.status(player) {
                Some(s) => status = s,
                None if !ctx.tables.is_ledger_exempt(player) => warnings.push(Warning::LedgerAbsent {
                    player: s!(player),
                    title: s!(ctx.title),
                    date: ctx.date.format(DATE_FMT).to_string(),
                }),
                None => {}
            },
            Some(col) => self.report_once(warnings, || Warning::LedgerTypeMismatch {
                ledger: col.event_type,
                thread: ctx.event_type,
                title: s!(ctx.title),
            }),
            None if ctx.date < ctx.today => self.report_once(warnings, || Warning::LedgerMissingEvent {
                date: ctx.date.format(DATE_FMT).to_string(),
                title: s!(ctx.title),
            }),
            None => {}
        }
        self.pending.retain(|(p, _)| p != player);
        status
    }

    fn report_once(&mut self, warnings: &mut Vec<Warning>, w: impl FnOnce() -> Warning) {
        if !self.reported_event {
            self.reported_event = true;
            warnings.push(w());
        }
    }
}

/// Scan the opening post `body` (end marker line included) for the roster.
pub fn extract(body: &[String], ctx: &RosterContext<'_>) -> Result<Extracted<Roster>, ThreadError> {
    let mut roster = Roster::with_capacity(ctx.size.unwrap_or(0) as usize);
    let mut warnings = Vec::new();
    let mut ledger = Reconciler::new(ctx);
    let mut started = false;

    for raw in body {
        let line = fix_body_chars(raw);
        if !started {
            started = is_list_start(&line);
            continue;
        }
        let Some(hit) = match_slot(&line) else {
            continue;
        };

        let number: u32 = hit.key.parse().map_err(|_| ThreadError::BadSlotNumber(hit.key.clone()))?;
        let role = classify(&hit.label, ctx.tables).collect_into(&mut warnings);
        let player = s!(ctx.tables.resolve_player(&hit.player));
        let status = ledger.status(&player, &mut warnings);

        let custom_label = (!hit.label.is_empty() && hit.label.to_lowercase() != role.code().to_lowercase())
            .then_some(hit.label);
        roster.add_slot(Slot { number, role, custom_label, player, status });
    }

    for (player, status) in ledger.pending {
        roster.add_reserve(player, status);
    }

    if !started {
        warnings.push(Warning::RosterNotFound(s!(ctx.title)));
    } else if roster.slot_count() == 0 {
        warnings.push(Warning::RosterEmpty(s!(ctx.title)));
    }

    Ok(Extracted { value: roster, warnings })
}
