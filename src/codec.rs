// src/codec.rs
//! Tabular export/import of an [`EventList`].
//!
//! Five blocks, each introduced by its header row: events, maps, slotlists,
//! slots, slot types. Seeded players, creators and maps are written by
//! registry id, so the same [`Registries`] must be at hand when reading a
//! snapshot back. Players without a seeded id travel by name.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::config::consts::*;
use crate::csv::{quote_row, split_quoted};
use crate::diag::{Extracted, Warning};
use crate::model::{Event, EventList, EventType, Roster, Slot, SlotStatus, SlotType};
use crate::registry::Registries;

pub const EVENTS_HEADER: &str = r#""event_id","user_id","post_id","thread_id","forum_id","event_name","player_number","event_type","event_date","event_time","map","slotlist","news_id","calendar_id","state""#;
pub const MAPS_HEADER: &str = r#""map_id","map_name""#;
pub const SLOTLISTS_HEADER: &str = r#""uniqueID","slotlistName","owner","comment""#;
pub const SLOTS_HEADER: &str = r#""uniqueID","slotlistID","slotNumber","slotid","customName","assignedUserID","customUser","attendance""#;
pub const SLOT_TYPES_HEADER: &str = r#""slotid","slotshort","slotlong""#;

const EVENT_CELLS: usize = 15;
const SLOT_CELLS: usize = 9;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/* ---------------- Id tables ---------------- */

pub fn event_type_id(t: EventType) -> u32 {
    match t {
        EventType::Blackbox => 1,
        EventType::Coop => 2,
        EventType::CoopPlus => 3,
        EventType::Competition => 4,
        EventType::Milsim => 5,
        EventType::Orga => 6,
        EventType::Tvt => 7,
        EventType::Zeus => 8,
        EventType::NoType => 0,
    }
}

pub fn event_type_by_id(id: u32) -> Option<EventType> {
    Some(match id {
        0 => EventType::NoType,
        1 => EventType::Blackbox,
        2 => EventType::Coop,
        3 => EventType::CoopPlus,
        4 => EventType::Competition,
        5 => EventType::Milsim,
        6 => EventType::Orga,
        7 => EventType::Tvt,
        8 => EventType::Zeus,
        _ => return None,
    })
}

pub fn status_id(s: SlotStatus) -> u32 {
    match s {
        SlotStatus::Appeared => 1,
        SlotStatus::SignedOut => 2,
        SlotStatus::SignedOutLate => 3,
        SlotStatus::PreparedLate => 4,
        SlotStatus::Absent => 5,
        SlotStatus::Unknown => 6,
    }
}

pub fn status_by_id(id: u32) -> Option<SlotStatus> {
    Some(match id {
        1 => SlotStatus::Appeared,
        2 => SlotStatus::SignedOut,
        3 => SlotStatus::SignedOutLate,
        4 => SlotStatus::PreparedLate,
        5 => SlotStatus::Absent,
        6 => SlotStatus::Unknown,
        _ => return None,
    })
}

/* ---------------- Export ---------------- */

/// Write `events` in the tabular format, registering creators, maps and
/// slotlists on the way. The player table is only read.
pub fn encode(events: &EventList, reg: &mut Registries) -> String {
    let mut next_slotlist = reg.slotlists.iter().map(|(id, _)| id).max().unwrap_or(0) + 1;
    let mut next_slot = 1u32;

    let mut event_rows = Vec::with_capacity(events.len());
    let mut slotlist_rows = Vec::with_capacity(events.len());
    let mut slot_rows = Vec::new();

    for (n, e) in events.iter().rev().enumerate() {
        let owner = reg.creator_id(&e.creator);
        let slotlist_name = join!(&e.name, SLOTLIST_SUFFIX);
        let slotlist = next_slotlist;
        next_slotlist += 1;
        if !reg.slotlists.insert_with_id(slotlist, slotlist_name.clone()) {
            logd!("Slotlist name already registered: {slotlist_name}");
        }
        slotlist_rows.push(quote_row(&[
            slotlist.to_string(),
            slotlist_name,
            owner.to_string(),
            s!(SLOTLIST_COMMENT),
        ]));

        for slot in e.roster.slots() {
            slot_rows.push(slot_row(
                reg,
                next_slot,
                slotlist,
                slot.number as i64,
                slot.role,
                slot.custom_label.as_deref().unwrap_or(""),
                &slot.player,
                slot.status,
            ));
            next_slot += 1;
        }
        for (player, status) in e.roster.reserve() {
            slot_rows.push(slot_row(
                reg,
                next_slot,
                slotlist,
                RESERVE_SLOT_NUMBER as i64,
                SlotType::Reserve,
                "",
                player,
                *status,
            ));
            next_slot += 1;
        }

        let map = reg.maps.ensure(&e.map);
        event_rows.push(quote_row(&[
            (n + 1).to_string(),
            owner.to_string(),
            e.post_id.to_string(),
            e.thread_id.unwrap_or(0).to_string(),
            FORUM_ID.to_string(),
            e.name.clone(),
            e.size.unwrap_or(0).to_string(),
            event_type_id(e.event_type).to_string(),
            e.date.format(TABLE_DATE_FMT).to_string(),
            e.time.map(|t| t.format(TABLE_TIME_FMT).to_string()).unwrap_or_default(),
            map.to_string(),
            slotlist.to_string(),
            s!("0"),
            s!("0"),
            EVENT_STATE.to_string(),
        ]));
    }

    let mut out = vec![s!(EVENTS_HEADER)];
    out.extend(event_rows);
    out.push(s!(MAPS_HEADER));
    out.extend(reg.maps.iter().map(|(id, name)| quote_row(&[id.to_string(), name.clone()])));
    out.push(s!(SLOTLISTS_HEADER));
    out.extend(slotlist_rows);
    out.push(s!(SLOTS_HEADER));
    out.extend(slot_rows);
    out.push(s!(SLOT_TYPES_HEADER));
    out.extend(reg.slot_types.iter().map(|(id, t)| {
        quote_row(&[id.to_string(), s!(t.short_name()), s!(t.long_name())])
    }));
    out.join("\n")
}

#[allow(clippy::too_many_arguments)]
fn slot_row(
    reg: &Registries,
    unique: u32,
    slotlist: u32,
    number: i64,
    role: SlotType,
    custom: &str,
    player: &str,
    status: SlotStatus,
) -> String {
    let type_id = reg.slot_types.id_of(&role).unwrap_or(0);
    let (user_id, custom_user) = match reg.player_id(player) {
        Some(id) => (id, ""),
        None => (0, player),
    };
    quote_row(&[
        unique.to_string(),
        slotlist.to_string(),
        number.to_string(),
        type_id.to_string(),
        s!(custom),
        user_id.to_string(),
        s!(custom_user),
        status_id(status).to_string(),
        s!("0"),
    ])
}

/* ---------------- Import ---------------- */

struct EventRow {
    event_id: u32,
    slotlist: u32,
    event: Event,
}

/// Read a snapshot written by [`encode`]. Events come back in their original
/// order; ids the registries don't know become warnings and sentinels.
pub fn decode(text: &str, reg: &mut Registries) -> Result<Extracted<EventList>, CodecError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.first().map(|l| l.trim()) != Some(EVENTS_HEADER) {
        return Err(CodecError::MissingHeader("events"));
    }
    let maps_at = find_header(&lines, 1, MAPS_HEADER, "maps")?;
    let slotlists_at = find_header(&lines, maps_at + 1, SLOTLISTS_HEADER, "slotlists")?;
    let slots_at = find_header(&lines, slotlists_at + 1, SLOTS_HEADER, "slots")?;
    let types_at = find_header(&lines, slots_at + 1, SLOT_TYPES_HEADER, "slot types")?;

    let mut warnings = Vec::new();

    for i in maps_at + 1..slotlists_at {
        let Some(cells) = row(&lines, i, 2)? else { continue };
        let id: u32 = num(&cells, 0, i)?;
        let name = cells[1].trim();
        if !reg.maps.insert_with_id(id, s!(name)) && reg.maps.get(id).map(String::as_str) != Some(name) {
            return Err(CodecError::Malformed { line: i + 1, reason: format!("map id {id} conflicts with the registry") });
        }
    }

    let mut rows = Vec::with_capacity(maps_at.saturating_sub(1));
    for i in 1..maps_at {
        if let Some(cells) = row(&lines, i, EVENT_CELLS)? {
            rows.push(event_row(&cells, i, reg, &mut warnings)?);
        }
    }

    let mut by_slotlist: BTreeMap<u32, Vec<(SlotType, Slot)>> = BTreeMap::new();
    for i in slots_at + 1..types_at {
        let Some(cells) = row(&lines, i, SLOT_CELLS)? else { continue };
        let slotlist: u32 = num(&cells, 1, i)?;
        let number: i64 = num(&cells, 2, i)?;
        let type_id: u32 = num(&cells, 3, i)?;
        let user_id: u32 = num(&cells, 5, i)?;
        let attendance: u32 = num(&cells, 7, i)?;

        let role = reg.slot_types.get(type_id).copied().unwrap_or_else(|| {
            warnings.push(Warning::UnknownId { kind: "slot type", id: type_id.to_string() });
            SlotType::NoType
        });
        let status = status_by_id(attendance).unwrap_or_else(|| {
            warnings.push(Warning::UnknownId { kind: "attendance", id: attendance.to_string() });
            SlotStatus::Unknown
        });
        let player = if user_id == 0 {
            cells[6].clone()
        } else {
            match reg.players.get(user_id) {
                Some(name) => name.clone(),
                None => unknown_player(user_id, &mut warnings),
            }
        };
        let number = if role == SlotType::Reserve {
            0
        } else {
            u32::try_from(number)
                .map_err(|_| CodecError::Malformed { line: i + 1, reason: format!("slot number {number}") })?
        };
        let custom_label = Some(cells[4].clone()).filter(|c| !c.is_empty());
        by_slotlist
            .entry(slotlist)
            .or_default()
            .push((role, Slot { number, role, custom_label, player, status }));
    }

    rows.sort_by(|a, b| b.event_id.cmp(&a.event_id));
    let mut events = EventList::with_capacity(rows.len());
    for EventRow { slotlist, mut event, .. } in rows {
        let mut roster = Roster::with_capacity(event.size.unwrap_or(0) as usize);
        for (role, slot) in by_slotlist.remove(&slotlist).unwrap_or_default() {
            if role == SlotType::Reserve {
                roster.add_reserve(slot.player, slot.status);
            } else {
                roster.add_slot(slot);
            }
        }
        event.roster = roster;
        events.push(event);
    }
    for id in by_slotlist.keys() {
        warnings.push(Warning::UnknownId { kind: "slotlist", id: id.to_string() });
    }

    Ok(Extracted { value: events, warnings })
}

fn find_header(lines: &[&str], from: usize, header: &str, kind: &'static str) -> Result<usize, CodecError> {
    lines
        .iter()
        .skip(from)
        .position(|l| l.trim() == header)
        .map(|p| p + from)
        .ok_or(CodecError::MissingHeader(kind))
}

/// Cells of line `i`, or `None` for a blank line. Values are not escaped, so a
/// `","` inside one shows up as extra cells.
fn row(lines: &[&str], i: usize, want: usize) -> Result<Option<Vec<String>>, CodecError> {
    let line = lines[i].trim();
    if line.is_empty() {
        return Ok(None);
    }
    let cells = split_quoted(line);
    if cells.len() != want {
        return Err(CodecError::Malformed {
            line: i + 1,
            reason: format!("expected {want} values, found {}", cells.len()),
        });
    }
    Ok(Some(cells))
}

fn num<T: FromStr>(cells: &[String], at: usize, i: usize) -> Result<T, CodecError> {
    let raw = cells[at].trim();
    raw.parse()
        .map_err(|_| CodecError::Malformed { line: i + 1, reason: format!("bad number '{raw}' in column {}", at + 1) })
}

fn unknown_player(id: u32, warnings: &mut Vec<Warning>) -> String {
    warnings.push(Warning::UnknownId { kind: "player", id: id.to_string() });
    s!(UNKNOWN_PLAYER)
}

fn event_row(
    cells: &[String],
    i: usize,
    reg: &Registries,
    warnings: &mut Vec<Warning>,
) -> Result<EventRow, CodecError> {
    let bad = |what: &str, raw: &str| CodecError::Malformed { line: i + 1, reason: format!("bad {what} '{raw}'") };

    let type_id: u32 = num(cells, 7, i)?;
    let event_type = event_type_by_id(type_id).unwrap_or_else(|| {
        warnings.push(Warning::UnknownId { kind: "event type", id: type_id.to_string() });
        EventType::NoType
    });

    let date = cells[8].trim();
    let date = NaiveDate::parse_from_str(date, TABLE_DATE_FMT).map_err(|_| bad("date", date))?;
    let time = match cells[9].trim() {
        "" => None,
        t => Some(NaiveTime::parse_from_str(t, TABLE_TIME_FMT).map_err(|_| bad("time", t))?),
    };

    let map_id: u32 = num(cells, 10, i)?;
    let map = match reg.maps.get(map_id) {
        Some(m) => m.clone(),
        None => {
            warnings.push(Warning::UnknownId { kind: "map", id: map_id.to_string() });
            s!(UNKNOWN_MAP)
        }
    };

    let size: u32 = num(cells, 6, i)?;
    let thread_id: u32 = num(cells, 3, i)?;
    let owner: u32 = num(cells, 1, i)?;
    let creator = match reg.creator_name(owner) {
        Some(name) => name.clone(),
        None => unknown_player(owner, warnings),
    };

    let event = Event {
        name: cells[5].clone(),
        event_type,
        size: Some(size).filter(|&n| n > 0),
        creator,
        map,
        date,
        time,
        thread_id: Some(thread_id).filter(|&n| n > 0),
        post_id: num(cells, 2, i)?,
        roster: Roster::default(),
    };
    Ok(EventRow { event_id: num(cells, 0, i)?, slotlist: num(cells, 11, i)?, event })
}
