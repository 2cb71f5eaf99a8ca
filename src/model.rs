// src/model.rs
//! In-memory event model: events, rosters, slots and the closed enumerations
//! they are built from.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Kind of event, as announced in the thread title.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Blackbox,
    Competition,
    Coop,
    CoopPlus,
    Milsim,
    NoType,
    Orga,
    Tvt,
    Zeus,
}

impl EventType {
    pub fn code(self) -> &'static str {
        match self {
            EventType::Blackbox => "BLACKBOX",
            EventType::Competition => "COMPETITION",
            EventType::Coop => "COOP",
            EventType::CoopPlus => "COOP_PLUS",
            EventType::Milsim => "MILSIM",
            EventType::NoType => "NO_TYPE",
            EventType::Orga => "ORGA",
            EventType::Tvt => "TVT",
            EventType::Zeus => "ZEUS",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whether a signed-up player actually showed up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Absent,
    Appeared,
    PreparedLate,
    SignedOut,
    SignedOutLate,
    Unknown,
}

impl SlotStatus {
    pub fn code(self) -> &'static str {
        match self {
            SlotStatus::Absent => "ABSENT",
            SlotStatus::Appeared => "APPEARED",
            SlotStatus::PreparedLate => "PREPARED_LATE",
            SlotStatus::SignedOut => "SIGNED_OUT",
            SlotStatus::SignedOutLate => "SIGNED_OUT_LATE",
            SlotStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Canonical role codes. Declaration order matters: the classifier walks
/// [`SlotType::ALL`] when matching labels against code names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotType {
    NoType,
    Co,
    Xo,
    Mio,
    Col,
    Jtac,
    Pl,
    Psg,
    Fo,
    Sl,
    Tl,
    Ftl,
    Ar,
    Gre,
    Rfl,
    Cmdc,
    Dm,
    Atr,
    Aar,
    Mg,
    Amg,
    At,
    Aat,
    Aa,
    Aaa,
    Snp,
    Spt,
    Tpl,
    Tps,
    Tc,
    Gnr,
    Drv,
    Log,
    Mdc,
    Pil,
    Cpil,
    Wso,
    Wco,
    Acso,
    Spec,
    ZcPlus,
    Ce,
    Uaso,
    Ugso,
    Other,
    Reserve,
}

impl SlotType {
    pub const ALL: [SlotType; 46] = [
        SlotType::NoType, SlotType::Co, SlotType::Xo, SlotType::Mio, SlotType::Col,
        SlotType::Jtac, SlotType::Pl, SlotType::Psg, SlotType::Fo, SlotType::Sl,
        SlotType::Tl, SlotType::Ftl, SlotType::Ar, SlotType::Gre, SlotType::Rfl,
        SlotType::Cmdc, SlotType::Dm, SlotType::Atr, SlotType::Aar, SlotType::Mg,
        SlotType::Amg, SlotType::At, SlotType::Aat, SlotType::Aa, SlotType::Aaa,
        SlotType::Snp, SlotType::Spt, SlotType::Tpl, SlotType::Tps, SlotType::Tc,
        SlotType::Gnr, SlotType::Drv, SlotType::Log, SlotType::Mdc, SlotType::Pil,
        SlotType::Cpil, SlotType::Wso, SlotType::Wco, SlotType::Acso, SlotType::Spec,
        SlotType::ZcPlus, SlotType::Ce, SlotType::Uaso, SlotType::Ugso, SlotType::Other,
        SlotType::Reserve,
    ];

    /// Code name as it appears in labels such as `Rifleman (AT)`.
    pub fn code(self) -> &'static str {
        match self {
            SlotType::NoType => "NO_TYPE",
            SlotType::Co => "CO",
            SlotType::Xo => "XO",
            SlotType::Mio => "MIO",
            SlotType::Col => "COL",
            SlotType::Jtac => "JTAC",
            SlotType::Pl => "PL",
            SlotType::Psg => "PSG",
            SlotType::Fo => "FO",
            SlotType::Sl => "SL",
            SlotType::Tl => "TL",
            SlotType::Ftl => "FTL",
            SlotType::Ar => "AR",
            SlotType::Gre => "GRE",
            SlotType::Rfl => "RFL",
            SlotType::Cmdc => "CMDC",
            SlotType::Dm => "DM",
            SlotType::Atr => "ATR",
            SlotType::Aar => "AAR",
            SlotType::Mg => "MG",
            SlotType::Amg => "AMG",
            SlotType::At => "AT",
            SlotType::Aat => "AAT",
            SlotType::Aa => "AA",
            SlotType::Aaa => "AAA",
            SlotType::Snp => "SNP",
            SlotType::Spt => "SPT",
            SlotType::Tpl => "TPL",
            SlotType::Tps => "TPS",
            SlotType::Tc => "TC",
            SlotType::Gnr => "GNR",
            SlotType::Drv => "DRV",
            SlotType::Log => "LOG",
            SlotType::Mdc => "MDC",
            SlotType::Pil => "PIL",
            SlotType::Cpil => "CPIL",
            SlotType::Wso => "WSO",
            SlotType::Wco => "WCO",
            SlotType::Acso => "ACSO",
            SlotType::Spec => "SPEC",
            SlotType::ZcPlus => "ZC_PLUS",
            SlotType::Ce => "CE",
            SlotType::Uaso => "UASO",
            SlotType::Ugso => "UGSO",
            SlotType::Other => "OTHER",
            SlotType::Reserve => "RESERVE",
        }
    }

    /// Short name used in the slot-type table.
    pub fn short_name(self) -> &'static str {
        match self {
            SlotType::Col => "CoL",
            SlotType::ZcPlus => "ZC+",
            SlotType::Other => "N/A",
            SlotType::Reserve => "RE",
            other => other.code(),
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            SlotType::NoType => "Unclassified",
            SlotType::Co => "Commanding Officer",
            SlotType::Xo => "Executive Officer",
            SlotType::Mio => "Military Intelligence Officer",
            SlotType::Col => "Chief of Logistics",
            SlotType::Jtac => "Joint Terminal Attack Controller",
            SlotType::Pl => "Platoon Leader",
            SlotType::Psg => "Platoon Sergeant",
            SlotType::Fo => "Forward Observer",
            SlotType::Sl => "Squad Leader",
            SlotType::Tl => "Team Leader",
            SlotType::Ftl => "Fireteam Leader",
            SlotType::Ar => "Automatic Rifleman",
            SlotType::Gre => "Grenadier",
            SlotType::Rfl => "Rifleman",
            SlotType::Cmdc => "Combat Medic",
            SlotType::Dm => "Designated Marksman",
            SlotType::Atr => "Anti-Tank Rifleman",
            SlotType::Aar => "Anti-Air Rifleman",
            SlotType::Mg => "Machine Gunner",
            SlotType::Amg => "Assistant Machine Gunner",
            SlotType::At => "Anti-Tank Specialist",
            SlotType::Aat => "Assistant Anti-Tank Specialist",
            SlotType::Aa => "Anti-Air Specialist",
            SlotType::Aaa => "Assistant Anti-Air Specialist",
            SlotType::Snp => "Sniper",
            SlotType::Spt => "Spotter",
            SlotType::Tpl => "Tank Platoon Leader",
            SlotType::Tps => "Tank Platoon Sergeant",
            SlotType::Tc => "Tank Commander",
            SlotType::Gnr => "Gunner",
            SlotType::Drv => "Driver",
            SlotType::Log => "Logistician",
            SlotType::Mdc => "Medic",
            SlotType::Pil => "Pilot",
            SlotType::Cpil => "Co-Pilot",
            SlotType::Wso => "Weapon Systems Officer",
            SlotType::Wco => "Wing Commander",
            SlotType::Acso => "Artillery Command Systems Operator",
            SlotType::Spec => "Special Forces",
            SlotType::ZcPlus => "Zeus/CO+/etc.",
            SlotType::Ce => "Combat Engineer",
            SlotType::Uaso => "Unmanned Aerial Systems Operator",
            SlotType::Ugso => "Unmanned Ground Systems Operator",
            SlotType::Other => "Other",
            SlotType::Reserve => "Reserve",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One role assignment within a roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub number: u32,
    pub role: SlotType,
    /// Raw label when it differs from the role code's own name.
    pub custom_label: Option<String>,
    pub player: String,
    pub status: SlotStatus,
}

/// Assigned slots plus reserve players for one event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    slots: Vec<Slot>,
    reserve: BTreeMap<String, SlotStatus>,
}

impl Roster {
    pub fn with_capacity(size: usize) -> Self {
        Self { slots: Vec::with_capacity(size), reserve: BTreeMap::new() }
    }

    /// Assigns a slot. A reserve entry for the same player is dropped.
    pub fn add_slot(&mut self, slot: Slot) {
        self.reserve.remove(&slot.player);
        self.slots.push(slot);
    }

    /// Adds a reserve player. Returns false when the player already holds a slot.
    pub fn add_reserve(&mut self, player: impl Into<String>, status: SlotStatus) -> bool {
        let player = player.into();
        if self.is_assigned(&player) {
            return false;
        }
        self.reserve.insert(player, status);
        true
    }

    pub fn is_assigned(&self, player: &str) -> bool {
        self.slots.iter().any(|s| s.player == player)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn reserve(&self) -> &BTreeMap<String, SlotStatus> {
        &self.reserve
    }

    pub fn reserve_status(&self, player: &str) -> Option<SlotStatus> {
        self.reserve.get(player).copied()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn reserve_count(&self) -> usize {
        self.reserve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.reserve.is_empty()
    }
}

/// One scheduled session, assembled once from a forum thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub event_type: EventType,
    pub size: Option<u32>,
    pub creator: String,
    pub map: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub thread_id: Option<u32>,
    pub post_id: u32,
    pub roster: Roster,
}

/// Events in crawl order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventList {
    events: Vec<Event>,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { events: Vec::with_capacity(n) }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }
}

impl FromIterator<Event> for EventList {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self { events: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a EventList {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(player: &str) -> Slot {
        Slot {
            number: 1,
            role: SlotType::Rfl,
            custom_label: None,
            player: s!(player),
            status: SlotStatus::Unknown,
        }
    }

    #[test]
    fn reserve_never_shadows_an_assigned_player() {
        let mut r = Roster::with_capacity(4);
        r.add_slot(slot("Zabuza"));
        assert!(!r.add_reserve("Zabuza", SlotStatus::Appeared));
        assert!(r.add_reserve("Rallen", SlotStatus::Absent));
        assert_eq!(r.slot_count(), 1);
        assert_eq!(r.reserve_status("Rallen"), Some(SlotStatus::Absent));
        assert_eq!(r.reserve_status("Zabuza"), None);
    }

    #[test]
    fn assigning_moves_player_out_of_reserve() {
        let mut r = Roster::default();
        r.add_reserve("Rallen", SlotStatus::SignedOut);
        r.add_slot(slot("Rallen"));
        assert_eq!(r.reserve_count(), 0);
        assert!(r.is_assigned("Rallen"));
    }

    #[test]
    fn short_names_follow_the_slot_type_table() {
        assert_eq!(SlotType::Col.short_name(), "CoL");
        assert_eq!(SlotType::ZcPlus.short_name(), "ZC+");
        assert_eq!(SlotType::Other.short_name(), "N/A");
        assert_eq!(SlotType::Reserve.short_name(), "RE");
        assert_eq!(SlotType::Sl.short_name(), "SL");
    }

    #[test]
    fn codes_match_serde_names() {
        for t in SlotType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.code()));
        }
        assert_eq!(serde_json::to_string(&EventType::CoopPlus).unwrap(), "\"COOP_PLUS\"");
    }
}
