// src/diag.rs
//! Non-fatal diagnostics. Heuristic misses never abort extraction; they ride
//! along with the value in [`Extracted`].

use thiserror::Error;

use crate::model::EventType;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Warning {
    // Field extraction
    #[error("Can't parse thread name from title (using title instead): {0}")]
    UnparsedName(String),
    #[error("Can't parse event size from title: {0}")]
    UnparsedSize(String),
    #[error("Can't parse event type from title: {0}")]
    UnparsedType(String),
    #[error("Can't parse date from title: {0}")]
    UnparsedDate(String),
    #[error("Can't read 'wroteAt' date from thread: {0}")]
    MissingPostedAtYear(String),
    #[error("No valid date: {0}")]
    InvalidDate(String),
    #[error("Can not parse starting time of event: {0}")]
    UnparsedTime(String),
    #[error("Can't parse thread id from url: {0}")]
    UnparsedThreadId(String),

    // Roster
    #[error("Can not parse slot type out of: {0}")]
    UnknownSlotType(String),
    #[error("Can't find threads slotlist with title: {0}")]
    RosterNotFound(String),
    #[error("Can't find slots in threads slotlist with title: {0}")]
    RosterEmpty(String),
    #[error("External data says player '{player}' has not participated on this event ({title}):{date}")]
    LedgerAbsent { player: String, title: String, date: String },
    #[error("External event has different type of '{ledger}' instead '{thread}' ({title})")]
    LedgerTypeMismatch { ledger: EventType, thread: EventType, title: String },
    #[error("Can't find external event with web events date: {date} ({title})")]
    LedgerMissingEvent { date: String, title: String },

    // Ledger file
    #[error("Ledger header has {types} type columns but {dates} date columns")]
    HeaderLengthMismatch { types: usize, dates: usize },
    #[error("Unknown ledger event type: {0}")]
    UnknownEventType(String),
    #[error("Unknown ledger status '{code}' for player {player}")]
    UnknownStatus { player: String, code: String },
    #[error("Player {0} has no registration date")]
    MissingRegistrationDate(String),
    #[error("Unreadable ledger date: {0}")]
    UnparsedLedgerDate(String),

    // Tabular import
    #[error("Unknown {kind} id in tabular data: {id}")]
    UnknownId { kind: &'static str, id: String },

    // Crawl
    #[error("Skipped thread {url}: {reason}")]
    ThreadSkipped { url: String, reason: String },
}

/// A best-effort value plus whatever went wrong while producing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extracted<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Extracted<T> {
    pub fn clean(value: T) -> Self {
        Self { value, warnings: Vec::new() }
    }

    pub fn warned(value: T, warning: Warning) -> Self {
        Self { value, warnings: vec![warning] }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extracted<U> {
        Extracted { value: f(self.value), warnings: self.warnings }
    }

    /// Move the warnings into `sink` and hand back the value.
    pub fn collect_into(self, sink: &mut Vec<Warning>) -> T {
        sink.extend(self.warnings);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_follow_values_through_map_and_collect() {
        let mut sink = Vec::new();
        let size = Extracted::warned(None::<u32>, Warning::UnparsedSize(s!("Foo")))
            .map(|s| s.unwrap_or(0))
            .collect_into(&mut sink);
        assert_eq!(size, 0);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].to_string(), "Can't parse event size from title: Foo");
    }

    #[test]
    fn type_mismatch_message_names_both_types() {
        let w = Warning::LedgerTypeMismatch {
            ledger: EventType::Tvt,
            thread: EventType::Coop,
            title: s!("[Co30] X"),
        };
        assert_eq!(w.to_string(), "External event has different type of 'TVT' instead 'COOP' ([Co30] X)");
    }
}
