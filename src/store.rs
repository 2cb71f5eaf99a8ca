// src/store.rs
//! Local cache and input files: registry seeds, the attendance ledger and the
//! `.store/` snapshot that lets a run skip the crawl.

use std::error::Error;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::config::consts::{CREATORS_SNAPSHOT_FILE, PLAYERS_SNAPSHOT_FILE};
use crate::config::options::FileOptions;
use crate::diag::Extracted;
use crate::file::{read_optional, write_text};
use crate::ledger::Ledger;
use crate::model::EventList;
use crate::registry::Registries;

/// The player table written next to a snapshot.
pub fn players_path(snapshot: &Path) -> PathBuf {
    snapshot.with_file_name(PLAYERS_SNAPSHOT_FILE)
}

/// The creator table written next to a snapshot.
pub fn creators_path(snapshot: &Path) -> PathBuf {
    snapshot.with_file_name(CREATORS_SNAPSHOT_FILE)
}

/// Registries primed from the seed files. Missing seeds are fine.
pub fn load_registries(files: &FileOptions) -> Result<Registries, Box<dyn Error>> {
    let mut reg = Registries::new();
    if let Some(text) = read_optional(&files.players_seed)? {
        let n = reg.players.load_semicolon_seed(&text)?;
        logd!("Seeded {n} players from {}", files.players_seed.display());
    }
    if let Some(text) = read_optional(&files.maps_seed)? {
        let n = reg.maps.load_quoted_seed(&text)?;
        logd!("Seeded {n} maps from {}", files.maps_seed.display());
    }
    Ok(reg)
}

/// The attendance ledger, or `None` when there is no ledger file.
pub fn load_ledger(path: &Path) -> Result<Option<Extracted<Ledger>>, Box<dyn Error>> {
    let Some(text) = read_optional(path)? else {
        logf!("No ledger at {}", path.display());
        return Ok(None);
    };
    let ledger = Ledger::parse(&text)?;
    logf!(
        "Ledger: {} events, {} players",
        ledger.value.event_count(),
        ledger.value.player_count()
    );
    Ok(Some(ledger))
}

/// Write the tabular snapshot plus the player and creator tables it refers to.
pub fn save_snapshot(events: &EventList, reg: &mut Registries, snapshot: &Path) -> Result<(), Box<dyn Error>> {
    let text = codec::encode(events, reg);
    write_text(snapshot, &text)?;
    write_text(&players_path(snapshot), &reg.players.to_semicolon_seed())?;
    write_text(&creators_path(snapshot), &reg.creators.to_semicolon_seed())?;
    logf!("Saved {} events to {}", events.len(), snapshot.display());
    Ok(())
}

/// Read a snapshot written by [`save_snapshot`].
pub fn load_snapshot(reg: &mut Registries, snapshot: &Path) -> Result<Extracted<EventList>, Box<dyn Error>> {
    if let Some(text) = read_optional(&players_path(snapshot))? {
        reg.players.load_semicolon_seed(&text)?;
    }
    if let Some(text) = read_optional(&creators_path(snapshot))? {
        reg.creators.load_semicolon_seed(&text)?;
    }
    let text = read_optional(snapshot)?
        .ok_or_else(|| format!("No snapshot at {}; crawl first", snapshot.display()))?;
    let events = codec::decode(&text, reg)?;
    logf!("Loaded {} events from {}", events.value.len(), snapshot.display());
    Ok(events)
}

/// Rebuild the ledger from `events`, keeping player data from `known`, and write it.
pub fn save_ledger(
    events: &EventList,
    known: Option<&Ledger>,
    reg: &Registries,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut ledger = Ledger::from_events(events);
    if let Some(known) = known {
        ledger.adopt_players(known);
    }
    write_text(path, &ledger.export(&reg.players))?;
    logf!("Wrote ledger with {} events to {}", ledger.event_count(), path.display());
    Ok(())
}
