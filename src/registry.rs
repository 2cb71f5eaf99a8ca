// src/registry.rs
//! Canonical registries: bidirectional value ↔ surrogate-id dictionaries.
//!
//! Ids are handed out monotonically from 1 and never reused. The four
//! registries travel together as [`Registries`], built by the caller and
//! passed by `&mut` into whatever needs them.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use thiserror::Error;

use crate::csv::split_quoted;
use crate::model::SlotType;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("seed line {line}: id {id} already holds '{existing}'")]
    Conflict { line: usize, id: u32, existing: String },
}

#[derive(Clone, Debug)]
pub struct Registry<V> {
    by_id: BTreeMap<u32, V>,
    by_value: HashMap<V, u32>,
    next_id: u32,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self { by_id: BTreeMap::new(), by_value: HashMap::new(), next_id: 1 }
    }
}

impl<V: Clone + Eq + Hash> Registry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `value`, registering it first if needed.
    pub fn ensure(&mut self, value: &V) -> u32 {
        if let Some(&id) = self.by_value.get(value) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.by_id.insert(id, value.clone());
        self.by_value.insert(value.clone(), id);
        id
    }

    /// Register under a fixed id (seeds, imports). Returns false if either side is taken.
    pub fn insert_with_id(&mut self, id: u32, value: V) -> bool {
        if self.by_id.contains_key(&id) || self.by_value.contains_key(&value) {
            return false;
        }
        self.by_value.insert(value.clone(), id);
        self.by_id.insert(id, value);
        self.next_id = self.next_id.max(id + 1);
        true
    }

    /// Make the next fresh id at least `floor`.
    pub fn skip_to(&mut self, floor: u32) {
        self.next_id = self.next_id.max(floor);
    }

    pub fn id_of(&self, value: &V) -> Option<u32> {
        self.by_value.get(value).copied()
    }

    pub fn get(&self, id: u32) -> Option<&V> {
        self.by_id.get(&id)
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &V)> {
        self.by_id.iter().map(|(id, v)| (*id, v))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Registry<String> {
    /// `id;name` per line; blank lines are ignored.
    pub fn load_semicolon_seed(&mut self, text: &str) -> Result<usize, SeedError> {
        let mut added = 0;
        for (n, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (id, name) = line.split_once(';').ok_or_else(|| SeedError::Malformed {
                line: n + 1,
                reason: s!("expected 'id;name'"),
            })?;
            let id = parse_id(id, n + 1)?;
            added += self.seed_one(id, name.trim(), n + 1)?;
        }
        Ok(added)
    }

    /// `"id","name","active"` per line; the activity flag is not kept.
    pub fn load_quoted_seed(&mut self, text: &str) -> Result<usize, SeedError> {
        let mut added = 0;
        for (n, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells = split_quoted(line.trim());
            let (Some(id), Some(name)) = (cells.first(), cells.get(1)) else {
                return Err(SeedError::Malformed { line: n + 1, reason: s!("expected '\"id\",\"name\",…'") });
            };
            let id = parse_id(id, n + 1)?;
            added += self.seed_one(id, name.trim(), n + 1)?;
        }
        Ok(added)
    }

    /// Inverse of [`load_semicolon_seed`](Self::load_semicolon_seed).
    pub fn to_semicolon_seed(&self) -> String {
        self.iter().map(|(id, name)| format!("{id};{name}\n")).collect()
    }

    fn seed_one(&mut self, id: u32, name: &str, line: usize) -> Result<usize, SeedError> {
        if let Some(existing) = self.get(id) {
            if existing == name {
                return Ok(0);
            }
            return Err(SeedError::Conflict { line, id, existing: existing.clone() });
        }
        // A name already registered under another id keeps its first id.
        Ok(usize::from(self.insert_with_id(id, s!(name))))
    }
}

fn parse_id(raw: &str, line: usize) -> Result<u32, SeedError> {
    raw.trim()
        .parse()
        .map_err(|_| SeedError::Malformed { line, reason: format!("bad id '{}'", raw.trim()) })
}

/// Slot-type table with the fixed ids of the tabular format.
fn slot_type_registry() -> Registry<SlotType> {
    use SlotType::*;
    const FIXED: [SlotType; 46] = [
        Co, Xo, Mio, Col, Jtac, Pl, Psg, Fo, Sl, Tl, Ftl, Ar, Gre, Rfl, Cmdc, Dm, Atr, Aar, Mg,
        Amg, At, Aat, Aa, Aaa, Snp, Spt, Tpl, Tps, Tc, Gnr, Drv, Log, Mdc, Pil, Cpil, Wso, Wco,
        Acso, Spec, ZcPlus, Ce, Other, Reserve, Uaso, Ugso, NoType,
    ];
    let mut r = Registry::new();
    for t in FIXED {
        r.ensure(&t);
    }
    r
}

/// The registries of one run.
#[derive(Clone, Debug)]
pub struct Registries {
    /// Seeded players only. Anyone else travels by name.
    pub players: Registry<String>,
    /// Event owners that are not seeded players.
    pub creators: Registry<String>,
    pub maps: Registry<String>,
    pub slot_types: Registry<SlotType>,
    pub slotlists: Registry<String>,
}

impl Default for Registries {
    fn default() -> Self {
        Self {
            players: Registry::new(),
            creators: Registry::new(),
            maps: Registry::new(),
            slot_types: slot_type_registry(),
            slotlists: Registry::new(),
        }
    }
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner id for an event creator. A seeded player keeps their id; anyone
    /// else gets a creator entry numbered above every player id.
    pub fn creator_id(&mut self, name: &str) -> u32 {
        let name = s!(name);
        if let Some(id) = self.creators.id_of(&name) {
            return id;
        }
        if let Some(id) = self.players.id_of(&name) {
            if self.creators.insert_with_id(id, name.clone()) {
                return id;
            }
        }
        let floor = self.players.iter().map(|(id, _)| id).max().unwrap_or(0) + 1;
        self.creators.skip_to(floor);
        self.creators.ensure(&name)
    }

    pub fn creator_name(&self, id: u32) -> Option<&String> {
        self.creators.get(id).or_else(|| self.players.get(id))
    }

    /// Id of a seeded player, if any.
    pub fn player_id(&self, name: &str) -> Option<u32> {
        self.players.id_of(&s!(name)).filter(|&id| id > 0)
    }
}
