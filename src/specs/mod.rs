// src/specs/mod.rs
//! # Forum page “specs”
//!
//! This module holds the **page-specific extraction rules** for the event forum.
//! Each spec covers one kind of page (or one region of a thread page) and
//! encodes *where the facts live in the markup* and *how to read them when
//! the authors did not follow any template*.
//!
//! ## What lives here
//! - **Listing walk** (`listing`): pages of `viewforum.php`, pinned rows
//!   rejected, thread locations collected until an empty page.
//! - **Structural anchors** (`thread`): title, creator, opening post and the end
//!   of the first post. A miss here aborts the thread.
//! - **Title heuristics** (`title`): name, size, type and date, each an ordered
//!   rule list behind a literal per-title exception table.
//! - **Body heuristics** (`body`): start time, map and the thread id.
//! - **Roster scan** (`roster`): the list-start markers, the slot line rules and
//!   the reconciliation against the attendance ledger.
//!
//! ## What does **not** live here
//! - **Fetching** (`core::net`): specs take lines, never locations, except for
//!   the listing walker which drives a [`Fetch`](crate::core::Fetch).
//! - **Assembly and crawl order** (`assemble`), **tabular I/O** (`codec`) and
//!   **persistence** (`store`).
//!
//! ## Typical call chain
//! ```text
//! cli → assemble::crawl → specs::listing::ThreadWalker
//!                       ↘ assemble::assemble_event → specs::{thread, title, body, roster}
//! ```
//!
//! ## Conventions & invariants
//! - Rule lists are **ordered**; the first matching rule wins and the order is
//!   part of the behaviour.
//! - Heuristic misses are **warnings** that travel with the value in
//!   [`Extracted`](crate::diag::Extracted); only structural misses are errors.
//! - Line offsets (creator = title + 5, post = creator + 3, posted-at = title + 9)
//!   come from the board's thread template and live in `config::consts`.
//!
//! ## Testing notes
//! Every spec is testable offline against small captured fixtures.
pub mod body;
pub mod listing;
pub mod roster;
pub mod thread;
pub mod title;
