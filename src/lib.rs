// src/lib.rs
// #![allow(dead_code)]
// #![allow(unused)]

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod config;
pub mod core;

pub mod model;
pub mod diag;
pub mod registry;
pub mod csv;
pub mod tables;
pub mod classify;
pub mod specs;
pub mod ledger;
pub mod assemble;
pub mod codec;

pub mod cli;
pub mod file;
pub mod progress;
pub mod store;
