// src/cli.rs
use std::{env, path::PathBuf};

use crate::assemble;
use crate::config::options::AppOptions;
use crate::core::HttpFetcher;
use crate::diag::Warning;
use crate::progress::LogProgress;
use crate::store;
use crate::tables::Tables;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut opts = AppOptions::default();
    parse_cli(&mut opts, env::args().skip(1))?;
    run_with(&opts)
}

/// One full run: load inputs, crawl or read the snapshot, write outputs.
pub fn run_with(opts: &AppOptions) -> Result<(), Box<dyn std::error::Error>> {
    let files = &opts.files;
    let today = chrono::Local::now().date_naive();

    let mut reg = store::load_registries(files)?;
    let tables = match &files.tables_dir {
        Some(dir) => Tables::from_dir(dir)?,
        None => Tables::embedded()?,
    };
    let ledger = store::load_ledger(&files.ledger)?.map(|l| {
        report("ledger", &l.warnings);
        l.value
    });

    let events = if opts.crawl.fresh {
        let mut fetch = HttpFetcher::new(opts.crawl.pause_ms);
        let mut progress = LogProgress::new();
        let got = assemble::crawl(&mut fetch, &opts.crawl, &tables, ledger.as_ref(), today, Some(&mut progress))?;
        report("crawl", &got.warnings);
        store::save_snapshot(&got.value, &mut reg, &files.snapshot)?;
        got.value
    } else {
        let got = store::load_snapshot(&mut reg, &files.snapshot)?;
        report("snapshot", &got.warnings);
        got.value
    };
    logf!("{} events", events.len());

    if let Some(out) = &files.ledger_out {
        store::save_ledger(&events, ledger.as_ref(), &reg, out)?;
    }
    Ok(())
}

fn report(stage: &str, warnings: &[Warning]) {
    for w in warnings {
        logw!("{w}");
    }
    if !warnings.is_empty() {
        logf!("{stage}: {} warnings", warnings.len());
    }
}

fn parse_cli(opts: &mut AppOptions, args: impl Iterator<Item = String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut args = args;
    while let Some(a) = args.next() {
        match a.as_str() {
            "--crawl" => opts.crawl.fresh = true,
            "--cached" => opts.crawl.fresh = false,
            "--snapshot" => opts.files.snapshot = PathBuf::from(args.next().ok_or("Missing value for --snapshot")?),
            "--ledger" => opts.files.ledger = PathBuf::from(args.next().ok_or("Missing value for --ledger")?),
            "--ledger-out" => {
                opts.files.ledger_out = Some(PathBuf::from(args.next().ok_or("Missing value for --ledger-out")?))
            }
            "--tables" => opts.files.tables_dir = Some(PathBuf::from(args.next().ok_or("Missing value for --tables")?)),
            "--players-seed" => {
                opts.files.players_seed = PathBuf::from(args.next().ok_or("Missing value for --players-seed")?)
            }
            "--maps-seed" => opts.files.maps_seed = PathBuf::from(args.next().ok_or("Missing value for --maps-seed")?),
            "--pause" => opts.crawl.pause_ms = args.next().ok_or("Missing value for --pause")?.parse()?,
            "-h" | "--help" => {
                eprintln!(include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown arg: {}", a).into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<AppOptions, Box<dyn std::error::Error>> {
        let mut opts = AppOptions::default();
        parse_cli(&mut opts, args.iter().map(|a| s!(*a)))?;
        Ok(opts)
    }

    #[test]
    fn flags_override_defaults() {
        let o = parse(&["--cached", "--snapshot", "out/e.csv", "--ledger-out", "l.csv", "--pause", "0"]).unwrap();
        assert!(!o.crawl.fresh);
        assert_eq!(o.files.snapshot, PathBuf::from("out/e.csv"));
        assert_eq!(o.files.ledger_out, Some(PathBuf::from("l.csv")));
        assert_eq!(o.crawl.pause_ms, 0);
        assert!(parse(&[]).unwrap().crawl.fresh);
    }

    #[test]
    fn bad_args_are_errors() {
        assert!(parse(&["--snapshot"]).is_err());
        assert!(parse(&["--nope"]).is_err());
        assert!(parse(&["--pause", "soon"]).is_err());
    }
}
