// src/bin/cli.rs
use gw_crawl::{cli, log, loge};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = log::init() {
        eprintln!("Logging disabled: {e}");
    }

    if let Err(e) = cli::run() {
        loge!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}
