mod map;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "temap";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Locate transposable element insertion sites from aligned short-read evidence.")
        .subcommand_required(true)
        .subcommand(map::cli::create_map_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // MAP
        //
        Some((map::cli::MAP_CMD, matches)) => {
            map::handlers::run_map(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
