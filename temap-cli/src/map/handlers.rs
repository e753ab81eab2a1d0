use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use log::info;

use temap_core::utils::get_dynamic_writer;
use temap_mapper::{CallsWrite, MapperConfig, OutputFormat, Pipeline, read_alignment_file};

///
/// Collect mapper options given on the command line. Anything not given stays
/// unset so it does not mask the config file.
///
fn config_from_matches(matches: &ArgMatches) -> MapperConfig {
    let signed = |name: &str| matches.get_one::<i64>(name).copied();

    MapperConfig {
        window_size_junction: signed("window-size-junction"),
        window_size_anchor: signed("window-size-anchor"),
        insert_size: signed("insert-size"),
        min_junction_clip: signed("min-junction-clip"),
        min_anchor_support: signed("min-anchor-support"),
        family_ambiguity_margin: signed("family-ambiguity-margin"),
        contigs: matches
            .get_many::<String>("contigs")
            .map(|values| values.cloned().collect()),
        threads: matches.get_one::<usize>("threads").copied(),
    }
}

pub fn run_map(matches: &ArgMatches) -> Result<()> {
    let alignments = matches
        .get_one::<String>("alignments")
        .expect("--alignments is required");

    let format = matches
        .get_one::<String>("format")
        .map(|f| OutputFormat::from_str(f))
        .transpose()
        .map_err(|e| anyhow!(e))?
        .unwrap_or_default();

    let file_config = match matches.get_one::<String>("config") {
        Some(path) => MapperConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config file: {}", path))?,
        None => MapperConfig::default(),
    };
    let config = file_config.merge(config_from_matches(matches));

    let pipeline = Pipeline::new(&config)?.with_progress(matches.get_flag("progress"));

    info!("Reading alignment records from {}", alignments);
    let batch = read_alignment_file(Path::new(alignments))?;
    let output = pipeline.run(batch)?;

    match matches.get_one::<String>("output") {
        Some(path) => {
            output.calls.write_calls(path, format)?;
            info!("Wrote {} calls to {}", output.calls.len(), path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            match format {
                OutputFormat::Tsv => output.calls.write_tsv(&mut stdout)?,
                OutputFormat::Json => output.calls.write_json(&mut stdout)?,
            }
            stdout.flush()?;
        }
    }

    if let Some(path) = matches.get_one::<String>("summary") {
        let mut writer = get_dynamic_writer(Path::new(path))?;
        serde_json::to_writer_pretty(&mut writer, &output.summary)
            .with_context(|| format!("Failed to write run summary: {}", path))?;
        writer.flush()?;
    }

    for line in output.summary.to_string().lines() {
        info!("{}", line);
    }

    Ok(())
}
