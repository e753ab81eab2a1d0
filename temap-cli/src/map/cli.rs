use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const MAP_CMD: &str = "map";

fn signed_option(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(false)
        .value_parser(value_parser!(i64))
        .allow_negative_numbers(true)
        .help(help)
}

pub fn create_map_cli() -> Command {
    Command::new(MAP_CMD)
        .author("Databio")
        .about("Classify, cluster and resolve aligned reads into TE insertion calls.")
        .arg(
            arg!(--alignments <ALIGNMENTS>)
                .required(true)
                .help("Path to the aligner's record table (.tsv or .tsv.gz)"),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("TOML file with mapper options; flags given here override it"),
        )
        .arg(
            arg!(--output <OUTPUT>)
                .required(false)
                .help("Output path for the calls (default: stdout)"),
        )
        .arg(
            arg!(--format <FORMAT>)
                .required(false)
                .default_value("tsv")
                .help("Output format: tsv or json"),
        )
        .arg(
            arg!(--summary <SUMMARY>)
                .required(false)
                .help("Write the run summary as JSON to this path"),
        )
        .arg(
            arg!(--threads <THREADS>)
                .required(false)
                .value_parser(value_parser!(usize))
                .help("Number of worker threads (default: all cores)"),
        )
        .arg(signed_option(
            "window-size-junction",
            "Clustering window for junction breakpoints, in bp",
        ))
        .arg(signed_option(
            "window-size-anchor",
            "Clustering window for anchor breakpoints, in bp (default: library insert size)",
        ))
        .arg(signed_option(
            "insert-size",
            "Library insert size, used as the anchor window when none is given",
        ))
        .arg(signed_option(
            "min-junction-clip",
            "Minimum soft-clip length for a junction read",
        ))
        .arg(signed_option(
            "min-anchor-support",
            "Minimum anchor reads for a HIGH confidence call",
        ))
        .arg(signed_option(
            "family-ambiguity-margin",
            "Maximum read-count lead of the top TE family that still counts as ambiguous",
        ))
        .arg(
            Arg::new("contigs")
                .long("contigs")
                .required(false)
                .num_args(1..)
                .help("Only call insertions on these genome contigs"),
        )
        .arg(
            Arg::new("progress")
                .long("progress")
                .action(ArgAction::SetTrue)
                .help("Show a progress bar over contigs"),
        )
}
