use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rstest::*;

use temap_core::models::{AlignedRead, Confidence, DiscardReason, Orientation, Strand, TeFamily};
use temap_mapper::cluster::cluster_reads;
use temap_mapper::config::AnchorWindowSource;
use temap_mapper::grouping::group_into_units;
use temap_mapper::{
    AnnotatedClipMatcher, CallsWrite, MapperConfig, MapperParams, OutputFormat, Pipeline,
    ReadClassifier, RecordBatch, read_alignment_file,
};

fn get_test_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/data/alignments")
        .join(file_name)
}

fn run_file(file_name: &str, config: &MapperConfig) -> temap_mapper::PipelineOutput {
    let batch = read_alignment_file(&get_test_path(file_name)).unwrap();
    Pipeline::new(config).unwrap().run(batch).unwrap()
}

#[fixture]
fn two_flanks_reads() -> Vec<AlignedRead> {
    read_alignment_file(&get_test_path("scenario_two_flanks.tsv"))
        .unwrap()
        .reads
}

mod scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_junction_and_anchor_flanks_give_high_call() {
        let output = run_file("scenario_two_flanks.tsv", &MapperConfig::default());

        assert_eq!(output.calls.len(), 1);
        let call = &output.calls[0];
        assert_eq!(call.contig, "2L");
        assert_eq!(call.estimated_position, 1005);
        assert_eq!(call.te_family, TeFamily::Named("TE_X".to_string()));
        assert_eq!(call.junction_support, 2);
        assert_eq!(call.anchor_support, 10);
        assert_eq!(call.flanks, 2);
        assert_eq!((call.upstream_support, call.downstream_support), (10, 2));
        assert_eq!((call.tsd_start, call.tsd_end), (Some(1005), Some(1018)));
        assert_eq!(call.orientation, Some(Orientation::Same));
        assert_eq!(call.confidence, Confidence::High);
    }

    #[rstest]
    fn test_evenly_split_families_are_ambiguous() {
        let output = run_file("scenario_mixed_family.tsv", &MapperConfig::default());

        assert_eq!(output.calls.len(), 1);
        let call = &output.calls[0];
        assert_eq!(call.te_family, TeFamily::Ambiguous);
        assert_eq!(call.confidence, Confidence::Low);
        assert_eq!(call.anchor_support, 10);
        assert_eq!(call.junction_support, 0);
        assert_eq!(call.estimated_position, 2104);
    }

    #[rstest]
    fn test_distant_anchor_groups_are_separate_calls() {
        let config = MapperConfig {
            window_size_anchor: Some(100),
            ..Default::default()
        };
        let output = run_file("scenario_separate_loci.tsv", &config);

        let calls: Vec<(u64, u64, u64, u32)> = output
            .calls
            .iter()
            .map(|c| (c.estimated_position, c.interval_start, c.interval_end, c.anchor_support))
            .collect();
        assert_eq!(calls, vec![(1001, 1000, 1003, 4), (1401, 1400, 1403, 4)]);
        assert!(output.calls.iter().all(|c| c.strand == Strand::Forward));
    }

    #[rstest]
    fn test_malformed_record_is_skipped_and_counted() {
        let output = run_file("scenario_malformed.tsv", &MapperConfig::default());

        assert_eq!(output.summary.records_read, 10);
        assert_eq!(output.summary.records_skipped, 1);
        assert_eq!(output.summary.skipped[0].line, 7);

        assert_eq!(output.calls.len(), 1);
        assert_eq!(output.calls[0].anchor_support, 4);
        assert_eq!(output.calls[0].junction_support, 1);
        assert_eq!(output.calls[0].confidence, Confidence::High);
    }
}

mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_discards_never_reach_clusters(two_flanks_reads: Vec<AlignedRead>) {
        let mut reads = two_flanks_reads;
        // a genome/genome pair and a lone genome read, both discarded
        let mut extra = reads[0].clone();
        extra.read_id = "gg".to_string();
        extra.mate = Some("gg".to_string());
        let mut mate = extra.clone();
        mate.strand = Strand::Reverse;
        mate.position += 250;
        let mut lone = extra.clone();
        lone.read_id = "lone".to_string();
        lone.mate = None;
        reads.extend([extra, mate, lone]);

        let params = MapperParams::default();
        let classifier = ReadClassifier::new(&params, &AnnotatedClipMatcher);
        let classified = classifier
            .classify_units(&group_into_units(reads))
            .unwrap();
        assert_eq!(classified.iter().filter(|r| r.is_discard()).count(), 2);

        let clusters = cluster_reads(
            classified.into_iter().map(std::sync::Arc::new).collect(),
            &params,
        )
        .unwrap();

        for (key, stream) in &clusters {
            let window = params.window_for(key.evidence);
            for cluster in stream {
                assert!(cluster.span() <= window);
                for member in &cluster.members {
                    assert!(!member.is_discard());
                    let bp = member.breakpoint.unwrap();
                    assert!(bp >= cluster.breakpoint_min && bp <= cluster.breakpoint_max);
                }
            }
        }
    }

    #[rstest]
    #[case(7)]
    #[case(42)]
    #[case(2024)]
    fn test_calls_do_not_depend_on_input_order(#[case] seed: u64) {
        let mut reads: Vec<AlignedRead> = Vec::new();
        for name in ["scenario_two_flanks.tsv", "scenario_mixed_family.tsv", "mixed.tsv.gz"] {
            reads.extend(read_alignment_file(&get_test_path(name)).unwrap().reads);
        }
        let pipeline = Pipeline::new(&MapperConfig::default()).unwrap();
        let expected = pipeline.run(RecordBatch::from(reads.clone())).unwrap();

        let mut rng = StdRng::seed_from_u64(seed);
        reads.shuffle(&mut rng);
        let shuffled = pipeline.run(RecordBatch::from(reads)).unwrap();

        assert_eq!(shuffled.calls, expected.calls);
        assert_eq!(shuffled.summary.classes, expected.summary.classes);
    }

    #[rstest]
    fn test_support_accounts_for_every_evidence_read() {
        let output = run_file("mixed.tsv.gz", &MapperConfig::default());
        let support: u64 = output.calls.iter().map(|c| c.total_support() as u64).sum();
        let evidence = output.summary.classes.junction + output.summary.classes.anchor;
        assert_eq!(support, evidence);
    }
}

mod pipeline {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_gzipped_input_and_estimated_window() {
        let output = run_file("mixed.tsv.gz", &MapperConfig::default());
        let summary = &output.summary;

        assert_eq!(summary.records_read, 26);
        assert_eq!(summary.window_size_anchor, 340);
        assert_eq!(summary.anchor_window_source, AnchorWindowSource::Estimated);

        assert_eq!(summary.classes.junction, 1);
        assert_eq!(summary.classes.anchor, 5);
        assert_eq!(summary.classes.discarded, 8);
        assert_eq!(summary.classes.discard_reasons[&DiscardReason::BothGenome], 5);
        assert_eq!(summary.classes.discard_reasons[&DiscardReason::BothTeLibrary], 1);
        assert_eq!(summary.classes.discard_reasons[&DiscardReason::Ambiguous], 1);
        assert_eq!(summary.classes.discard_reasons[&DiscardReason::NoTeEvidence], 1);

        // the junction read is clipped at its end, the same flank as the anchors
        assert_eq!(output.calls.len(), 1);
        let call = &output.calls[0];
        assert_eq!(call.contig, "X");
        assert_eq!(call.estimated_position, 869);
        assert_eq!((call.interval_start, call.interval_end), (800, 869));
        assert_eq!(call.flanks, 1);
        assert_eq!((call.upstream_support, call.downstream_support), (6, 0));
        assert_eq!(call.tsd_start, None);
        assert_eq!(call.confidence, Confidence::Medium);
    }

    #[rstest]
    fn test_junction_read_strand_does_not_change_the_call(
        #[values(Strand::Forward, Strand::Reverse)] strand: Strand,
    ) {
        let mut reads = read_alignment_file(&get_test_path("mixed.tsv.gz")).unwrap().reads;
        let expected = Pipeline::new(&MapperConfig::default())
            .unwrap()
            .run(RecordBatch::from(reads.clone()))
            .unwrap();

        for read in reads.iter_mut().filter(|r| r.read_id == "xj0") {
            read.strand = strand;
        }
        let output = Pipeline::new(&MapperConfig::default())
            .unwrap()
            .run(RecordBatch::from(reads))
            .unwrap();

        assert_eq!(output.calls, expected.calls);
        assert_eq!(output.calls[0].flanks, 1);
        assert_eq!(output.calls[0].confidence, Confidence::Medium);
    }

    #[rstest]
    fn test_failed_contig_is_isolated() {
        let output = run_file("contig_failure.tsv", &MapperConfig::default());

        assert_eq!(output.summary.failed_contigs.len(), 1);
        assert_eq!(output.summary.failed_contigs[0].contig, "3R");
        assert!(output.summary.failed_contigs[0].cause.contains("overflow"));

        assert_eq!(output.calls.len(), 1);
        assert_eq!(output.calls[0].contig, "2L");
        assert_eq!(output.calls[0].te_family, TeFamily::Named("blood".to_string()));
        assert_eq!(output.summary.contigs_processed, 1);
    }

    #[rstest]
    fn test_contig_allow_list() {
        let config = MapperConfig {
            contigs: Some(vec!["2L".to_string()]),
            ..Default::default()
        };
        let output = run_file("mixed.tsv.gz", &config);

        assert!(output.calls.is_empty());
        assert_eq!(
            output.summary.classes.discard_reasons[&DiscardReason::ExcludedContig],
            6
        );
    }

    #[rstest]
    #[case(OutputFormat::Tsv, "calls.tsv")]
    #[case(OutputFormat::Json, "calls.json")]
    fn test_write_calls(#[case] format: OutputFormat, #[case] name: &str) {
        let output = run_file("scenario_separate_loci.tsv", &MapperConfig {
            window_size_anchor: Some(100),
            ..Default::default()
        });

        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join(name);
        output.calls.write_calls(&path, format).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        match format {
            OutputFormat::Tsv => {
                let lines: Vec<&str> = text.lines().collect();
                assert_eq!(lines.len(), 3);
                assert_eq!(lines[0].split('\t').count(), 15);
                assert!(lines[1].starts_with("2R\t1001\t1000\t1003\t.\t.\t+\t+/+\troo\t"));
                assert!(lines[2].starts_with("2R\t1401\t"));
            }
            OutputFormat::Json => {
                let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
                assert_eq!(parsed.as_array().unwrap().len(), 2);
                assert_eq!(parsed[1]["estimated_position"], 1401);
            }
        }
    }
}
