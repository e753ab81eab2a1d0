//! Batch driver: classify, cluster and resolve every contig in parallel.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use log::{debug, info, warn};
use rayon::prelude::*;

use temap_core::models::{ClassifiedRead, InsertionCall};

use crate::adapter::RecordBatch;
use crate::classify::{AnnotatedClipMatcher, ClipMatcher, ReadClassifier};
use crate::cluster::cluster_reads;
use crate::config::{MapperConfig, MapperParams, ValidatedConfig};
use crate::emit::sort_calls;
use crate::errors::{ConfigError, MapperError, MapperResult};
use crate::grouping::{ContigBatch, group_into_units, partition_by_contig};
use crate::library::estimate_insert_size;
use crate::resolve::InsertionResolver;
use crate::summary::{ClassCounts, ContigFailure, RunSummary};

///
/// Shared flag that stops a run before its next contig starts. Contigs
/// already in progress run to completion.
///
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything one contig worker hands back.
#[derive(Debug, Default)]
pub struct ContigOutput {
    pub calls: Vec<InsertionCall>,
    pub classes: ClassCounts,
    pub clusters: u64,
}

enum ContigRun {
    Done(ContigOutput),
    Failed(MapperError),
    Cancelled,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub calls: Vec<InsertionCall>,
    pub summary: RunSummary,
}

pub struct Pipeline {
    config: ValidatedConfig,
    matcher: Box<dyn ClipMatcher>,
    cancel: CancelToken,
    progress: bool,
}

impl Pipeline {
    ///
    /// Validate the configuration and build a pipeline. Invalid parameters
    /// fail here, before any record is looked at.
    ///
    pub fn new(config: &MapperConfig) -> MapperResult<Self> {
        Ok(Pipeline {
            config: config.validate()?,
            matcher: Box::new(AnnotatedClipMatcher),
            cancel: CancelToken::new(),
            progress: false,
        })
    }

    pub fn with_matcher<M: ClipMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    ///
    /// Classify, cluster and resolve the units placed on one contig.
    ///
    pub fn process_contig(
        &self,
        batch: &ContigBatch,
        params: &MapperParams,
    ) -> MapperResult<ContigOutput> {
        let classifier = ReadClassifier::new(params, self.matcher.as_ref());

        let mut output = ContigOutput::default();
        let mut evidence: Vec<Arc<ClassifiedRead>> = Vec::new();
        for unit in &batch.units {
            let read = classifier.classify_unit(unit)?;
            output.classes.record(&read);
            if !read.is_discard() {
                evidence.push(Arc::new(read));
            }
        }

        let clusters = cluster_reads(evidence, params)?;
        output.clusters = clusters.values().map(|c| c.len() as u64).sum();
        output.calls = InsertionResolver::new(params).resolve(&batch.contig, clusters);

        debug!(
            "{}: {} junction, {} anchor, {} clusters, {} calls",
            batch.contig,
            output.classes.junction,
            output.classes.anchor,
            output.clusters,
            output.calls.len()
        );
        Ok(output)
    }

    ///
    /// Run the whole batch. A contig that fails is reported in the summary and
    /// contributes no calls; the other contigs are unaffected.
    ///
    pub fn run(&self, batch: RecordBatch) -> MapperResult<PipelineOutput> {
        let records_read = batch.records_read();
        let skipped = batch.skipped;
        let units = group_into_units(batch.reads);

        let estimate = match self.config.needs_insert_size_estimate() {
            true => estimate_insert_size(&units),
            false => None,
        };
        let params = self.config.resolve(estimate);
        info!(
            "Anchor window: {} bp ({})",
            params.window_size_anchor, params.anchor_window_source
        );

        let mut summary = RunSummary::new(params.window_size_anchor, params.anchor_window_source);
        summary.records_read = records_read;
        summary.records_skipped = skipped.len() as u64;
        summary.skipped = skipped;

        let (batches, unplaced) = partition_by_contig(units);

        let classifier = ReadClassifier::new(&params, self.matcher.as_ref());
        for unit in &unplaced {
            summary.classes.record(&classifier.classify_unit(unit)?);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;

        let bar = match self.progress {
            true => ProgressBar::new(batches.len() as u64),
            false => ProgressBar::hidden(),
        };

        info!("Processing {} contigs", batches.len());
        let results: Vec<(&str, ContigRun)> = pool.install(|| {
            batches
                .par_iter()
                .map(|batch| {
                    let run = if self.cancel.is_cancelled() {
                        ContigRun::Cancelled
                    } else {
                        match self.process_contig(batch, &params) {
                            Ok(output) => ContigRun::Done(output),
                            Err(e) => ContigRun::Failed(e),
                        }
                    };
                    bar.inc(1);
                    (batch.contig.as_str(), run)
                })
                .collect()
        });
        bar.finish_and_clear();

        let mut calls: Vec<InsertionCall> = Vec::new();
        for (contig, run) in results {
            match run {
                ContigRun::Done(output) => {
                    summary.contigs_processed += 1;
                    summary.clusters_formed += output.clusters;
                    summary.classes.merge(&output.classes);
                    calls.extend(output.calls);
                }
                ContigRun::Failed(e) => {
                    let failure = ContigFailure::new(contig, &e);
                    warn!("{}", failure);
                    summary.failed_contigs.push(failure);
                }
                ContigRun::Cancelled => summary.cancelled_contigs.push(contig.to_string()),
            }
        }
        if !summary.cancelled_contigs.is_empty() {
            warn!(
                "Run cancelled, {} contigs not processed",
                summary.cancelled_contigs.len()
            );
        }

        sort_calls(&mut calls);
        summary.calls_emitted = calls.len() as u64;

        Ok(PipelineOutput { calls, summary })
    }
}
