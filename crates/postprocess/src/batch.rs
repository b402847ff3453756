//! Parallel processing of many documents.

use crate::error::PipelineError;
use crate::markdown::Settings;
use crate::options::PostprocessOptions;
use crate::pipeline::{DocumentOptions, ProcessedDocument, process_document};
use crate::postprocess::Postprocessor;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A single document to process.
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Document identifier (typically the file path).
    pub id: String,
    /// Markdown/MDX source content.
    pub source: String,
    /// Optional path used in error locations.
    pub path: Option<PathBuf>,
}

/// Result for a single document in a batch.
#[derive(Debug)]
pub struct BatchResult {
    /// Document identifier matching the input.
    pub id: String,
    /// The processed document or the error that stopped it.
    pub outcome: Result<ProcessedDocument, PipelineError>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    /// Number of inputs.
    pub total: u32,
    /// Number of documents processed successfully.
    pub succeeded: u32,
    /// Number of documents that failed.
    pub failed: u32,
    /// Wall time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to rayon's global pool.
    pub max_threads: Option<usize>,
    /// Whether to continue after an error. Defaults to true; when false,
    /// documents are processed in order and processing stops at the first failure.
    pub continue_on_error: bool,
    /// Postprocessor options used for every document.
    pub options: PostprocessOptions,
    /// Markdown settings used for every document.
    pub settings: Settings,
    /// Store each document's table of contents as `toc`.
    pub generate_toc: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_threads: None,
            continue_on_error: true,
            options: PostprocessOptions::default(),
            settings: Settings::default(),
            generate_toc: false,
        }
    }
}

/// Results in input order plus statistics.
#[derive(Debug)]
pub struct BatchOutput {
    /// Per-document results; shorter than the input when processing stopped early.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Processes `inputs`, each worker thread using its own [`Postprocessor`].
pub fn process_batch(inputs: Vec<BatchInput>, options: &BatchOptions) -> BatchOutput {
    let start = Instant::now();

    let pool = options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| log::warn!("falling back to the global thread pool: {err}"))
            .ok()
    });

    let total = inputs.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let new_processor =
        || Postprocessor::new(options.options.clone()).with_settings(options.settings.clone());

    let process_input = |processor: &mut Postprocessor, input: BatchInput| -> BatchResult {
        let document = DocumentOptions {
            path: input.path,
            frontmatter: None,
            generate_toc: options.generate_toc,
        };
        let outcome = process_document(&input.source, &document, processor);
        match &outcome {
            Ok(_) => succeeded.fetch_add(1, Ordering::Relaxed),
            Err(err) => {
                log::debug!("failed to process `{}`: {err}", input.id);
                failed.fetch_add(1, Ordering::Relaxed)
            }
        };
        BatchResult {
            id: input.id,
            outcome,
        }
    };

    let results: Vec<BatchResult> = if options.continue_on_error {
        let run = || {
            inputs
                .into_par_iter()
                .map_init(new_processor, process_input)
                .collect::<Vec<_>>()
        };
        match pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    } else {
        let mut processor = new_processor();
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(&mut processor, input);
            let stop = result.outcome.is_err();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    let elapsed = start.elapsed();
    BatchOutput {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: elapsed.as_secs_f64() * 1000.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str, source: &str) -> BatchInput {
        BatchInput {
            id: id.into(),
            source: source.into(),
            path: None,
        }
    }

    fn inputs() -> Vec<BatchInput> {
        vec![
            input("a", "# A"),
            input("broken", "# B\n\n{unclosed"),
            input("c", "# C"),
        ]
    }

    #[test]
    fn continues_past_errors_in_order() {
        let output = process_batch(
            inputs(),
            &BatchOptions {
                max_threads: Some(2),
                ..Default::default()
            },
        );

        let ids: Vec<_> = output.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "broken", "c"]);
        assert_eq!(output.stats.total, 3);
        assert_eq!(output.stats.succeeded, 2);
        assert_eq!(output.stats.failed, 1);

        let title = |i: usize| {
            let document = output.results[i].outcome.as_ref().unwrap();
            document.file.frontmatter.as_ref().unwrap()["title"].clone()
        };
        assert_eq!(title(0), "A");
        assert_eq!(title(2), "C");
    }

    #[test]
    fn stops_at_first_error() {
        let output = process_batch(
            inputs(),
            &BatchOptions {
                continue_on_error: false,
                ..Default::default()
            },
        );
        assert_eq!(output.results.len(), 2);
        assert!(output.results[1].outcome.is_err());
        assert_eq!(output.stats.succeeded, 1);
        assert_eq!(output.stats.failed, 1);
    }

    #[test]
    fn empty_batch() {
        let output = process_batch(Vec::new(), &BatchOptions::default());
        assert!(output.results.is_empty());
        assert_eq!(output.stats.total, 0);
    }
}
