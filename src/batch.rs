//! # Batch Runner
//!
//! Runs every job of a [`Config`] in order. A failing job is logged with its
//! index and base image and the batch moves on; nothing is retried.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::Config;
use crate::job;

/// A job that did not produce output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Zero-based job index.
    pub index: usize,
    pub base_image: String,
    pub error: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    /// Jobs attempted, successful or not.
    pub processed: usize,
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<JobFailure>,
}

impl BatchReport {
    /// `"processed/total"`, as logged after each job.
    pub fn progress(&self) -> String {
        format!("{}/{}", self.processed, self.total)
    }
}

/// Render every job in `config` into `output_dir`.
pub fn run_batch(config: &Config, output_dir: &Path) -> BatchReport {
    let mut report = BatchReport {
        total: config.files.len(),
        ..Default::default()
    };

    for (i, file) in config.files.iter().enumerate() {
        match job::run_job(file, output_dir, i) {
            Ok(path) => report.outputs.push(path),
            Err(e) => {
                error!(
                    progress = %format!("{}/{}", i + 1, report.total),
                    baseimg = %file.base_image,
                    error = %e,
                    "job failed"
                );
                report.failures.push(JobFailure {
                    index: i,
                    base_image: file.base_image.clone(),
                    error: e.to_string(),
                });
            }
        }

        report.processed += 1;
        info!(progress = %report.progress(), "complete");
    }

    info!(
        outputs = report.outputs.len(),
        failures = report.failures.len(),
        "all jobs finished"
    );
    report
}
