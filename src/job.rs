//! # Jobs
//!
//! A job is one base image plus its overlay items, producing one PNG.
//!
//! ## Pipeline
//!
//! ```text
//! base image ──load──▶ Canvas ──item 0..N──▶ Canvas ──save──▶ <stem>_<index>.png
//!                         ▲                     │
//!                         └──── DrawState ◀─────┘
//! ```
//!
//! Items render in order. The first item that fails ends the job and its
//! error becomes the job's result.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::canvas::{Canvas, DrawState};
use crate::error::{JobError, ValidationError};
use crate::fsutil;
use crate::item::{self, ItemDescriptor};

/// One unit of work: a base image and the items drawn over it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    #[serde(rename = "baseimg", default)]
    pub base_image: String,
    #[serde(default)]
    pub items: Vec<ItemDescriptor>,
}

impl JobDescriptor {
    /// Pre-render check. Stops at the first problem found.
    pub fn check_params(&self) -> Result<(), ValidationError> {
        if !fsutil::is_file(&self.base_image) {
            return Err(ValidationError::MissingBaseImage(self.base_image.clone()));
        }

        for (i, item) in self.items.iter().enumerate() {
            item.check_params(i)?;
        }
        Ok(())
    }

    /// Output file name for this job at `index`: the base image's file name
    /// without its extension, followed by `_<index>.png`.
    pub fn output_file_name(&self, index: usize) -> String {
        let stem = Path::new(&self.base_image)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}_{}.png", stem, index)
    }
}

/// Render `job` and write it into `output_dir`. Returns the written path.
#[instrument(skip_all, fields(job = index, base = %job.base_image))]
pub fn run_job(job: &JobDescriptor, output_dir: &Path, index: usize) -> Result<PathBuf, JobError> {
    let base = image::open(&job.base_image).map_err(|e| JobError::BaseImage {
        path: job.base_image.clone(),
        reason: e.to_string(),
    })?;

    let mut canvas = Canvas::new(base);
    debug!(
        width = canvas.width(),
        height = canvas.height(),
        items = job.items.len(),
        "base image loaded"
    );

    let mut state = DrawState::default();
    for (i, it) in job.items.iter().enumerate() {
        state = item::render(it, &mut canvas, state)
            .map_err(|source| JobError::Render { item: i, source })?;
    }

    let path = output_dir.join(job.output_file_name(index));
    canvas.save_png(&path).map_err(|e| JobError::Persist {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    info!(file = %path.display(), "generated");
    Ok(path)
}
