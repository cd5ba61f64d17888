//! Partition samples into finished and pending.
//!
//! Selection is a point-in-time snapshot of the output root; it is not
//! re-validated once dispatch begins.
use crate::completeness::{is_run_complete, is_sample_complete};
use crate::manifest::Sample;
use std::path::Path;

/// Samples split by completion state, each in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub finished: Vec<String>,
    pub pending: Vec<String>,
}

impl Selection {
    pub fn total(&self) -> usize {
        self.finished.len() + self.pending.len()
    }
}

/// True when the sample or any of its runs lacks a result artifact.
///
/// Every run is checked even after the first failure so all missing
/// artifacts get reported.
pub fn needs_execution(output_root: &Path, sample: &Sample) -> bool {
    let mut pending = !is_sample_complete(output_root, &sample.sample_id);
    let sample_dir = output_root.join(&sample.sample_id);
    if sample_dir.is_dir() {
        for run in &sample.runs {
            if !is_run_complete(&sample_dir, &run.run_id) {
                pending = true;
            }
        }
    }
    pending
}

pub fn partition(output_root: &Path, samples: &[Sample]) -> Selection {
    let mut selection = Selection::default();
    for sample in samples {
        if needs_execution(output_root, sample) {
            selection.pending.push(sample.sample_id.clone());
        } else {
            selection.finished.push(sample.sample_id.clone());
        }
    }
    selection
}

/// Identifiers of samples that still need to run, in manifest order.
pub fn select_pending(output_root: &Path, samples: &[Sample]) -> Vec<String> {
    partition(output_root, samples).pending
}
