//! Per-invocation context threaded through selection, dispatch and reporting.
use crate::config::ReferenceConfig;
use crate::inputs::Inputs;
use crate::layout::OutputLayout;
use crate::manifest::Sample;
use crate::runner::RunnerSettings;

#[derive(Debug, Clone)]
pub struct RunContext {
    pub inputs: Inputs,
    pub layout: OutputLayout,
    pub runner: RunnerSettings,
}

impl RunContext {
    pub fn new(inputs: Inputs, runner: RunnerSettings) -> Self {
        let layout = OutputLayout::new(inputs.config.output_root());
        Self {
            inputs,
            layout,
            runner,
        }
    }

    pub fn config(&self) -> &ReferenceConfig {
        &self.inputs.config
    }

    pub fn samples(&self) -> &[Sample] {
        &self.inputs.sample_sheet.samples
    }

    /// Resolve pending identifiers back to their samples, keeping order.
    pub fn samples_by_id<'a>(&'a self, ids: &[String]) -> Vec<&'a Sample> {
        ids.iter()
            .filter_map(|id| self.samples().iter().find(|sample| &sample.sample_id == id))
            .collect()
    }
}
