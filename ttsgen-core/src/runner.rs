//! Drives a pipeline through a batch of samples.

use std::time::Duration;

use rand::seq::SliceRandom;
use tracing::{error, info, warn};

use crate::error::DatagenError;
use crate::pipeline::{SamplePipeline, SampleRequest};

/// Outcome counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct RunDriver<'a> {
    pipeline: &'a mut SamplePipeline,
    inter_sample_delay: Duration,
    voice: Option<String>,
    style: Option<String>,
}

impl<'a> RunDriver<'a> {
    pub fn new(pipeline: &'a mut SamplePipeline) -> Self {
        let inter_sample_delay = pipeline.settings().inter_sample_delay();
        Self {
            pipeline,
            inter_sample_delay,
            voice: None,
            style: None,
        }
    }

    pub fn with_inter_sample_delay(mut self, delay: Duration) -> Self {
        self.inter_sample_delay = delay;
        self
    }

    /// Pin every sample to one voice instead of drawing from the catalog
    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }

    /// Request `count` samples, each on a topic drawn from `topics`.
    ///
    /// Individual failures are counted and skipped. Credential exhaustion
    /// aborts the run.
    pub async fn run(
        &mut self,
        topics: &[String],
        count: usize,
    ) -> Result<RunSummary, DatagenError> {
        if topics.is_empty() {
            return Err(DatagenError::Configuration(
                "No topics available to generate from".to_string(),
            ));
        }

        let mut summary = RunSummary {
            requested: count,
            ..Default::default()
        };
        info!(count, topics = topics.len(), "Starting generation run");

        for index in 0..count {
            let Some(topic) = topics.choose(self.pipeline.rng_mut()).cloned() else {
                break;
            };
            info!("Sample {}/{}: {}", index + 1, count, topic);

            let request = SampleRequest {
                topic,
                voice: self.voice.clone(),
                style: self.style.clone(),
            };
            match self.pipeline.generate(request).await {
                Ok(Some(_)) => summary.succeeded += 1,
                Ok(None) => {
                    summary.failed += 1;
                    warn!("Sample {}/{} skipped", index + 1, count);
                }
                Err(e) => {
                    error!(
                        succeeded = summary.succeeded,
                        failed = summary.failed,
                        "Run aborted: {e}"
                    );
                    return Err(e);
                }
            }

            if index + 1 < count && !self.inter_sample_delay.is_zero() {
                self.pipeline.sleeper().sleep(self.inter_sample_delay).await;
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Generation run complete"
        );
        Ok(summary)
    }
}
