use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use super::provider::GenderClassifier;
use crate::labeling::Gender;
use crate::voice::audio::Waveform;

/// Mock classifier returning a fixed label, or failing on demand
#[derive(Clone)]
pub struct MockClassifier {
    label: Arc<Mutex<Option<Gender>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockClassifier {
    pub fn new(label: Gender) -> Self {
        Self {
            label: Arc::new(Mutex::new(Some(label))),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// A classifier whose every call fails
    pub fn failing() -> Self {
        Self {
            label: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_label(&self, label: Option<Gender>) {
        *self.label.lock().unwrap() = label;
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl GenderClassifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn classify(&self, waveform: &Waveform) -> Result<Gender> {
        *self.call_count.lock().unwrap() += 1;
        if waveform.samples.is_empty() {
            anyhow::bail!("Mock classifier received an empty waveform");
        }
        let label = *self.label.lock().unwrap();
        label.ok_or_else(|| anyhow::anyhow!("Mock classifier failure"))
    }
}
