use crate::ai::{error::AiError, provider::TextGenerator};
use std::sync::{Arc, Mutex};

/// Scripted outcome for mock collaborators
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MockBehavior {
    /// Return successful responses
    #[default]
    Success,
    /// Return a retryable error N times, then succeed
    RetryableErrorThenSuccess { remaining_errors: usize },
    /// Return a quota error N times, then succeed
    QuotaErrorThenSuccess { remaining_errors: usize },
    /// Always return a retryable error
    AlwaysRetryableError,
    /// Always return a quota error
    AlwaysQuotaError,
    /// Always return a non-retryable error
    AlwaysNonRetryableError,
    /// Play the queued behaviors in order, then fall back to success
    BehaviorQueue { behaviors: Vec<MockBehavior> },
}

impl MockBehavior {
    /// Decide the outcome of one call, advancing any countdown or queue.
    pub(crate) fn next_outcome(behavior: &mut MockBehavior) -> Result<(), AiError> {
        match behavior {
            MockBehavior::Success => Ok(()),
            MockBehavior::RetryableErrorThenSuccess { remaining_errors } => {
                if *remaining_errors == 0 {
                    return Ok(());
                }
                *remaining_errors -= 1;
                Err(AiError::Retryable(anyhow::anyhow!(
                    "Mock retryable error (remaining: {})",
                    remaining_errors
                )))
            }
            MockBehavior::QuotaErrorThenSuccess { remaining_errors } => {
                if *remaining_errors == 0 {
                    return Ok(());
                }
                *remaining_errors -= 1;
                Err(AiError::QuotaExceeded(anyhow::anyhow!(
                    "Mock 429 quota error (remaining: {})",
                    remaining_errors
                )))
            }
            MockBehavior::AlwaysRetryableError => Err(AiError::Retryable(anyhow::anyhow!(
                "Mock retryable error (always fails)"
            ))),
            MockBehavior::AlwaysQuotaError => Err(AiError::QuotaExceeded(anyhow::anyhow!(
                "Mock 429 quota error (always fails)"
            ))),
            MockBehavior::AlwaysNonRetryableError => Err(AiError::Terminal(anyhow::anyhow!(
                "Mock non-retryable error"
            ))),
            MockBehavior::BehaviorQueue { behaviors } => {
                if behaviors.is_empty() {
                    return Ok(());
                }
                let mut head = behaviors.remove(0);
                Self::next_outcome(&mut head)
            }
        }
    }
}

/// Mock text generator for testing
#[derive(Clone)]
pub struct MockTextGenerator {
    behavior: Arc<Mutex<MockBehavior>>,
    response_text: Arc<Mutex<String>>,
    call_count: Arc<Mutex<usize>>,
    captured_prompts: Arc<Mutex<Vec<String>>>,
}

impl MockTextGenerator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            response_text: Arc::new(Mutex::new(
                "  Plants catch sunlight in their leaves and turn it into sugar.  ".to_string(),
            )),
            call_count: Arc::new(Mutex::new(0)),
            captured_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn set_response_text(&self, text: impl Into<String>) {
        *self.response_text.lock().unwrap() = text.into();
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_captured_prompts(&self) -> Vec<String> {
        self.captured_prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextGenerator for MockTextGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, AiError> {
        self.captured_prompts
            .lock()
            .unwrap()
            .push(prompt.to_string());
        *self.call_count.lock().unwrap() += 1;

        {
            let mut behavior = self.behavior.lock().unwrap();
            MockBehavior::next_outcome(&mut behavior)?;
        }

        Ok(self.response_text.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_success() {
        let generator = MockTextGenerator::new(MockBehavior::Success);
        generator.set_response_text("Mock response");

        let text = generator.generate("model", "Test").await.unwrap();
        assert_eq!(text, "Mock response");
        assert_eq!(generator.get_call_count(), 1);
        assert_eq!(generator.get_captured_prompts(), vec!["Test".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_generator_quota_then_success() {
        let generator = MockTextGenerator::new(MockBehavior::QuotaErrorThenSuccess {
            remaining_errors: 2,
        });

        let result1 = generator.generate("model", "Test").await;
        assert!(matches!(result1, Err(AiError::QuotaExceeded(_))));

        let result2 = generator.generate("model", "Test").await;
        assert!(matches!(result2, Err(AiError::QuotaExceeded(_))));

        assert!(generator.generate("model", "Test").await.is_ok());
        assert_eq!(generator.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_behavior_queue_falls_back_to_success() {
        let generator = MockTextGenerator::new(MockBehavior::BehaviorQueue {
            behaviors: vec![
                MockBehavior::AlwaysRetryableError,
                MockBehavior::AlwaysNonRetryableError,
            ],
        });

        assert!(matches!(
            generator.generate("m", "p").await,
            Err(AiError::Retryable(_))
        ));
        assert!(matches!(
            generator.generate("m", "p").await,
            Err(AiError::Terminal(_))
        ));
        assert!(generator.generate("m", "p").await.is_ok());
    }
}
