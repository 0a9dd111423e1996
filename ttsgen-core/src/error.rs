use thiserror::Error;

/// Errors that stop sample generation outright.
///
/// Everything else (quota hits, network failures, malformed responses,
/// classifier failures) is absorbed by the pipeline's retry loop and only
/// shows up as a missing sample.
#[derive(Error, Debug)]
pub enum DatagenError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("All {tried} credentials exhausted by quota failures")]
    CredentialsExhausted { tried: usize },
}
