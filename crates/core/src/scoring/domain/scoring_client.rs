use serde::Deserialize;
use thiserror::Error;

use crate::session::payload::SessionPayload;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("payload could not be encoded: {0}")]
    Encode(String),
    #[error("request to scoring service failed: {0}")]
    Transport(String),
    #[error("scoring service returned {code}: {detail}")]
    Status { code: u16, detail: String },
    #[error("scoring service returned an invalid body: {0}")]
    InvalidResponse(String),
}

/// Verdict returned by the scoring service.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Verdict {
    /// Liveness confidence in [0, 1].
    pub score: f64,
    pub is_real: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Option<VerdictDetails>,
}

/// Optional per-component breakdown; servers may omit any of it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VerdictDetails {
    #[serde(default)]
    pub motion_consistency: Option<f64>,
    #[serde(default)]
    pub visual_liveness: Option<f64>,
    #[serde(default)]
    pub frames_processed: Option<usize>,
}

/// External scoring collaborator: takes the finished payload, returns a
/// verdict. Transport details live in infrastructure.
pub trait ScoringClient: Send {
    fn score(&self, payload: &SessionPayload) -> Result<Verdict, ScoringError>;
}
