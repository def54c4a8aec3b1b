use reqwest::blocking::multipart::{Form, Part};

use crate::scoring::domain::scoring_client::{ScoringClient, ScoringError, Verdict};
use crate::session::payload::SessionPayload;

/// Blocking HTTP client for the scoring service.
///
/// The payload JSON goes up as multipart part `file` (`liveness.json`);
/// the still image, when present, as part `image` (`capture.jpg`). An
/// optional extra header is attached to every request for tunnel
/// interstitial bypass.
pub struct HttpScoringClient {
    base_url: String,
    bypass_header: Option<(String, String)>,
    client: reqwest::blocking::Client,
}

impl HttpScoringClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            bypass_header: None,
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn with_bypass_header(mut self, name: &str, value: &str) -> Self {
        self.bypass_header = Some((name.to_string(), value.to_string()));
        self
    }

    fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url)
    }
}

impl ScoringClient for HttpScoringClient {
    fn score(&self, payload: &SessionPayload) -> Result<Verdict, ScoringError> {
        let json = payload
            .to_json()
            .map_err(|e| ScoringError::Encode(e.to_string()))?;

        let mut form = Form::new().part(
            "file",
            Part::bytes(json.into_bytes())
                .file_name("liveness.json")
                .mime_str("application/json")
                .map_err(|e| ScoringError::Encode(e.to_string()))?,
        );
        if let Some(jpeg) = &payload.still_jpeg {
            form = form.part(
                "image",
                Part::bytes(jpeg.clone())
                    .file_name("capture.jpg")
                    .mime_str("image/jpeg")
                    .map_err(|e| ScoringError::Encode(e.to_string()))?,
            );
        }

        let mut request = self.client.post(self.predict_url()).multipart(form);
        if let Some((name, value)) = &self.bypass_header {
            request = request.header(name.as_str(), value.as_str());
        }

        log::debug!(
            "posting {} frames to {}",
            payload.meta.frame_count,
            self.predict_url()
        );
        let response = request
            .send()
            .map_err(|e| ScoringError::Transport(e.to_string()))?;

        let code = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ScoringError::Transport(e.to_string()))?;

        if !(200..300).contains(&code) {
            return Err(ScoringError::Status {
                code,
                detail: extract_detail(&body),
            });
        }
        serde_json::from_str(&body).map_err(|e| ScoringError::InvalidResponse(e.to_string()))
    }
}

/// Pull the human-readable error out of a `{"detail": ...}` or
/// `{"message": ...}` body, falling back to a truncated raw body.
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let mut detail = body.trim().to_string();
    if detail.len() > 200 {
        let mut end = 200;
        while !detail.is_char_boundary(end) {
            end -= 1;
        }
        detail.truncate(end);
    }
    detail
}
