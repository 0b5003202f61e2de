//! HTTP client for the translation endpoint.
//!
//! Sends the recorded WAV as multipart form data and parses the JSON response.
//! The endpoint is unauthenticated and requests are not retried; a failed
//! attempt is terminal and the user records again.

use anyhow::anyhow;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::StatusCode;
use serde::Deserialize;

/// Endpoint used when the config does not override it.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/translate";

/// A successful translation: recognized text, translated text, and the
/// synthesized speech decoded from the response's base64 payload.
#[derive(Debug, Clone)]
pub struct Translation {
    pub original_text: String,
    pub translated_text: String,
    /// MP3 bytes of the spoken translation
    pub speech: Vec<u8>,
}

/// Wire shape of the endpoint response. Every field is optional because the
/// endpoint returns either the three result fields or a lone `error`.
#[derive(Debug, Deserialize)]
struct TranslateBody {
    #[serde(default)]
    original_text: Option<String>,
    #[serde(default)]
    translated_text: Option<String>,
    #[serde(default)]
    audio_data: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the translation endpoint.
pub struct TranslatorClient {
    endpoint: String,
    client: reqwest::Client,
}

impl TranslatorClient {
    /// Creates a client for the given endpoint URL. No timeout is configured;
    /// the transport default applies.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Translates one recording.
    ///
    /// The multipart body carries the WAV bytes as `audio` (audio/wav) and the
    /// language code as `target_lang`, matching what the endpoint expects.
    ///
    /// # Errors
    /// - If the endpoint is unreachable or the request times out
    /// - If the response is not JSON or is missing result fields
    /// - If the response carries an `error` field (returned verbatim)
    /// - If the `audio_data` payload is not valid base64
    pub async fn translate(
        &self,
        wav: Vec<u8>,
        target_lang: &str,
    ) -> anyhow::Result<Translation> {
        let wav_len = wav.len();
        let file_part = reqwest::multipart::Part::bytes(wav)
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(|e| anyhow!("Failed to build audio upload part: {e}"))?;

        let form = reqwest::multipart::Form::new()
            .part("audio", file_part)
            .text("target_lang", target_lang.to_string());

        tracing::debug!(
            "Translate request: POST {} ({} WAV bytes, target_lang={})",
            self.endpoint,
            wav_len,
            target_lang
        );

        let response = match self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_connect() {
                    "Failed to connect to the translation endpoint. Is the server running?"
                        .to_string()
                } else if e.is_timeout() {
                    "Translation request timed out. The endpoint is not responding.".to_string()
                } else {
                    format!("Translation network error: {e}")
                };
                return Err(anyhow!(error_msg));
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read translation response: {e}"))?;

        tracing::debug!("Translate response: status {status}, {} bytes", body.len());

        parse_response(status, &body)
    }
}

/// Interprets the endpoint response.
///
/// An `error` field wins over everything else, including the HTTP status, and
/// is surfaced verbatim so the UI shows exactly what the service reported.
fn parse_response(status: StatusCode, body: &str) -> anyhow::Result<Translation> {
    let parsed: TranslateBody = serde_json::from_str(body).map_err(|e| {
        tracing::debug!("Unparseable translation response: {e}");
        anyhow!("Translation service error. Please try again.")
    })?;

    if let Some(error) = parsed.error {
        if !error.is_empty() {
            return Err(anyhow!(error));
        }
    }

    if !status.is_success() {
        return Err(anyhow!(
            "Translation service error (status {status}). Please try again."
        ));
    }

    match (parsed.original_text, parsed.translated_text, parsed.audio_data) {
        (Some(original_text), Some(translated_text), Some(audio_data)) => {
            let speech = BASE64.decode(audio_data.as_bytes()).map_err(|e| {
                tracing::debug!("Bad audio_data payload: {e}");
                anyhow!("Translation service error. Please try again.")
            })?;
            Ok(Translation {
                original_text,
                translated_text,
                speech,
            })
        }
        _ => {
            tracing::debug!("Translation response missing result fields");
            Err(anyhow!("Translation service error. Please try again."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_response() {
        let body = r#"{
            "original_text": "Hola",
            "translated_text": "Hello",
            "audio_data": "aGVsbG8="
        }"#;
        let translation = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(translation.original_text, "Hola");
        assert_eq!(translation.translated_text, "Hello");
        assert_eq!(translation.speech, b"hello");
    }

    #[test]
    fn error_field_is_surfaced_verbatim() {
        let body = r#"{"error": "no speech detected"}"#;
        let err = parse_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(err.to_string(), "no speech detected");
    }

    #[test]
    fn error_field_wins_even_on_ok_status() {
        let body = r#"{"error": "engine overloaded"}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.to_string(), "engine overloaded");
    }

    #[test]
    fn non_json_body_is_a_service_error() {
        let err = parse_response(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(err.to_string().contains("Translation service error"));
    }

    #[test]
    fn missing_fields_are_a_service_error() {
        let body = r#"{"original_text": "Hola"}"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert!(err.to_string().contains("Translation service error"));
    }

    #[test]
    fn undecodable_audio_is_a_service_error() {
        let body = r#"{
            "original_text": "Hola",
            "translated_text": "Hello",
            "audio_data": "not base64!!!"
        }"#;
        let err = parse_response(StatusCode::OK, body).unwrap_err();
        assert!(err.to_string().contains("Translation service error"));
    }

    #[test]
    fn http_error_without_error_field_is_a_service_error() {
        let err = parse_response(StatusCode::INTERNAL_SERVER_ERROR, "{}").unwrap_err();
        assert!(err.to_string().contains("status 500"));
    }
}
