//! Translation service client.
//!
//! Ships recorded audio to the translation endpoint and parses the combined
//! speech-recognition / translation / text-to-speech response.

pub mod api;
pub mod language;

pub use api::{Translation, TranslatorClient};
