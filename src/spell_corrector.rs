use std::sync::{Arc, Mutex};
use std::thread;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Endpoint de chat-completions de OpenAI
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Modelo usado para la corrección ortográfica
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Instrucción fija que antecede a la cadena consolidada. El texto (errores
/// incluidos) debe mantenerse byte a byte: es el prompt con el que se validó
/// el comportamiento del modelo.
pub const CORRECTION_PROMPT: &str = "You are a spelling correcting bot. Convert this string of characters into a words. some of the characters may be wrong. Sometimes characters are missing or extra or in the wrong order. Sometimes spaces are missing. Don't explain, just give me the answer. \n";

#[derive(Error, Debug)]
pub enum CorrectorError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response shape")]
    InvalidResponse,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Cliente de corrección ortográfica sobre la API de chat de OpenAI.
///
/// Cada letra consolidada dispara una petición con la cadena completa, en
/// modo fire-and-forget: la respuesta (si llega) se deposita en un slot
/// compartido y la última escritura gana. Los fallos se registran y se
/// descartan; la cadena consolidada nunca se ve afectada.
#[derive(Clone)]
pub struct SpellCorrector {
    endpoint: String,
    api_key: String,
    model: String,
}

impl SpellCorrector {
    pub fn new(api_key: String) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Lee la clave de `OPENAI_API_KEY`; sin ella no hay corrección.
    pub fn from_env() -> Result<Self, CorrectorError> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(CorrectorError::MissingApiKey),
        }
    }

    fn build_body(model: &str, committed: &str) -> serde_json::Value {
        json!({
            "model": model,
            "messages": [
                {
                    "role": "user",
                    "content": format!("{}{}", CORRECTION_PROMPT, committed),
                }
            ],
        })
    }

    /// Petición síncrona; el llamador decide en qué hilo corre.
    pub fn request_blocking(&self, committed: &str) -> Result<String, CorrectorError> {
        let body = Self::build_body(&self.model, committed);

        let response = ureq::post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => CorrectorError::Status {
                    code,
                    body: resp.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => CorrectorError::Transport(t.to_string()),
            })?;

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|_| CorrectorError::InvalidResponse)?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CorrectorError::InvalidResponse)
    }

    /// Lanza la corrección en un hilo propio y vuelve de inmediato. El
    /// resultado se escribe en `slot`; si hay varias peticiones en vuelo
    /// gana la que termine última, sin orden garantizado.
    pub fn request_correction(&self, committed: String, slot: Arc<Mutex<Option<String>>>) {
        let corrector = self.clone();
        thread::spawn(move || match corrector.request_blocking(&committed) {
            Ok(corrected) => {
                if let Ok(mut guard) = slot.lock() {
                    *guard = Some(corrected);
                }
            }
            Err(e) => {
                eprintln!("❌ Corrección fallida: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_carries_prompt_and_string() {
        let body = SpellCorrector::build_body(DEFAULT_MODEL, "HELLQ");
        assert_eq!(body["model"], DEFAULT_MODEL);

        let content = body["messages"][0]["content"].as_str().unwrap();
        assert!(content.starts_with(CORRECTION_PROMPT));
        assert!(content.ends_with("HELLQ"));
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_parses_chat_response() {
        let raw = r#"{
            "choices": [
                { "message": { "role": "assistant", "content": "HELLO" } }
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "HELLO");
    }

    #[test]
    fn test_from_env_requires_key() {
        // Sin variable (o vacía) el constructor debe fallar
        std::env::remove_var("OPENAI_API_KEY");
        assert!(matches!(
            SpellCorrector::from_env(),
            Err(CorrectorError::MissingApiKey)
        ));
    }
}
