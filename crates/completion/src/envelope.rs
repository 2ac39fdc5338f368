//! Turns a fallback outcome into the response sent to the canvas.

use crate::{fallback::Outcome, messages::AiResponse};

/// Apology when the free-tier request limit or quota was reached.
pub(crate) const RATE_LIMIT_APOLOGY: &str = "Lo siento, no pude procesar tu pregunta en este momento. \
     He alcanzado el límite de requests gratuitos de Groq. Intenta de nuevo en unos momentos.";

/// Apology for every other failure.
pub(crate) const UNAVAILABLE_APOLOGY: &str = "Lo siento, no pude procesar tu pregunta en este momento. \
     El servicio de IA podría estar temporalmente no disponible. Intenta de nuevo en unos momentos.";

pub(crate) fn build(outcome: Outcome) -> AiResponse {
    match outcome {
        Outcome::Answered { text, .. } => AiResponse {
            message: text,
            success: true,
            error: None,
        },
        Outcome::Exhausted { primary, secondary } => {
            let message = if primary.is_rate_limit() || secondary.is_rate_limit() {
                RATE_LIMIT_APOLOGY
            } else {
                UNAVAILABLE_APOLOGY
            };

            AiResponse {
                message: message.to_string(),
                success: false,
                error: Some(secondary.to_string()),
            }
        }
    }
}
