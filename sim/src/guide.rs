//! Field guide: hunting tips, strategy and artwork from a generative backend.
//!
//! The backend is an external service. Every request fails open: errors and
//! empty replies turn into fixed fallback text (or `None` for images) and a
//! warning in the log, so a dead backend never interrupts a hunt.

use crate::species::Species;
use crate::systems::population::HuntRecord;
use thiserror::Error;

pub const TIP_ERROR_FALLBACK: &str = "Listen to the forest closely.";
pub const TIP_EMPTY_FALLBACK: &str = "Stay low, watch the shadows.";
pub const STRATEGY_ERROR_FALLBACK: &str = "The forest remains mysterious. Adapt your tactics.";
pub const STRATEGY_EMPTY_FALLBACK: &str = "Continue your patient vigil.";

/// Failure reported by a guide backend.
#[derive(Debug, Error)]
pub enum GuideError {
    #[error("guide backend unavailable: {0}")]
    Unavailable(String),
    #[error("guide request rejected: {0}")]
    Rejected(String),
}

/// Request/response contract of a generative backend.
pub trait GuideBackend {
    /// A short tip for tracking `species`.
    fn quick_tip(&self, species: Species) -> Result<String, GuideError>;

    /// A longer strategy from a summary of the hunt so far.
    fn strategy(&self, history: &str) -> Result<String, GuideError>;

    /// An image (as a data URL) for `prompt`, or `None` if the backend made none.
    fn artwork(&self, prompt: &str, aspect_ratio: &str) -> Result<Option<String>, GuideError>;

    /// A modified version of `image` following `instruction`.
    fn edit_artwork(&self, image: &str, instruction: &str) -> Result<Option<String>, GuideError>;
}

/// Backend used when no service is configured. Every request errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGuide;

impl GuideBackend for OfflineGuide {
    fn quick_tip(&self, _species: Species) -> Result<String, GuideError> {
        Err(GuideError::Unavailable("offline".into()))
    }

    fn strategy(&self, _history: &str) -> Result<String, GuideError> {
        Err(GuideError::Unavailable("offline".into()))
    }

    fn artwork(&self, _prompt: &str, _aspect_ratio: &str) -> Result<Option<String>, GuideError> {
        Err(GuideError::Unavailable("offline".into()))
    }

    fn edit_artwork(&self, _image: &str, _instruction: &str) -> Result<Option<String>, GuideError> {
        Err(GuideError::Unavailable("offline".into()))
    }
}

/// Fail-open wrapper around a [`GuideBackend`].
#[derive(Debug, Default)]
pub struct FieldGuide<B: GuideBackend> {
    backend: B,
}

impl<B: GuideBackend> FieldGuide<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn quick_tip(&self, species: Species) -> String {
        match self.backend.quick_tip(species) {
            Ok(text) => non_empty_or(text, TIP_EMPTY_FALLBACK),
            Err(e) => {
                log::warn!("Quick tip for {} failed: {}", species.as_str(), e);
                TIP_ERROR_FALLBACK.to_string()
            }
        }
    }

    pub fn strategy(&self, log: &[HuntRecord]) -> String {
        match self.backend.strategy(&summarize_hunt(log)) {
            Ok(text) => non_empty_or(text, STRATEGY_EMPTY_FALLBACK),
            Err(e) => {
                log::warn!("Strategy request failed: {}", e);
                STRATEGY_ERROR_FALLBACK.to_string()
            }
        }
    }

    pub fn artwork(&self, prompt: &str) -> Option<String> {
        self.backend
            .artwork(prompt, "16:9")
            .unwrap_or_else(|e| {
                log::warn!("Artwork generation failed: {}", e);
                None
            })
    }

    pub fn edit_artwork(&self, image: &str, instruction: &str) -> Option<String> {
        self.backend
            .edit_artwork(image, instruction)
            .unwrap_or_else(|e| {
                log::warn!("Artwork edit failed: {}", e);
                None
            })
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// One line per kill, oldest first, as sent to the strategy request.
pub fn summarize_hunt(log: &[HuntRecord]) -> String {
    if log.is_empty() {
        return "No kills yet.".to_string();
    }
    log.iter()
        .map(|r| {
            format!(
                "{} at {:.0}m, t={:.0}s, +{}",
                r.species.as_str(),
                r.distance,
                r.timestamp_ms as f64 / 1000.0,
                r.score
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);

    impl GuideBackend for Canned {
        fn quick_tip(&self, _species: Species) -> Result<String, GuideError> {
            Ok(self.0.to_string())
        }
        fn strategy(&self, _history: &str) -> Result<String, GuideError> {
            Ok(self.0.to_string())
        }
        fn artwork(&self, prompt: &str, _aspect_ratio: &str) -> Result<Option<String>, GuideError> {
            Ok(Some(format!("data:image/png;base64,{}", prompt)))
        }
        fn edit_artwork(&self, _image: &str, _instruction: &str) -> Result<Option<String>, GuideError> {
            Ok(None)
        }
    }

    #[test]
    fn test_offline_falls_back() {
        let guide = FieldGuide::new(OfflineGuide);
        assert_eq!(guide.quick_tip(Species::Deer), TIP_ERROR_FALLBACK);
        assert_eq!(guide.strategy(&[]), STRATEGY_ERROR_FALLBACK);
        assert_eq!(guide.artwork("a stag at dawn"), None);
        assert_eq!(guide.edit_artwork("img", "add fog"), None);
    }

    #[test]
    fn test_empty_replies_fall_back() {
        let guide = FieldGuide::new(Canned("   "));
        assert_eq!(guide.quick_tip(Species::Wolf), TIP_EMPTY_FALLBACK);
        let guide = FieldGuide::new(Canned(""));
        assert_eq!(guide.strategy(&[]), STRATEGY_EMPTY_FALLBACK);
    }

    #[test]
    fn test_replies_pass_through() {
        let guide = FieldGuide::new(Canned("Follow the blood. "));
        assert_eq!(guide.quick_tip(Species::Bear), "Follow the blood.");
        assert!(guide.artwork("bear").unwrap().ends_with("bear"));
    }

    #[test]
    fn test_summary_lists_kills() {
        let log = [
            HuntRecord { id: 1, species: Species::Deer, timestamp_ms: 61_000, distance: 42.4, score: 50 },
            HuntRecord { id: 7, species: Species::Bear, timestamp_ms: 300_000, distance: 12.0, score: 200 },
        ];
        assert_eq!(summarize_hunt(&log), "deer at 42m, t=61s, +50; bear at 12m, t=300s, +200");
        assert_eq!(summarize_hunt(&[]), "No kills yet.");
    }
}
