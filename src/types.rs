use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::currency::{round2, EUR};
use crate::error::LookupError;

/// Games with a dedicated pricing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Pokemon,
    Yugioh,
    Magic,
}

pub const SUPPORTED_GAMES: &[&str] = &["pokemon", "yugioh", "magic"];

impl Game {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pokemon" => Some(Game::Pokemon),
            "yugioh" => Some(Game::Yugioh),
            "magic" => Some(Game::Magic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Game::Pokemon => "pokemon",
            Game::Yugioh => "yugioh",
            Game::Magic => "magic",
        }
    }
}

/// Grading context supplied per request. `company` stays a free-form string:
/// unknown companies fall through to multiplier 1 instead of being rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingInfo {
    pub company: String,
    pub grade: String,
}

/// Ungraded market value estimate, always denominated in EUR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrice {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<f64>,
    pub currency: String,
}

impl RawPrice {
    /// Synthesize a range around a single representative price. The pricing
    /// providers for Yu-Gi-Oh! and Magic publish one authoritative number per
    /// card, not a bid/ask range, so min/max are fabricated at an
    /// adapter-specific spread for UI consistency.
    pub fn from_spread(representative: f64, spread: f64) -> Self {
        RawPrice {
            min: round2(representative * (1.0 - spread)),
            max: round2(representative * (1.0 + spread)),
            avg: round2(representative),
            market: Some(round2(representative)),
            currency: EUR.to_string(),
        }
    }
}

/// Estimated value of a professionally graded copy, derived from
/// `RawPrice::avg` at response time. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedPrice {
    pub estimated: f64,
    pub multiplier: f64,
    pub currency: String,
}

/// Unified response shape returned to callers and persisted in the cache
/// (sans `graded_price`, which depends on per-request grading input).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLookupResult {
    pub card_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    pub raw_price: Option<RawPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded_price: Option<GradedPrice>,
    pub source: String,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Wire request for a price lookup. `game` arrives as a string so that an
/// unsupported value can be rejected with a message naming the supported set
/// rather than failing JSON deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    #[serde(default)]
    pub card_name: String,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    #[serde(default = "default_game")]
    pub game: String,
    pub grading: Option<GradingInfo>,
}

fn default_game() -> String {
    "pokemon".to_string()
}

/// Validated lookup input.
#[derive(Debug, Clone)]
pub struct CardQuery {
    pub card_name: String,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    pub game: Game,
    pub grading: Option<GradingInfo>,
}

impl CardQuery {
    pub fn from_request(req: LookupRequest) -> Result<Self, LookupError> {
        let card_name = req.card_name.trim().to_string();
        if card_name.is_empty() {
            return Err(LookupError::validation("cardName must not be empty"));
        }

        let game_name = if req.game.trim().is_empty() {
            "pokemon".to_string()
        } else {
            req.game
        };
        let game = Game::from_name(&game_name).ok_or_else(|| {
            LookupError::validation(format!(
                "unsupported game '{}' (supported: {})",
                game_name.trim(),
                SUPPORTED_GAMES.join(", ")
            ))
        })?;

        Ok(CardQuery {
            card_name,
            set_name: req.set_name.filter(|s| !s.trim().is_empty()),
            card_number: req.card_number.filter(|s| !s.trim().is_empty()),
            game,
            grading: req.grading,
        })
    }

    /// Composite cache key: name|set|number, empty string for absent fields.
    /// Grading is deliberately excluded; it never affects the cached record.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.card_name,
            self.set_name.as_deref().unwrap_or(""),
            self.card_number.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, game: &str) -> LookupRequest {
        LookupRequest {
            card_name: name.to_string(),
            game: game.to_string(),
            ..LookupRequest::default()
        }
    }

    #[test]
    fn empty_card_name_is_rejected() {
        let err = CardQuery::from_request(request("  ", "pokemon")).unwrap_err();
        assert!(err.to_string().contains("cardName"));
    }

    #[test]
    fn unsupported_game_is_rejected_with_supported_list() {
        let err = CardQuery::from_request(request("Charizard", "hearthstone")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("hearthstone"));
        assert!(msg.contains("pokemon"));
        assert!(msg.contains("yugioh"));
        assert!(msg.contains("magic"));
    }

    #[test]
    fn game_defaults_to_pokemon_when_omitted() {
        let req: LookupRequest = serde_json::from_str(r#"{"cardName":"Pikachu"}"#).unwrap();
        let query = CardQuery::from_request(req).unwrap();
        assert_eq!(query.game, Game::Pokemon);
    }

    #[test]
    fn cache_key_joins_fields_with_pipes() {
        let mut req = request("Charizard", "pokemon");
        req.set_name = Some("Base Set".to_string());
        let query = CardQuery::from_request(req).unwrap();
        assert_eq!(query.cache_key(), "Charizard|Base Set|");
    }

    #[test]
    fn spread_price_brackets_the_representative() {
        let raw = RawPrice::from_spread(10.0, 0.15);
        assert_eq!(raw.min, 8.5);
        assert_eq!(raw.max, 11.5);
        assert_eq!(raw.avg, 10.0);
        assert_eq!(raw.market, Some(10.0));
        assert_eq!(raw.currency, "EUR");
    }
}
