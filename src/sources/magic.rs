use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{soft_result, PriceSource};
use crate::currency::{Currency, FxRates};
use crate::types::{CardQuery, PriceLookupResult, RawPrice};

/// Scryfall (scryfall.com). Fuzzy-name lookup, set/number appended to the
/// fuzzy string when supplied; native EUR price preferred over USD. The ±15%
/// min/max band is synthesized.
pub struct Scryfall {
    client: reqwest::Client,
    base_url: String,
    fx: FxRates,
}

const SPREAD: f64 = 0.15;

impl Scryfall {
    pub fn new(client: reqwest::Client, base_url: String, fx: FxRates) -> Self {
        Self {
            client,
            base_url,
            fx,
        }
    }

    fn fuzzy_query(query: &CardQuery) -> String {
        let mut fuzzy = query.card_name.clone();
        if let Some(set) = &query.set_name {
            fuzzy.push(' ');
            fuzzy.push_str(set);
        }
        if let Some(number) = &query.card_number {
            fuzzy.push(' ');
            fuzzy.push_str(number);
        }
        fuzzy
    }
}

#[async_trait]
impl PriceSource for Scryfall {
    fn name(&self) -> &str {
        "scryfall"
    }

    async fn fetch(&self, query: &CardQuery) -> Result<PriceLookupResult> {
        let url = format!("{}/cards/named", self.base_url);
        let fuzzy = Self::fuzzy_query(query);

        let resp = self
            .client
            .get(&url)
            .query(&[("fuzzy", fuzzy.as_str())])
            .send()
            .await
            .context("Scryfall request failed")?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(soft_result(query, self.name(), "Card not found"));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Scryfall HTTP {}: {}", status, body);
        }

        let card: Value = resp.json().await.context("Scryfall parse failed")?;

        let card_id = card["id"].as_str().map(|s| s.to_string());
        let card_name = card["name"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| query.card_name.clone());
        let set_name = card["set_name"].as_str().map(|s| s.to_string());
        let card_number = card["collector_number"].as_str().map(|s| s.to_string());

        let Some(representative) = extract_representative(&card["prices"], self.fx) else {
            let mut result =
                soft_result(query, self.name(), "No pricing data available for this card");
            result.card_id = card_id;
            result.card_name = card_name;
            result.set_name = set_name.or_else(|| query.set_name.clone());
            result.card_number = card_number.or_else(|| query.card_number.clone());
            return Ok(result);
        };

        Ok(PriceLookupResult {
            card_name,
            card_id,
            set_name,
            card_number,
            raw_price: Some(RawPrice::from_spread(representative, SPREAD)),
            graded_price: None,
            source: self.name().to_string(),
            last_updated: Utc::now(),
            message: None,
        })
    }
}

/// Scryfall prices are string-or-null fields. Prefer native EUR; fall back
/// to USD converted at the configured rate.
fn extract_representative(prices: &Value, fx: FxRates) -> Option<f64> {
    if let Some(eur) = string_price(prices.get("eur")) {
        return Some(fx.to_eur(eur, Currency::Eur));
    }
    if let Some(usd) = string_price(prices.get("usd")) {
        return Some(fx.to_eur(usd, Currency::Usd));
    }
    None
}

fn string_price(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|p| *p > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Game;
    use serde_json::json;

    fn fx() -> FxRates {
        FxRates::new(0.92)
    }

    #[test]
    fn native_eur_is_preferred() {
        let prices = json!({ "eur": "12.34", "usd": "99.99" });
        assert_eq!(extract_representative(&prices, fx()), Some(12.34));
    }

    #[test]
    fn usd_is_converted_when_eur_is_null() {
        let prices = json!({ "eur": null, "usd": "100.00" });
        assert_eq!(extract_representative(&prices, fx()), Some(92.0));
    }

    #[test]
    fn no_prices_yields_none() {
        assert!(extract_representative(&json!({ "eur": null, "usd": null }), fx()).is_none());
        assert!(extract_representative(&json!(null), fx()).is_none());
    }

    #[test]
    fn spread_is_fifteen_percent() {
        let raw = RawPrice::from_spread(10.0, SPREAD);
        assert_eq!(raw.min, 8.5);
        assert_eq!(raw.max, 11.5);
    }

    #[test]
    fn fuzzy_query_appends_set_and_number() {
        let query = CardQuery {
            card_name: "Black Lotus".to_string(),
            set_name: Some("Limited Edition Alpha".to_string()),
            card_number: Some("232".to_string()),
            game: Game::Magic,
            grading: None,
        };
        assert_eq!(
            Scryfall::fuzzy_query(&query),
            "Black Lotus Limited Edition Alpha 232"
        );
    }
}
