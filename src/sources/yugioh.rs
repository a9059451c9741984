use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{soft_result, PriceSource};
use crate::currency::{Currency, FxRates};
use crate::types::{CardQuery, PriceLookupResult, RawPrice};

/// YGOPRODeck (db.ygoprodeck.com). Fuzzy name search, one authoritative
/// price per card from `card_prices[0]`: Cardmarket (EUR) preferred,
/// TCGplayer (USD) as fallback. The ±20% min/max band is synthesized.
pub struct YgoProDeck {
    client: reqwest::Client,
    base_url: String,
    fx: FxRates,
}

const SPREAD: f64 = 0.20;

impl YgoProDeck {
    pub fn new(client: reqwest::Client, base_url: String, fx: FxRates) -> Self {
        Self {
            client,
            base_url,
            fx,
        }
    }
}

#[async_trait]
impl PriceSource for YgoProDeck {
    fn name(&self) -> &str {
        "ygoprodeck"
    }

    async fn fetch(&self, query: &CardQuery) -> Result<PriceLookupResult> {
        let url = format!("{}/cardinfo.php", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("fname", query.card_name.as_str())])
            .send()
            .await
            .context("YGOPRODeck request failed")?;

        let status = resp.status();
        // YGOPRODeck signals "no card matching your query" with HTTP 400.
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::NOT_FOUND
        {
            return Ok(soft_result(query, self.name(), "Card not found"));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("YGOPRODeck HTTP {}: {}", status, body);
        }

        let body: Value = resp.json().await.context("YGOPRODeck parse failed")?;

        let Some(card) = body["data"].get(0) else {
            return Ok(soft_result(query, self.name(), "Card not found"));
        };

        let card_id = card["id"].as_i64().map(|id| id.to_string());
        let card_name = card["name"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| query.card_name.clone());

        let Some(representative) = extract_representative(&card["card_prices"], self.fx) else {
            let mut result =
                soft_result(query, self.name(), "No pricing data available for this card");
            result.card_id = card_id;
            result.card_name = card_name;
            return Ok(result);
        };

        Ok(PriceLookupResult {
            card_name,
            card_id,
            set_name: query.set_name.clone(),
            card_number: query.card_number.clone(),
            raw_price: Some(RawPrice::from_spread(representative, SPREAD)),
            graded_price: None,
            source: self.name().to_string(),
            last_updated: Utc::now(),
            message: None,
        })
    }
}

/// Pull the representative EUR price from `card_prices[0]`: Cardmarket
/// when positive, else TCGplayer converted from USD. Price fields arrive as
/// strings ("0.00" when absent) but numbers are tolerated too.
fn extract_representative(card_prices: &Value, fx: FxRates) -> Option<f64> {
    let prices = card_prices.get(0)?;

    if let Some(eur) = prices.get("cardmarket_price").and_then(price_field) {
        return Some(fx.to_eur(eur, Currency::Eur));
    }
    if let Some(usd) = prices.get("tcgplayer_price").and_then(price_field) {
        return Some(fx.to_eur(usd, Currency::Usd));
    }
    None
}

fn price_field(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.filter(|p| *p > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fx() -> FxRates {
        FxRates::new(0.92)
    }

    #[test]
    fn cardmarket_eur_is_preferred() {
        let prices = json!([{ "cardmarket_price": "10.00", "tcgplayer_price": "50.00" }]);
        assert_eq!(extract_representative(&prices, fx()), Some(10.0));
    }

    #[test]
    fn tcgplayer_usd_is_converted_when_cardmarket_is_zero() {
        let prices = json!([{ "cardmarket_price": "0.00", "tcgplayer_price": "100.00" }]);
        assert_eq!(extract_representative(&prices, fx()), Some(92.0));
    }

    #[test]
    fn missing_price_record_yields_none() {
        assert!(extract_representative(&json!([]), fx()).is_none());
        assert!(extract_representative(&json!(null), fx()).is_none());
        assert!(extract_representative(
            &json!([{ "cardmarket_price": "0.00", "tcgplayer_price": "0.00" }]),
            fx()
        )
        .is_none());
    }

    #[test]
    fn spread_is_twenty_percent() {
        let raw = RawPrice::from_spread(10.0, SPREAD);
        assert_eq!(raw.min, 8.0);
        assert_eq!(raw.max, 12.0);
        assert_eq!(raw.avg, 10.0);
    }
}
