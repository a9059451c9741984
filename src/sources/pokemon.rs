use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{soft_result, PriceSource};
use crate::currency::{Currency, FxRates, EUR};
use crate::types::{CardQuery, PriceLookupResult, RawPrice};

/// Pokémon TCG API (pokemontcg.io). Card search by structured query string;
/// prices come from the TCGplayer block, which carries a real USD range per
/// print variant (low/mid/high/market), converted to EUR field by field.
pub struct PokemonTcg {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    fx: FxRates,
}

/// Print variants in price-extraction priority order; the first variant
/// carrying a usable price wins.
const VARIANT_PRIORITY: &[&str] = &[
    "holofoil",
    "1stEditionHolofoil",
    "unlimitedHolofoil",
    "reverseHolofoil",
    "normal",
];

impl PokemonTcg {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        fx: FxRates,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            fx,
        }
    }

    fn search_query(query: &CardQuery) -> String {
        let mut q = format!("name:\"{}\"", query.card_name);
        if let Some(set) = &query.set_name {
            q.push_str(&format!(" set.name:\"{}\"", set));
        }
        if let Some(number) = &query.card_number {
            q.push_str(&format!(" number:{}", number));
        }
        q
    }
}

#[async_trait]
impl PriceSource for PokemonTcg {
    fn name(&self) -> &str {
        "pokemontcg"
    }

    async fn fetch(&self, query: &CardQuery) -> Result<PriceLookupResult> {
        let url = format!("{}/cards", self.base_url);
        let q = Self::search_query(query);

        let mut req = self
            .client
            .get(&url)
            .query(&[("q", q.as_str()), ("pageSize", "1")]);
        if let Some(key) = &self.api_key {
            req = req.header("X-Api-Key", key);
        }

        let resp = req.send().await.context("Pokémon TCG API request failed")?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(soft_result(query, self.name(), "Card not found"));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Pokémon TCG API HTTP {}: {}", status, body);
        }

        let body: Value = resp.json().await.context("Pokémon TCG API parse failed")?;

        let Some(card) = body["data"].get(0) else {
            return Ok(soft_result(query, self.name(), "Card not found"));
        };

        let card_id = card["id"].as_str().map(|s| s.to_string());
        let card_name = card["name"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| query.card_name.clone());
        let set_name = card["set"]["name"].as_str().map(|s| s.to_string());
        let card_number = card["number"].as_str().map(|s| s.to_string());

        let Some(raw_price) = extract_raw_price(&card["tcgplayer"]["prices"], self.fx) else {
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
            raw_price: Some(raw_price),
            graded_price: None,
            source: self.name().to_string(),
            last_updated: Utc::now(),
            message: None,
        })
    }
}

/// Walk the TCGplayer price block in variant priority order and lift the
/// first usable USD range into EUR. A variant is usable when it carries a
/// market or mid price; low/high fall back to the representative when
/// missing. Structurally unexpected blocks yield `None`, never partial data.
fn extract_raw_price(prices: &Value, fx: FxRates) -> Option<RawPrice> {
    for variant in VARIANT_PRIORITY {
        let Some(fields) = prices.get(*variant) else {
            continue;
        };
        let market = fields.get("market").and_then(Value::as_f64);
        let mid = fields.get("mid").and_then(Value::as_f64);
        let Some(representative) = market.or(mid) else {
            continue;
        };
        let low = fields
            .get("low")
            .and_then(Value::as_f64)
            .unwrap_or(representative);
        let high = fields
            .get("high")
            .and_then(Value::as_f64)
            .unwrap_or(representative);

        return Some(RawPrice {
            min: fx.to_eur(low, Currency::Usd),
            max: fx.to_eur(high, Currency::Usd),
            avg: fx.to_eur(representative, Currency::Usd),
            market: market.map(|m| fx.to_eur(m, Currency::Usd)),
            currency: EUR.to_string(),
        });
    }
    None
}
