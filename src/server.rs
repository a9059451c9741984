use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::LookupError;
use crate::oracle::PriceOracle;
use crate::types::{CardQuery, LookupRequest, PriceLookupResult};

pub fn router(oracle: Arc<PriceOracle>) -> Router {
    Router::new()
        .route("/api/price", post(lookup_price))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(oracle)
}

pub async fn serve(oracle: Arc<PriceOracle>, bind: &str) -> Result<()> {
    let app = router(oracle);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!("Listening on http://{bind}");
    axum::serve(listener, app).await.context("server error")
}

/// POST /api/price
///
/// Soft misses (card not found, no pricing data) are 200s with a null
/// rawPrice; only validation (400) and provider failures (500) are errors.
async fn lookup_price(
    State(oracle): State<Arc<PriceOracle>>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<PriceLookupResult>, LookupError> {
    let query = CardQuery::from_request(req)?;
    let result = oracle.lookup(&query).await?;
    Ok(Json(result))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::cache::MemoryCache;
    use crate::sources::testing::{Script, ScriptedSource};
    use crate::sources::{PriceSource, SourceRegistry};
    use crate::types::{Game, RawPrice};

    fn app_with(script: Script) -> Router {
        let mut sources: HashMap<Game, Box<dyn PriceSource>> = HashMap::new();
        sources.insert(
            Game::Pokemon,
            Box::new(ScriptedSource::new("pokemontcg", script)),
        );
        let oracle = PriceOracle::new(
            SourceRegistry::with_sources(sources),
            Arc::new(MemoryCache::new(24)),
        );
        router(Arc::new(oracle))
    }

    fn priced_result() -> PriceLookupResult {
        PriceLookupResult {
            card_name: "Charizard".to_string(),
            card_id: Some("base1-4".to_string()),
            set_name: Some("Base Set".to_string()),
            card_number: Some("4".to_string()),
            raw_price: Some(RawPrice {
                min: 80.0,
                max: 120.0,
                avg: 100.0,
                market: Some(100.0),
                currency: "EUR".to_string(),
            }),
            graded_price: None,
            source: "pokemontcg".to_string(),
            last_updated: Utc::now(),
            message: None,
        }
    }

    async fn post_price(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/price")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn priced_lookup_returns_200_with_raw_price() {
        let app = app_with(Script::Priced(priced_result()));
        let (status, body) =
            post_price(app, r#"{"cardName":"Charizard","game":"pokemon"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rawPrice"]["avg"], 100.0);
        assert_eq!(body["rawPrice"]["currency"], "EUR");
        assert_eq!(body["source"], "pokemontcg");
    }

    #[tokio::test]
    async fn empty_card_name_returns_400() {
        let app = app_with(Script::Priced(priced_result()));
        let (status, body) = post_price(app, r#"{"cardName":""}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("cardName"));
    }

    #[tokio::test]
    async fn unsupported_game_returns_400_naming_supported_games() {
        let app = app_with(Script::Priced(priced_result()));
        let (status, body) =
            post_price(app, r#"{"cardName":"Ragnaros","game":"hearthstone"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let msg = body["error"].as_str().unwrap();
        assert!(msg.contains("pokemon") && msg.contains("yugioh") && msg.contains("magic"));
    }

    #[tokio::test]
    async fn soft_not_found_returns_200_with_null_raw_price() {
        let app = app_with(Script::NotFound("Card not found".to_string()));
        let (status, body) =
            post_price(app, r#"{"cardName":"Zzyzzyx Nonexistent Card 999"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["rawPrice"].is_null());
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_returns_500_with_details() {
        let app = app_with(Script::Fail("HTTP 503: maintenance".to_string()));
        let (status, body) = post_price(app, r#"{"cardName":"Charizard"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("pokemontcg"));
        assert!(body["details"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn game_defaults_to_pokemon() {
        let app = app_with(Script::Priced(priced_result()));
        let (status, body) = post_price(app, r#"{"cardName":"Charizard"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "pokemontcg");
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = app_with(Script::Priced(priced_result()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
