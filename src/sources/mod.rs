pub mod magic;
pub mod pokemon;
pub mod yugioh;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::config::ProviderConfig;
use crate::currency::FxRates;
use crate::types::{CardQuery, Game, PriceLookupResult};

/// One pricing provider per game. A hard `Err` means the provider was
/// unreachable or answered outside its contract; "card not found" and "card
/// has no pricing data" are soft results built with [`soft_result`], not
/// errors.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, query: &CardQuery) -> Result<PriceLookupResult>;
}

pub struct SourceRegistry {
    sources: HashMap<Game, Box<dyn PriceSource>>,
}

impl SourceRegistry {
    pub fn new(
        client: reqwest::Client,
        providers: &ProviderConfig,
        fx: FxRates,
        pokemon_api_key: Option<String>,
    ) -> Self {
        if pokemon_api_key.is_none() {
            tracing::warn!("POKEMON_TCG_API_KEY not set; Pokémon TCG API rate limits will be low");
        }

        let mut sources: HashMap<Game, Box<dyn PriceSource>> = HashMap::new();
        sources.insert(
            Game::Pokemon,
            Box::new(pokemon::PokemonTcg::new(
                client.clone(),
                providers.pokemon_base_url.clone(),
                pokemon_api_key,
                fx,
            )),
        );
        sources.insert(
            Game::Yugioh,
            Box::new(yugioh::YgoProDeck::new(
                client.clone(),
                providers.yugioh_base_url.clone(),
                fx,
            )),
        );
        sources.insert(
            Game::Magic,
            Box::new(magic::Scryfall::new(
                client,
                providers.scryfall_base_url.clone(),
                fx,
            )),
        );

        Self { sources }
    }

    /// Registry with explicit adapters; used by tests to substitute mocks.
    pub fn with_sources(sources: HashMap<Game, Box<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    pub fn get(&self, game: Game) -> Option<&dyn PriceSource> {
        self.sources.get(&game).map(|s| s.as_ref())
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

/// Result shell for soft misses: provider reachable, but either no matching
/// card or no pricing fields on the match. Never cached, so repeat requests
/// retry the provider.
pub(crate) fn soft_result(
    query: &CardQuery,
    source: &str,
    message: impl Into<String>,
) -> PriceLookupResult {
    PriceLookupResult {
        card_name: query.card_name.clone(),
        card_id: None,
        set_name: query.set_name.clone(),
        card_number: query.card_number.clone(),
        raw_price: None,
        graded_price: None,
        source: source.to_string(),
        last_updated: Utc::now(),
        message: Some(message.into()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Scripted adapter for orchestrator and server tests. Counts calls so
    /// tests can assert whether the cache absorbed a repeat lookup.
    pub struct ScriptedSource {
        pub name: &'static str,
        pub script: Script,
        pub calls: Arc<AtomicUsize>,
    }

    pub enum Script {
        Priced(PriceLookupResult),
        NotFound(String),
        Fail(String),
    }

    impl ScriptedSource {
        pub fn new(name: &'static str, script: Script) -> Self {
            Self {
                name,
                script,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, query: &CardQuery) -> Result<PriceLookupResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Priced(result) => Ok(result.clone()),
                Script::NotFound(message) => Ok(soft_result(query, self.name, message.clone())),
                Script::Fail(message) => anyhow::bail!("{message}"),
            }
        }
    }
}
