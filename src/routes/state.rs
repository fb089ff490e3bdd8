use std::sync::Arc;

use crate::{
    config::{Config, StoreBackend, DEFAULT_HISTORY_LIMIT},
    db::{create_pool, create_redis_client, Cache, CacheWriterHandle},
    models::CategorySynonyms,
    services::{
        engine::RecommendationEngine,
        recommendations::RecommendationService,
        store::{CachedEventStore, EventStore, MemoryEventStore, PgEventStore, RestEventStore},
    },
};

/// Shared application state
pub struct AppState {
    pub recommendations: RecommendationService,
}

impl AppState {
    /// Wraps an already-built store, using the built-in synonym table
    pub fn with_store(store: Arc<dyn EventStore>) -> Arc<Self> {
        Arc::new(Self {
            recommendations: RecommendationService::new(
                store,
                RecommendationEngine::default(),
                DEFAULT_HISTORY_LIMIT,
            ),
        })
    }

    /// Builds the state described by `config`
    ///
    /// Returns the cache writer handle when Redis caching is enabled so the
    /// caller can flush it on shutdown.
    pub async fn from_config(
        config: &Config,
    ) -> anyhow::Result<(Arc<Self>, Option<CacheWriterHandle>)> {
        let synonyms = match &config.synonyms_path {
            Some(path) => CategorySynonyms::from_path(path)?,
            None => CategorySynonyms::default(),
        };
        tracing::info!(
            version = synonyms.version,
            categories = synonyms.len(),
            "Loaded category synonym table"
        );

        let mut store: Arc<dyn EventStore> = match config.store_backend {
            StoreBackend::Memory => Arc::new(MemoryEventStore::new()),
            StoreBackend::Rest => {
                let (url, key) = config.rest_credentials()?;
                Arc::new(RestEventStore::new(url.to_string(), key.to_string()))
            }
            StoreBackend::Postgres => {
                Arc::new(PgEventStore::new(create_pool(&config.database_url).await?))
            }
        };

        let mut cache_handle = None;
        if let Some(redis_url) = &config.redis_url {
            let (cache, handle) = Cache::new(create_redis_client(redis_url)?);
            store = Arc::new(CachedEventStore::new(store, cache, config.events_cache_ttl));
            cache_handle = Some(handle);
        }

        tracing::info!(
            backend = store.name(),
            cached = cache_handle.is_some(),
            "Event store ready"
        );

        let engine = RecommendationEngine::new(Arc::new(synonyms));
        let state = Arc::new(Self {
            recommendations: RecommendationService::new(store, engine, config.history_limit),
        });

        Ok((state, cache_handle))
    }
}
