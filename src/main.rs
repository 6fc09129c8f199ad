use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodflix::{
    api::{create_router, AppState},
    config::Config,
    db::{SearchCache, TitleCache},
    services::{
        providers::{CatalogSource, OmdbSource, TmdbSource, TvmazeSource},
        CatalogService, ContentSearch, GeminiInterpreter, KeywordInterpreter, MoodInterpreter,
        WatchmodeProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("moodflix=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let http_client = config.http_client()?;
    let timeout = config.upstream_timeout();

    let tmdb = TmdbSource::new(
        http_client.clone(),
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    )
    .with_image_url(config.tmdb_image_url.clone())
    .with_quality_floor(config.min_vote_average, config.min_vote_count)
    .with_timeout(timeout);

    let omdb = OmdbSource::new(
        http_client.clone(),
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
    )
    .with_timeout(timeout);

    let tvmaze =
        TvmazeSource::new(http_client.clone(), config.tvmaze_api_url.clone()).with_timeout(timeout);

    if config.tmdb_api_key.is_none() {
        tracing::warn!(provider = "TMDb", "No API key configured, primary catalog disabled");
    }
    if config.omdb_api_key.is_none() {
        tracing::warn!(provider = "OMDb", "No API key configured, classics catalog disabled");
    }

    let search = ContentSearch::new(
        Arc::new(tmdb),
        vec![
            Arc::new(omdb) as Arc<dyn CatalogSource>,
            Arc::new(tvmaze) as Arc<dyn CatalogSource>,
        ],
        config.search_policy(),
    );

    let availability = WatchmodeProvider::new(
        http_client.clone(),
        config.watchmode_api_key.clone(),
        config.watchmode_api_url.clone(),
    );

    let catalog = CatalogService::new(
        search,
        SearchCache::new(config.cache_ttl(), config.cache_capacity),
        TitleCache::new(config.cache_ttl(), config.cache_capacity),
        Arc::new(availability),
    );

    let interpreter: Arc<dyn MoodInterpreter> = match config.gemini_api_key.clone() {
        Some(api_key) if !api_key.is_empty() => Arc::new(GeminiInterpreter::new(
            http_client,
            api_key,
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
        )),
        _ => {
            tracing::warn!(provider = "gemini", "No API key configured, using keyword mood classification");
            Arc::new(KeywordInterpreter)
        }
    };

    let app = create_router(AppState::new(catalog, interpreter));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
