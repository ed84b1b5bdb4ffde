use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod report;
mod routes;
mod source;
mod state;
mod utils;

use config::{Config, DataSourceKind};
use db::init_db;

use crate::docs::ApiDoc;
use crate::report::aggregator::Aggregator;
use crate::report::clock::{Clock, FixedClock, SystemClock};
use crate::source::{AttendanceSource, MemorySource, PgSource};
use crate::state::AppState;
use crate::utils::directory_cache::DirectoryCache;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn open_source(config: &Config) -> anyhow::Result<Arc<dyn AttendanceSource>> {
    match config.data_source {
        DataSourceKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            Ok(Arc::new(PgSource::new(init_db(url).await?)))
        }
        DataSourceKind::File => {
            let path = config.data_file.as_deref().context("DATA_FILE must be set")?;
            Ok(Arc::new(MemorySource::from_json_file(path)?))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let source = open_source(&config).await?;

    let clock: Arc<dyn Clock> = match config.report_today {
        Some(date) => {
            warn!(%date, "Reports are pinned to a fixed date");
            Arc::new(FixedClock::on(date))
        }
        None => Arc::new(SystemClock),
    };

    let directory = DirectoryCache::new(source.clone(), config.directory_cache_ttl);
    let state = Data::new(AppState {
        source,
        directory: directory.clone(),
        clock,
        aggregator: Aggregator::new(config.report_policy),
    });

    actix_web::rt::spawn(async move {
        if let Err(e) = directory.warmup().await {
            error!(error = %format!("{e:#}"), "Failed to warm up directory cache");
        }
    });

    let limiter = routes::build_limiter(config.rate_reports_per_min)?;
    let api_prefix = config.api_prefix.clone();

    info!(
        addr = %config.server_addr,
        source = %config.data_source,
        weekend = %config.report_policy.weekend,
        "Listening"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .app_data(routes::query_config())
            .app_data(routes::path_config())
            .service(health)
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limiter))
    })
    .bind(&config.server_addr)
    .with_context(|| format!("Failed to bind {}", config.server_addr))?
    .run()
    .await?;

    Ok(())
}
