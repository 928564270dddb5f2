use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use once_cell::sync::Lazy;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;

use config::{Config, StoreBackend};
use db::init_db;
use service::dashboard::STARTED_AT;
use store::{MemoryStore, MySqlStore, VacationStore};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn VacationStore>> {
    let store: Arc<dyn VacationStore> = match config.store_backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORE_BACKEND=mysql")?;
            Arc::new(MySqlStore::new(init_db(url).await?))
        }
    };
    Ok(store)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    Lazy::force(&STARTED_AT);
    info!(backend = ?config.store_backend, addr = %config.server_addr, "Server starting...");

    let store = build_store(&config).await?;
    if let Some(admin) = &config.bootstrap_admin {
        auth::bootstrap::seed_admin(store.as_ref(), admin).await?;
    }

    let store_data: Data<dyn VacationStore> = Data::from(store);
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the JS/CSS assets match too
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store_data.clone())
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
