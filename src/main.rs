use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::anyhow;
use dotenvy::dotenv;

mod api;
mod config;
mod dashboard;
mod docs;
mod error;
mod model;
mod pipeline;
mod rm;
mod routes;
mod utils;

use config::Config;

use crate::docs::ApiDoc;
use crate::rm::client::{LedgerSource, RmSoapClient};
use crate::utils::session_store::SessionStore;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Payroll dashboard: see /swagger-ui/"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;
    let level: tracing::Level = config
        .log_level
        .parse()
        .map_err(|_| anyhow!("LOG_LEVEL has an invalid value: {:?}", config.log_level))?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let sessions = SessionStore::new(
        config.session_max,
        Duration::from_secs(config.session_ttl_secs),
    );
    let source: Data<dyn LedgerSource> = Data::from(
        Arc::new(RmSoapClient::new(Duration::from_secs(config.rm_timeout_secs)))
            as Arc<dyn LedgerSource>,
    );
    let query_limiter = routes::build_limiter(config.rate_query_per_min)?;

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(sessions.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(source.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &query_limiter))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
