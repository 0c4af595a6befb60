use crate::{
    api::{dashboard, export, query, session},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<LimiterConfig> {
    let per_ms = (60_000 / u64::from(requests_per_min.max(1))).max(1);
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min} requests/min"))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, query_limiter: &LimiterConfig) {
    cfg.service(
        web::scope(&config.api_prefix)
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                AppError::Validation(err.to_string()).into()
            }))
            // /session
            .service(
                web::resource("/session")
                    .route(web::post().to(session::create_session))
                    .route(web::get().to(session::get_session))
                    .route(web::delete().to(session::delete_session)),
            )
            // /session/connection
            .service(
                web::resource("/session/connection")
                    .route(web::put().to(session::save_connection)),
            )
            // /session/query hits the remote ERP, so it is rate limited
            .service(
                web::resource("/session/query")
                    .wrap(Governor::new(query_limiter))
                    .route(web::post().to(query::run_query)),
            )
            // /session/dashboard
            .service(
                web::resource("/session/dashboard")
                    .route(web::post().to(dashboard::render_dashboard)),
            )
            // /session/export
            .service(
                web::resource("/session/export").route(web::post().to(export::export_records)),
            ),
    );
}

// SESSION
//  ├─ POST   /session             → defaults, returns id
//  ├─ PUT    /session/connection  → validate + store settings, clear data
//  ├─ POST   /session/query       → remote call, replace dataset
//  ├─ POST   /session/dashboard   → render widgets for selections
//  ├─ POST   /session/export      → ; separated file
//  └─ DELETE /session

// every call after the first carries X-Session-Id
