use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use futures::future::{Ready, ready};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::model::connection::{ConnectionSettings, QueryParams};
use crate::model::session::Session;
use crate::utils::session_store::SessionStore;

pub const SESSION_HEADER: &str = "X-Session-Id";

/// Session id taken from the `X-Session-Id` header.
pub struct SessionId(pub Uuid);

impl FromRequest for SessionId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = match req
            .headers()
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
        {
            Some(v) => v.trim(),
            None => return ready(Err(AppError::SessionMissing.into())),
        };

        match Uuid::parse_str(raw) {
            Ok(id) => ready(Ok(SessionId(id))),
            Err(_) => ready(Err(AppError::SessionNotFound(raw.to_string()).into())),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SaveConnection {
    /// Base address only, e.g. `http://192.168.1.10:8051`.
    #[schema(example = "http://192.168.1.10:8051")]
    pub server: String,
    #[schema(example = "mestre")]
    pub username: String,
    #[schema(example = "totvs")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    #[schema(example = "0f8fad5b-d9cb-469f-a165-70867728950e")]
    pub session_id: String,
    pub connected: bool,
    #[schema(example = "http://localhost:8051")]
    pub server: String,
    #[schema(example = "mestre")]
    pub username: String,
    /// Service description URL, once the connection has been saved.
    #[schema(example = "http://localhost:8051/wsConsultaSQL/MEX?wsdl")]
    pub wsdl_url: Option<String>,
    pub last_query: Option<QueryParams>,
    #[schema(example = 2024)]
    pub default_year: i32,
    pub record_count: usize,
    pub last_error: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.to_string(),
            connected: session.is_connected(),
            server: session.server_hint.clone(),
            username: session.user_hint.clone(),
            wsdl_url: session.connection.as_ref().map(|c| c.wsdl_url()),
            last_query: session.last_query,
            default_year: session.default_year,
            record_count: session.dataset.len(),
            last_error: session.last_error.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/session",
    responses(
        (status = 201, description = "Session created with default connection settings", body = SessionResponse)
    ),
    tag = "Session"
)]
pub async fn create_session(
    store: web::Data<SessionStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let session = Session::new(
        config.rm_default_server.clone(),
        config.rm_default_user.clone(),
        config.default_query_year,
    );
    let response = SessionResponse::from(&session);
    info!(session_id = %session.id, "Session created");
    store.insert(session).await;

    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses(
        (status = 200, body = SessionResponse),
        (status = 401, description = "Missing session header"),
        (status = 404, description = "Unknown or expired session")
    ),
    security(("session_id" = [])),
    tag = "Session"
)]
pub async fn get_session(
    id: SessionId,
    store: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    let session = store.get(&id.0).await?;
    Ok(HttpResponse::Ok().json(SessionResponse::from(&session)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses(
        (status = 204, description = "Session dropped"),
        (status = 404, description = "Unknown or expired session")
    ),
    security(("session_id" = [])),
    tag = "Session"
)]
pub async fn delete_session(
    id: SessionId,
    store: web::Data<SessionStore>,
) -> Result<HttpResponse, AppError> {
    store.remove(&id.0).await?;
    info!(session_id = %id.0, "Session dropped");
    Ok(HttpResponse::NoContent().finish())
}

/// Save connection settings. Any previously loaded data is discarded.
#[utoipa::path(
    put,
    path = "/api/v1/session/connection",
    request_body = SaveConnection,
    responses(
        (status = 200, description = "Connection configured", body = SessionResponse),
        (status = 400, description = "Invalid connection settings"),
        (status = 404, description = "Unknown or expired session")
    ),
    security(("session_id" = [])),
    tag = "Session"
)]
#[instrument(name = "save_connection", skip_all, fields(session_id = %id.0))]
pub async fn save_connection(
    id: SessionId,
    store: web::Data<SessionStore>,
    payload: web::Json<SaveConnection>,
) -> Result<HttpResponse, AppError> {
    let settings = ConnectionSettings::new(&payload.server, &payload.username, &payload.password)
        .inspect_err(|e| info!(error = %e, "Connection settings rejected"))?;
    let wsdl_url = settings.wsdl_url();

    let response = store
        .update(&id.0, |session| {
            session.save_connection(settings);
            Ok(SessionResponse::from(&*session))
        })
        .await?;
    info!(%wsdl_url, user = %response.username, "Connection configured");

    Ok(HttpResponse::Ok().json(response))
}
