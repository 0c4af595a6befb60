use actix_web::{HttpResponse, http::header, web};
use tracing::{info, instrument};

use crate::api::session::SessionId;
use crate::dashboard::{self, DashboardRequest};
use crate::error::AppError;
use crate::pipeline::export::{EXPORT_FILE_NAME, to_delimited};
use crate::utils::session_store::SessionStore;

/// Download the filtered table as `;`-separated text with decimal commas.
#[utoipa::path(
    post,
    path = "/api/v1/session/export",
    request_body = DashboardRequest,
    responses(
        (status = 200, description = "Delimited export", content_type = "text/csv", body = String),
        (status = 409, description = "No data loaded yet")
    ),
    security(("session_id" = [])),
    tag = "Dashboard"
)]
#[instrument(name = "export_records", skip_all, fields(session_id = %id.0))]
pub async fn export_records(
    id: SessionId,
    store: web::Data<SessionStore>,
    payload: web::Json<DashboardRequest>,
) -> Result<HttpResponse, AppError> {
    let session = store.get(&id.0).await?;
    let records = dashboard::filtered_view(&session, &payload)?;
    let body = to_delimited(&records)?;
    info!(rows = records.len(), bytes = body.len(), "Export generated");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
        ))
        .body(body))
}
