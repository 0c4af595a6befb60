use actix_web::{HttpResponse, web};
use tracing::{debug, instrument};

use crate::api::session::SessionId;
use crate::dashboard::{self, DashboardRequest, DashboardView};
use crate::error::AppError;
use crate::utils::session_store::SessionStore;

/// Render every dashboard widget for the given filter selections.
#[utoipa::path(
    post,
    path = "/api/v1/session/dashboard",
    request_body = DashboardRequest,
    responses(
        (status = 200, body = DashboardView),
        (status = 400, description = "Invalid selection (month range, threshold)"),
        (status = 409, description = "No data loaded yet")
    ),
    security(("session_id" = [])),
    tag = "Dashboard"
)]
#[instrument(name = "render_dashboard", skip_all, fields(session_id = %id.0))]
pub async fn render_dashboard(
    id: SessionId,
    store: web::Data<SessionStore>,
    payload: web::Json<DashboardRequest>,
) -> Result<HttpResponse, AppError> {
    let session = store.get(&id.0).await?;
    let view = dashboard::render(&session, &payload)?;
    debug!(
        records = view.summary.record_count,
        dataset = session.dataset.len(),
        "Dashboard rendered"
    );
    Ok(HttpResponse::Ok().json(view))
}
