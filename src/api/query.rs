use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::api::session::SessionId;
use crate::error::AppError;
use crate::model::connection::QueryParams;
use crate::pipeline;
use crate::rm::client::LedgerSource;
use crate::utils::session_store::SessionStore;

#[derive(Deserialize, ToSchema)]
pub struct RunQuery {
    /// Company code (CODCOLIGADA); digits only.
    #[schema(example = "1")]
    pub company: String,
    /// Competence year; defaults to the session's default year.
    #[schema(example = 2024, minimum = 2000, maximum = 2100)]
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct QueryResponse {
    pub query: QueryParams,
    #[schema(example = 1532)]
    pub record_count: usize,
    #[schema(example = "Company 1 | Year 2024 | 1532 records loaded")]
    pub message: String,
}

/// Fetch the payroll ledger for one company and year, replacing the session's dataset.
///
/// On failure the dataset is emptied and the error is kept on the session.
#[utoipa::path(
    post,
    path = "/api/v1/session/query",
    request_body = RunQuery,
    responses(
        (status = 200, description = "Dataset replaced", body = QueryResponse),
        (status = 400, description = "Invalid company or year"),
        (status = 409, description = "Connection settings not saved, or saved again while the query ran"),
        (status = 422, description = "Response lacks required fields"),
        (status = 502, description = "Remote service unreachable or returned a malformed response")
    ),
    security(("session_id" = [])),
    tag = "Query"
)]
#[instrument(name = "run_query", skip_all, fields(session_id = %id.0))]
pub async fn run_query(
    id: SessionId,
    store: web::Data<SessionStore>,
    source: web::Data<dyn LedgerSource>,
    payload: web::Json<RunQuery>,
) -> Result<HttpResponse, AppError> {
    let session = store.get(&id.0).await?;
    let settings = session.connection.clone().ok_or(AppError::NotConnected)?;
    let revision = session.connection_revision;
    let params = QueryParams::parse(&payload.company, payload.year.unwrap_or(session.default_year))?;

    info!(company = params.company, year = params.year, "Fetching ledger");

    let source: Arc<dyn LedgerSource> = source.into_inner();
    let outcome = web::block(move || {
        source
            .fetch(&settings, &params)
            .and_then(|document| pipeline::load(&document))
    })
    .await
    .map_err(|e| AppError::Internal(format!("query worker failed: {e}")))
    .and_then(|result| result);

    let (records, failure) = match outcome {
        Ok(records) => (records, None),
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Query failed");
            (Vec::new(), Some(e))
        }
    };
    let record_count = records.len();
    let last_error = failure.as_ref().map(|e| e.to_string());

    store
        .update(&id.0, |session| {
            if session.connection_revision != revision {
                return Err(AppError::QuerySuperseded);
            }
            session.replace_dataset(params, records, last_error);
            Ok(())
        })
        .await
        .inspect_err(|e| warn!(error = %e, "Query result discarded"))?;

    if let Some(e) = failure {
        return Err(e);
    }
    info!(record_count, "Dataset replaced");

    Ok(HttpResponse::Ok().json(QueryResponse {
        query: params,
        record_count,
        message: format!(
            "Company {} | Year {} | {} records loaded",
            params.company, params.year, record_count
        ),
    }))
}
