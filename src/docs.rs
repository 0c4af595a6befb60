use crate::api::query::{QueryResponse, RunQuery};
use crate::api::session::{SESSION_HEADER, SaveConnection, SessionResponse};
use crate::dashboard::{DashboardRequest, DashboardView, FilterOptions, SelectionView, SummaryView};
use crate::model::connection::QueryParams;
use crate::model::criteria::MonthRange;
use crate::model::ledger::{EventType, LedgerRecord};
use crate::pipeline::aggregate::{AmountBasis, BalancePoint, PeriodBalance, RankedEvent, RankedTotal};
use crate::pipeline::commitment::{CommitmentAnalysis, CommitmentGrouping, CommitmentRow};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Dashboard API",
        version = "0.1.0",
        description = r#"
## Ficha Financeira dashboard

Queries the payroll ledger ("Ficha Financeira") of an RM ERP server through its
`wsConsultaSQL` web service and turns it into dashboard data.

### Flow
1. `POST /session` to obtain a session id
2. `PUT /session/connection` with the server address and credentials
3. `POST /session/query` with company and year
4. `POST /session/dashboard` with filter selections, as often as needed
5. `POST /session/export` for the filtered table

### Widgets
- Summary metrics (earnings, deductions, net balance)
- Earnings vs deductions per period, and the net balance series
- Top 10 events, roles and sections
- Commitment ratio (deductions / earnings) by employee, section and role, with alerts

Amounts are decimal strings. Every call after the first carries the `X-Session-Id` header.
"#,
    ),
    paths(
        crate::api::session::create_session,
        crate::api::session::get_session,
        crate::api::session::delete_session,
        crate::api::session::save_connection,

        crate::api::query::run_query,

        crate::api::dashboard::render_dashboard,
        crate::api::export::export_records
    ),
    components(
        schemas(
            SaveConnection,
            SessionResponse,
            RunQuery,
            QueryResponse,
            QueryParams,
            DashboardRequest,
            DashboardView,
            FilterOptions,
            SelectionView,
            SummaryView,
            MonthRange,
            AmountBasis,
            EventType,
            LedgerRecord,
            PeriodBalance,
            BalancePoint,
            RankedEvent,
            RankedTotal,
            CommitmentGrouping,
            CommitmentRow,
            CommitmentAnalysis
        )
    ),
    modifiers(&SessionHeaderAddon),
    tags(
        (name = "Session", description = "Session lifecycle and connection settings"),
        (name = "Query", description = "Remote ledger query"),
        (name = "Dashboard", description = "Filtered widgets and export"),
    )
)]
pub struct ApiDoc;

pub struct SessionHeaderAddon;

impl Modify for SessionHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(SESSION_HEADER))),
            );
        }
    }
}
