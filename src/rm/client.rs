use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult};
use crate::model::connection::{ConnectionSettings, QueryParams};
use crate::rm::envelope::{SOAP_ACTION, extract_result, request_body};

/// Source of raw ledger documents.
///
/// Implementations block; callers run them on the blocking pool.
pub trait LedgerSource: Send + Sync {
    /// Returns the result document of one ledger query (the XML whose root
    /// holds the `Resultado` nodes).
    fn fetch(&self, settings: &ConnectionSettings, params: &QueryParams) -> AppResult<String>;
}

/// `wsConsultaSQL` client of the RM ERP web service.
pub struct RmSoapClient {
    agent: ureq::Agent,
}

impl RmSoapClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(concat!("payroll-dashboard/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl LedgerSource for RmSoapClient {
    fn fetch(&self, settings: &ConnectionSettings, params: &QueryParams) -> AppResult<String> {
        let endpoint = settings.service_url();
        let credentials = BASE64.encode(format!("{}:{}", settings.username(), settings.password()));
        debug!(%endpoint, company = params.company, year = params.year, "Calling RealizarConsultaSQL");

        let response = self
            .agent
            .post(&endpoint)
            .set("Content-Type", "text/xml; charset=utf-8")
            .set("SOAPAction", &format!("\"{SOAP_ACTION}\""))
            .set("Authorization", &format!("Basic {credentials}"))
            .send_string(&request_body(params));

        let body = match response {
            Ok(resp) => resp.into_string().map_err(|e| {
                error!(error = %e, "Failed to read response body");
                AppError::Transport(format!("failed to read response: {e}"))
            })?,
            Err(ureq::Error::Status(status, resp)) => {
                return Err(status_error(status, resp.into_string().ok()));
            }
            Err(ureq::Error::Transport(transport)) => {
                error!(error = %transport, %endpoint, "Transport failure");
                return Err(AppError::Transport(transport.to_string()));
            }
        };

        let document = extract_result(&body)?;
        info!(bytes = document.len(), "Ledger document received");
        Ok(document)
    }
}

fn status_error(status: u16, body: Option<String>) -> AppError {
    error!(status, "Remote service returned an error status");
    if status == 401 || status == 403 {
        return AppError::Transport(format!("authentication rejected (HTTP {status})"));
    }
    // SOAP faults travel with HTTP 500; prefer the fault text when there is one.
    if let Some(body) = body {
        if let Err(err @ AppError::Transport(_)) = extract_result(&body) {
            return err;
        }
    }
    AppError::Transport(format!("remote service answered HTTP {status}"))
}
