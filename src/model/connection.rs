use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Appended to the server base address to form the service description URL.
pub const WSDL_SUFFIX: &str = "/wsConsultaSQL/MEX?wsdl";
/// Path of the SQL query endpoint the WSDL binds to.
pub const SERVICE_PATH: &str = "/wsConsultaSQL/IwsConsultaSQL";

/// Report and system codes of the payroll ledger query.
pub const REPORT_ID: &str = "FICHA_FINANCEIRA";
pub const SYSTEM_CODE: &str = "P";
pub const COMPANY_FILTER: i32 = 0;

pub const MIN_QUERY_YEAR: i32 = 2000;
pub const MAX_QUERY_YEAR: i32 = 2100;

/// Validated credentials and address of the remote ERP.
#[derive(Clone)]
pub struct ConnectionSettings {
    server_base: String,
    username: String,
    password: String,
}

impl ConnectionSettings {
    pub fn new(server: &str, username: &str, password: &str) -> AppResult<Self> {
        let server_base = server.trim().trim_end_matches('/').to_string();
        if !server_base.starts_with("http") {
            return Err(AppError::ConfigurationInvalid(
                "server address must start with http:// or https://".to_string(),
            ));
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::ConfigurationInvalid(
                "username must not be empty".to_string(),
            ));
        }
        if password.trim().is_empty() {
            return Err(AppError::ConfigurationInvalid(
                "password must not be empty".to_string(),
            ));
        }

        Ok(Self {
            server_base,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn server_base(&self) -> &str {
        &self.server_base
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn wsdl_url(&self) -> String {
        format!("{}{}", self.server_base, WSDL_SUFFIX)
    }

    pub fn service_url(&self) -> String {
        format!("{}{}", self.server_base, SERVICE_PATH)
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("server_base", &self.server_base)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Company and competence year of one ledger query.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QueryParams {
    #[schema(example = 1)]
    pub company: u32,
    #[schema(example = 2024)]
    pub year: i32,
}

impl QueryParams {
    pub fn parse(company: &str, year: i32) -> AppResult<Self> {
        let company = company.trim();
        if company.is_empty() || !company.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::Validation(
                "company must be a valid number".to_string(),
            ));
        }
        let company = company
            .parse::<u32>()
            .map_err(|_| AppError::Validation("company number is too large".to_string()))?;
        if !(MIN_QUERY_YEAR..=MAX_QUERY_YEAR).contains(&year) {
            return Err(AppError::Validation(format!(
                "year must be between {MIN_QUERY_YEAR} and {MAX_QUERY_YEAR}"
            )));
        }
        Ok(Self { company, year })
    }

    /// Parameter string understood by the report: `CODCOLIGADA={n};ANO={year}`.
    pub fn report_parameters(&self) -> String {
        format!("CODCOLIGADA={};ANO={}", self.company, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_are_trimmed_and_build_endpoints() {
        let settings =
            ConnectionSettings::new("  http://192.168.1.10:8051/ ", " mestre ", "totvs").unwrap();
        assert_eq!(settings.server_base(), "http://192.168.1.10:8051");
        assert_eq!(settings.username(), "mestre");
        assert_eq!(
            settings.wsdl_url(),
            "http://192.168.1.10:8051/wsConsultaSQL/MEX?wsdl"
        );
        assert_eq!(
            settings.service_url(),
            "http://192.168.1.10:8051/wsConsultaSQL/IwsConsultaSQL"
        );
    }

    #[test]
    fn settings_reject_missing_scheme_and_blank_credentials() {
        assert!(matches!(
            ConnectionSettings::new("192.168.1.10:8051", "mestre", "x"),
            Err(AppError::ConfigurationInvalid(_))
        ));
        assert!(matches!(
            ConnectionSettings::new("http://host", "  ", "x"),
            Err(AppError::ConfigurationInvalid(_))
        ));
        assert!(matches!(
            ConnectionSettings::new("http://host", "mestre", "   "),
            Err(AppError::ConfigurationInvalid(_))
        ));
    }

    #[test]
    fn debug_output_hides_password() {
        let settings = ConnectionSettings::new("http://host", "mestre", "s3cret").unwrap();
        assert!(!format!("{settings:?}").contains("s3cret"));
    }

    #[test]
    fn query_params_validate_company_and_year() {
        let params = QueryParams::parse(" 3 ", 2024).unwrap();
        assert_eq!(params.report_parameters(), "CODCOLIGADA=3;ANO=2024");
        assert!(QueryParams::parse("1a", 2024).is_err());
        assert!(QueryParams::parse("-1", 2024).is_err());
        assert!(QueryParams::parse("", 2024).is_err());
        assert!(QueryParams::parse("1", 1999).is_err());
        assert!(QueryParams::parse("1", 2101).is_err());
    }
}
