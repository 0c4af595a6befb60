use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Kind of payroll event on a ledger line.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum EventType {
    /// Provento: pay, bonus and other credits.
    #[strum(to_string = "Provento", serialize = "Earning")]
    #[serde(rename = "Provento")]
    Earning,
    /// Desconto: taxes, contributions and other debits.
    #[strum(to_string = "Desconto", serialize = "Deduction")]
    #[serde(rename = "Desconto")]
    Deduction,
    /// Any other TIPO_EVENTO value; counts as neither earning nor deduction.
    #[strum(to_string = "Outro", serialize = "Unclassified")]
    #[serde(rename = "Outro")]
    Unclassified,
}

impl EventType {
    /// Parses the service's TIPO_EVENTO text. Unknown values never fail.
    pub fn from_source(raw: &str) -> Self {
        EventType::from_str(raw.trim()).unwrap_or(EventType::Unclassified)
    }
}

/// One payroll event occurrence for one employee in one period.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LedgerRecord {
    #[schema(example = "1")]
    pub company_id: String,
    #[schema(example = "ACME LTDA")]
    pub company_name: String,
    #[schema(example = "Ana Souza")]
    pub employee_name: String,
    #[schema(example = "Analista")]
    pub role: String,
    #[schema(example = "Financeiro")]
    pub section: String,
    pub event_type: EventType,
    #[schema(example = "Salario")]
    pub event_name: String,
    /// Payroll run number within the month (NROPERIODO).
    #[schema(example = "1")]
    pub period_number: String,
    /// 1..=12, or 0 when the source value was missing or out of range.
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(value_type = String, example = "1000.00")]
    pub gross_amount: Decimal,
    #[schema(value_type = String, example = "1000.00")]
    pub net_amount: Decimal,
}

impl LedgerRecord {
    pub fn period_key(&self) -> PeriodKey {
        PeriodKey {
            year: self.year,
            month: self.month,
        }
    }
}

/// (year, month) grouping key; orders chronologically, displays as `MM/YYYY`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PeriodKey {
    // field order matters for the derived Ord
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Text fields of a `Resultado` node, as named by the remote report.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, AsRefStr, EnumIter,
)]
pub enum SourceField {
    #[strum(serialize = "CODCOLIGADA")]
    CompanyId,
    #[strum(serialize = "NOMEFANTASIA")]
    CompanyName,
    #[strum(serialize = "NOME")]
    EmployeeName,
    #[strum(serialize = "FUNCAO")]
    Role,
    #[strum(serialize = "SECAO")]
    Section,
    #[strum(serialize = "TIPO_EVENTO")]
    EventType,
    #[strum(serialize = "EVENTO")]
    EventName,
    #[strum(serialize = "NROPERIODO")]
    PeriodNumber,
    #[strum(serialize = "MESCOMP")]
    Month,
    #[strum(serialize = "ANOCOMP")]
    Year,
    #[strum(serialize = "VALOR")]
    GrossAmount,
    #[strum(serialize = "VLR_PROV_DESC")]
    NetAmount,
}

impl SourceField {
    pub fn from_tag(tag: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        SourceField::iter().find(|f| f.as_ref() == tag)
    }
}
