use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::model::ledger::LedgerRecord;

pub const EXPORT_FILE_NAME: &str = "ficha_financeira.csv";

/// Column headers of the exported table.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "Company",
    "Employee",
    "Role",
    "Section",
    "EventType",
    "EventName",
    "Period",
    "Month",
    "Year",
    "Value",
    "NetValue",
];

/// Delimited text for the target locale's spreadsheets: `;` between fields,
/// `,` as the decimal mark.
pub fn to_delimited(records: &[LedgerRecord]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS).map_err(export_error)?;
    for r in records {
        let month = r.month.to_string();
        let year = r.year.to_string();
        let value = decimal_comma(r.gross_amount);
        let net_value = decimal_comma(r.net_amount);
        writer
            .write_record([
                r.company_name.as_str(),
                r.employee_name.as_str(),
                r.role.as_str(),
                r.section.as_str(),
                AsRef::<str>::as_ref(&r.event_type),
                r.event_name.as_str(),
                r.period_number.as_str(),
                month.as_str(),
                year.as_str(),
                value.as_str(),
                net_value.as_str(),
            ])
            .map_err(export_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("failed to finish export: {e}")))
}

fn decimal_comma(value: Decimal) -> String {
    value.to_string().replace('.', ",")
}

fn export_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("failed to write export: {e}"))
}
