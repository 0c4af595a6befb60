use crate::error::{AppError, AppResult};
use crate::model::ledger::SourceField;
use crate::pipeline::normalize::NormalizedSet;

/// Source fields the aggregations cannot do without.
pub const REQUIRED_FIELDS: [SourceField; 7] = [
    SourceField::Year,
    SourceField::Month,
    SourceField::EmployeeName,
    SourceField::EventType,
    SourceField::EventName,
    SourceField::GrossAmount,
    SourceField::CompanyName,
];

/// Rejects a non-empty set whose nodes never carried one of
/// [`REQUIRED_FIELDS`]. An empty set passes: there is nothing to aggregate.
pub fn ensure_required_fields(set: &NormalizedSet) -> AppResult<()> {
    if set.records.is_empty() {
        return Ok(());
    }
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|f| !set.observed_fields.contains(*f))
        .map(|f| f.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::SchemaMismatch { missing })
    }
}
