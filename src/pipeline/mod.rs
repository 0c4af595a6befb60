//! Pure transformation stages: raw document → normalized table → filtered
//! view → independent aggregations.

pub mod aggregate;
pub mod commitment;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod schema;

use crate::error::AppResult;
use crate::model::ledger::LedgerRecord;

/// Normalizes a result document and checks it carries what the aggregations need.
pub fn load(document: &str) -> AppResult<Vec<LedgerRecord>> {
    let set = normalize::normalize(document)?;
    schema::ensure_required_fields(&set)?;
    Ok(set.records)
}
