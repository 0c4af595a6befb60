use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::ledger::{EventType, LedgerRecord};

/// Employee choice: every employee, or one by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeSelection {
    All,
    Named(String),
}

impl EmployeeSelection {
    pub fn name(&self) -> Option<&str> {
        match self {
            EmployeeSelection::All => None,
            EmployeeSelection::Named(name) => Some(name),
        }
    }

    pub fn matches(&self, employee_name: &str) -> bool {
        match self {
            EmployeeSelection::All => true,
            EmployeeSelection::Named(name) => name == employee_name,
        }
    }
}

/// Inclusive month bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MonthRange {
    #[schema(example = 1)]
    pub min: u32,
    #[schema(example = 12)]
    pub max: u32,
}

impl MonthRange {
    pub fn new(min: u32, max: u32) -> AppResult<Self> {
        if min > max {
            return Err(AppError::Validation(format!(
                "month range start {min} is after end {max}"
            )));
        }
        Ok(Self {
            min: min.min(12),
            max: max.min(12),
        })
    }

    pub fn contains(&self, month: u32) -> bool {
        (self.min..=self.max).contains(&month)
    }
}

/// Snapshot of the user's filter selections for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub years: BTreeSet<i32>,
    pub event_types: BTreeSet<EventType>,
    pub periods: BTreeSet<String>,
    pub employee: EmployeeSelection,
    pub month_range: MonthRange,
}

impl FilterCriteria {
    /// Selections that keep every row of `records`: each set holds all values
    /// present, and the month range spans the observed minimum and maximum.
    pub fn all_of(records: &[LedgerRecord]) -> Self {
        let (min, max) = month_bounds(records).unwrap_or((0, 12));
        Self {
            years: records.iter().map(|r| r.year).collect(),
            event_types: records.iter().map(|r| r.event_type).collect(),
            periods: records.iter().map(|r| r.period_number.clone()).collect(),
            employee: EmployeeSelection::All,
            month_range: MonthRange { min, max },
        }
    }
}

pub fn month_bounds(records: &[LedgerRecord]) -> Option<(u32, u32)> {
    let min = records.iter().map(|r| r.month).min()?;
    let max = records.iter().map(|r| r.month).max()?;
    Some((min, max))
}
