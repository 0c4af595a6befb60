//! Commitment ratio: how much of a group's earnings is eaten by deductions.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::ledger::{EventType, LedgerRecord};
use crate::pipeline::aggregate::{accumulate, top_ascending};
use crate::utils::format::fmt_percent;

/// Rows kept by the analysis (the highest ratios).
pub const COMMITMENT_SIZE: usize = 20;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentGrouping {
    Employee,
    Section,
    Role,
}

impl CommitmentGrouping {
    pub const ALL: [CommitmentGrouping; 3] = [
        CommitmentGrouping::Employee,
        CommitmentGrouping::Section,
        CommitmentGrouping::Role,
    ];

    fn key<'r>(&self, record: &'r LedgerRecord) -> &'r str {
        match self {
            CommitmentGrouping::Employee => &record.employee_name,
            CommitmentGrouping::Section => &record.section,
            CommitmentGrouping::Role => &record.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CommitmentRow {
    #[schema(example = "Ana Souza")]
    pub key: String,
    #[schema(value_type = String, example = "1000.00")]
    pub earnings_total: Decimal,
    #[schema(value_type = String, example = "400.00")]
    pub deductions_total: Decimal,
    /// deductions / earnings * 100, one decimal place.
    #[schema(value_type = String, example = "40.0")]
    pub ratio: Decimal,
    #[schema(example = "40.0%")]
    pub ratio_label: String,
    pub alert: bool,
    /// Filled only when grouping by employee.
    pub section: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CommitmentAnalysis {
    pub grouping: CommitmentGrouping,
    #[schema(value_type = String, example = "30")]
    pub threshold: Decimal,
    /// Ascending by ratio; the most committed group comes last.
    pub rows: Vec<CommitmentRow>,
    pub alert_count: usize,
    /// Rows at or above the threshold, highest ratio first.
    pub alerts: Vec<CommitmentRow>,
}

#[derive(Default)]
struct Totals {
    earnings: Decimal,
    deductions: Decimal,
}

/// Per-group commitment ratios over `records`.
///
/// Only earning rows feed `earnings_total` and only deduction rows feed
/// `deductions_total`. Groups without positive earnings have no ratio and are
/// left out, as are groups whose ratio does not fit in a Decimal.
pub fn commitment_analysis(
    records: &[LedgerRecord],
    grouping: CommitmentGrouping,
    threshold: Decimal,
) -> CommitmentAnalysis {
    let mut groups: HashMap<&str, Totals> = HashMap::new();
    for record in records {
        let totals = groups.entry(grouping.key(record)).or_default();
        match record.event_type {
            EventType::Earning => accumulate(&mut totals.earnings, record.gross_amount),
            EventType::Deduction => accumulate(&mut totals.deductions, record.gross_amount),
            EventType::Unclassified => {}
        }
    }

    let profiles = match grouping {
        CommitmentGrouping::Employee => employee_profiles(records),
        _ => HashMap::new(),
    };

    let rows: Vec<CommitmentRow> = groups
        .into_iter()
        .filter(|(_, t)| t.earnings > Decimal::ZERO)
        .filter_map(|(key, t)| {
            let ratio = ratio(t.deductions, t.earnings)?;
            let (section, role) = match profiles.get(key) {
                Some((section, role)) => (Some(section.to_string()), Some(role.to_string())),
                None => (None, None),
            };
            Some(CommitmentRow {
                key: key.to_string(),
                earnings_total: t.earnings,
                deductions_total: t.deductions,
                ratio,
                ratio_label: fmt_percent(ratio),
                alert: ratio >= threshold,
                section,
                role,
            })
        })
        .collect();

    let rows = top_ascending(rows, COMMITMENT_SIZE, |r| (r.ratio, r.key.clone()));

    let mut alerts: Vec<CommitmentRow> = rows.iter().filter(|r| r.alert).cloned().collect();
    alerts.reverse();

    CommitmentAnalysis {
        grouping,
        threshold,
        alert_count: alerts.len(),
        rows,
        alerts,
    }
}

/// `deductions / earnings * 100` to one decimal place; `None` on overflow.
fn ratio(deductions: Decimal, earnings: Decimal) -> Option<Decimal> {
    deductions
        .checked_div(earnings)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|r| r.round_dp(1))
}

/// Section and role of each employee, taken from the first row seen for that
/// name in input order.
fn employee_profiles(records: &[LedgerRecord]) -> HashMap<&str, (&str, &str)> {
    let mut profiles = HashMap::new();
    for record in records {
        profiles
            .entry(record.employee_name.as_str())
            .or_insert((record.section.as_str(), record.role.as_str()));
    }
    profiles
}
