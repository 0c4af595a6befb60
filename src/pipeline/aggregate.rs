use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::ledger::{EventType, LedgerRecord, PeriodKey};

/// Rows kept by the ranking reducers.
pub const RANKING_SIZE: usize = 10;

/// Earnings, deductions and their difference for one (year, month).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodBalance {
    /// `MM/YYYY` label.
    #[schema(example = "01/2024")]
    pub period: String,
    pub year: i32,
    pub month: u32,
    #[schema(value_type = String, example = "1000.00")]
    pub earnings: Decimal,
    #[schema(value_type = String, example = "200.00")]
    pub deductions: Decimal,
    #[schema(value_type = String, example = "800.00")]
    pub balance: Decimal,
}

/// One point of the net balance series.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BalancePoint {
    #[schema(example = "01/2024")]
    pub period: String,
    pub year: i32,
    pub month: u32,
    #[schema(value_type = String, example = "800.00")]
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RankedEvent {
    #[schema(example = "Salario")]
    pub event_name: String,
    /// Type carrying the largest share of the event's value.
    pub event_type: EventType,
    #[schema(value_type = String, example = "15000.00")]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RankedTotal {
    #[schema(example = "Financeiro")]
    pub key: String,
    #[schema(value_type = String, example = "15000.00")]
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub record_count: usize,
    pub earnings: Decimal,
    pub deductions: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CostCenter {
    Role,
    Section,
}

impl CostCenter {
    fn key<'r>(&self, record: &'r LedgerRecord) -> &'r str {
        match self {
            CostCenter::Role => &record.role,
            CostCenter::Section => &record.section,
        }
    }
}

/// Amount column summed by the cost-center rankings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AmountBasis {
    #[default]
    Gross,
    Net,
}

impl AmountBasis {
    fn amount(&self, record: &LedgerRecord) -> Decimal {
        match self {
            AmountBasis::Gross => record.gross_amount,
            AmountBasis::Net => record.net_amount,
        }
    }
}

#[derive(Default, Clone, Copy)]
struct Split {
    earnings: Decimal,
    deductions: Decimal,
}

impl Split {
    fn add(&mut self, record: &LedgerRecord) {
        match record.event_type {
            EventType::Earning => accumulate(&mut self.earnings, record.gross_amount),
            EventType::Deduction => accumulate(&mut self.deductions, record.gross_amount),
            EventType::Unclassified => {}
        }
    }

    fn balance(&self) -> Decimal {
        self.earnings.saturating_sub(self.deductions)
    }
}

/// Adds `amount` to `total`, pinning at the Decimal bounds instead of overflowing.
pub(crate) fn accumulate(total: &mut Decimal, amount: Decimal) {
    *total = total.saturating_add(amount);
}

fn split_by_period(records: &[LedgerRecord]) -> BTreeMap<PeriodKey, Split> {
    let mut periods: BTreeMap<PeriodKey, Split> = BTreeMap::new();
    for record in records {
        periods.entry(record.period_key()).or_default().add(record);
    }
    periods
}

/// Per-period earnings vs deductions, ordered chronologically. A period with
/// only one of the two types reports zero for the other.
pub fn period_balance(records: &[LedgerRecord]) -> Vec<PeriodBalance> {
    split_by_period(records)
        .into_iter()
        .map(|(key, split)| PeriodBalance {
            period: key.to_string(),
            year: key.year,
            month: key.month,
            earnings: split.earnings,
            deductions: split.deductions,
            balance: split.balance(),
        })
        .collect()
}

/// Each period's own net balance (not cumulative), in chronological order.
pub fn balance_evolution(records: &[LedgerRecord]) -> Vec<BalancePoint> {
    split_by_period(records)
        .into_iter()
        .map(|(key, split)| BalancePoint {
            period: key.to_string(),
            year: key.year,
            month: key.month,
            balance: split.balance(),
        })
        .collect()
}

/// Top events by summed gross amount, ascending so the largest comes last.
pub fn event_ranking(records: &[LedgerRecord]) -> Vec<RankedEvent> {
    let mut events: HashMap<&str, HashMap<EventType, Decimal>> = HashMap::new();
    for record in records {
        let total = events
            .entry(record.event_name.as_str())
            .or_default()
            .entry(record.event_type)
            .or_default();
        accumulate(total, record.gross_amount);
    }

    let ranked: Vec<RankedEvent> = events
        .into_iter()
        .map(|(name, by_type)| {
            let total = by_type
                .values()
                .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v));
            let event_type = by_type
                .iter()
                .max_by(|(ta, a), (tb, b)| a.abs().cmp(&b.abs()).then(tb.cmp(ta)))
                .map(|(t, _)| *t)
                .unwrap_or(EventType::Unclassified);
            RankedEvent {
                event_name: name.to_string(),
                event_type,
                total,
            }
        })
        .collect();

    top_ascending(ranked, RANKING_SIZE, |e| (e.total, e.event_name.clone()))
}

/// Top roles or sections by the chosen amount basis, ascending.
pub fn cost_center_ranking(
    records: &[LedgerRecord],
    center: CostCenter,
    basis: AmountBasis,
) -> Vec<RankedTotal> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for record in records {
        accumulate(totals.entry(center.key(record)).or_default(), basis.amount(record));
    }

    let ranked: Vec<RankedTotal> = totals
        .into_iter()
        .map(|(key, total)| RankedTotal {
            key: key.to_string(),
            total,
        })
        .collect();

    top_ascending(ranked, RANKING_SIZE, |r| (r.total, r.key.clone()))
}

/// Headline metrics of the filtered view.
pub fn summary(records: &[LedgerRecord]) -> Summary {
    let mut split = Split::default();
    for record in records {
        split.add(record);
    }
    Summary {
        record_count: records.len(),
        earnings: split.earnings,
        deductions: split.deductions,
        balance: split.balance(),
    }
}

/// Sorts ascending by `key` and keeps the last `limit` rows.
pub(crate) fn top_ascending<T, K: Ord>(
    mut rows: Vec<T>,
    limit: usize,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    rows.sort_by_key(|r| key(r));
    let skip = rows.len().saturating_sub(limit);
    rows.split_off(skip)
}
