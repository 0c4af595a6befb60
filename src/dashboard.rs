//! One render pass: session state and filter selections in, every widget's
//! data out.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::criteria::{EmployeeSelection, FilterCriteria, MonthRange, month_bounds};
use crate::model::ledger::{EventType, LedgerRecord};
use crate::model::session::Session;
use crate::pipeline::aggregate::{
    self, AmountBasis, BalancePoint, CostCenter, PeriodBalance, RankedEvent, RankedTotal,
};
use crate::pipeline::commitment::{CommitmentAnalysis, CommitmentGrouping, commitment_analysis};
use crate::pipeline::filter;
use crate::utils::format::{MONTH_LABELS, fmt_brl, month_label};

pub const DEFAULT_THRESHOLD: u32 = 30;
pub const MIN_THRESHOLD: u32 = 10;
pub const MAX_THRESHOLD: u32 = 80;

/// Filter and display selections. An omitted list means "every available
/// value"; an empty list selects nothing.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DashboardRequest {
    #[schema(example = json!([2024]))]
    pub years: Option<Vec<i32>>,
    #[schema(example = json!(["Provento", "Desconto"]))]
    pub event_types: Option<Vec<EventType>>,
    #[schema(example = json!(["1"]))]
    pub periods: Option<Vec<String>>,
    /// Employee name; omit for all employees.
    #[schema(example = "Ana Souza")]
    pub employee: Option<String>,
    pub month_range: Option<MonthRange>,
    pub amount_basis: Option<AmountBasis>,
    /// Commitment alert threshold in percent.
    #[schema(example = 30, minimum = 10, maximum = 80)]
    pub threshold: Option<u32>,
}

impl DashboardRequest {
    pub fn criteria(&self, records: &[LedgerRecord]) -> AppResult<FilterCriteria> {
        let available = FilterCriteria::all_of(records);
        let month_range = match self.month_range {
            Some(range) => MonthRange::new(range.min, range.max)?,
            None => available.month_range,
        };
        Ok(FilterCriteria {
            years: pick(&self.years, available.years),
            event_types: pick(&self.event_types, available.event_types),
            periods: pick(&self.periods, available.periods),
            employee: match &self.employee {
                Some(name) => EmployeeSelection::Named(name.clone()),
                None => EmployeeSelection::All,
            },
            month_range,
        })
    }

    pub fn threshold(&self) -> AppResult<u32> {
        let threshold = self.threshold.unwrap_or(DEFAULT_THRESHOLD);
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
            return Err(AppError::Validation(format!(
                "threshold must be between {MIN_THRESHOLD} and {MAX_THRESHOLD}"
            )));
        }
        Ok(threshold)
    }
}

fn pick<T: Ord + Clone>(chosen: &Option<Vec<T>>, available: BTreeSet<T>) -> BTreeSet<T> {
    match chosen {
        Some(values) => values.iter().cloned().collect(),
        None => available,
    }
}

/// Values offered by the filter widgets, taken from the full dataset.
#[derive(Debug, Serialize, ToSchema)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub event_types: Vec<EventType>,
    pub periods: Vec<String>,
    pub employees: Vec<String>,
    pub month_min: u32,
    pub month_max: u32,
    pub month_labels: Vec<String>,
}

impl FilterOptions {
    fn from_records(records: &[LedgerRecord]) -> Self {
        let available = FilterCriteria::all_of(records);
        let employees: BTreeSet<&str> = records.iter().map(|r| r.employee_name.as_str()).collect();
        let (month_min, month_max) = month_bounds(records).unwrap_or((0, 0));
        Self {
            years: available.years.into_iter().collect(),
            event_types: available.event_types.into_iter().collect(),
            periods: available.periods.into_iter().collect(),
            employees: employees.into_iter().map(String::from).collect(),
            month_min,
            month_max,
            month_labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Effective selections after defaults were applied.
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionView {
    pub years: Vec<i32>,
    pub event_types: Vec<EventType>,
    pub periods: Vec<String>,
    /// `null` when every employee is selected.
    pub employee: Option<String>,
    pub month_range: MonthRange,
    pub caption: String,
    pub amount_basis: AmountBasis,
    pub threshold: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryView {
    pub record_count: usize,
    #[schema(value_type = String)]
    pub earnings: Decimal,
    #[schema(value_type = String)]
    pub deductions: Decimal,
    #[schema(value_type = String)]
    pub balance: Decimal,
    #[schema(example = "R$ 1.000,00")]
    pub earnings_label: String,
    #[schema(example = "R$ 200,00")]
    pub deductions_label: String,
    #[schema(example = "R$ 800,00")]
    pub balance_label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardView {
    pub options: FilterOptions,
    pub selection: SelectionView,
    pub summary: SummaryView,
    pub period_balance: Vec<PeriodBalance>,
    pub balance_evolution: Vec<BalancePoint>,
    pub event_ranking: Vec<RankedEvent>,
    pub role_ranking: Vec<RankedTotal>,
    pub section_ranking: Vec<RankedTotal>,
    /// By employee, by section and by role.
    pub commitment: Vec<CommitmentAnalysis>,
    /// Filtered rows ordered by year, month and employee.
    pub records: Vec<LedgerRecord>,
}

/// Filtered rows of the session's dataset for the given selections.
pub fn filtered_view(session: &Session, request: &DashboardRequest) -> AppResult<Vec<LedgerRecord>> {
    if session.dataset.is_empty() {
        return Err(AppError::NoData);
    }
    let criteria = request.criteria(&session.dataset)?;
    Ok(filter::apply(&session.dataset, &criteria))
}

/// Builds every widget from one filtered snapshot of the session's dataset.
pub fn render(session: &Session, request: &DashboardRequest) -> AppResult<DashboardView> {
    if session.dataset.is_empty() {
        return Err(AppError::NoData);
    }
    let dataset = &session.dataset;
    let criteria = request.criteria(dataset)?;
    let threshold = request.threshold()?;
    let basis = request.amount_basis.unwrap_or_default();

    let view = filter::apply(dataset, &criteria);

    let summary = aggregate::summary(&view);
    let commitment = CommitmentGrouping::ALL
        .into_iter()
        .map(|grouping| commitment_analysis(&view, grouping, Decimal::from(threshold)))
        .collect();

    let mut records = view.clone();
    records.sort_by(|a, b| {
        (a.year, a.month, &a.employee_name).cmp(&(b.year, b.month, &b.employee_name))
    });

    Ok(DashboardView {
        options: FilterOptions::from_records(dataset),
        selection: SelectionView {
            caption: format!(
                "Filtrando de {} até {}",
                month_label(criteria.month_range.min),
                month_label(criteria.month_range.max)
            ),
            years: criteria.years.into_iter().collect(),
            event_types: criteria.event_types.into_iter().collect(),
            periods: criteria.periods.into_iter().collect(),
            employee: criteria.employee.name().map(String::from),
            month_range: criteria.month_range,
            amount_basis: basis,
            threshold,
        },
        summary: SummaryView {
            record_count: summary.record_count,
            earnings: summary.earnings,
            deductions: summary.deductions,
            balance: summary.balance,
            earnings_label: fmt_brl(summary.earnings),
            deductions_label: fmt_brl(summary.deductions),
            balance_label: fmt_brl(summary.balance),
        },
        period_balance: aggregate::period_balance(&view),
        balance_evolution: aggregate::balance_evolution(&view),
        event_ranking: aggregate::event_ranking(&view),
        role_ranking: aggregate::cost_center_ranking(&view, CostCenter::Role, basis),
        section_ranking: aggregate::cost_center_ranking(&view, CostCenter::Section, basis),
        commitment,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::connection::QueryParams;
    use crate::model::fixtures::{deduction, earning};

    fn session_with(records: Vec<LedgerRecord>) -> Session {
        let mut session = Session::new("http://localhost:8051".into(), "mestre".into(), 2024);
        session.replace_dataset(QueryParams::parse("1", 2024).unwrap(), records, None);
        session
    }

    fn dataset() -> Vec<LedgerRecord> {
        let mut bruno = earning("Bruno", 2000, 2, 2024);
        bruno.section = "TI".into();
        bruno.role = "Desenvolvedor".into();
        vec![
            earning("Carla", 1500, 3, 2024),
            earning("Ana", 1000, 1, 2024),
            deduction("Ana", 400, 1, 2024),
            bruno,
            deduction("Bruno", 100, 2, 2024),
        ]
    }

    #[test]
    fn default_request_shows_everything() {
        let view = render(&session_with(dataset()), &DashboardRequest::default()).unwrap();
        assert_eq!(view.summary.record_count, 5);
        assert_eq!(view.summary.balance, Decimal::from(4000));
        assert_eq!(view.summary.balance_label, "R$ 4.000,00");
        assert_eq!(view.options.employees, vec!["Ana", "Bruno", "Carla"]);
        assert_eq!((view.options.month_min, view.options.month_max), (1, 3));
        assert_eq!(view.selection.caption, "Filtrando de Jan até Mar");
        assert_eq!(view.selection.threshold, DEFAULT_THRESHOLD);
        assert_eq!(view.period_balance.len(), 3);
        assert_eq!(view.commitment.len(), 3);
        assert_eq!(view.commitment[0].grouping, CommitmentGrouping::Employee);
        assert_eq!(view.commitment[0].alert_count, 1);
    }

    #[test]
    fn records_are_sorted_by_year_month_employee() {
        let view = render(&session_with(dataset()), &DashboardRequest::default()).unwrap();
        let order: Vec<_> = view
            .records
            .iter()
            .map(|r| (r.month, r.employee_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(1, "Ana"), (1, "Ana"), (2, "Bruno"), (2, "Bruno"), (3, "Carla")]
        );
    }

    #[test]
    fn explicit_empty_selection_empties_every_widget() {
        let request = DashboardRequest {
            event_types: Some(Vec::new()),
            ..Default::default()
        };
        let view = render(&session_with(dataset()), &request).unwrap();
        assert_eq!(view.summary.record_count, 0);
        assert!(view.period_balance.is_empty());
        assert!(view.event_ranking.is_empty());
        assert!(view.commitment.iter().all(|c| c.rows.is_empty()));
        // options still describe the full dataset
        assert_eq!(view.options.employees.len(), 3);
    }

    #[test]
    fn employee_and_month_selections_apply() {
        let request = DashboardRequest {
            employee: Some("Bruno".into()),
            month_range: Some(MonthRange { min: 2, max: 2 }),
            amount_basis: Some(AmountBasis::Net),
            ..Default::default()
        };
        let view = render(&session_with(dataset()), &request).unwrap();
        assert_eq!(view.summary.record_count, 2);
        assert_eq!(view.selection.employee.as_deref(), Some("Bruno"));
        assert_eq!(view.role_ranking.len(), 2);
        assert_eq!(view.section_ranking.last().unwrap().key, "TI");
    }

    #[test]
    fn rejects_out_of_range_threshold_and_inverted_months() {
        let session = session_with(dataset());
        let request = DashboardRequest {
            threshold: Some(90),
            ..Default::default()
        };
        assert!(matches!(render(&session, &request), Err(AppError::Validation(_))));

        let request = DashboardRequest {
            month_range: Some(MonthRange { min: 5, max: 1 }),
            ..Default::default()
        };
        assert!(matches!(render(&session, &request), Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_dataset_asks_for_a_query() {
        let session = Session::new("http://localhost:8051".into(), "mestre".into(), 2024);
        assert!(matches!(
            render(&session, &DashboardRequest::default()),
            Err(AppError::NoData)
        ));
    }
}
