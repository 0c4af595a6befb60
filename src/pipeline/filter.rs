use crate::model::criteria::FilterCriteria;
use crate::model::ledger::LedgerRecord;

impl FilterCriteria {
    /// Conjunction of every selection. An empty selection set matches nothing.
    pub fn matches(&self, record: &LedgerRecord) -> bool {
        self.years.contains(&record.year)
            && self.event_types.contains(&record.event_type)
            && self.periods.contains(&record.period_number)
            && self.employee.matches(&record.employee_name)
            && self.month_range.contains(record.month)
    }
}

/// Rows of `records` kept by `criteria`, in their original order.
pub fn apply(records: &[LedgerRecord], criteria: &FilterCriteria) -> Vec<LedgerRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::criteria::{EmployeeSelection, MonthRange};
    use crate::model::fixtures::{deduction, earning};
    use crate::model::ledger::EventType;

    fn dataset() -> Vec<LedgerRecord> {
        let mut bonus = earning("Bruno", 300, 12, 2023);
        bonus.period_number = "2".into();
        vec![
            earning("Ana", 1000, 1, 2024),
            deduction("Ana", 200, 1, 2024),
            earning("Bruno", 500, 6, 2024),
            bonus,
        ]
    }

    #[test]
    fn all_of_keeps_everything() {
        let records = dataset();
        let criteria = FilterCriteria::all_of(&records);
        assert_eq!(apply(&records, &criteria), records);
    }

    #[test]
    fn predicates_are_combined_with_and() {
        let records = dataset();
        let mut criteria = FilterCriteria::all_of(&records);
        criteria.years = BTreeSet::from([2024]);
        criteria.event_types = BTreeSet::from([EventType::Earning]);
        criteria.employee = EmployeeSelection::Named("Ana".into());

        let out = apply(&records, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].employee_name, "Ana");
        assert_eq!(out[0].event_type, EventType::Earning);
    }

    #[test]
    fn month_range_is_inclusive() {
        let records = dataset();
        let mut criteria = FilterCriteria::all_of(&records);
        criteria.month_range = MonthRange { min: 1, max: 6 };
        let out = apply(&records, &criteria);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| (1..=6).contains(&r.month)));
    }

    #[test]
    fn any_empty_selection_yields_nothing() {
        let records = dataset();
        let full = FilterCriteria::all_of(&records);

        let mut no_years = full.clone();
        no_years.years.clear();
        assert!(apply(&records, &no_years).is_empty());

        let mut no_types = full.clone();
        no_types.event_types.clear();
        assert!(apply(&records, &no_types).is_empty());

        let mut no_periods = full;
        no_periods.periods.clear();
        assert!(apply(&records, &no_periods).is_empty());
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let records = dataset();
        let mut criteria = FilterCriteria::all_of(&records);
        criteria.periods = BTreeSet::from(["1".to_string()]);
        let once = apply(&records, &criteria);
        let twice = apply(&once, &criteria);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }
}
