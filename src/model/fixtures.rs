//! Ledger rows for unit tests.

use rust_decimal::Decimal;

use crate::model::ledger::{EventType, LedgerRecord};

pub fn record(employee: &str, event_type: EventType, amount: i64, month: u32, year: i32) -> LedgerRecord {
    LedgerRecord {
        company_id: "1".into(),
        company_name: "ACME LTDA".into(),
        employee_name: employee.into(),
        role: "Analista".into(),
        section: "Financeiro".into(),
        event_type,
        event_name: match event_type {
            EventType::Earning => "Salario".into(),
            EventType::Deduction => "INSS".into(),
            EventType::Unclassified => "Base FGTS".into(),
        },
        period_number: "1".into(),
        month,
        year,
        gross_amount: Decimal::from(amount),
        net_amount: Decimal::from(amount),
    }
}

pub fn earning(employee: &str, amount: i64, month: u32, year: i32) -> LedgerRecord {
    record(employee, EventType::Earning, amount, month, year)
}

pub fn deduction(employee: &str, amount: i64, month: u32, year: i32) -> LedgerRecord {
    record(employee, EventType::Deduction, amount, month, year)
}
