use std::collections::BTreeSet;
use std::str::FromStr;

use roxmltree::{Document, Node};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::model::ledger::{EventType, LedgerRecord, SourceField};

/// Element name of one ledger line in the result document.
pub const RECORD_ELEMENT: &str = "Resultado";

/// Output of [`normalize`]: the records plus every source field seen in at
/// least one node, used for the schema check.
#[derive(Debug, Default)]
pub struct NormalizedSet {
    pub records: Vec<LedgerRecord>,
    pub observed_fields: BTreeSet<SourceField>,
}

/// Flattens the result document into one [`LedgerRecord`] per `Resultado`
/// node, preserving order.
///
/// Individual fields never fail: numbers degrade to 0 and text to "". Only a
/// document that is not XML at all is rejected.
pub fn normalize(document: &str) -> AppResult<NormalizedSet> {
    if document.trim().is_empty() {
        return Ok(NormalizedSet::default());
    }

    let doc = Document::parse(document)
        .map_err(|e| AppError::MalformedResponse(format!("result is not valid XML: {e}")))?;

    let mut set = NormalizedSet::default();
    for node in doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == RECORD_ELEMENT)
    {
        let fields = NodeFields::read(node, &mut set.observed_fields);
        set.records.push(fields.into_record());
    }

    debug!(
        records = set.records.len(),
        fields = set.observed_fields.len(),
        "Normalized ledger document"
    );
    Ok(set)
}

#[derive(Default)]
struct NodeFields<'a> {
    values: [Option<&'a str>; FIELD_COUNT],
}

const FIELD_COUNT: usize = 12;

impl<'a> NodeFields<'a> {
    fn read<'input: 'a>(node: Node<'a, 'input>, observed: &mut BTreeSet<SourceField>) -> Self {
        let mut fields = NodeFields::default();
        for child in node.children().filter(|c| c.is_element()) {
            if let Some(field) = SourceField::from_tag(child.tag_name().name()) {
                observed.insert(field);
                fields.values[field as usize] = Some(child.text().unwrap_or_default());
            }
        }
        fields
    }

    fn text(&self, field: SourceField) -> String {
        self.values[field as usize]
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn raw(&self, field: SourceField) -> &str {
        self.values[field as usize].unwrap_or_default()
    }

    fn into_record(self) -> LedgerRecord {
        LedgerRecord {
            company_id: self.text(SourceField::CompanyId),
            company_name: self.text(SourceField::CompanyName),
            employee_name: self.text(SourceField::EmployeeName),
            role: self.text(SourceField::Role),
            section: self.text(SourceField::Section),
            event_type: EventType::from_source(self.raw(SourceField::EventType)),
            event_name: self.text(SourceField::EventName),
            period_number: self.text(SourceField::PeriodNumber),
            month: parse_month(self.raw(SourceField::Month)),
            year: parse_year(self.raw(SourceField::Year)),
            gross_amount: parse_amount(self.raw(SourceField::GrossAmount)),
            net_amount: parse_amount(self.raw(SourceField::NetAmount)),
        }
    }
}

fn parse_month(raw: &str) -> u32 {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .unwrap_or(0)
}

fn parse_year(raw: &str) -> i32 {
    raw.trim().parse::<i32>().unwrap_or(0)
}

fn parse_amount(raw: &str) -> Decimal {
    let raw = raw.trim();
    if raw.is_empty() {
        return Decimal::ZERO;
    }
    if let Ok(value) = Decimal::from_str(raw) {
        return value;
    }
    if let Ok(value) = Decimal::from_scientific(raw) {
        return value;
    }
    // decimal comma without thousands separators, e.g. "1234,56"
    if raw.contains(',') && !raw.contains('.') {
        if let Ok(value) = Decimal::from_str(&raw.replace(',', ".")) {
            return value;
        }
    }
    Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"<NewDataSet>
  <Resultado>
    <CODCOLIGADA>1</CODCOLIGADA>
    <NOMEFANTASIA>ACME LTDA</NOMEFANTASIA>
    <NOME>Ana Souza</NOME>
    <FUNCAO>Analista</FUNCAO>
    <SECAO>Financeiro</SECAO>
    <TIPO_EVENTO>Provento</TIPO_EVENTO>
    <EVENTO>Salario</EVENTO>
    <NROPERIODO>1</NROPERIODO>
    <MESCOMP>3</MESCOMP>
    <ANOCOMP>2024</ANOCOMP>
    <VALOR>5000.50</VALOR>
    <VLR_PROV_DESC>5000.50</VLR_PROV_DESC>
  </Resultado>
  <Resultado>
    <NOME>Bruno Lima</NOME>
    <TIPO_EVENTO>Desconto</TIPO_EVENTO>
    <EVENTO>INSS</EVENTO>
    <MESCOMP>13</MESCOMP>
    <ANOCOMP>abc</ANOCOMP>
    <VALOR>n/a</VALOR>
    <VLR_PROV_DESC>-450,25</VLR_PROV_DESC>
  </Resultado>
  <Totais><VALOR>1</VALOR></Totais>
</NewDataSet>"#;

    #[test]
    fn produces_one_record_per_node_in_order() {
        let set = normalize(DOCUMENT).unwrap();
        assert_eq!(set.records.len(), 2);

        let ana = &set.records[0];
        assert_eq!(ana.employee_name, "Ana Souza");
        assert_eq!(ana.company_name, "ACME LTDA");
        assert_eq!(ana.event_type, EventType::Earning);
        assert_eq!(ana.month, 3);
        assert_eq!(ana.year, 2024);
        assert_eq!(ana.gross_amount, Decimal::new(500050, 2));

        assert_eq!(set.records[1].employee_name, "Bruno Lima");
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let set = normalize(DOCUMENT).unwrap();
        let bruno = &set.records[1];
        assert_eq!(bruno.month, 0);
        assert_eq!(bruno.year, 0);
        assert_eq!(bruno.gross_amount, Decimal::ZERO);
        assert_eq!(bruno.net_amount, Decimal::new(-45025, 2));
        assert_eq!(bruno.company_id, "");
        assert_eq!(bruno.role, "");
    }

    #[test]
    fn every_month_is_zero_or_calendar_month() {
        let set = normalize(DOCUMENT).unwrap();
        assert!(set.records.iter().all(|r| r.month <= 12));
    }

    #[test]
    fn tracks_observed_fields() {
        let set = normalize(DOCUMENT).unwrap();
        assert_eq!(set.observed_fields.len(), 12);

        let partial = normalize("<NewDataSet><Resultado><NOME>Ana</NOME></Resultado></NewDataSet>")
            .unwrap();
        assert_eq!(
            partial.observed_fields.into_iter().collect::<Vec<_>>(),
            vec![SourceField::EmployeeName]
        );
    }

    #[test]
    fn empty_document_is_an_empty_set() {
        assert!(normalize("").unwrap().records.is_empty());
        assert!(normalize("<NewDataSet/>").unwrap().records.is_empty());
    }

    #[test]
    fn non_xml_is_malformed() {
        assert!(matches!(
            normalize("Erro: sentenca invalida"),
            Err(AppError::MalformedResponse(_))
        ));
    }

    #[test]
    fn amount_parsing_accepts_common_forms() {
        assert_eq!(parse_amount(" 12.5 "), Decimal::new(125, 1));
        assert_eq!(parse_amount("1e3"), Decimal::from(1000));
        assert_eq!(parse_amount("7,25"), Decimal::new(725, 2));
        assert_eq!(parse_amount("1.234,56"), Decimal::ZERO);
    }
}
