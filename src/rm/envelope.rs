//! SOAP 1.1 framing of the `RealizarConsultaSQL` call.

use roxmltree::Document;

use crate::error::{AppError, AppResult};
use crate::model::connection::{COMPANY_FILTER, QueryParams, REPORT_ID, SYSTEM_CODE};

pub const SOAP_ACTION: &str = "http://www.totvs.com/IwsConsultaSQL/RealizarConsultaSQL";
const RESULT_ELEMENT: &str = "RealizarConsultaSQLResult";

/// Builds the request envelope.
///
/// Every interpolated value is a fixed ASCII constant or the
/// `CODCOLIGADA={digits};ANO={digits}` string, none of which contain XML
/// markup characters, so nothing is escaped.
pub fn request_body(params: &QueryParams) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:tot="http://www.totvs.com/">
  <soapenv:Header/>
  <soapenv:Body>
    <tot:RealizarConsultaSQL>
      <tot:codSentenca>{report}</tot:codSentenca>
      <tot:codColigada>{company_filter}</tot:codColigada>
      <tot:codSistema>{system}</tot:codSistema>
      <tot:parameters>{parameters}</tot:parameters>
    </tot:RealizarConsultaSQL>
  </soapenv:Body>
</soapenv:Envelope>"#,
        report = REPORT_ID,
        company_filter = COMPANY_FILTER,
        system = SYSTEM_CODE,
        parameters = params.report_parameters(),
    )
}

/// Pulls the result document out of a response envelope.
///
/// A SOAP fault is the remote side refusing the call and maps to
/// [`AppError::Transport`]; anything that is not a well-formed envelope with
/// a result element is [`AppError::MalformedResponse`].
pub fn extract_result(envelope: &str) -> AppResult<String> {
    let doc = Document::parse(envelope)
        .map_err(|e| AppError::MalformedResponse(format!("envelope is not valid XML: {e}")))?;

    if let Some(fault) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Fault")
    {
        let reason = fault
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "faultstring")
            .and_then(|n| n.text())
            .unwrap_or("unspecified fault")
            .trim()
            .to_string();
        return Err(AppError::Transport(format!("remote fault: {reason}")));
    }

    let result = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == RESULT_ELEMENT)
        .ok_or_else(|| {
            AppError::MalformedResponse(format!("envelope has no {RESULT_ELEMENT} element"))
        })?;

    Ok(result.text().unwrap_or_default().to_string())
}
