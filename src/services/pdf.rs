// services/pdf.rs - consent document rendering

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::config::PdfConfig;
use crate::services::consent::strip_data_uri;
use crate::types::Loose;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF renderer URL is not configured")]
    NotConfigured,

    #[error("PDF renderer request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("PDF renderer returned {status}")]
    Status { status: u16 },

    #[error("PDF renderer returned an empty document")]
    Empty,
}

/// Everything printed on a consent document. All fields are optional; the
/// document shows blanks for whatever is missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsentDocument {
    pub reservation_id: Loose,
    pub status: Loose,
    pub tail_number: Loose,
    pub reservation_name: Loose,
    pub customer_name: Loose,
    pub fbo_name: Loose,
    pub aircraft_type: Loose,
    pub estimated_arrival: Loose,
    pub actual_arrival: Loose,
    pub estimated_departure: Loose,
    pub actual_departure: Loose,
    pub services: Option<Vec<DocumentService>>,
    pub terms: Loose,
    pub terms_version: Loose,
    pub signature_base64: Loose,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentService {
    pub product_name: Loose,
    pub quantity: Loose,
    pub service_date: Loose,
    pub quoted_price: Loose,
}

const STYLE: &str = r#"
      body { font-family: Arial, sans-serif; color: #111; margin: 0; padding: 24px; }
      .header { display: flex; justify-content: space-between; align-items: center; border-bottom: 2px solid #134C8D; padding-bottom: 8px; margin-bottom: 16px; }
      h1 { font-size: 20px; color: #134C8D; margin: 0; }
      h2 { font-size: 16px; margin: 12px 0 4px; color: #00263D; }
      .section { margin-bottom: 16px; }
      .grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 12px; font-size: 13px; }
      .grid p { margin: 2px 0; }
      table { width: 100%; border-collapse: collapse; margin-top: 8px; font-size: 13px; }
      table th, table td { border: 1px solid #ddd; padding: 6px 8px; text-align: left; }
      table th { background: #F4F6F8; font-weight: bold; }
      .terms { font-size: 11px; line-height: 1.5; border-top: 1px solid #ddd; padding-top: 8px; margin-top: 16px; }
      .signature { margin-top: 24px; }
      .signature img { border: 1px solid #ccc; height: 60px; }
      .footer { margin-top: 32px; font-size: 10px; color: #666; text-align: center; }
"#;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn field(value: &Loose) -> String {
    escape_html(&value.display())
}

/// Sum of every parseable quoted price
pub fn estimated_total(services: &[DocumentService]) -> Decimal {
    services
        .iter()
        .filter_map(|s| s.quoted_price.decimal("quotedPrice").ok().flatten())
        .sum()
}

/// Render the consent document as a standalone HTML page, dated `today`.
pub fn render_html(doc: &ConsentDocument, today: NaiveDate) -> String {
    let services = doc.services.as_deref().unwrap_or_default();

    let mut rows = String::new();
    for s in services {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>${}</td></tr>",
            field(&s.product_name),
            field(&s.quantity),
            field(&s.service_date),
            field(&s.quoted_price),
        ));
    }

    let signature = match doc.signature_base64.text() {
        Some(encoded) => format!(
            r#"<img src="data:image/png;base64,{}" />"#,
            escape_html(strip_data_uri(&encoded))
        ),
        None => "<p>[Signature Not Provided]</p>".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <style>{style}</style>
  </head>
  <body>
    <div class="header"><h1>Reservation Consent</h1></div>

    <div class="section">
      <h2>Reservation Details</h2>
      <div class="grid">
        <p><b>ID:</b> {reservation_id}</p>
        <p><b>Status:</b> {status}</p>
        <p><b>Tail:</b> {tail_number}</p>
        <p><b>Name:</b> {reservation_name}</p>
      </div>
    </div>

    <div class="section">
      <h2>Customer Information</h2>
      <div class="grid">
        <p><b>Name:</b> {customer_name}</p>
        <p><b>FBO:</b> {fbo_name}</p>
      </div>
    </div>

    <div class="section">
      <h2>Flight Information</h2>
      <div class="grid">
        <p><b>Type:</b> {aircraft_type}</p>
        <p><b>Estimated Arrival:</b> {estimated_arrival}</p>
        <p><b>Actual Arrival:</b> {actual_arrival}</p>
        <p><b>Estimated Departure:</b> {estimated_departure}</p>
        <p><b>Actual Departure:</b> {actual_departure}</p>
      </div>
    </div>

    <div class="section">
      <h2>Service Details</h2>
      <table>
        <thead>
          <tr><th>Product</th><th>Qty</th><th>Service Date</th><th>Quoted Price</th></tr>
        </thead>
        <tbody>
          {rows}
          <tr>
            <td colspan="3" style="text-align:right"><b>Estimated Total</b></td>
            <td><b>${total:.2}</b></td>
          </tr>
        </tbody>
      </table>
    </div>

    <div class="terms">
      <h2>Terms &amp; Conditions {terms_version}</h2>
      <p>{terms}</p>
    </div>

    <div class="signature">
      <h2>Customer Signature</h2>
      {signature}
      <p><b>Name:</b> {customer_name}</p>
      <p><b>Date:</b> {date}</p>
    </div>

    <div class="footer">
      <p>This electronic signature constitutes legal acceptance of the above terms.</p>
    </div>
  </body>
</html>
"#,
        style = STYLE,
        reservation_id = field(&doc.reservation_id),
        status = field(&doc.status),
        tail_number = field(&doc.tail_number),
        reservation_name = field(&doc.reservation_name),
        customer_name = field(&doc.customer_name),
        fbo_name = field(&doc.fbo_name),
        aircraft_type = field(&doc.aircraft_type),
        estimated_arrival = field(&doc.estimated_arrival),
        actual_arrival = field(&doc.actual_arrival),
        estimated_departure = field(&doc.estimated_departure),
        actual_departure = field(&doc.actual_departure),
        rows = rows,
        total = estimated_total(services),
        terms_version = field(&doc.terms_version),
        terms = field(&doc.terms),
        signature = signature,
        date = today.format("%m/%d/%Y"),
    )
}

/// Converts an HTML page into PDF bytes
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: String) -> Result<Vec<u8>, RenderError>;
}

/// Posts the page to an external HTML-to-PDF service and returns its body
pub struct HttpPdfRenderer {
    client: reqwest::Client,
    url: Option<String>,
    timeout: Duration,
}

impl HttpPdfRenderer {
    pub fn new(client: reqwest::Client, config: &PdfConfig) -> Self {
        Self {
            client,
            url: config.renderer_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl PdfRenderer for HttpPdfRenderer {
    async fn render(&self, html: String) -> Result<Vec<u8>, RenderError> {
        let url = self.url.as_deref().ok_or(RenderError::NotConfigured)?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/html; charset=utf-8")
            .header(reqwest::header::ACCEPT, "application/pdf")
            .timeout(self.timeout)
            .body(html)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(RenderError::Empty);
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> ConsentDocument {
        serde_json::from_value(value).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 27).unwrap()
    }

    #[test]
    fn interpolated_values_are_escaped() {
        let html = render_html(
            &doc(json!({
                "reservationId": "R1<script>alert(1)</script>",
                "customerName": "O'Brien & Sons",
                "terms": "<b>bold</b>"
            })),
            today(),
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("R1&lt;script&gt;"));
        assert!(html.contains("O&#39;Brien &amp; Sons"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn total_is_summed_to_two_decimals() {
        let html = render_html(
            &doc(json!({
                "services": [
                    { "productName": "Fuel", "quantity": 1, "quotedPrice": 100.5 },
                    { "productName": "Catering", "quantity": 2, "quotedPrice": "20.25" },
                    { "productName": "Towing", "quotedPrice": "n/a" }
                ]
            })),
            today(),
        );
        assert!(html.contains("<b>$120.75</b>"));
        assert!(html.contains("<td>Catering</td><td>2</td>"));
    }

    #[test]
    fn empty_service_list_totals_zero() {
        let html = render_html(&ConsentDocument::default(), today());
        assert!(html.contains("<b>$0.00</b>"));
    }

    #[test]
    fn signature_placeholder_when_absent() {
        let without = render_html(&ConsentDocument::default(), today());
        assert!(without.contains("[Signature Not Provided]"));
        assert!(without.contains("08/27/2025"));

        let with = render_html(&doc(json!({ "signatureBase64": "data:image/png;base64,AQID" })), today());
        assert!(with.contains(r#"src="data:image/png;base64,AQID""#));
        assert!(!with.contains("[Signature Not Provided]"));
    }

    #[tokio::test]
    async fn unconfigured_renderer_fails() {
        let renderer = HttpPdfRenderer::new(
            reqwest::Client::new(),
            &PdfConfig { renderer_url: None, timeout_secs: 5 },
        );
        assert!(matches!(renderer.render("<html/>".into()).await, Err(RenderError::NotConfigured)));
    }
}
