// ABOUTME: Minimal Yahoo Finance quoteSummary client plus pure extractors
// ABOUTME: for price, company snapshot and income statement payloads.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, anyhow};
use serde::Serialize;
use serde_json::Value;

/// quoteSummary endpoint; the symbol is appended as a path segment.
pub const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Modules needed for the current price.
pub const PRICE_MODULES: &[&str] = &["price", "financialData"];

/// Modules needed for the company snapshot.
pub const COMPANY_MODULES: &[&str] = &[
    "price",
    "summaryProfile",
    "summaryDetail",
    "financialData",
    "defaultKeyStatistics",
];

/// Modules needed for annual income statements.
pub const INCOME_MODULES: &[&str] = &["incomeStatementHistory"];

/// Shared HTTP access to Yahoo Finance.
#[derive(Debug, Clone)]
pub struct YahooFinance {
    http: reqwest::Client,
    base_url: String,
}

impl Default for YahooFinance {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooFinance {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; crewline/0.1)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: QUOTE_SUMMARY_URL.to_string(),
        }
    }

    /// Point at a different quoteSummary endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the requested modules for a symbol.
    ///
    /// Returns the single `quoteSummary.result[0]` object.
    pub async fn quote_summary(&self, symbol: &str, modules: &[&str]) -> anyhow::Result<Value> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(symbol)
        );
        let response = self
            .http
            .get(&url)
            .query(&[("modules", modules.join(","))])
            .send()
            .await
            .context("request failed")?;

        let status = response.status();
        let text = response.text().await.context("failed to read response")?;
        parse_quote_summary(status.as_u16(), &text)
    }
}

/// Turn a raw quoteSummary reply into its result object.
///
/// Non-2xx replies keep their status; the message is Yahoo's error
/// description when the body is JSON, else the body text itself.
pub fn parse_quote_summary(status: u16, text: &str) -> anyhow::Result<Value> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|body| {
                body["quoteSummary"]["error"]["description"]
                    .as_str()
                    .map(str::to_string)
            })
            .unwrap_or_else(|| text.trim().to_string());
        return Err(anyhow!("HTTP {}: {}", status, message));
    }
    let body: Value = serde_json::from_str(text).context("invalid JSON")?;
    first_result(body)
}

/// Pull `quoteSummary.result[0]` out of a response body.
pub fn first_result(mut body: Value) -> anyhow::Result<Value> {
    if let Some(description) = body["quoteSummary"]["error"]["description"].as_str() {
        return Err(anyhow!("{}", description));
    }
    match body.pointer_mut("/quoteSummary/result/0") {
        Some(result) => Ok(result.take()),
        None => Err(anyhow!("no data returned")),
    }
}

/// Yahoo wraps numbers as `{"raw": 1.5, "fmt": "1.50"}`; unwrap to the raw value.
///
/// Empty wrappers (`{}`) become `null`.
pub fn raw(value: &Value) -> Value {
    match value {
        Value::Object(map) if map.contains_key("raw") => map["raw"].clone(),
        Value::Object(map) if map.is_empty() => Value::Null,
        other => other.clone(),
    }
}

fn field(summary: &Value, module: &str, key: &str) -> Value {
    raw(&summary[module][key])
}

fn first_present(candidates: [Value; 2]) -> Value {
    candidates
        .into_iter()
        .find(|v| !v.is_null())
        .unwrap_or(Value::Null)
}

fn with_currency(amount: &Value, currency: &str) -> String {
    let amount = match amount {
        Value::Null => "n/a".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("{} {}", amount, currency)
}

/// Regular market price, falling back to the analyst "current price".
pub fn current_price(summary: &Value) -> Option<f64> {
    first_present([
        field(summary, "price", "regularMarketPrice"),
        field(summary, "financialData", "currentPrice"),
    ])
    .as_f64()
}

/// Company profile and current financial snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CompanySnapshot {
    #[serde(rename = "Name")]
    pub name: Value,
    #[serde(rename = "Symbol")]
    pub symbol: Value,
    #[serde(rename = "Current Stock Price")]
    pub current_price: String,
    #[serde(rename = "Market Cap")]
    pub market_cap: String,
    #[serde(rename = "Sector")]
    pub sector: Value,
    #[serde(rename = "Industry")]
    pub industry: Value,
    #[serde(rename = "City")]
    pub city: Value,
    #[serde(rename = "Country")]
    pub country: Value,
    #[serde(rename = "EPS")]
    pub eps: Value,
    #[serde(rename = "P/E Ratio")]
    pub pe_ratio: Value,
    #[serde(rename = "52 Week Low")]
    pub week52_low: Value,
    #[serde(rename = "52 Week High")]
    pub week52_high: Value,
    #[serde(rename = "50 Day Average")]
    pub day50_average: Value,
    #[serde(rename = "200 Day Average")]
    pub day200_average: Value,
    #[serde(rename = "Employees")]
    pub employees: Value,
    #[serde(rename = "Total Cash")]
    pub total_cash: Value,
    #[serde(rename = "Free Cash flow")]
    pub free_cashflow: Value,
    #[serde(rename = "Operating Cash flow")]
    pub operating_cashflow: Value,
    #[serde(rename = "EBITDA")]
    pub ebitda: Value,
    #[serde(rename = "Revenue Growth")]
    pub revenue_growth: Value,
    #[serde(rename = "Gross Margins")]
    pub gross_margins: Value,
    #[serde(rename = "Ebitda Margins")]
    pub ebitda_margins: Value,
}

impl CompanySnapshot {
    /// Build the snapshot from a quoteSummary result with [`COMPANY_MODULES`].
    pub fn from_summary(summary: &Value) -> Self {
        let currency = summary["price"]["currency"].as_str().unwrap_or("USD");
        let price = first_present([
            field(summary, "price", "regularMarketPrice"),
            field(summary, "financialData", "currentPrice"),
        ]);
        let market_cap = first_present([
            field(summary, "price", "marketCap"),
            field(summary, "defaultKeyStatistics", "enterpriseValue"),
        ]);

        Self {
            name: field(summary, "price", "shortName"),
            symbol: field(summary, "price", "symbol"),
            current_price: with_currency(&price, currency),
            market_cap: with_currency(&market_cap, currency),
            sector: field(summary, "summaryProfile", "sector"),
            industry: field(summary, "summaryProfile", "industry"),
            city: field(summary, "summaryProfile", "city"),
            country: field(summary, "summaryProfile", "country"),
            eps: field(summary, "defaultKeyStatistics", "trailingEps"),
            pe_ratio: field(summary, "summaryDetail", "trailingPE"),
            week52_low: field(summary, "summaryDetail", "fiftyTwoWeekLow"),
            week52_high: field(summary, "summaryDetail", "fiftyTwoWeekHigh"),
            day50_average: field(summary, "summaryDetail", "fiftyDayAverage"),
            day200_average: field(summary, "summaryDetail", "twoHundredDayAverage"),
            employees: field(summary, "summaryProfile", "fullTimeEmployees"),
            total_cash: field(summary, "financialData", "totalCash"),
            free_cashflow: field(summary, "financialData", "freeCashflow"),
            operating_cashflow: field(summary, "financialData", "operatingCashflow"),
            ebitda: field(summary, "financialData", "ebitda"),
            revenue_growth: field(summary, "financialData", "revenueGrowth"),
            gross_margins: field(summary, "financialData", "grossMargins"),
            ebitda_margins: field(summary, "financialData", "ebitdaMargins"),
        }
    }
}

/// Line item → period end date → value, e.g.
/// `{"Total Revenue": {"2024-03-31": 2.29e12}}`.
pub type IncomeStatements = BTreeMap<String, BTreeMap<String, Value>>;

/// Reshape `incomeStatementHistory` into line items keyed by period.
pub fn income_statements(summary: &Value) -> IncomeStatements {
    let mut table = IncomeStatements::new();
    let periods = summary["incomeStatementHistory"]["incomeStatementHistory"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default();

    for period in periods {
        let Some(entries) = period.as_object() else {
            continue;
        };
        let date = match &period["endDate"] {
            Value::Object(d) => d
                .get("fmt")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| d.get("raw").map(Value::to_string)),
            _ => None,
        };
        let Some(date) = date else {
            continue;
        };

        for (key, value) in entries {
            if matches!(key.as_str(), "endDate" | "maxAge") {
                continue;
            }
            table
                .entry(title_case(key))
                .or_default()
                .insert(date.clone(), raw(value));
        }
    }

    table
}

/// `totalRevenue` → `Total Revenue`.
fn title_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, ch) in camel.chars().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            out.push(' ');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}
