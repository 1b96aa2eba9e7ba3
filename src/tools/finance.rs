// ABOUTME: Stock data tools backed by Yahoo Finance: current price, company
// ABOUTME: snapshot and income statements. Lookup failures are returned as text.

use async_trait::async_trait;
use serde::Deserialize;

use super::yahoo::{
    COMPANY_MODULES, CompanySnapshot, INCOME_MODULES, PRICE_MODULES, YahooFinance,
    current_price, income_statements,
};
use crate::tool::{Tool, ToolResult, parse_params, single_string_schema};

#[derive(Deserialize)]
struct SymbolParams {
    symbol: String,
}

fn symbol_schema() -> serde_json::Value {
    single_string_schema("symbol", "The stock symbol, e.g. TATASTEEL.NS")
}

/// Current market price for a symbol, formatted to two decimals.
#[derive(Debug, Clone, Default)]
pub struct StockPriceTool {
    yahoo: YahooFinance,
}

impl StockPriceTool {
    pub fn new(yahoo: YahooFinance) -> Self {
        Self { yahoo }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_current_stock_price"
    }

    fn description(&self) -> &str {
        "Use this function to get the current stock price for a given symbol. \
         Returns the current stock price or an error message."
    }

    fn schema(&self) -> serde_json::Value {
        symbol_schema()
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let SymbolParams { symbol } = parse_params(params)?;

        match self.yahoo.quote_summary(&symbol, PRICE_MODULES).await {
            Ok(summary) => Ok(match current_price(&summary) {
                Some(price) => ToolResult::text(format!("{:.2}", price)),
                None => {
                    ToolResult::error(format!("Could not fetch current price for {}", symbol))
                }
            }),
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "price lookup failed");
                Ok(ToolResult::error(format!(
                    "Error fetching current price for {}: {:#}",
                    symbol, e
                )))
            }
        }
    }
}

/// Company profile and financial snapshot as JSON.
#[derive(Debug, Clone, Default)]
pub struct CompanyInfoTool {
    yahoo: YahooFinance,
}

impl CompanyInfoTool {
    pub fn new(yahoo: YahooFinance) -> Self {
        Self { yahoo }
    }
}

#[async_trait]
impl Tool for CompanyInfoTool {
    fn name(&self) -> &str {
        "get_company_info"
    }

    fn description(&self) -> &str {
        "Use this function to get company information and current financial snapshot \
         for a given stock symbol. Returns JSON containing company profile and current \
         financial snapshot."
    }

    fn schema(&self) -> serde_json::Value {
        symbol_schema()
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let SymbolParams { symbol } = parse_params(params)?;

        match self.yahoo.quote_summary(&symbol, COMPANY_MODULES).await {
            Ok(summary) => Ok(ToolResult::json(&CompanySnapshot::from_summary(&summary))?),
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "company lookup failed");
                Ok(ToolResult::error(format!(
                    "Error fetching company profile for {}: {:#}",
                    symbol, e
                )))
            }
        }
    }
}

/// Annual income statements as JSON keyed by line item then period.
#[derive(Debug, Clone, Default)]
pub struct IncomeStatementsTool {
    yahoo: YahooFinance,
}

impl IncomeStatementsTool {
    pub fn new(yahoo: YahooFinance) -> Self {
        Self { yahoo }
    }
}

#[async_trait]
impl Tool for IncomeStatementsTool {
    fn name(&self) -> &str {
        "get_income_statements"
    }

    fn description(&self) -> &str {
        "Use this function to get income statements for a given stock symbol. \
         Returns JSON containing income statements or an empty object."
    }

    fn schema(&self) -> serde_json::Value {
        symbol_schema()
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let SymbolParams { symbol } = parse_params(params)?;

        match self.yahoo.quote_summary(&symbol, INCOME_MODULES).await {
            Ok(summary) => Ok(ToolResult::json(&income_statements(&summary))?),
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "income statement lookup failed");
                Ok(ToolResult::error(format!(
                    "Error fetching income statements for {}: {:#}",
                    symbol, e
                )))
            }
        }
    }
}
