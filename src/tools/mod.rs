// ABOUTME: Built-in tools - internet search and Yahoo Finance lookups.
// ABOUTME: Each tool takes one string argument and returns text or JSON text.

mod finance;
mod web_search;
pub mod yahoo;

pub use finance::{CompanyInfoTool, IncomeStatementsTool, StockPriceTool};
pub use web_search::{DuckDuckGoSearchTool, SearchHit};

use crate::tool::Registry;

/// Register every built-in tool, sharing one Yahoo Finance client.
pub async fn register_builtin(registry: &Registry) {
    let yahoo = yahoo::YahooFinance::new();
    registry.register(DuckDuckGoSearchTool::new()).await;
    registry.register(StockPriceTool::new(yahoo.clone())).await;
    registry.register(CompanyInfoTool::new(yahoo.clone())).await;
    registry.register(IncomeStatementsTool::new(yahoo)).await;
}
