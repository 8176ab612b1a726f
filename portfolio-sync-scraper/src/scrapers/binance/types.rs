//! Binance API payloads

use rust_decimal::Decimal;
use serde::Deserialize;

/// `{"code":-2015,"msg":"Invalid API-key, IP, or permissions for action."}`
#[derive(Debug, Deserialize)]
pub struct BinanceErrorResponse {
    pub code: i64,
    pub msg: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub balances: Vec<Balance>,
}

/// One wallet entry. Assets the user no longer holds are still listed, with zero amounts,
/// so only the asset code matters here.
#[derive(Debug, Deserialize)]
pub struct Balance {
    pub asset: String,
}

/// `GET /api/v3/exchangeInfo`, reduced to the symbol list.
#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

/// A spot pair. Delisted pairs stay in the list (status `BREAK`) and keep their trade history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    pub id: u64,
    pub price: Decimal,
    pub qty: Decimal,
    pub quote_qty: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
    /// Milliseconds since the epoch.
    pub time: i64,
    pub is_buyer: bool,
}
