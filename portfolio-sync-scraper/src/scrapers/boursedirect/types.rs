//! Bourse Direct payloads

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// One line of the operations history. Amounts come as French-formatted strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub reference: String,
    /// `DD/MM/YYYY`
    pub date: String,
    #[serde(rename = "type")]
    pub operation_type: String,
    #[serde(default)]
    pub libelle: String,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub quantite: Option<String>,
    #[serde(default)]
    pub cours: Option<String>,
    pub montant: String,
    #[serde(default)]
    pub frais: Option<String>,
    #[serde(default = "default_currency")]
    pub devise: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}
