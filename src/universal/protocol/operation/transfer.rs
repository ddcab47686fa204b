use super::*;

/// `amt` is either a single amount or an array of amounts; the array form
/// is a multi-receiver transfer paying the first N standard outputs and is
/// applied all-or-nothing.
#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TransferAmount {
  Single(String),
  Multi(Vec<String>),
}

#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct Transfer {
  pub tick: String,
  #[serde(rename = "amt")]
  pub amount: TransferAmount,
}

impl Transfer {
  pub fn amounts(&self) -> Vec<&str> {
    match &self.amount {
      TransferAmount::Single(amount) => vec![amount.as_str()],
      TransferAmount::Multi(amounts) => amounts.iter().map(String::as_str).collect(),
    }
  }
}
