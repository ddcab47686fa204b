use super::*;

#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct Mint {
  pub tick: String,
  #[serde(rename = "amt")]
  pub amount: String,
}
