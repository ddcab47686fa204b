use super::*;

#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct Deploy {
  pub tick: String,
  #[serde(rename = "max")]
  pub max_supply: String,
  #[serde(rename = "lim", default, skip_serializing_if = "Option::is_none")]
  pub mint_limit: Option<String>,
  #[serde(rename = "dec", default, skip_serializing_if = "Option::is_none")]
  pub decimals: Option<String>,
}
