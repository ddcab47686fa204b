use super::*;

mod deploy;
mod mint;
mod transfer;

pub use self::{
  deploy::Deploy,
  mint::Mint,
  transfer::{Transfer, TransferAmount},
};

/// Pulls an operation struct out of a decoded payload body, separating
/// "field absent" (structural) from "field unusable" (protocol).
pub(crate) fn from_body<T: serde::de::DeserializeOwned>(
  body: &serde_json::Value,
  required: &[&'static str],
) -> Result<T, OperationError> {
  for field in required {
    if body.get(field).is_none() {
      return Err(JsonPayloadError::MissingField(field).into());
    }
  }

  serde_json::from_value::<T>(body.clone())
    .map_err(|e| ProtocolError::InvalidAmount(e.to_string()).into())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn deploy_deserialize() {
    let body = json!({
      "p": "brc-20",
      "op": "deploy",
      "tick": "ordi",
      "max": "21000000",
      "lim": "1000"
    });

    assert_eq!(
      from_body::<Deploy>(&body, &["max"]).unwrap(),
      Deploy {
        tick: "ordi".to_string(),
        max_supply: "21000000".to_string(),
        mint_limit: Some("1000".to_string()),
        decimals: None,
      }
    );
  }

  #[test]
  fn mint_deserialize() {
    let body = json!({"p": "brc-20", "op": "mint", "tick": "ordi", "amt": "1000"});
    assert_eq!(
      from_body::<Mint>(&body, &["amt"]).unwrap(),
      Mint {
        tick: "ordi".to_string(),
        amount: "1000".to_string(),
      }
    );
  }

  #[test]
  fn transfer_deserialize_single_and_multi() {
    let body = json!({"p": "brc-20", "op": "transfer", "tick": "ordi", "amt": "100"});
    assert_eq!(
      from_body::<Transfer>(&body, &["amt"]).unwrap().amounts(),
      vec!["100"]
    );

    let body = json!({"p": "brc-20", "op": "transfer", "tick": "ordi", "amt": ["5", "5", "5"]});
    assert_eq!(
      from_body::<Transfer>(&body, &["amt"]).unwrap().amounts(),
      vec!["5", "5", "5"]
    );
  }

  #[test]
  fn missing_field_is_structural() {
    let body = json!({"p": "brc-20", "op": "mint", "tick": "ordi"});
    assert_eq!(
      from_body::<Mint>(&body, &["amt"]).unwrap_err(),
      OperationError::Structural(JsonPayloadError::MissingField("amt"))
    );
  }

  #[test]
  fn non_string_amount_is_protocol_error() {
    let body = json!({"p": "brc-20", "op": "mint", "tick": "ordi", "amt": 33});
    assert!(matches!(
      from_body::<Mint>(&body, &["amt"]).unwrap_err(),
      OperationError::Protocol(ProtocolError::InvalidAmount(_))
    ));
  }
}
