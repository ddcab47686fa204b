use super::*;
use crate::universal::protocol::envelope;

#[derive(Debug, Parser)]
pub(crate) struct Decode {
  #[arg(help = "Payload to decode: raw JSON, or hex with --hex.")]
  payload: String,
  #[arg(long, help = "Treat <PAYLOAD> as hex-encoded bytes.")]
  hex: bool,
}

#[derive(Debug, Serialize, Eq, PartialEq, Deserialize)]
pub struct Output {
  pub operations: Vec<DecodedOperation>,
}

#[derive(Debug, Serialize, Eq, PartialEq, Deserialize)]
pub struct DecodedOperation {
  pub op: Option<String>,
  pub tick: Option<String>,
  pub valid: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl Decode {
  pub(crate) fn run(self, options: Options) -> SubcommandResult {
    let config = options.config()?;

    let raw = if self.hex {
      hex::decode(self.payload.trim()).context("invalid hex payload")?
    } else {
      self.payload.clone().into_bytes()
    };

    let operations = envelope::payload_operations(&raw, config.payload_max_bytes)
      .into_iter()
      .map(|result| match result {
        Ok(operation) => DecodedOperation {
          op: Some(operation.op),
          tick: operation.tick,
          valid: true,
          error: None,
        },
        Err(e) => DecodedOperation {
          op: None,
          tick: None,
          valid: false,
          error: Some(format!("{}: {e}", e.code())),
        },
      })
      .collect();

    Ok(Box::new(Output { operations }))
  }
}
