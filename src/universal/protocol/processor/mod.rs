use super::*;

mod deploy;
mod mint;
mod no_return;
mod transfer;

pub use self::{
  deploy::DeployProcessor, mint::MintProcessor, no_return::NoReturnProcessor,
  transfer::TransferProcessor,
};

#[derive(Debug, PartialEq)]
pub enum Outcome {
  Success,
  Invalid(OperationError),
}

/// What a processor proposes for one operation. Updates are only applied on
/// `Success`; the receipt fields describe the operation either way.
#[derive(Debug, PartialEq)]
pub struct Execution {
  pub outcome: Outcome,
  pub updates: Vec<StateUpdate>,
  pub tick: Option<Tick>,
  pub amount: Option<u128>,
  pub from: Option<ScriptKey>,
  pub to: Option<ScriptKey>,
}

impl Execution {
  pub fn success(updates: Vec<StateUpdate>) -> Self {
    Self {
      outcome: Outcome::Success,
      updates,
      tick: None,
      amount: None,
      from: None,
      to: None,
    }
  }

  pub fn invalid(error: impl Into<OperationError>) -> Self {
    Self {
      outcome: Outcome::Invalid(error.into()),
      updates: Vec::new(),
      tick: None,
      amount: None,
      from: None,
      to: None,
    }
  }
}

/// The processor contract. One registered processor per op-tag; `process`
/// validates against the context and proposes updates without touching the
/// store. Transient failures (`Err`) abort the whole block for retry.
pub trait OpiProcessor: Send + Sync {
  fn tag(&self) -> &'static str;

  fn process(
    &self,
    msg: &ExecutionMessage,
    ctx: &Context,
  ) -> Result<Execution, TransientError>;
}

/// Shared preamble: every built-in except `no_return` requires a
/// well-formed ticker.
pub(crate) fn require_tick(msg: &ExecutionMessage) -> Result<Tick, OperationError> {
  match msg.op.body.get("tick") {
    None => Err(JsonPayloadError::MissingField("tick").into()),
    Some(serde_json::Value::String(raw)) => Ok(raw.parse::<Tick>()?),
    Some(other) => Err(ProtocolError::InvalidTicker(other.to_string()).into()),
  }
}
