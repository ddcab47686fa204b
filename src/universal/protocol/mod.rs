use crate::*;
use crate::{
  node::TxData,
  universal::{
    datastore::{
      Balance, BalanceDelta, CommitPlan, LegacyTransferEvent, ProcessedBlockEntry, Receipt,
      ScriptKey, StoreError, SupplyBucket, SupplyDelta, Tick, TickError, TokenInfo, TokenSupply,
      UniversalReader,
    },
    legacy::LegacyOracle,
  },
};

pub(crate) mod address;
mod context;
pub mod envelope;
mod error;
mod executor;
mod intermediate;
mod num;
pub(crate) mod operation;
pub mod params;
mod processor;
mod registry;

pub use self::{
  context::{BlockContext, Context},
  envelope::{ParsedOperation, RawOperation},
  error::{FatalError, JsonPayloadError, NumError, OperationError, ProtocolError, TransientError},
  executor::BlockExecutor,
  intermediate::{BlockSupplyDelta, IntermediateState, StateUpdate},
  num::Num,
  processor::{
    DeployProcessor, Execution, MintProcessor, NoReturnProcessor, OpiProcessor, Outcome,
    TransferProcessor,
  },
  registry::OpiRegistry,
};

pub(crate) use self::{intermediate::ApplyError, params::*, processor::require_tick};

/// A routed operation with the transaction facts processors need: position
/// in the canonical sequence plus resolved sender and receivers.
#[derive(Debug, Clone)]
pub struct ExecutionMessage {
  pub txid: Txid,
  pub tx_index: u32,
  pub sub_index: u32,
  pub op: RawOperation,
  pub raw: Vec<u8>,
  pub sender: Option<ScriptKey>,
  pub receivers: Vec<ScriptKey>,
}
