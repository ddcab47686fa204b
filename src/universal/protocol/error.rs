use super::*;

/// Structural payload failures. These become invalid receipts when the
/// payload was recognizably protocol-carrying, and are skipped silently
/// otherwise.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonPayloadError {
  #[error("payload is not valid utf-8")]
  UnsupportedEncoding,

  #[error("payload is not valid json: {0}")]
  MalformedJson(String),

  #[error("payload of {size} bytes exceeds cap of {cap}")]
  PayloadTooLarge { size: usize, cap: usize },

  #[error("missing required field `{0}`")]
  MissingField(&'static str),

  #[error("unknown operation `{0}`")]
  UnknownOp(String),
}

impl JsonPayloadError {
  pub fn code(&self) -> &'static str {
    match self {
      Self::UnsupportedEncoding => "UNSUPPORTED_ENCODING",
      Self::MalformedJson(_) => "MALFORMED_JSON",
      Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
      Self::MissingField(_) => "MISSING_FIELD",
      Self::UnknownOp(_) => "UNKNOWN_OP",
    }
  }
}

/// Protocol-level validation failures, including the cross-namespace
/// checks. Each maps to a stable receipt error code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
  #[error("invalid ticker `{0}`")]
  InvalidTicker(String),

  #[error("invalid amount: {0}")]
  InvalidAmount(String),

  #[error("ticker `{0}` already deployed")]
  TickerAlreadyDeployed(Tick),

  #[error("ticker `{0}` not deployed")]
  TickerNotDeployed(Tick),

  #[error("mint of {amount} exceeds per-mint limit {limit}")]
  MintExceedsLimit { amount: u128, limit: u128 },

  #[error("mint of {amount} exceeds remaining supply {remaining}")]
  MintExceedsSupply { amount: u128, remaining: u128 },

  #[error("insufficient balance: {available} available, {required} required")]
  InsufficientBalance { available: u128, required: u128 },

  #[error("no transaction input resolves to a sender address")]
  UnresolvableSender,

  #[error("transaction has no standard output to receive")]
  NoStandardReceiver,

  #[error("ticker `{0}` exists in the legacy namespace")]
  LegacyTokenExists(Tick),

  #[error("no matching legacy transfer event")]
  NoLegacyTransfer,
}

impl ProtocolError {
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidTicker(_) => "INVALID_TICKER",
      Self::InvalidAmount(_) => "INVALID_AMOUNT",
      Self::TickerAlreadyDeployed(_) => "TICKER_ALREADY_DEPLOYED",
      Self::TickerNotDeployed(_) => "TICKER_NOT_DEPLOYED",
      Self::MintExceedsLimit { .. } => "MINT_EXCEEDS_LIMIT",
      Self::MintExceedsSupply { .. } => "MINT_EXCEEDS_SUPPLY",
      Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
      Self::UnresolvableSender => "UNRESOLVABLE_SENDER",
      Self::NoStandardReceiver => "NO_STANDARD_RECEIVER",
      Self::LegacyTokenExists(_) => "LEGACY_TOKEN_EXISTS",
      Self::NoLegacyTransfer => "NO_LEGACY_TRANSFER",
    }
  }
}

impl From<NumError> for ProtocolError {
  fn from(e: NumError) -> Self {
    Self::InvalidAmount(e.to_string())
  }
}

impl From<TickError> for ProtocolError {
  fn from(e: TickError) -> Self {
    Self::InvalidTicker(e.to_string())
  }
}

/// Either failure class, as carried by an invalid receipt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OperationError {
  #[error(transparent)]
  Structural(#[from] JsonPayloadError),

  #[error(transparent)]
  Protocol(#[from] ProtocolError),
}

impl OperationError {
  pub fn code(&self) -> &'static str {
    match self {
      Self::Structural(e) => e.code(),
      Self::Protocol(e) => e.code(),
    }
  }
}

impl From<NumError> for OperationError {
  fn from(e: NumError) -> Self {
    Self::Protocol(e.into())
  }
}

impl From<TickError> for OperationError {
  fn from(e: TickError) -> Self {
    Self::Protocol(e.into())
  }
}

/// Failures that abort the in-flight block without writing anything.
/// The updater retries them with backoff until the budget runs out.
#[derive(Debug, thiserror::Error)]
pub enum TransientError {
  #[error("node unavailable: {0}")]
  NodeUnavailable(String),

  #[error("oracle unavailable: {0}")]
  OracleUnavailable(String),

  #[error("legacy lookup required but oracle unavailable: {0}")]
  LegacyLookupUnavailable(String),

  #[error("store conflict: {0}")]
  StoreConflict(String),
}

impl TransientError {
  pub fn code(&self) -> &'static str {
    match self {
      Self::NodeUnavailable(_) => "NODE_UNAVAILABLE",
      Self::OracleUnavailable(_) => "ORACLE_UNAVAILABLE",
      Self::LegacyLookupUnavailable(_) => "LEGACY_LOOKUP_REQUIRED_BUT_UNAVAILABLE",
      Self::StoreConflict(_) => "STORE_CONFLICT",
    }
  }
}

/// Failures that stop the indexer and need operator action.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
  #[error("REORG_IRRECOVERABLE: {0}")]
  ReorgIrrecoverable(String),

  #[error("COMMIT_CHECKSUM_MISMATCH: stored plan for block {0} fails verification")]
  CommitChecksumMismatch(u64),

  #[error("DUPLICATE_PROCESSOR_REGISTRATION: op tag `{0}` registered twice")]
  DuplicateProcessorRegistration(String),

  #[error("CONFIG_INVALID: {0}")]
  ConfigInvalid(String),
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum NumError {
  #[error("{op} overflow: original: {org}, other: {other}")]
  Overflow { op: String, org: Num, other: Num },

  #[error("invalid integer {0}")]
  InvalidInteger(Num),

  #[error("internal error: {0}")]
  InternalError(String),

  #[error("invalid number: {0}")]
  InvalidNum(String),
}
