use super::*;
use crate::universal::datastore::ScriptKey;
use reqwest::{blocking::Client, StatusCode};

/// Legacy-namespace oracle speaking the OPI light-client HTTP interface.
pub struct HttpOracle {
  client: Client,
  base_url: String,
}

#[derive(Debug, Deserialize)]
struct OracleResponse<T> {
  error: Option<String>,
  result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TickerResult {
  max_supply: String,
  #[serde(default)]
  decimals: Option<u8>,
  #[serde(default)]
  limit_per_mint: Option<String>,
  deploy_inscription_id: String,
  block_height: u64,
  #[serde(default)]
  deployer_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransferEventResult {
  tick: String,
  amount: String,
  sender_address: String,
  inscription_id: String,
}

impl HttpOracle {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build legacy oracle HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }

  fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>, OracleError> {
    let url = format!("{}{path}", self.base_url);
    let response = self
      .client
      .get(&url)
      .send()
      .map_err(|e| OracleError::Unavailable(e.to_string()))?;

    if response.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }

    if !response.status().is_success() {
      return Err(OracleError::Unavailable(format!(
        "`{url}` returned status {}",
        response.status()
      )));
    }

    let body = response
      .json::<OracleResponse<T>>()
      .map_err(|e| OracleError::Malformed(e.to_string()))?;

    if let Some(error) = body.error {
      return Err(OracleError::Malformed(format!(
        "`{url}` returned error: {error}"
      )));
    }

    Ok(body.result)
  }
}

fn parse_amount(field: &str, raw: &str) -> Result<u128, OracleError> {
  raw
    .parse::<u128>()
    .map_err(|e| OracleError::Malformed(format!("bad {field} `{raw}`: {e}")))
}

impl LegacyOracle for HttpOracle {
  fn lookup_ticker(&self, tick: &Tick) -> Result<Option<LegacyTokenRecord>, OracleError> {
    let result =
      self.get::<TickerResult>(&format!("/v1/brc20/ticker/{}", tick.as_str().to_lowercase()))?;

    let Some(result) = result else {
      return Ok(None);
    };

    Ok(Some(LegacyTokenRecord {
      tick: tick.clone(),
      max_supply: parse_amount("max_supply", &result.max_supply)?,
      decimals: result.decimals.unwrap_or(18),
      limit_per_mint: result
        .limit_per_mint
        .as_deref()
        .map(|raw| parse_amount("limit_per_mint", raw))
        .transpose()?,
      deploy_inscription_id: result.deploy_inscription_id,
      deploy_height: result.block_height,
      deployer_address: result.deployer_address,
      last_verified_at: Utc::now().timestamp(),
    }))
  }

  fn transfer_events_for_tx(&self, txid: &Txid) -> Result<Vec<LegacyTransferEvent>, OracleError> {
    let result =
      self.get::<Vec<TransferEventResult>>(&format!("/v1/brc20/event/by-spending-tx/{txid}"))?;

    let mut events = Vec::new();
    for event in result.unwrap_or_default() {
      let tick = event
        .tick
        .parse::<Tick>()
        .map_err(|e| OracleError::Malformed(format!("bad tick in transfer event: {e}")))?;
      events.push(LegacyTransferEvent {
        tick,
        amount: parse_amount("amount", &event.amount)?,
        sender_address: ScriptKey::Address(event.sender_address),
        inscription_id: event.inscription_id,
      });
    }
    Ok(events)
  }
}
