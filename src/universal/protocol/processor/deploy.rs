use super::*;

pub struct DeployProcessor;

impl DeployProcessor {
  fn validate(
    &self,
    msg: &ExecutionMessage,
    ctx: &Context,
  ) -> Result<Result<(Tick, TokenInfo), OperationError>, TransientError> {
    let tick = match require_tick(msg) {
      Ok(tick) => tick,
      Err(e) => return Ok(Err(e)),
    };

    let deploy = match operation::from_body::<operation::Deploy>(&msg.op.body, &["max"]) {
      Ok(deploy) => deploy,
      Err(e) => return Ok(Err(e)),
    };

    let result = (|| -> Result<(u128, Option<u128>, u8), OperationError> {
      let decimals = match &deploy.decimals {
        Some(raw) => {
          let decimals = Num::from_str(raw)?.checked_to_u8()?;
          if decimals > MAX_DECIMAL_WIDTH {
            return Err(
              ProtocolError::InvalidAmount(format!("decimals {decimals} out of range")).into(),
            );
          }
          decimals
        }
        None => default_decimals(),
      };

      let supply = Num::from_str(&deploy.max_supply)?;
      if supply.is_zero()
        || supply > *MAXIMUM_SUPPLY
        || supply.scale() > i64::from(decimals)
      {
        return Err(
          ProtocolError::InvalidAmount(format!("invalid max supply {supply}")).into(),
        );
      }

      let limit = match &deploy.mint_limit {
        Some(raw) => {
          let limit = Num::from_str(raw)?;
          if limit.is_zero() || limit > supply || limit.scale() > i64::from(decimals) {
            return Err(
              ProtocolError::InvalidAmount(format!("invalid mint limit {limit}")).into(),
            );
          }
          Some(limit.to_base_units(decimals)?)
        }
        None => None,
      };

      Ok((supply.to_base_units(decimals)?, limit, decimals))
    })();

    let (max_supply, limit_per_mint, decimals) = match result {
      Ok(parsed) => parsed,
      Err(e) => return Ok(Err(e)),
    };

    if ctx.deploy_of(&tick)?.is_some() {
      return Ok(Err(ProtocolError::TickerAlreadyDeployed(tick).into()));
    }

    let deployer = match msg.sender.clone().or_else(|| msg.receivers.first().cloned()) {
      Some(deployer) => deployer,
      None => return Ok(Err(ProtocolError::UnresolvableSender.into())),
    };

    // Cross-namespace check: a legacy deploy at or below this height owns
    // the ticker. Oracle downtime defers the block under require_legacy and
    // otherwise lets the deploy through flagged for audit.
    let (legacy_validated, legacy_snapshot) = match ctx.oracle().lookup_ticker(&tick) {
      Ok(Some(record)) if record.deploy_height <= ctx.chain.height => {
        return Ok(Err(ProtocolError::LegacyTokenExists(tick).into()));
      }
      Ok(record) => (true, record),
      Err(e) if ctx.require_legacy => {
        return Err(TransientError::LegacyLookupUnavailable(e.to_string()));
      }
      Err(e) => {
        log::warn!(
          "legacy oracle unavailable while deploying {tick}, proceeding unvalidated: {e}"
        );
        (false, None)
      }
    };

    let info = TokenInfo {
      tick: tick.clone(),
      max_supply,
      limit_per_mint,
      decimals,
      deployer,
      deploy_txid: msg.txid,
      deploy_height: ctx.chain.height,
      deploy_tx_index: msg.tx_index,
      deploy_timestamp: ctx.chain.time,
      legacy_validated,
      legacy_snapshot,
    };

    Ok(Ok((tick, info)))
  }
}

impl OpiProcessor for DeployProcessor {
  fn tag(&self) -> &'static str {
    "deploy"
  }

  fn process(
    &self,
    msg: &ExecutionMessage,
    ctx: &Context,
  ) -> Result<Execution, TransientError> {
    let (tick, info) = match self.validate(msg, ctx)? {
      Ok(validated) => validated,
      Err(e) => return Ok(Execution::invalid(e)),
    };

    let deployer = info.deployer.clone();
    Ok(Execution {
      tick: Some(tick),
      to: Some(deployer),
      ..Execution::success(vec![StateUpdate::DeployCreate { info }])
    })
  }
}
