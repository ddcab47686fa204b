use super::*;

pub struct MintProcessor;

impl MintProcessor {
  fn validate(
    &self,
    msg: &ExecutionMessage,
    ctx: &Context,
  ) -> Result<Result<(Tick, u128, ScriptKey), OperationError>, TransientError> {
    let tick = match require_tick(msg) {
      Ok(tick) => tick,
      Err(e) => return Ok(Err(e)),
    };

    let mint = match operation::from_body::<operation::Mint>(&msg.op.body, &["amt"]) {
      Ok(mint) => mint,
      Err(e) => return Ok(Err(e)),
    };

    let Some(info) = ctx.deploy_of(&tick)? else {
      return Ok(Err(ProtocolError::TickerNotDeployed(tick).into()));
    };

    let amount = match (|| -> Result<u128, OperationError> {
      let amount = Num::from_str(&mint.amount)?;
      if amount.is_zero() {
        return Err(ProtocolError::InvalidAmount("mint amount must be positive".into()).into());
      }
      if amount.scale() > i64::from(info.decimals) {
        return Err(
          ProtocolError::InvalidAmount(format!(
            "amount {amount} exceeds {} decimals",
            info.decimals
          ))
          .into(),
        );
      }
      Ok(amount.to_base_units(info.decimals)?)
    })() {
      Ok(amount) => amount,
      Err(e) => return Ok(Err(e)),
    };

    if let Some(limit) = info.limit_per_mint {
      if amount > limit {
        return Ok(Err(ProtocolError::MintExceedsLimit { amount, limit }.into()));
      }
    }

    let supply = ctx.supply_of(&tick)?;
    let remaining = supply.remaining(info.max_supply);
    if amount > remaining {
      return Ok(Err(ProtocolError::MintExceedsSupply { amount, remaining }.into()));
    }

    // The minter's own input address when it resolves, otherwise the first
    // standard output.
    let receiver = msg.sender.clone().or_else(|| msg.receivers.first().cloned());
    let Some(receiver) = receiver else {
      return Ok(Err(ProtocolError::NoStandardReceiver.into()));
    };

    Ok(Ok((tick, amount, receiver)))
  }
}

impl OpiProcessor for MintProcessor {
  fn tag(&self) -> &'static str {
    "mint"
  }

  fn process(
    &self,
    msg: &ExecutionMessage,
    ctx: &Context,
  ) -> Result<Execution, TransientError> {
    let (tick, amount, receiver) = match self.validate(msg, ctx)? {
      Ok(validated) => validated,
      Err(e) => return Ok(Execution::invalid(e)),
    };

    Ok(Execution {
      tick: Some(tick.clone()),
      amount: Some(amount),
      to: Some(receiver.clone()),
      ..Execution::success(vec![
        StateUpdate::BalanceAdd {
          script: receiver,
          tick: tick.clone(),
          amount,
        },
        StateUpdate::SupplyAdd {
          tick,
          bucket: SupplyBucket::Universal,
          amount,
        },
      ])
    })
  }
}
