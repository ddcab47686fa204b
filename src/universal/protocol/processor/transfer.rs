use super::*;

pub struct TransferProcessor;

struct ValidatedTransfer {
  tick: Tick,
  amounts: Vec<u128>,
  total: u128,
  sender: ScriptKey,
}

impl TransferProcessor {
  fn validate(
    &self,
    msg: &ExecutionMessage,
    ctx: &Context,
  ) -> Result<Result<ValidatedTransfer, OperationError>, TransientError> {
    let tick = match require_tick(msg) {
      Ok(tick) => tick,
      Err(e) => return Ok(Err(e)),
    };

    let transfer = match operation::from_body::<operation::Transfer>(&msg.op.body, &["amt"]) {
      Ok(transfer) => transfer,
      Err(e) => return Ok(Err(e)),
    };

    let Some(info) = ctx.deploy_of(&tick)? else {
      return Ok(Err(ProtocolError::TickerNotDeployed(tick).into()));
    };

    let amounts = match (|| -> Result<Vec<u128>, OperationError> {
      let raw = transfer.amounts();
      if raw.is_empty() {
        return Err(ProtocolError::InvalidAmount("empty amount list".into()).into());
      }
      raw
        .iter()
        .map(|s| {
          let amount = Num::from_str(s)?;
          if amount.is_zero() {
            return Err(
              ProtocolError::InvalidAmount("transfer amount must be positive".into()).into(),
            );
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
        })
        .collect()
    })() {
      Ok(amounts) => amounts,
      Err(e) => return Ok(Err(e)),
    };

    if msg.receivers.len() < amounts.len() {
      return Ok(Err(ProtocolError::NoStandardReceiver.into()));
    }

    let Some(sender) = msg.sender.clone() else {
      return Ok(Err(ProtocolError::UnresolvableSender.into()));
    };

    let total = match amounts.iter().try_fold(0u128, |acc, a| acc.checked_add(*a)) {
      Some(total) => total,
      None => {
        return Ok(Err(
          ProtocolError::InvalidAmount("transfer total overflows".into()).into(),
        ))
      }
    };

    let available = ctx.balance_of(&sender, &tick)?;
    if available < total {
      return Ok(Err(
        ProtocolError::InsufficientBalance {
          available,
          required: total,
        }
        .into(),
      ));
    }

    Ok(Ok(ValidatedTransfer {
      tick,
      amounts,
      total,
      sender,
    }))
  }
}

impl OpiProcessor for TransferProcessor {
  fn tag(&self) -> &'static str {
    "transfer"
  }

  fn process(
    &self,
    msg: &ExecutionMessage,
    ctx: &Context,
  ) -> Result<Execution, TransientError> {
    let transfer = match self.validate(msg, ctx)? {
      Ok(validated) => validated,
      Err(e) => return Ok(Execution::invalid(e)),
    };

    let mut updates = vec![StateUpdate::BalanceSub {
      script: transfer.sender.clone(),
      tick: transfer.tick.clone(),
      amount: transfer.total,
    }];

    // First N standard outputs, in output order; one delta per receiver.
    for (receiver, amount) in msg.receivers.iter().zip(&transfer.amounts) {
      updates.push(StateUpdate::BalanceAdd {
        script: receiver.clone(),
        tick: transfer.tick.clone(),
        amount: *amount,
      });
    }

    Ok(Execution {
      tick: Some(transfer.tick),
      amount: Some(transfer.total),
      from: Some(transfer.sender),
      to: msg.receivers.first().cloned(),
      ..Execution::success(updates)
    })
  }
}
