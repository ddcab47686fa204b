use super::*;
use crate::universal::datastore::{Tick, TokenInfo, TokenSupply};

#[derive(Debug, Parser)]
pub(crate) struct Supply {
  #[arg(help = "Ticker to look up.")]
  tick: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Output {
  pub deploy: TokenInfo,
  pub supply: TokenSupply,
  pub total: u128,
  pub remaining: u128,
  pub holders: usize,
}

impl Supply {
  pub(crate) fn run(self, options: Options) -> SubcommandResult {
    let tick = self.tick.parse::<Tick>().map_err(|e| anyhow!("{e}"))?;
    let index = Index::open(&options.data_dir()?)?;

    let Some(deploy) = index.token_info(&tick)? else {
      bail!("ticker `{tick}` is not deployed");
    };
    let supply = index.supply_of(&tick)?.unwrap_or_default();
    let holders = index
      .balances_for_tick(&tick)?
      .iter()
      .filter(|(_, balance)| balance.amount > 0)
      .count();

    Ok(Box::new(Output {
      total: supply.total(),
      remaining: supply.remaining(deploy.max_supply),
      deploy,
      supply,
      holders,
    }))
  }
}
