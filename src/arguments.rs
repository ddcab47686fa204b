use super::*;

#[derive(Debug, Parser)]
#[command(version, about = "Universal BRC-20 indexer for OP_RETURN token operations")]
pub(crate) struct Arguments {
  #[clap(flatten)]
  pub(crate) options: Options,
  #[clap(subcommand)]
  pub(crate) subcommand: Subcommand,
}

impl Arguments {
  pub(crate) fn run(self) -> SubcommandResult {
    self.subcommand.run(self.options)
  }
}
