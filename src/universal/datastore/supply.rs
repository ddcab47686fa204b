use super::*;

/// Per-ticker supply decomposition. Maintained by the commit engine; reads
/// derive `total` and `remaining` instead of storing them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSupply {
  pub universal_minted: u128,
  pub legacy_minted: u128,
  pub burned: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupplyBucket {
  Universal,
  Legacy,
  Burned,
}

impl TokenSupply {
  pub fn total(&self) -> u128 {
    self.universal_minted + self.legacy_minted
  }

  pub fn remaining(&self, max_supply: u128) -> u128 {
    max_supply.saturating_sub(self.total() + self.burned)
  }

  pub fn bucket(&self, bucket: SupplyBucket) -> u128 {
    match bucket {
      SupplyBucket::Universal => self.universal_minted,
      SupplyBucket::Legacy => self.legacy_minted,
      SupplyBucket::Burned => self.burned,
    }
  }

  pub fn bucket_mut(&mut self, bucket: SupplyBucket) -> &mut u128 {
    match bucket {
      SupplyBucket::Universal => &mut self.universal_minted,
      SupplyBucket::Legacy => &mut self.legacy_minted,
      SupplyBucket::Burned => &mut self.burned,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn remaining_saturates() {
    let supply = TokenSupply {
      universal_minted: 600,
      legacy_minted: 300,
      burned: 200,
    };
    assert_eq!(supply.total(), 900);
    assert_eq!(supply.remaining(1_000), 0);
    assert_eq!(supply.remaining(2_000), 900);
  }
}
