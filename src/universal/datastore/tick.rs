use super::*;
use serde::{de, Deserializer, Serializer};

pub const TICK_MIN_BYTE_COUNT: usize = 1;
pub const TICK_MAX_BYTE_COUNT: usize = 8;

/// Case-insensitive ticker, normalized to uppercase. The uppercase form is
/// the primary key across deploys, balances and supplies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tick(String);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TickError {
  #[error("invalid tick length: {0}")]
  InvalidLength(usize),
  #[error("invalid tick character in `{0}`")]
  InvalidCharacter(String),
}

impl FromStr for Tick {
  type Err = TickError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = s.as_bytes();

    if bytes.len() < TICK_MIN_BYTE_COUNT || bytes.len() > TICK_MAX_BYTE_COUNT {
      return Err(TickError::InvalidLength(bytes.len()));
    }

    if !bytes
      .iter()
      .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
    {
      return Err(TickError::InvalidCharacter(s.to_string()));
    }

    Ok(Self(s.to_ascii_uppercase()))
  }
}

impl Tick {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn hex(&self) -> String {
    hex::encode(self.0.as_bytes())
  }

  pub fn min_hex() -> String {
    String::new()
  }

  pub fn max_hex() -> String {
    hex::encode([0xffu8; TICK_MAX_BYTE_COUNT])
  }
}

impl Display for Tick {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Serialize for Tick {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_str().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for Tick {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Self::from_str(&String::deserialize(deserializer)?)
      .map_err(|e| de::Error::custom(format!("deserialize tick error: {e}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tick_normalizes_to_uppercase() {
    assert_eq!(Tick::from_str("ordi").unwrap().as_str(), "ORDI");
    assert_eq!(Tick::from_str("Alfa_1").unwrap().as_str(), "ALFA_1");
  }

  #[test]
  fn tick_compare_ignores_case() {
    assert_eq!(Tick::from_str("aBc1").unwrap(), Tick::from_str("AbC1").unwrap());
    assert_ne!(Tick::from_str("aBc1").unwrap(), Tick::from_str("aBc2").unwrap());
  }

  #[test]
  fn tick_length_bounds() {
    assert_eq!(Tick::from_str("").unwrap_err(), TickError::InvalidLength(0));
    assert!(Tick::from_str("A").is_ok());
    assert!(Tick::from_str("ABCDEFGH").is_ok());
    assert_eq!(
      Tick::from_str("ABCDEFGHI").unwrap_err(),
      TickError::InvalidLength(9)
    );
  }

  #[test]
  fn tick_charset() {
    assert!(Tick::from_str("0").is_ok());
    assert!(Tick::from_str("A_B").is_ok());
    assert!(Tick::from_str("A-B").is_err());
    assert!(Tick::from_str("A B").is_err());
    assert!(Tick::from_str("中文").is_err());
  }

  #[test]
  fn tick_serialize_round_trip() {
    let tick = Tick::from_str("ordi").unwrap();
    assert_eq!(serde_json::to_string(&tick).unwrap(), r#""ORDI""#);
    assert_eq!(serde_json::from_str::<Tick>(r#""ordi""#).unwrap(), tick);
  }
}
