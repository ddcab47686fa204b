use super::{error::NumError, params::MAX_DECIMAL_WIDTH};
use bigdecimal::{
  num_bigint::{BigInt, Sign, ToBigInt},
  BigDecimal, One, ToPrimitive,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
  fmt::{Display, Formatter},
  str::FromStr,
};

/// Exact decimal used for on-chain amount strings. Parsing is strict: no
/// sign, no exponent, no bare or trailing dot, no leading zeros, at most
/// eighteen fractional digits.
#[derive(PartialEq, PartialOrd, Debug, Clone)]
pub struct Num(BigDecimal);

impl Num {
  pub fn checked_add(&self, other: &Num) -> Result<Self, NumError> {
    Ok(Self(self.0.clone() + &other.0))
  }

  pub fn checked_sub(&self, other: &Num) -> Result<Self, NumError> {
    if self.0 < other.0 {
      return Err(NumError::Overflow {
        op: String::from("checked_sub"),
        org: self.clone(),
        other: other.clone(),
      });
    }

    Ok(Self(self.0.clone() - &other.0))
  }

  pub fn checked_mul(&self, other: &Num) -> Result<Self, NumError> {
    Ok(Self(self.0.clone() * &other.0))
  }

  pub fn checked_powu(&self, exp: u64) -> Result<Self, NumError> {
    match exp {
      0 => Ok(Self(BigDecimal::one())),
      1 => Ok(Self(self.0.clone())),
      exp => {
        let mut result = self.0.clone();
        for _ in 1..exp {
          result = result * &self.0;
        }

        Ok(Self(result))
      }
    }
  }

  pub fn checked_to_u8(&self) -> Result<u8, NumError> {
    if !self.0.is_integer() {
      return Err(NumError::InvalidInteger(self.clone()));
    }
    self.0.clone().to_u8().ok_or(NumError::Overflow {
      op: String::from("to_u8"),
      org: self.clone(),
      other: Self(BigDecimal::from(u8::MAX)),
    })
  }

  pub fn checked_to_u128(&self) -> Result<u128, NumError> {
    if !self.0.is_integer() {
      return Err(NumError::InvalidInteger(self.clone()));
    }
    self
      .0
      .to_bigint()
      .ok_or(NumError::InternalError(format!(
        "convert {} to bigint failed",
        self.0
      )))?
      .to_u128()
      .ok_or(NumError::Overflow {
        op: String::from("to_u128"),
        org: self.clone(),
        other: Self(BigDecimal::from(BigInt::from(u128::MAX))),
      })
  }

  /// Scales an amount into integer base units. The caller has already
  /// checked `scale() <= decimals`.
  pub fn to_base_units(&self, decimals: u8) -> Result<u128, NumError> {
    self
      .checked_mul(&super::params::BIGDECIMAL_TEN.checked_powu(u64::from(decimals))?)?
      .checked_to_u128()
  }

  pub fn is_zero(&self) -> bool {
    self.sign() == Sign::NoSign
  }

  pub fn sign(&self) -> Sign {
    self.0.sign()
  }

  pub fn scale(&self) -> i64 {
    let (_, scale) = self.0.as_bigint_and_exponent();
    scale
  }
}

impl From<u64> for Num {
  fn from(n: u64) -> Self {
    Self(BigDecimal::from(n))
  }
}

impl From<u128> for Num {
  fn from(n: u128) -> Self {
    Self(BigDecimal::from(BigInt::from(n)))
  }
}

impl FromStr for Num {
  type Err = NumError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.is_empty()
      || s.starts_with('.')
      || s.ends_with('.')
      || s.find(&['e', 'E', '+', '-', ' '][..]).is_some()
    {
      return Err(NumError::InvalidNum(s.to_string()));
    }

    let integer = s.split('.').next().unwrap();
    if integer.len() > 1 && integer.starts_with('0') {
      return Err(NumError::InvalidNum(s.to_string()));
    }

    let num = BigDecimal::from_str(s).map_err(|_| NumError::InvalidNum(s.to_string()))?;

    let (_, scale) = num.as_bigint_and_exponent();
    if scale > i64::from(MAX_DECIMAL_WIDTH) {
      return Err(NumError::InvalidNum(s.to_string()));
    }

    Ok(Self(num))
  }
}

impl Display for Num {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    self.0.fmt(f)
  }
}

impl Serialize for Num {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let s = self.to_string();
    serializer.serialize_str(&s)
  }
}

impl<'de> Deserialize<'de> for Num {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    Self::from_str(&s).map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn canonical_strings_parse() {
    assert!(Num::from_str("0").is_ok());
    assert!(Num::from_str("1").is_ok());
    assert!(Num::from_str("1000").is_ok());
    assert!(Num::from_str("0.1").is_ok());
    assert!(Num::from_str("1.01").is_ok());
    assert!(Num::from_str("1.000000000000000001").is_ok());
  }

  #[test]
  fn non_canonical_strings_are_rejected() {
    assert!(Num::from_str("").is_err());
    assert!(Num::from_str(" ").is_err());
    assert!(Num::from_str(".").is_err());
    assert!(Num::from_str(".1").is_err());
    assert!(Num::from_str("1.").is_err());
    assert!(Num::from_str(" 1").is_err());
    assert!(Num::from_str("1 ").is_err());
    assert!(Num::from_str("01").is_err());
    assert!(Num::from_str("001").is_err());
    assert!(Num::from_str("00.1").is_err());
    assert!(Num::from_str("+1").is_err());
    assert!(Num::from_str("-1.1").is_err());
    assert!(Num::from_str("1e2").is_err());
    assert!(Num::from_str("1E2").is_err());
    assert!(Num::from_str("1.2.3").is_err());
    assert!(Num::from_str("1.0000000000000000001").is_err());
  }

  #[test]
  fn zero_with_fraction_is_canonical() {
    assert!(Num::from_str("0.5").is_ok());
    assert!(Num::from_str("0.0").is_ok());
  }

  #[test]
  fn checked_sub_rejects_negative_results() {
    let one = Num::from_str("1").unwrap();
    let two = Num::from_str("2").unwrap();
    assert!(two.checked_sub(&one).is_ok());
    assert!(one.checked_sub(&two).is_err());
  }

  #[test]
  fn base_unit_scaling() {
    assert_eq!(
      Num::from_str("1.5").unwrap().to_base_units(2).unwrap(),
      150
    );
    assert_eq!(Num::from_str("10").unwrap().to_base_units(0).unwrap(), 10);
    assert_eq!(
      Num::from_str("1").unwrap().to_base_units(18).unwrap(),
      1_000_000_000_000_000_000
    );
  }

  #[test]
  fn fractional_base_units_fail() {
    assert!(Num::from_str("1.55").unwrap().to_base_units(1).is_err());
  }

  #[test]
  fn to_u8_bounds() {
    assert_eq!(Num::from_str("255").unwrap().checked_to_u8().unwrap(), 255);
    assert!(Num::from_str("256").unwrap().checked_to_u8().is_err());
    assert!(Num::from_str("2.5").unwrap().checked_to_u8().is_err());
  }

  #[test]
  fn to_u128_bounds() {
    let n = Num::from(u128::MAX);
    assert_eq!(n.checked_to_u128().unwrap(), u128::MAX);

    let too_big = n.checked_add(&Num::from(1u64)).unwrap();
    assert!(too_big.checked_to_u128().is_err());

    assert!(Num::from_str("0.3").unwrap().checked_to_u128().is_err());
  }

  #[test]
  fn serialize_as_string() {
    let num = Num::from_str("1.01").unwrap();
    assert_eq!(serde_json::to_string(&num).unwrap(), r#""1.01""#);
    assert_eq!(serde_json::from_str::<Num>(r#""1.01""#).unwrap(), num);
    assert!(serde_json::from_str::<Num>(r#""01""#).is_err());
  }
}
