//! Binary prediction outcome

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::OracleError;

/// Resolution of a binary prediction
///
/// Serialized as the bare integer the contract stores (`0` or `1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Outcome {
    No = 0,
    Yes = 1,
}

impl Outcome {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for Outcome {
    type Error = OracleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Outcome::No),
            1 => Ok(Outcome::Yes),
            other => Err(OracleError::adjudication(format!(
                "outcome must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl From<Outcome> for u8 {
    fn from(outcome: Outcome) -> Self {
        outcome.as_u8()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Outcome::try_from(value).map_err(serde::de::Error::custom)
    }
}
