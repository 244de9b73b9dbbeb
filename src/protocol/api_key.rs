//! ApiKey to tag request types.
//!
//! # References
//! - <https://kafka.apache.org/protocol#protocol_api_keys>

use std::fmt;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum ApiKey {
    ListOffsets,
    Metadata,
    Unknown(i16),
}

impl From<i16> for ApiKey {
    fn from(key: i16) -> Self {
        match key {
            2 => Self::ListOffsets,
            3 => Self::Metadata,
            _ => Self::Unknown(key),
        }
    }
}

impl From<ApiKey> for i16 {
    fn from(key: ApiKey) -> Self {
        match key {
            ApiKey::ListOffsets => 2,
            ApiKey::Metadata => 3,
            ApiKey::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown({code})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_known_keys() {
        for key in [ApiKey::ListOffsets, ApiKey::Metadata] {
            assert_eq!(ApiKey::from(i16::from(key)), key);
        }
        assert_eq!(ApiKey::from(60), ApiKey::Unknown(60));
    }
}
