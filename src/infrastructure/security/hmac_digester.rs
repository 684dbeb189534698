//! HMAC-based [`TokenDigester`].
//!
//! Secrets are MACed with the server signing key (`TOKEN_SIGNING_SECRET`)
//! before storage, so a read-only copy of the database is not enough to forge
//! or check a token.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

use crate::domain::ports::TokenDigester;
use crate::domain::values::Digest;
use crate::error::{AppResult, InfrastructureError};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HmacAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl HmacAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            HmacAlgorithm::Sha256 => "hmac-sha256",
            HmacAlgorithm::Sha512 => "hmac-sha512",
        }
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HmacAlgorithm {
    type Err = InfrastructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hmac-sha256" => Ok(HmacAlgorithm::Sha256),
            "hmac-sha512" => Ok(HmacAlgorithm::Sha512),
            _ => Err(InfrastructureError::UnsupportedHmacAlgorithm(s.to_string())),
        }
    }
}

pub struct HmacTokenDigester {
    key: Vec<u8>,
    algorithm: HmacAlgorithm,
}

impl HmacTokenDigester {
    pub fn new(key: impl Into<Vec<u8>>, algorithm: HmacAlgorithm) -> Self {
        Self {
            key: key.into(),
            algorithm,
        }
    }

    /// Builds a digester from an algorithm name such as `hmac-sha512`.
    ///
    /// # Errors
    ///
    /// Returns [`InfrastructureError::UnsupportedHmacAlgorithm`] for unknown names.
    pub fn from_name(key: impl Into<Vec<u8>>, algorithm: &str) -> AppResult<Self> {
        Ok(Self::new(key, algorithm.parse::<HmacAlgorithm>()?))
    }

    pub fn algorithm(&self) -> HmacAlgorithm {
        self.algorithm
    }

    fn keyed<M: Mac + hmac::digest::KeyInit>(&self, plain: &str) -> AppResult<M> {
        let mut mac = <M as Mac>::new_from_slice(&self.key)
            .map_err(|e| InfrastructureError::Crypto(format!("invalid HMAC key: {e}")))?;
        mac.update(plain.as_bytes());
        Ok(mac)
    }
}

impl TokenDigester for HmacTokenDigester {
    fn digest(&self, plain: &str) -> AppResult<Digest> {
        let bytes = match self.algorithm {
            HmacAlgorithm::Sha256 => self
                .keyed::<HmacSha256>(plain)?
                .finalize()
                .into_bytes()
                .to_vec(),
            HmacAlgorithm::Sha512 => self
                .keyed::<HmacSha512>(plain)?
                .finalize()
                .into_bytes()
                .to_vec(),
        };

        Ok(Digest::new(hex::encode(bytes), self.algorithm.name()))
    }

    fn verify(&self, plain: &str, digest: &Digest) -> AppResult<bool> {
        let algorithm = digest.algorithm.parse::<HmacAlgorithm>()?;

        let Ok(expected) = hex::decode(&digest.value) else {
            return Ok(false);
        };

        let matches = match algorithm {
            HmacAlgorithm::Sha256 => self.keyed::<HmacSha256>(plain)?.verify_slice(&expected),
            HmacAlgorithm::Sha512 => self.keyed::<HmacSha512>(plain)?.verify_slice(&expected),
        };

        Ok(matches.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn digester(algorithm: HmacAlgorithm) -> HmacTokenDigester {
        HmacTokenDigester::new(b"test-secret".to_vec(), algorithm)
    }

    #[test]
    fn test_digest_is_deterministic() {
        let d = digester(HmacAlgorithm::Sha256);

        let a = d.digest("token").unwrap();
        let b = d.digest("token").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.algorithm, "hmac-sha256");
        assert_eq!(a.value.len(), 64);
    }

    #[test]
    fn test_sha512_digest_length() {
        let d = digester(HmacAlgorithm::Sha512).digest("token").unwrap();
        assert_eq!(d.algorithm, "hmac-sha512");
        assert_eq!(d.value.len(), 128);
    }

    #[test]
    fn test_different_keys_give_different_digests() {
        let a = HmacTokenDigester::new(b"secret-a".to_vec(), HmacAlgorithm::Sha256);
        let b = HmacTokenDigester::new(b"secret-b".to_vec(), HmacAlgorithm::Sha256);

        assert_ne!(a.digest("token").unwrap(), b.digest("token").unwrap());
    }

    #[test]
    fn test_verify_accepts_matching_and_rejects_other_input() {
        let d = digester(HmacAlgorithm::Sha256);
        let digest = d.digest("token").unwrap();

        assert!(d.verify("token", &digest).unwrap());
        assert!(!d.verify("other", &digest).unwrap());
    }

    #[test]
    fn test_verify_uses_the_stored_algorithm() {
        let old = digester(HmacAlgorithm::Sha512).digest("token").unwrap();
        let current = digester(HmacAlgorithm::Sha256);

        assert!(current.verify("token", &old).unwrap());
    }

    #[test]
    fn test_verify_rejects_non_hex_value() {
        let d = digester(HmacAlgorithm::Sha256);
        let bogus = Digest::new("zz-not-hex", "hmac-sha256");

        assert!(!d.verify("token", &bogus).unwrap());
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let err = HmacTokenDigester::from_name(b"k".to_vec(), "hmac-md5")
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedHmacAlgorithm);

        let d = digester(HmacAlgorithm::Sha256);
        let stored = Digest::new("00", "hmac-md5");
        let err = d.verify("token", &stored).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedHmacAlgorithm);
    }

    #[test]
    fn test_algorithm_names_parse_case_insensitively() {
        assert_eq!(
            "HMAC-SHA512".parse::<HmacAlgorithm>().unwrap(),
            HmacAlgorithm::Sha512
        );
        assert_eq!(HmacAlgorithm::default().to_string(), "hmac-sha256");
    }
}
