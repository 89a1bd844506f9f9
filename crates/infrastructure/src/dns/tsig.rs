use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hickory_proto::dnssec::rdata::tsig::TsigAlgorithm as HickoryTsigAlgorithm;
use hickory_proto::dnssec::tsig::TSigner;
use hickory_proto::op::Message;
use hickory_proto::rr::Name;
use std::str::FromStr;
use zone_manager_domain::{DomainError, TsigAlgorithm, TsigKey};

/// Allowed clock skew between signer and verifier.
pub const TSIG_FUDGE_SECS: u16 = 300;

/// Signs outgoing messages with one TSIG key.
///
/// Responses are not verified.
pub struct TsigSigner {
    key_name: String,
    signer: TSigner,
}

impl std::fmt::Debug for TsigSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsigSigner")
            .field("key_name", &self.key_name)
            .finish_non_exhaustive()
    }
}

impl TsigSigner {
    pub fn from_key(key: &TsigKey) -> Result<Self, DomainError> {
        let secret = BASE64
            .decode(key.secret.trim())
            .map_err(|e| DomainError::Tsig(format!("Key '{}' secret is not base64: {}", key.name, e)))?;

        let name = Name::from_str(&key.name).map_err(|e| {
            DomainError::Tsig(format!("Key name '{}' is not a domain name: {}", key.name, e))
        })?;

        let signer = TSigner::new(secret, Self::algorithm(key.algorithm), name, TSIG_FUDGE_SECS)
            .map_err(|e| DomainError::Tsig(format!("Key '{}' rejected: {}", key.name, e)))?;

        Ok(Self {
            key_name: key.name.clone(),
            signer,
        })
    }

    fn algorithm(algorithm: TsigAlgorithm) -> HickoryTsigAlgorithm {
        match algorithm {
            TsigAlgorithm::HmacMd5 => HickoryTsigAlgorithm::HmacMd5,
            TsigAlgorithm::HmacSha1 => HickoryTsigAlgorithm::HmacSha1,
            TsigAlgorithm::HmacSha224 => HickoryTsigAlgorithm::HmacSha224,
            TsigAlgorithm::HmacSha256 => HickoryTsigAlgorithm::HmacSha256,
            TsigAlgorithm::HmacSha384 => HickoryTsigAlgorithm::HmacSha384,
            TsigAlgorithm::HmacSha512 => HickoryTsigAlgorithm::HmacSha512,
        }
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Appends the TSIG record to `message`. Must be the last change made
    /// to the message before it is serialized.
    pub fn sign(&self, message: &mut Message) -> Result<(), DomainError> {
        let now = chrono::Utc::now().timestamp();
        message
            .finalize(&self.signer, now as _)
            .map_err(|e| DomainError::Tsig(format!("Signing with '{}' failed: {}", self.key_name, e)))?;
        Ok(())
    }
}

/// Signs when a signer is present.
pub fn sign_optional(signer: Option<&TsigSigner>, message: &mut Message) -> Result<(), DomainError> {
    match signer {
        Some(signer) => signer.sign(message),
        None => Ok(()),
    }
}
