//! # Member Identities
//!
//! Every participant in a QUADRA organization is identified by a 32-byte
//! Ed25519 public key, wrapped as [`MemberId`]. The wrapper exists so the
//! rest of the codebase can treat identity as an opaque, copyable,
//! orderable value — equality checks and map keys, nothing more. The
//! governance layer's authority and whitelist predicates are exactly
//! that: equality and existence checks over `MemberId`s.
//!
//! [`MemberKeypair`] is the generation side. The core operations never
//! verify signatures themselves — callers arrive authenticated by the
//! transport that executed them — but identities still have to *be*
//! Ed25519 points so the off-curve guarantee of derived addresses means
//! something. Generating them from real keys keeps that honest.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::MEMBER_ID_LENGTH;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from decoding member identities.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The input did not decode as base58.
    #[error("invalid base58 encoding")]
    InvalidEncoding,

    /// The decoded bytes were not exactly 32 bytes long.
    #[error("invalid identity length: expected {MEMBER_ID_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

// ---------------------------------------------------------------------------
// MemberId
// ---------------------------------------------------------------------------

/// A member identity: the 32 bytes of an Ed25519 public key.
///
/// Displayed in base58, matching how the rest of the ecosystem prints
/// account keys. Orderable and hashable so it can key maps and sort
/// deterministically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId([u8; 32]);

impl MemberId {
    /// Wraps raw identity bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identity.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the base58-encoded identity.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Parses a base58-encoded identity.
    pub fn from_base58(s: &str) -> Result<Self, IdentityError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| IdentityError::InvalidEncoding)?;
        if bytes.len() != MEMBER_ID_LENGTH {
            return Err(IdentityError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl From<&VerifyingKey> for MemberId {
    fn from(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({}...)", &self.to_base58()[..8])
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl std::str::FromStr for MemberId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

// ---------------------------------------------------------------------------
// Serde helper: HashMap<MemberId, V> with base58 string keys
// ---------------------------------------------------------------------------

/// Serde helper for `HashMap<MemberId, V>` keyed by base58 strings.
///
/// JSON object keys must be strings; without this, serde would reject the
/// `[u8; 32]` key type. Attach with
/// `#[serde(with = "quadra_protocol::identity::member_id_map")]`.
pub mod member_id_map {
    use super::MemberId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<V, S>(map: &HashMap<MemberId, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut ser_map = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            ser_map.serialize_entry(&key.to_base58(), value)?;
        }
        ser_map.end()
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<HashMap<MemberId, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let string_map: HashMap<String, V> = HashMap::deserialize(deserializer)?;
        string_map
            .into_iter()
            .map(|(key, value)| {
                MemberId::from_base58(&key)
                    .map(|id| (id, value))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MemberKeypair
// ---------------------------------------------------------------------------

/// An Ed25519 keypair backing a member identity.
///
/// Deliberately does NOT implement `Serialize` — persisting private key
/// material must be an explicit act, not a side effect of dumping state.
/// The governance core only ever sees the [`MemberId`] half.
pub struct MemberKeypair {
    signing_key: SigningKey,
}

impl MemberKeypair {
    /// Generates a fresh keypair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstructs a keypair from its 32 secret bytes.
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&bytes),
        }
    }

    /// The public verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// The member identity derived from this keypair.
    pub fn member_id(&self) -> MemberId {
        MemberId::from(&self.verifying_key())
    }
}

impl fmt::Debug for MemberKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material, even in debug output.
        write!(f, "MemberKeypair({})", self.member_id())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
