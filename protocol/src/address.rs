//! # Derived Addresses
//!
//! Maps a tuple of seed segments — a namespace tag plus whatever
//! identifies the record (an organization name, a member id, a
//! little-endian proposal index) — to a unique storage address. The
//! mapping is deterministic: any party holding the logical key can
//! recompute the address and fetch the record, so the ledger needs no
//! side index.
//!
//! ## The off-curve rule
//!
//! A derived address must never be a valid Ed25519 public key. If it
//! were, somebody could hold the matching secret key and sign as the
//! record's "owner". Derivation therefore walks a one-byte bump seed
//! downward from 255, hashing `(seeds, bump)` each time, and accepts the
//! first digest that does NOT decompress to a curve point. Roughly half
//! of all digests are curve points, so the walk almost always stops
//! within a few steps; exhausting all 256 bumps has probability ~2^-256
//! and is treated as fatal.
//!
//! ## Framing
//!
//! Seed segments are length-framed before hashing, so `["ab", "c"]` and
//! `["a", "bc"]` derive different addresses. The whole derivation runs
//! under a dedicated BLAKE3 domain context, keeping addresses disjoint
//! from every other hash in the protocol.

use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ADDRESS_DOMAIN;

/// A derived storage address. 32 bytes, guaranteed off-curve when
/// produced by [`Address::derive`].
///
/// Displayed in base58. Ordering is lexicographic over the raw bytes,
/// which is what the account store's deterministic state root relies on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 32]);

impl Address {
    /// Wraps raw address bytes. Use [`Address::derive`] for anything that
    /// must honor the off-curve rule; this constructor is for replaying
    /// addresses that were derived elsewhere.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte address.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the base58-encoded address.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Derives the canonical address for a tuple of seed segments,
    /// returning the address and the bump that canonicalized it.
    ///
    /// Identical seeds always produce the identical `(address, bump)`
    /// pair. Distinct namespace tags can never collide thanks to the
    /// length framing and the domain context.
    ///
    /// # Panics
    ///
    /// Panics if all 256 bump values yield on-curve digests. The odds are
    /// ~2^-256 per seed tuple — this is a fatal "the RNG of the universe
    /// is broken" condition, not a recoverable error.
    pub fn derive(seeds: &[&[u8]]) -> (Address, u8) {
        for bump in (0..=u8::MAX).rev() {
            let candidate = derivation_digest(seeds, bump);
            if CompressedEdwardsY(candidate).decompress().is_none() {
                return (Address(candidate), bump);
            }
        }
        panic!("address derivation exhausted all 256 bump seeds");
    }
}

/// Hash the length-framed seed segments plus the bump byte under the
/// address domain context.
fn derivation_digest(seeds: &[&[u8]], bump: u8) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(ADDRESS_DOMAIN);
    for seed in seeds {
        hasher.update(&(seed.len() as u32).to_le_bytes());
        hasher.update(seed);
    }
    hasher.update(&[bump]);
    *hasher.finalize().as_bytes()
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}...)", &self.to_base58()[..8])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
