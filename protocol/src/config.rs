//! # Protocol Constants
//!
//! Every magic number in the protocol crate lives here. Domain contexts
//! in particular are consensus-critical: change one and every derived
//! address and asset id on the network changes with it.

/// Domain context for address derivation. Mixed into the BLAKE3 keyed
/// hash so addresses can never collide with asset ids or any other
/// hash-derived value, even for identical input bytes.
pub const ADDRESS_DOMAIN: &str = "quadra/address/v1";

/// Domain context for credential asset id derivation.
pub const ASSET_DOMAIN: &str = "quadra/asset/v1";

/// Length in bytes of a member identity (an Ed25519 public key).
pub const MEMBER_ID_LENGTH: usize = 32;

/// Length in bytes of a derived storage address.
pub const ADDRESS_LENGTH: usize = 32;

/// Highest canonicalization bump tried during address derivation. The
/// walk starts here and counts down, so for a given seed tuple the
/// canonical bump is the largest one producing an off-curve candidate.
pub const MAX_BUMP: u8 = 255;
