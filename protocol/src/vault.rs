//! # Credential Vault
//!
//! The fungible voting credential: asset metadata plus per-member
//! balances. One vault exists per organization; its asset's mint
//! authority is the organization's own derived address, so no individual
//! keypair can ever mint.
//!
//! Two rules are enforced here and nowhere else:
//!
//! - **Conservation** — `total_supply` equals the sum of all balances at
//!   all times. Mint adds to both, burn subtracts from both, and there is
//!   no third operation.
//! - **No resurrection** — burned units are gone. They do not move to the
//!   organization, a treasury, or any other balance. A vote's quadratic
//!   cost permanently leaves circulation.
//!
//! All amounts are in the asset's smallest units. The `decimals` field is
//! display metadata for clients; the protocol never divides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::address::Address;
use crate::config::ASSET_DOMAIN;
use crate::crypto::hash::domain_separated_hash;
use crate::identity::MemberId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Minting would overflow the asset's total supply counter.
    #[error("supply overflow: supply {supply}, mint {minted}")]
    SupplyOverflow {
        /// Supply before the failed mint.
        supply: u64,
        /// Amount that caused the overflow.
        minted: u64,
    },

    /// Minting would overflow a single member's balance.
    #[error("balance overflow for {member}: balance {balance}, credit {credit}")]
    BalanceOverflow {
        /// The member whose balance would overflow.
        member: MemberId,
        /// Balance before the failed mint.
        balance: u64,
        /// Amount that caused the overflow.
        credit: u64,
    },

    /// A burn exceeded the member's balance.
    #[error("insufficient balance for {member}: have {balance}, burn {amount}")]
    InsufficientBalance {
        /// The member being debited.
        member: MemberId,
        /// Current balance.
        balance: u64,
        /// Amount the caller tried to burn.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Content-addressed identifier for a credential asset.
///
/// Derived as a domain-separated BLAKE3 hash of the asset's canonical
/// properties (name, symbol, mint authority). The same properties always
/// produce the same id, so clients can recompute it instead of looking
/// it up.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId([u8; 32]);

impl AssetId {
    /// Wraps a raw 32-byte id.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte id.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the hex-encoded id.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded id.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derives the id from the asset's canonical properties.
    ///
    /// Fields are separated by `0x00` bytes so one field's suffix can
    /// never blur into the next field's prefix.
    pub fn derive(name: &str, symbol: &str, mint_authority: &Address) -> Self {
        let mut preimage = Vec::with_capacity(name.len() + symbol.len() + 34);
        preimage.extend_from_slice(name.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(symbol.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(mint_authority.as_bytes());
        Self(domain_separated_hash(ASSET_DOMAIN, &preimage))
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// AssetInfo
// ---------------------------------------------------------------------------

/// Metadata for a credential asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Content-addressed identifier.
    pub id: AssetId,
    /// Human-readable asset name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Display decimals. Never used in arithmetic.
    pub decimals: u8,
    /// Current supply in smallest units. Equals the sum of all balances.
    pub total_supply: u64,
    /// The derived address allowed to mint — an organization, not a
    /// person.
    pub mint_authority: Address,
    /// When the asset was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CredentialVault
// ---------------------------------------------------------------------------

/// One asset and the balances of everyone who holds it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialVault {
    asset: AssetInfo,
    #[serde(with = "crate::identity::member_id_map")]
    balances: HashMap<MemberId, u64>,
}

impl CredentialVault {
    /// Creates a vault for a fresh asset with zero supply.
    pub fn new(
        name: &str,
        symbol: &str,
        decimals: u8,
        mint_authority: Address,
        now: DateTime<Utc>,
    ) -> Self {
        let id = AssetId::derive(name, symbol, &mint_authority);
        Self {
            asset: AssetInfo {
                id,
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals,
                total_supply: 0,
                mint_authority,
                created_at: now,
            },
            balances: HashMap::new(),
        }
    }

    /// The asset's metadata.
    pub fn asset(&self) -> &AssetInfo {
        &self.asset
    }

    /// A member's balance in smallest units. Zero if the member has never
    /// held the asset — absent balance entries are created lazily on the
    /// first mint.
    pub fn balance_of(&self, member: &MemberId) -> u64 {
        self.balances.get(member).copied().unwrap_or(0)
    }

    /// Number of members with a balance entry (including spent-to-zero).
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Mints `amount` units to `member`, returning the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::SupplyOverflow`] or
    /// [`VaultError::BalanceOverflow`] if either counter would wrap.
    /// Neither counter moves on failure.
    pub fn mint_to(&mut self, member: &MemberId, amount: u64) -> Result<u64, VaultError> {
        let new_supply =
            self.asset
                .total_supply
                .checked_add(amount)
                .ok_or(VaultError::SupplyOverflow {
                    supply: self.asset.total_supply,
                    minted: amount,
                })?;

        let balance = self.balances.entry(*member).or_insert(0);
        let new_balance = balance.checked_add(amount).ok_or(VaultError::BalanceOverflow {
            member: *member,
            balance: *balance,
            credit: amount,
        })?;

        *balance = new_balance;
        self.asset.total_supply = new_supply;
        Ok(new_balance)
    }

    /// Burns `amount` units from `member`, returning the new balance.
    /// The units leave circulation permanently.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InsufficientBalance`] if the member holds
    /// less than `amount`.
    pub fn burn_from(&mut self, member: &MemberId, amount: u64) -> Result<u64, VaultError> {
        let current = self.balance_of(member);
        if current < amount {
            return Err(VaultError::InsufficientBalance {
                member: *member,
                balance: current,
                amount,
            });
        }

        let balance = self.balances.entry(*member).or_insert(0);
        *balance -= amount;
        // Supply >= every individual balance by conservation, so this
        // cannot underflow.
        self.asset.total_supply -= amount;
        Ok(*balance)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemberKeypair;

    fn vault() -> CredentialVault {
        let (authority, _) = Address::derive(&[b"test-dao", b"vault"]);
        CredentialVault::new("Test Credential", "TCR", 9, authority, Utc::now())
    }

    fn member() -> MemberId {
        MemberKeypair::generate().member_id()
    }

    #[test]
    fn asset_id_is_deterministic() {
        let (authority, _) = Address::derive(&[b"dao", b"id-test"]);
        let a = AssetId::derive("Cred", "CRD", &authority);
        let b = AssetId::derive("Cred", "CRD", &authority);
        assert_eq!(a, b);
    }

    #[test]
    fn asset_id_differs_per_authority() {
        let (auth_a, _) = Address::derive(&[b"dao", b"alpha"]);
        let (auth_b, _) = Address::derive(&[b"dao", b"beta"]);
        assert_ne!(
            AssetId::derive("Cred", "CRD", &auth_a),
            AssetId::derive("Cred", "CRD", &auth_b)
        );
    }

    #[test]
    fn asset_id_hex_roundtrip() {
        let (authority, _) = Address::derive(&[b"dao", b"hex"]);
        let id = AssetId::derive("Cred", "CRD", &authority);
        assert_eq!(AssetId::from_hex(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn fresh_vault_has_zero_supply() {
        let v = vault();
        assert_eq!(v.asset().total_supply, 0);
        assert_eq!(v.holder_count(), 0);
    }

    #[test]
    fn unknown_member_has_zero_balance() {
        let v = vault();
        assert_eq!(v.balance_of(&member()), 0);
    }

    #[test]
    fn mint_creates_entry_and_tracks_supply() {
        let mut v = vault();
        let m = member();
        assert_eq!(v.mint_to(&m, 500).unwrap(), 500);
        assert_eq!(v.balance_of(&m), 500);
        assert_eq!(v.asset().total_supply, 500);
        assert_eq!(v.holder_count(), 1);
    }

    #[test]
    fn mint_accumulates() {
        let mut v = vault();
        let m = member();
        v.mint_to(&m, 300).unwrap();
        v.mint_to(&m, 200).unwrap();
        assert_eq!(v.balance_of(&m), 500);
        assert_eq!(v.asset().total_supply, 500);
    }

    #[test]
    fn supply_overflow_rejected_without_side_effects() {
        let mut v = vault();
        let a = member();
        let b = member();
        v.mint_to(&a, u64::MAX).unwrap();
        let result = v.mint_to(&b, 1);
        assert!(matches!(result, Err(VaultError::SupplyOverflow { .. })));
        assert_eq!(v.balance_of(&b), 0);
        assert_eq!(v.asset().total_supply, u64::MAX);
    }

    #[test]
    fn burn_reduces_balance_and_supply() {
        let mut v = vault();
        let m = member();
        v.mint_to(&m, 1000).unwrap();
        assert_eq!(v.burn_from(&m, 400).unwrap(), 600);
        assert_eq!(v.balance_of(&m), 600);
        assert_eq!(v.asset().total_supply, 600);
    }

    #[test]
    fn burn_to_exactly_zero() {
        let mut v = vault();
        let m = member();
        v.mint_to(&m, 100).unwrap();
        assert_eq!(v.burn_from(&m, 100).unwrap(), 0);
        assert_eq!(v.asset().total_supply, 0);
    }

    #[test]
    fn overburn_rejected() {
        let mut v = vault();
        let m = member();
        v.mint_to(&m, 100).unwrap();
        let result = v.burn_from(&m, 101);
        assert!(matches!(
            result,
            Err(VaultError::InsufficientBalance {
                balance: 100,
                amount: 101,
                ..
            })
        ));
        assert_eq!(v.balance_of(&m), 100);
    }

    #[test]
    fn burn_from_unknown_member_rejected() {
        let mut v = vault();
        let result = v.burn_from(&member(), 1);
        assert!(matches!(
            result,
            Err(VaultError::InsufficientBalance { balance: 0, .. })
        ));
    }

    #[test]
    fn conservation_across_many_members() {
        let mut v = vault();
        let members: Vec<MemberId> = (0..4).map(|_| member()).collect();
        for (i, m) in members.iter().enumerate() {
            v.mint_to(m, (i as u64 + 1) * 100).unwrap();
        }
        v.burn_from(&members[2], 150).unwrap();
        let sum: u64 = members.iter().map(|m| v.balance_of(m)).sum();
        assert_eq!(v.asset().total_supply, sum);
    }

    #[test]
    fn vault_serialization_roundtrip() {
        let mut v = vault();
        let m = member();
        v.mint_to(&m, 77).unwrap();

        let json = serde_json::to_string(&v).expect("serialize");
        let recovered: CredentialVault = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(recovered.balance_of(&m), 77);
        assert_eq!(recovered.asset(), v.asset());
    }
}
