//! # QUADRA Protocol
//!
//! Ledger primitives for the QUADRA governance network. This crate knows
//! nothing about proposals or voting — it provides the substrate the
//! governance program is built on:
//!
//! - **Identities** ([`identity`]) — 32-byte Ed25519 public keys wrapped
//!   as [`MemberId`], the atomic unit of "who" in the protocol.
//! - **Derived addresses** ([`address`]) — deterministic, collision-free
//!   mapping from seed segments to storage addresses, so any party can
//!   locate a record without a side index.
//! - **Account store** ([`store`]) — the addressable key-value ledger.
//!   Record creation fails if the address is occupied, which is the
//!   primitive every existence guard in the governance layer leans on.
//! - **Credential vault** ([`vault`]) — the fungible voting credential:
//!   supply tracking, authority-owned minting, and irreversible burns.
//!
//! Everything here is synchronous and deterministic. Concurrency control
//! belongs to whatever embeds the ledger; this crate only promises that a
//! single sequence of operations is atomic per call and reproducible.

pub mod address;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod store;
pub mod vault;

pub use address::Address;
pub use identity::{MemberId, MemberKeypair};
pub use store::{AccountStore, StoreError};
pub use vault::{AssetId, AssetInfo, CredentialVault, VaultError};
