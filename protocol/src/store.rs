//! # Account Store
//!
//! The addressable key-value ledger: records of one type, keyed by
//! derived [`Address`]es. This is deliberately a flat map — proposals,
//! votes, and membership records are fixed-shape values at derived
//! addresses, never a pointer graph.
//!
//! The one behavioral subtlety is [`AccountStore::create`]: it fails if
//! the address is already occupied. That failure is load-bearing. Every
//! "exactly once" rule in the governance layer — one organization per
//! name, one vote per (proposal, voter), no double whitelist add — is
//! this create-guard wearing a different error name. Two racing writers
//! targeting the same address behave like compare-and-swap: one creates,
//! the other observes `AlreadyExists`.
//!
//! [`AccountStore::state_root`] summarizes the whole store as a Merkle
//! root over sorted `(address, record)` leaves, deterministic regardless
//! of insertion order.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::address::Address;
use crate::crypto::hash::{blake3_hash_multi, merkle_root};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from account store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `create` targeted an occupied address.
    #[error("account already exists at {0}")]
    AlreadyExists(Address),

    /// `remove` targeted an empty address.
    #[error("no account at {0}")]
    NotFound(Address),
}

// ---------------------------------------------------------------------------
// AccountStore
// ---------------------------------------------------------------------------

/// A typed account store keyed by derived addresses.
#[derive(Clone, Debug)]
pub struct AccountStore<T> {
    accounts: HashMap<Address, T>,
}

// Manual impl: the derived one would bound `T: Default`.
impl<T> Default for AccountStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AccountStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// Creates a record at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the address is occupied.
    /// Callers rely on this as their existence guard — do not "fix" it
    /// into an upsert.
    pub fn create(&mut self, address: Address, record: T) -> Result<(), StoreError> {
        if self.accounts.contains_key(&address) {
            return Err(StoreError::AlreadyExists(address));
        }
        self.accounts.insert(address, record);
        Ok(())
    }

    /// Returns the record at `address`, if any.
    pub fn get(&self, address: &Address) -> Option<&T> {
        self.accounts.get(address)
    }

    /// Returns a mutable reference to the record at `address`, if any.
    pub fn get_mut(&mut self, address: &Address) -> Option<&mut T> {
        self.accounts.get_mut(address)
    }

    /// Removes and returns the record at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the address is empty.
    pub fn remove(&mut self, address: &Address) -> Result<T, StoreError> {
        self.accounts
            .remove(address)
            .ok_or(StoreError::NotFound(*address))
    }

    /// Whether a record exists at `address`.
    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterates over `(address, record)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &T)> {
        self.accounts.iter()
    }
}

impl<T: Serialize> AccountStore<T> {
    /// Computes the Merkle state root of the store.
    ///
    /// Each leaf is `BLAKE3(address || serialized record)`; leaves are
    /// sorted by address before building the tree, so the root is a pure
    /// function of store contents. An empty store roots to all zeros.
    pub fn state_root(&self) -> [u8; 32] {
        let mut entries: Vec<(&Address, &T)> = self.accounts.iter().collect();
        entries.sort_by_key(|(address, _)| **address);

        let leaves: Vec<[u8; 32]> = entries
            .into_iter()
            .map(|(address, record)| {
                let bytes = serde_json::to_vec(record).unwrap_or_default();
                blake3_hash_multi(&[address.as_bytes(), &bytes])
            })
            .collect();

        merkle_root(&leaves)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
