//! # QUADRA Governance
//!
//! The on-chain logic of a quadratic-voting organization: members hold a
//! fungible voting credential, spend it quadratically to weight their
//! votes, and proposals pass or fail against a quorum of weighted votes.
//!
//! - **Registry** — one [`DaoRecord`](state::DaoRecord) per organization
//!   name, holding the authority, quorum threshold, proposal counter,
//!   and credential asset reference.
//! - **Credential issuer** — fixed-amount issuance gated by balance
//!   thresholds, a hard cap, and a 24-hour cooldown.
//! - **Access gate** — an authority-curated whitelist; a record's
//!   existence is the membership predicate.
//! - **Proposal lifecycle** — an explicit state machine
//!   (`Active → Passed/Rejected/QuorumNotMet`, `Passed → Executed`,
//!   `Active → Cancelled`) driven by transition methods, not flags.
//! - **Vote ledger** — one immutable record per (proposal, voter);
//!   creating it is the double-vote guard, and its quadratic cost is
//!   burned, not transferred.
//!
//! ## Design Principles
//!
//! 1. Authority and membership are capability predicates — identity
//!    equality and record existence — never role hierarchies.
//! 2. Every operation checks everything before mutating anything; an
//!    error always means zero state change.
//! 3. All counter arithmetic is checked. Wrapping math and vote tallies
//!    do not mix.
//! 4. Every account record is serializable for wire transport and state
//!    roots.

pub mod config;
pub mod engine;
pub mod error;
pub mod state;

pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use state::{
    DaoRecord, IssuanceRecord, Proposal, ProposalState, VoteRecord, WhitelistRecord,
};
