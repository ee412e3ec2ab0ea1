//! # Account Records
//!
//! The five record shapes that make up an organization's on-ledger
//! state, plus the proposal state machine. Each record type knows how to
//! derive its own address from its logical key, so any party can locate
//! any record without an index.
//!
//! Lifecycle rules at a glance:
//!
//! | record | created by | mutated by | destroyed by |
//! |---|---|---|---|
//! | [`DaoRecord`] | `initialize` | proposal counter bump | never |
//! | [`IssuanceRecord`] | first issuance | every later issuance | never |
//! | [`WhitelistRecord`] | authority add | — | authority remove |
//! | [`Proposal`] | `create_proposal` | votes, tally, execute, cancel | never |
//! | [`VoteRecord`] | `vote` | — | never |
//!
//! Proposals and vote records are append-only for auditability: a tally
//! can be re-derived from the vote records alone, forever.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use quadra_protocol::{Address, AssetId, MemberId};

use crate::config::{
    CREDENTIAL_MINT_SEED, DAO_SEED, ISSUANCE_SEED, PROPOSAL_SEED, VOTE_SEED, WHITELIST_SEED,
};
use crate::error::GovernanceError;

// ---------------------------------------------------------------------------
// DaoRecord
// ---------------------------------------------------------------------------

/// The organization record — the root of trust every other record hangs
/// off. One per organization name, created once, never destroyed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaoRecord {
    /// The controlling identity. Gates whitelist management, execute,
    /// and cancel — nothing else.
    pub authority: MemberId,
    /// Organization name (at most 32 bytes). Part of the address seed.
    pub name: String,
    /// The credential asset members spend to vote.
    pub credential_asset: AssetId,
    /// Minimum total weighted votes for a tally to be valid.
    pub quorum_threshold: u64,
    /// Index the next proposal will take. Monotonic.
    pub proposal_count: u64,
    /// Canonicalization bump of this record's address.
    pub bump: u8,
    /// When the organization was initialized.
    pub created_at: DateTime<Utc>,
}

impl DaoRecord {
    /// Derives the organization's address from its name.
    pub fn address(name: &str) -> (Address, u8) {
        Address::derive(&[DAO_SEED, name.as_bytes()])
    }
}

/// Derives the address of an organization's credential asset.
pub fn credential_mint_address(dao: &Address) -> (Address, u8) {
    Address::derive(&[CREDENTIAL_MINT_SEED, dao.as_bytes()])
}

// ---------------------------------------------------------------------------
// IssuanceRecord
// ---------------------------------------------------------------------------

/// Per-member issuance bookkeeping. Exists from a member's first
/// successful issuance onward; only `last_issue_time` ever changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IssuanceRecord {
    /// The member this record tracks.
    pub member: MemberId,
    /// When the member last received credential.
    pub last_issue_time: DateTime<Utc>,
    /// Canonicalization bump of this record's address.
    pub bump: u8,
}

impl IssuanceRecord {
    /// Derives the issuance record address for a member.
    pub fn address(member: &MemberId) -> (Address, u8) {
        Address::derive(&[ISSUANCE_SEED, member.as_bytes()])
    }
}

// ---------------------------------------------------------------------------
// WhitelistRecord
// ---------------------------------------------------------------------------

/// An access-gate record. Its existence IS the membership predicate —
/// there is no flag to check and no state to get out of sync.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhitelistRecord {
    /// The whitelisted member.
    pub member: MemberId,
    /// Canonicalization bump of this record's address.
    pub bump: u8,
}

impl WhitelistRecord {
    /// Derives the gate record address for an (organization, member) pair.
    pub fn address(dao: &Address, member: &MemberId) -> (Address, u8) {
        Address::derive(&[WHITELIST_SEED, dao.as_bytes(), member.as_bytes()])
    }
}

// ---------------------------------------------------------------------------
// ProposalState
// ---------------------------------------------------------------------------

/// The proposal lifecycle.
///
/// `Active` is the only state that accepts votes. Tally moves an active
/// proposal to `Passed`, `Rejected`, or `QuorumNotMet`; execute moves
/// `Passed` to `Executed`; cancel moves `Active` to `Cancelled`. Every
/// state except `Active` and `Passed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// Accepting votes until `end_time`.
    Active,
    /// Tallied: quorum met and yes outweighed no.
    Passed,
    /// Tallied: quorum met but yes did not outweigh no.
    Rejected,
    /// Tallied: total weighted votes fell short of the quorum.
    QuorumNotMet,
    /// A passed proposal whose action has been carried out.
    Executed,
    /// Cancelled by the authority before finalization.
    Cancelled,
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalState::Active => write!(f, "Active"),
            ProposalState::Passed => write!(f, "Passed"),
            ProposalState::Rejected => write!(f, "Rejected"),
            ProposalState::QuorumNotMet => write!(f, "QuorumNotMet"),
            ProposalState::Executed => write!(f, "Executed"),
            ProposalState::Cancelled => write!(f, "Cancelled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

/// A single proposal and its running tally.
///
/// Vote counters are in weight units, not credential units: a vote of
/// weight 10 adds 10 to a counter while burning 100 units of credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// The organization this proposal belongs to.
    pub dao: Address,
    /// Index within the organization, assigned at creation.
    pub proposal_id: u64,
    /// Who created the proposal.
    pub proposer: MemberId,
    /// Title (at most 200 bytes).
    pub title: String,
    /// Description (at most 1000 bytes).
    pub description: String,
    /// When the proposal was created.
    pub created_at: DateTime<Utc>,
    /// End of the voting period. Votes at exactly `end_time` count;
    /// tally requires strictly later.
    pub end_time: DateTime<Utc>,
    /// Total weight voted in favor.
    pub yes_votes: u64,
    /// Total weight voted against.
    pub no_votes: u64,
    /// Always `yes_votes + no_votes`.
    pub total_votes_cast: u64,
    /// Lifecycle state.
    pub state: ProposalState,
    /// Canonicalization bump of this record's address.
    pub bump: u8,
}

impl Proposal {
    /// Derives a proposal's address from its organization and index.
    pub fn address(dao: &Address, proposal_id: u64) -> (Address, u8) {
        Address::derive(&[PROPOSAL_SEED, dao.as_bytes(), &proposal_id.to_le_bytes()])
    }

    /// Whether the proposal currently accepts votes.
    pub fn voting_open(&self, now: DateTime<Utc>) -> bool {
        self.state == ProposalState::Active && now <= self.end_time
    }

    /// Adds an accepted vote's weight to the tally counters.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::VotingClosed`] if the proposal is not
    /// `Active`, or [`GovernanceError::ArithmeticOverflow`] if a counter
    /// would wrap. Counters are untouched on error.
    pub fn record_vote(&mut self, weight: u64, support: bool) -> Result<(), GovernanceError> {
        if self.state != ProposalState::Active {
            return Err(GovernanceError::VotingClosed);
        }

        let (yes, no) = if support {
            (
                self.yes_votes
                    .checked_add(weight)
                    .ok_or(GovernanceError::ArithmeticOverflow)?,
                self.no_votes,
            )
        } else {
            (
                self.yes_votes,
                self.no_votes
                    .checked_add(weight)
                    .ok_or(GovernanceError::ArithmeticOverflow)?,
            )
        };
        let total = yes
            .checked_add(no)
            .ok_or(GovernanceError::ArithmeticOverflow)?;

        self.yes_votes = yes;
        self.no_votes = no;
        self.total_votes_cast = total;
        Ok(())
    }

    /// Finalizes an active proposal once its voting period has elapsed.
    ///
    /// The outcome is a pure function of the counters and the quorum:
    /// below quorum → `QuorumNotMet`; else yes > no → `Passed`; else
    /// `Rejected`. One-shot — a second tally fails.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::ProposalAlreadyFinalized`] if the
    /// proposal already left `Active`, or
    /// [`GovernanceError::VotingStillOpen`] if `now` is not strictly
    /// past `end_time`.
    pub fn tally(&mut self, now: DateTime<Utc>, quorum: u64) -> Result<(), GovernanceError> {
        if self.state != ProposalState::Active {
            return Err(GovernanceError::ProposalAlreadyFinalized { state: self.state });
        }
        if now <= self.end_time {
            return Err(GovernanceError::VotingStillOpen {
                ends_at: self.end_time,
            });
        }

        self.state = if self.total_votes_cast < quorum {
            ProposalState::QuorumNotMet
        } else if self.yes_votes > self.no_votes {
            ProposalState::Passed
        } else {
            ProposalState::Rejected
        };
        Ok(())
    }

    /// Marks a passed proposal as executed. The execution payload itself
    /// is a no-op placeholder — whatever downstream action a proposal
    /// authorizes happens outside this ledger.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::ProposalNotPassed`] unless the state is
    /// `Passed`.
    pub fn execute(&mut self) -> Result<(), GovernanceError> {
        if self.state != ProposalState::Passed {
            return Err(GovernanceError::ProposalNotPassed { state: self.state });
        }
        self.state = ProposalState::Executed;
        Ok(())
    }

    /// Cancels an active proposal.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::ProposalAlreadyFinalized`] unless the
    /// state is `Active`.
    pub fn cancel(&mut self) -> Result<(), GovernanceError> {
        if self.state != ProposalState::Active {
            return Err(GovernanceError::ProposalAlreadyFinalized { state: self.state });
        }
        self.state = ProposalState::Cancelled;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// VoteRecord
// ---------------------------------------------------------------------------

/// One member's vote on one proposal. Created exactly once — the
/// record's existence at its derived address is the double-vote guard —
/// and immutable forever after.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Who voted.
    pub voter: MemberId,
    /// The proposal voted on.
    pub proposal: Address,
    /// Vote weight applied to the tally (>= 1).
    pub weight: u64,
    /// Credential burned for this vote: always `weight²`.
    pub credits_spent: u64,
    /// `true` for yes, `false` for no.
    pub support: bool,
    /// When the vote was accepted.
    pub cast_at: DateTime<Utc>,
    /// Canonicalization bump of this record's address.
    pub bump: u8,
}

impl VoteRecord {
    /// Derives the vote record address for a (proposal, voter) pair.
    pub fn address(proposal: &Address, voter: &MemberId) -> (Address, u8) {
        Address::derive(&[VOTE_SEED, proposal.as_bytes(), voter.as_bytes()])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
