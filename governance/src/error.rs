//! # Governance Errors
//!
//! Every failure mode of the governance program, each with a stable
//! identifying code. Errors are categorical and terminal per call — the
//! engine never partially applies a failed operation and never retries.
//! Clients key their user-facing messages off [`GovernanceError::code`],
//! so the code strings are part of the interface contract and must not
//! change.

use chrono::{DateTime, Utc};
use thiserror::Error;

use quadra_protocol::{Address, MemberId};

use crate::state::ProposalState;

/// Errors surfaced by governance operations.
#[derive(Debug, Error)]
pub enum GovernanceError {
    // --- configuration ---------------------------------------------------
    /// An organization already exists under this name.
    #[error("organization '{name}' is already initialized")]
    AlreadyInitialized {
        /// The contested organization name.
        name: String,
    },

    /// The organization configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// A caller-supplied input failed validation.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },

    // --- authorization ---------------------------------------------------
    /// The caller is not the organization authority.
    #[error("unauthorized: {caller} is not the organization authority")]
    Unauthorized {
        /// The rejected caller.
        caller: MemberId,
    },

    /// The member has no whitelist record for this organization.
    #[error("{member} is not whitelisted")]
    NotWhitelisted {
        /// The member lacking a gate record.
        member: MemberId,
    },

    /// The member already has a whitelist record.
    #[error("{member} is already whitelisted")]
    AlreadyWhitelisted {
        /// The member with an existing gate record.
        member: MemberId,
    },

    // --- economic --------------------------------------------------------
    /// The member's balance is at or above the issuance eligibility bound.
    #[error("balance {balance} is at or above the issuance bound of {threshold}")]
    BalanceTooHigh {
        /// The member's current balance.
        balance: u64,
        /// The eligibility bound.
        threshold: u64,
    },

    /// Issuance would put the member's balance over the hard cap.
    #[error("issuance would exceed the balance cap of {cap} (current balance {balance})")]
    MintCapReached {
        /// The member's current balance.
        balance: u64,
        /// The hard cap.
        cap: u64,
    },

    /// The member was issued credential too recently.
    #[error("issuance cooldown active: {remaining_secs}s remaining")]
    MintCooldownActive {
        /// Seconds until the member becomes eligible again.
        remaining_secs: i64,
    },

    /// The voter cannot afford the quadratic cost of the requested weight.
    #[error("insufficient credential: need {required}, have {available}")]
    InsufficientFunds {
        /// The quadratic cost in smallest units.
        required: u64,
        /// The voter's balance in smallest units.
        available: u64,
    },

    // --- lifecycle -------------------------------------------------------
    /// The proposal is not accepting votes (inactive or past its end time).
    #[error("voting is closed for this proposal")]
    VotingClosed,

    /// Tally was requested before the voting period elapsed.
    #[error("voting is still open until {ends_at}")]
    VotingStillOpen {
        /// When the voting period ends.
        ends_at: DateTime<Utc>,
    },

    /// The voter already holds a vote record for this proposal.
    #[error("{voter} has already voted on this proposal")]
    AlreadyVoted {
        /// The repeat voter.
        voter: MemberId,
    },

    /// The proposal already left the `Active` state.
    #[error("proposal is already finalized as {state}")]
    ProposalAlreadyFinalized {
        /// The terminal (or post-tally) state.
        state: ProposalState,
    },

    /// Execute was requested on a proposal that is not `Passed`.
    #[error("proposal has not passed (state: {state})")]
    ProposalNotPassed {
        /// The proposal's actual state.
        state: ProposalState,
    },

    // --- lookup & internal guards ---------------------------------------
    /// No organization record at the given address.
    #[error("no organization at {0}")]
    DaoNotFound(Address),

    /// No proposal record at the given address.
    #[error("no proposal at {0}")]
    ProposalNotFound(Address),

    /// A freshly derived address was unexpectedly occupied.
    #[error("account collision at {0}")]
    AccountCollision(Address),

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

impl GovernanceError {
    /// The stable identifying code for this error. Part of the client
    /// contract: dashboards map these strings to user-facing messages.
    pub fn code(&self) -> &'static str {
        match self {
            GovernanceError::AlreadyInitialized { .. } => "AlreadyInitialized",
            GovernanceError::InvalidConfig { .. } => "InvalidConfig",
            GovernanceError::InvalidInput { .. } => "InvalidInput",
            GovernanceError::Unauthorized { .. } => "Unauthorized",
            GovernanceError::NotWhitelisted { .. } => "NotWhitelisted",
            GovernanceError::AlreadyWhitelisted { .. } => "AlreadyWhitelisted",
            GovernanceError::BalanceTooHigh { .. } => "BalanceTooHigh",
            GovernanceError::MintCapReached { .. } => "MintCapReached",
            GovernanceError::MintCooldownActive { .. } => "MintCooldownActive",
            GovernanceError::InsufficientFunds { .. } => "InsufficientFunds",
            GovernanceError::VotingClosed => "VotingClosed",
            GovernanceError::VotingStillOpen { .. } => "VotingStillOpen",
            GovernanceError::AlreadyVoted { .. } => "AlreadyVoted",
            GovernanceError::ProposalAlreadyFinalized { .. } => "ProposalAlreadyFinalized",
            GovernanceError::ProposalNotPassed { .. } => "ProposalNotPassed",
            GovernanceError::DaoNotFound(_) => "DaoNotFound",
            GovernanceError::ProposalNotFound(_) => "ProposalNotFound",
            GovernanceError::AccountCollision(_) => "AccountCollision",
            GovernanceError::ArithmeticOverflow => "ArithmeticOverflow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_names() {
        let err = GovernanceError::VotingClosed;
        assert_eq!(err.code(), "VotingClosed");

        let err = GovernanceError::MintCooldownActive { remaining_secs: 60 };
        assert_eq!(err.code(), "MintCooldownActive");
    }

    #[test]
    fn messages_carry_context() {
        let err = GovernanceError::InsufficientFunds {
            required: 100,
            available: 36,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("36"));
    }
}
