//! # Governance Engine
//!
//! The state-transition surface of the governance program. The engine
//! owns the account stores and credential vaults and exposes one method
//! per ledger operation: initialize, issue credential, whitelist
//! add/remove, create proposal, vote, tally, execute, cancel.
//!
//! Callers arrive authenticated — the `caller`/`member` arguments are
//! identities the transport has already verified. Time-sensitive
//! operations take `now` explicitly, the way a ledger program reads the
//! chain clock: the engine never consults a wall clock of its own, which
//! also means tests drive time instead of sleeping through it.
//!
//! ## Atomicity
//!
//! Every operation validates ALL of its preconditions before touching
//! any state. The commit phase that follows is infallible by
//! construction (each fallible step was pre-checked against state that
//! `&mut self` guarantees cannot change in between), so an error return
//! always means zero state change. Two callers racing to create the
//! same record — the same vote, the same whitelist entry — resolve like
//! compare-and-swap: one creation wins, the other surfaces the
//! corresponding `Already*` error.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use quadra_protocol::{AccountStore, Address, CredentialVault, MemberId};

use crate::config::{
    BALANCE_THRESHOLD, CREDENTIAL_DECIMALS, CREDENTIAL_SYMBOL, ISSUE_AMOUNT, ISSUE_COOLDOWN_SECS,
    MAX_BALANCE, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_TITLE_LEN, MAX_VOTE_WEIGHT,
};
use crate::error::GovernanceError;
use crate::state::{
    credential_mint_address, DaoRecord, IssuanceRecord, Proposal, ProposalState, VoteRecord,
    WhitelistRecord,
};

/// The governance program state: five account stores and the credential
/// vaults, one vault per organization.
#[derive(Debug, Default)]
pub struct GovernanceEngine {
    daos: AccountStore<DaoRecord>,
    issuances: AccountStore<IssuanceRecord>,
    whitelist: AccountStore<WhitelistRecord>,
    proposals: AccountStore<Proposal>,
    votes: AccountStore<VoteRecord>,
    vaults: AccountStore<CredentialVault>,
}

impl GovernanceEngine {
    /// Creates an engine with no organizations.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Creates an organization and its credential asset, returning the
    /// organization's address.
    ///
    /// The credential's mint authority is the organization's derived
    /// address itself — the registry, not any individual, controls
    /// issuance.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the name is empty or longer than 32 bytes, or
    /// the quorum threshold is zero. `AlreadyInitialized` if an
    /// organization already exists under this name.
    pub fn initialize(
        &mut self,
        authority: MemberId,
        name: &str,
        quorum_threshold: u64,
        now: DateTime<Utc>,
    ) -> Result<Address, GovernanceError> {
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(GovernanceError::InvalidConfig {
                reason: format!("name must be 1..={MAX_NAME_LEN} bytes"),
            });
        }
        if quorum_threshold == 0 {
            return Err(GovernanceError::InvalidConfig {
                reason: "quorum threshold must be positive".into(),
            });
        }

        let (dao_address, bump) = DaoRecord::address(name);
        let (mint_address, _) = credential_mint_address(&dao_address);
        let vault = CredentialVault::new(
            &format!("{name} Voting Credential"),
            CREDENTIAL_SYMBOL,
            CREDENTIAL_DECIMALS,
            dao_address,
            now,
        );

        let record = DaoRecord {
            authority,
            name: name.to_string(),
            credential_asset: vault.asset().id,
            quorum_threshold,
            proposal_count: 0,
            bump,
            created_at: now,
        };

        self.daos
            .create(dao_address, record)
            .map_err(|_| GovernanceError::AlreadyInitialized {
                name: name.to_string(),
            })?;
        self.vaults
            .create(mint_address, vault)
            .map_err(|_| GovernanceError::AccountCollision(mint_address))?;

        info!(dao = %dao_address, %authority, quorum_threshold, "organization initialized");
        Ok(dao_address)
    }

    // -----------------------------------------------------------------------
    // Credential issuer
    // -----------------------------------------------------------------------

    /// Issues the fixed credential amount to `member`, subject to the
    /// eligibility bound, the hard cap, and the cooldown.
    ///
    /// Checks run in a fixed order and the first failure is the reported
    /// error: balance at or above the eligibility bound →
    /// `BalanceTooHigh`; balance at or above the cap → `MintCapReached`;
    /// cooldown not yet elapsed → `MintCooldownActive`; post-issuance
    /// balance over the cap → `MintCapReached` (the fixed amount is
    /// never clamped). On success the issuance record's
    /// `last_issue_time` is set to `now`, creating the record if this is
    /// the member's first issuance.
    pub fn issue_credential(
        &mut self,
        member: MemberId,
        dao: &Address,
        now: DateTime<Utc>,
    ) -> Result<(), GovernanceError> {
        if !self.daos.contains(dao) {
            return Err(GovernanceError::DaoNotFound(*dao));
        }
        let (mint_address, _) = credential_mint_address(dao);
        let vault = self
            .vaults
            .get_mut(&mint_address)
            .ok_or(GovernanceError::DaoNotFound(*dao))?;

        let balance = vault.balance_of(&member);
        if balance >= BALANCE_THRESHOLD {
            return Err(GovernanceError::BalanceTooHigh {
                balance,
                threshold: BALANCE_THRESHOLD,
            });
        }
        if balance >= MAX_BALANCE {
            return Err(GovernanceError::MintCapReached {
                balance,
                cap: MAX_BALANCE,
            });
        }

        let (record_address, record_bump) = IssuanceRecord::address(&member);
        if let Some(record) = self.issuances.get(&record_address) {
            let elapsed = now
                .signed_duration_since(record.last_issue_time)
                .num_seconds();
            if elapsed < ISSUE_COOLDOWN_SECS {
                return Err(GovernanceError::MintCooldownActive {
                    remaining_secs: ISSUE_COOLDOWN_SECS - elapsed,
                });
            }
        }

        let post_balance = balance
            .checked_add(ISSUE_AMOUNT)
            .ok_or(GovernanceError::ArithmeticOverflow)?;
        if post_balance > MAX_BALANCE {
            return Err(GovernanceError::MintCapReached {
                balance,
                cap: MAX_BALANCE,
            });
        }

        vault
            .mint_to(&member, ISSUE_AMOUNT)
            .map_err(|_| GovernanceError::ArithmeticOverflow)?;

        match self.issuances.get_mut(&record_address) {
            Some(record) => record.last_issue_time = now,
            None => {
                self.issuances
                    .create(
                        record_address,
                        IssuanceRecord {
                            member,
                            last_issue_time: now,
                            bump: record_bump,
                        },
                    )
                    .map_err(|_| GovernanceError::AccountCollision(record_address))?;
            }
        }

        info!(%member, amount = ISSUE_AMOUNT, new_balance = post_balance, "credential issued");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Access gate
    // -----------------------------------------------------------------------

    /// Adds `member` to the organization's whitelist. Authority only.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the organization authority;
    /// `AlreadyWhitelisted` if a gate record already exists.
    pub fn add_to_whitelist(
        &mut self,
        caller: MemberId,
        dao: &Address,
        member: MemberId,
    ) -> Result<(), GovernanceError> {
        self.require_authority(caller, dao)?;

        let (address, bump) = WhitelistRecord::address(dao, &member);
        self.whitelist
            .create(address, WhitelistRecord { member, bump })
            .map_err(|_| GovernanceError::AlreadyWhitelisted { member })?;

        info!(dao = %dao, %member, "member whitelisted");
        Ok(())
    }

    /// Removes `member` from the organization's whitelist. Authority only.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` is the organization authority;
    /// `NotWhitelisted` if no gate record exists.
    pub fn remove_from_whitelist(
        &mut self,
        caller: MemberId,
        dao: &Address,
        member: MemberId,
    ) -> Result<(), GovernanceError> {
        self.require_authority(caller, dao)?;

        let (address, _) = WhitelistRecord::address(dao, &member);
        self.whitelist
            .remove(&address)
            .map_err(|_| GovernanceError::NotWhitelisted { member })?;

        info!(dao = %dao, %member, "member removed from whitelist");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Proposal lifecycle
    // -----------------------------------------------------------------------

    /// Creates a proposal, assigns it the organization's next index, and
    /// returns its address. Any member may propose.
    ///
    /// # Errors
    ///
    /// `InvalidInput` on an oversized title or description or a
    /// non-positive voting period.
    pub fn create_proposal(
        &mut self,
        proposer: MemberId,
        dao: &Address,
        title: &str,
        description: &str,
        voting_period_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<Address, GovernanceError> {
        if title.len() > MAX_TITLE_LEN {
            return Err(GovernanceError::InvalidInput {
                reason: format!("title exceeds {MAX_TITLE_LEN} bytes"),
            });
        }
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(GovernanceError::InvalidInput {
                reason: format!("description exceeds {MAX_DESCRIPTION_LEN} bytes"),
            });
        }
        if voting_period_secs <= 0 {
            return Err(GovernanceError::InvalidInput {
                reason: "voting period must be positive".into(),
            });
        }

        let period = Duration::try_seconds(voting_period_secs)
            .ok_or(GovernanceError::ArithmeticOverflow)?;
        let end_time = now
            .checked_add_signed(period)
            .ok_or(GovernanceError::ArithmeticOverflow)?;

        let dao_record = self
            .daos
            .get_mut(dao)
            .ok_or(GovernanceError::DaoNotFound(*dao))?;
        let proposal_id = dao_record.proposal_count;
        let next_count = proposal_id
            .checked_add(1)
            .ok_or(GovernanceError::ArithmeticOverflow)?;

        let (address, bump) = Proposal::address(dao, proposal_id);
        let proposal = Proposal {
            dao: *dao,
            proposal_id,
            proposer,
            title: title.to_string(),
            description: description.to_string(),
            created_at: now,
            end_time,
            yes_votes: 0,
            no_votes: 0,
            total_votes_cast: 0,
            state: ProposalState::Active,
            bump,
        };

        // The index is fresh by construction, so this create cannot race
        // with anything; the counter bump below completes the atomic pair.
        self.proposals
            .create(address, proposal)
            .map_err(|_| GovernanceError::AccountCollision(address))?;
        dao_record.proposal_count = next_count;

        info!(dao = %dao, proposal = %address, proposal_id, %proposer, "proposal created");
        Ok(address)
    }

    /// Finalizes a proposal whose voting period has elapsed. Anyone may
    /// crank this.
    pub fn tally_proposal(
        &mut self,
        proposal: &Address,
        now: DateTime<Utc>,
    ) -> Result<ProposalState, GovernanceError> {
        let dao_address = self
            .proposals
            .get(proposal)
            .ok_or(GovernanceError::ProposalNotFound(*proposal))?
            .dao;
        let quorum = self
            .daos
            .get(&dao_address)
            .ok_or(GovernanceError::DaoNotFound(dao_address))?
            .quorum_threshold;

        let record = self
            .proposals
            .get_mut(proposal)
            .ok_or(GovernanceError::ProposalNotFound(*proposal))?;
        record.tally(now, quorum)?;

        info!(
            proposal = %proposal,
            state = %record.state,
            yes = record.yes_votes,
            no = record.no_votes,
            total = record.total_votes_cast,
            quorum,
            "proposal tallied"
        );
        Ok(record.state)
    }

    /// Marks a passed proposal executed. Authority only.
    pub fn execute_proposal(
        &mut self,
        caller: MemberId,
        proposal: &Address,
    ) -> Result<(), GovernanceError> {
        let dao_address = self
            .proposals
            .get(proposal)
            .ok_or(GovernanceError::ProposalNotFound(*proposal))?
            .dao;
        self.require_authority(caller, &dao_address)?;

        let record = self
            .proposals
            .get_mut(proposal)
            .ok_or(GovernanceError::ProposalNotFound(*proposal))?;
        record.execute()?;

        info!(proposal = %proposal, proposal_id = record.proposal_id, "proposal executed");
        Ok(())
    }

    /// Cancels an active proposal. Authority only.
    pub fn cancel_proposal(
        &mut self,
        caller: MemberId,
        proposal: &Address,
    ) -> Result<(), GovernanceError> {
        let dao_address = self
            .proposals
            .get(proposal)
            .ok_or(GovernanceError::ProposalNotFound(*proposal))?
            .dao;
        self.require_authority(caller, &dao_address)?;

        let record = self
            .proposals
            .get_mut(proposal)
            .ok_or(GovernanceError::ProposalNotFound(*proposal))?;
        record.cancel()?;

        info!(proposal = %proposal, proposal_id = record.proposal_id, "proposal cancelled");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Vote ledger
    // -----------------------------------------------------------------------

    /// Casts a vote of `weight` on a proposal, burning `weight²` units
    /// of the voter's credential.
    ///
    /// Checks run in a fixed order: voting window (`VotingClosed`),
    /// whitelist (`NotWhitelisted`), existing vote record
    /// (`AlreadyVoted`), weight bounds (`InvalidInput`), then balance
    /// against the quadratic cost (`InsufficientFunds`). The burn, the
    /// counter update, and the vote record creation then commit as a
    /// unit.
    pub fn vote(
        &mut self,
        voter: MemberId,
        proposal: &Address,
        weight: u64,
        support: bool,
        now: DateTime<Utc>,
    ) -> Result<(), GovernanceError> {
        let record = self
            .proposals
            .get(proposal)
            .ok_or(GovernanceError::ProposalNotFound(*proposal))?;
        if !record.voting_open(now) {
            return Err(GovernanceError::VotingClosed);
        }
        let dao_address = record.dao;

        let (gate_address, _) = WhitelistRecord::address(&dao_address, &voter);
        if !self.whitelist.contains(&gate_address) {
            return Err(GovernanceError::NotWhitelisted { member: voter });
        }

        let (vote_address, vote_bump) = VoteRecord::address(proposal, &voter);
        if self.votes.contains(&vote_address) {
            return Err(GovernanceError::AlreadyVoted { voter });
        }

        if weight < 1 || weight > MAX_VOTE_WEIGHT {
            return Err(GovernanceError::InvalidInput {
                reason: format!("vote weight must be between 1 and {MAX_VOTE_WEIGHT}"),
            });
        }
        let cost = quadratic_cost(weight)?;

        let (mint_address, _) = credential_mint_address(&dao_address);
        let vault = self
            .vaults
            .get_mut(&mint_address)
            .ok_or(GovernanceError::DaoNotFound(dao_address))?;
        let balance = vault.balance_of(&voter);
        if balance < cost {
            return Err(GovernanceError::InsufficientFunds {
                required: cost,
                available: balance,
            });
        }

        // Dry-run the counter update on a copy so the burn below can
        // never be followed by a failure.
        let mut updated = record.clone();
        updated.record_vote(weight, support)?;

        // Commit phase — every step here was pre-checked.
        vault
            .burn_from(&voter, cost)
            .map_err(|_| GovernanceError::InsufficientFunds {
                required: cost,
                available: balance,
            })?;
        *self
            .proposals
            .get_mut(proposal)
            .ok_or(GovernanceError::ProposalNotFound(*proposal))? = updated;
        self.votes
            .create(
                vote_address,
                VoteRecord {
                    voter,
                    proposal: *proposal,
                    weight,
                    credits_spent: cost,
                    support,
                    cast_at: now,
                    bump: vote_bump,
                },
            )
            .map_err(|_| GovernanceError::AlreadyVoted { voter })?;

        info!(
            proposal = %proposal,
            %voter,
            weight,
            support,
            cost,
            "vote recorded"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// The organization record at `dao`, if any.
    pub fn dao(&self, dao: &Address) -> Option<&DaoRecord> {
        self.daos.get(dao)
    }

    /// The proposal record at `proposal`, if any.
    pub fn proposal(&self, proposal: &Address) -> Option<&Proposal> {
        self.proposals.get(proposal)
    }

    /// The vote record for a (proposal, voter) pair, if any.
    pub fn vote_record(&self, proposal: &Address, voter: &MemberId) -> Option<&VoteRecord> {
        let (address, _) = VoteRecord::address(proposal, voter);
        self.votes.get(&address)
    }

    /// The issuance record for `member`, if any. Clients read this to
    /// show cooldown state before submitting.
    pub fn issuance_record(&self, member: &MemberId) -> Option<&IssuanceRecord> {
        let (address, _) = IssuanceRecord::address(member);
        self.issuances.get(&address)
    }

    /// Whether `member` is whitelisted in the organization.
    pub fn whitelist_contains(&self, dao: &Address, member: &MemberId) -> bool {
        let (address, _) = WhitelistRecord::address(dao, member);
        self.whitelist.contains(&address)
    }

    /// A member's credential balance in smallest units. Zero if the
    /// organization does not exist or the member holds nothing.
    pub fn credential_balance(&self, dao: &Address, member: &MemberId) -> u64 {
        self.credential_vault(dao)
            .map(|vault| vault.balance_of(member))
            .unwrap_or(0)
    }

    /// The organization's credential vault, if the organization exists.
    pub fn credential_vault(&self, dao: &Address) -> Option<&CredentialVault> {
        let (mint_address, _) = credential_mint_address(dao);
        self.vaults.get(&mint_address)
    }

    /// Mutable access to the organization's credential vault.
    ///
    /// This is the deployer-side faucet surface: genesis tooling and
    /// tests use it to seed balances directly, the same way a deployment
    /// script mints against the asset with the registry's authority. It
    /// is not reachable through any governance operation.
    pub fn credential_vault_mut(&mut self, dao: &Address) -> Option<&mut CredentialVault> {
        let (mint_address, _) = credential_mint_address(dao);
        self.vaults.get_mut(&mint_address)
    }

    /// A Merkle root summarizing the entire engine state, deterministic
    /// for a given set of records.
    pub fn state_root(&self) -> [u8; 32] {
        quadra_protocol::crypto::merkle_root(&[
            self.daos.state_root(),
            self.issuances.state_root(),
            self.whitelist.state_root(),
            self.proposals.state_root(),
            self.votes.state_root(),
            self.vaults.state_root(),
        ])
    }

    // -----------------------------------------------------------------------
    // Internal predicates
    // -----------------------------------------------------------------------

    /// The "is organization authority" capability predicate: a plain
    /// identity equality check against the organization record.
    fn require_authority(&self, caller: MemberId, dao: &Address) -> Result<(), GovernanceError> {
        let record = self.daos.get(dao).ok_or(GovernanceError::DaoNotFound(*dao))?;
        if record.authority != caller {
            return Err(GovernanceError::Unauthorized { caller });
        }
        Ok(())
    }
}

/// The quadratic cost rule: weight `w` costs `w²` smallest units.
/// Widened through u128 so the square itself cannot wrap before the
/// range check.
fn quadratic_cost(weight: u64) -> Result<u64, GovernanceError> {
    let wide = (weight as u128) * (weight as u128);
    u64::try_from(wide).map_err(|_| GovernanceError::ArithmeticOverflow)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
