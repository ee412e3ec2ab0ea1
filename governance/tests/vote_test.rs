//! Integration tests for the vote ledger: the whitelist gate, the
//! double-vote guard, quadratic cost accounting, and the
//! all-or-nothing behavior of a failed vote.

use chrono::{DateTime, Duration, Utc};
use quadra_governance::{GovernanceEngine, GovernanceError};
use quadra_protocol::{Address, MemberId, MemberKeypair};

fn member() -> MemberId {
    MemberKeypair::generate().member_id()
}

/// Helper: organization with one whitelisted voter holding `balance`
/// units and an open proposal with a one-hour voting period.
fn org_with_open_proposal(
    balance: u64,
) -> (GovernanceEngine, Address, Address, MemberId, MemberId, DateTime<Utc>) {
    let mut engine = GovernanceEngine::new();
    let authority = member();
    let voter = member();
    let now = Utc::now();

    let dao = engine.initialize(authority, "vote-org", 1, now).unwrap();
    engine.add_to_whitelist(authority, &dao, voter).unwrap();
    engine
        .credential_vault_mut(&dao)
        .unwrap()
        .mint_to(&voter, balance)
        .unwrap();

    let proposal = engine
        .create_proposal(voter, &dao, "Ledger test", "Vote mechanics", 3600, now)
        .unwrap();

    (engine, dao, proposal, authority, voter, now)
}

// ---------------------------------------------------------------------------
// Access gate
// ---------------------------------------------------------------------------

#[test]
fn non_whitelisted_vote_changes_nothing() {
    let (mut engine, dao, proposal, _, _, now) = org_with_open_proposal(1000);
    let outsider = member();
    engine
        .credential_vault_mut(&dao)
        .unwrap()
        .mint_to(&outsider, 500)
        .unwrap();

    let supply_before = engine.credential_vault(&dao).unwrap().asset().total_supply;
    let result = engine.vote(outsider, &proposal, 5, true, now);
    assert!(matches!(result, Err(GovernanceError::NotWhitelisted { .. })));

    // No vote record, no burn, no counter movement.
    assert!(engine.vote_record(&proposal, &outsider).is_none());
    assert_eq!(engine.credential_balance(&dao, &outsider), 500);
    assert_eq!(
        engine.credential_vault(&dao).unwrap().asset().total_supply,
        supply_before
    );
    let record = engine.proposal(&proposal).unwrap();
    assert_eq!(record.yes_votes, 0);
    assert_eq!(record.no_votes, 0);
    assert_eq!(record.total_votes_cast, 0);
}

#[test]
fn removed_member_can_no_longer_vote() {
    let (mut engine, dao, proposal, authority, voter, now) = org_with_open_proposal(1000);
    engine.remove_from_whitelist(authority, &dao, voter).unwrap();

    let result = engine.vote(voter, &proposal, 2, true, now);
    assert!(matches!(result, Err(GovernanceError::NotWhitelisted { .. })));
}

// ---------------------------------------------------------------------------
// Double-vote guard
// ---------------------------------------------------------------------------

#[test]
fn second_vote_fails_regardless_of_amount_or_side() {
    let (mut engine, dao, proposal, _, voter, now) = org_with_open_proposal(1000);

    engine.vote(voter, &proposal, 10, true, now).unwrap();
    let balance_after_first = engine.credential_balance(&dao, &voter);

    for (weight, support) in [(10u64, true), (1, true), (3, false)] {
        let result = engine.vote(voter, &proposal, weight, support, now);
        assert!(matches!(result, Err(GovernanceError::AlreadyVoted { .. })));
    }

    // The first vote's record and balance are untouched.
    assert_eq!(engine.credential_balance(&dao, &voter), balance_after_first);
    let record = engine.vote_record(&proposal, &voter).unwrap();
    assert_eq!(record.weight, 10);
    assert!(record.support);
}

#[test]
fn same_voter_may_vote_on_distinct_proposals() {
    let (mut engine, dao, first, _, voter, now) = org_with_open_proposal(1000);
    let second = engine
        .create_proposal(voter, &dao, "Second", "Another ballot", 3600, now)
        .unwrap();

    engine.vote(voter, &first, 10, true, now).unwrap();
    engine.vote(voter, &second, 10, false, now).unwrap();

    assert!(engine.vote_record(&first, &voter).is_some());
    assert!(engine.vote_record(&second, &voter).is_some());
    // Both burns applied: 1000 - 100 - 100.
    assert_eq!(engine.credential_balance(&dao, &voter), 800);
}

// ---------------------------------------------------------------------------
// Quadratic cost
// ---------------------------------------------------------------------------

#[test]
fn cost_is_weight_squared_and_burned() {
    let (mut engine, dao, proposal, _, voter, now) = org_with_open_proposal(1000);
    let supply_before = engine.credential_vault(&dao).unwrap().asset().total_supply;

    engine.vote(voter, &proposal, 7, false, now).unwrap();

    let record = engine.vote_record(&proposal, &voter).unwrap();
    assert_eq!(record.credits_spent, 49);
    assert_eq!(engine.credential_balance(&dao, &voter), 951);
    // Burned, not transferred: total supply shrank by the cost.
    assert_eq!(
        engine.credential_vault(&dao).unwrap().asset().total_supply,
        supply_before - 49
    );
    // Counters move in weight units, not credential units.
    assert_eq!(engine.proposal(&proposal).unwrap().no_votes, 7);
}

#[test]
fn insufficient_balance_rejects_without_side_effects() {
    let (mut engine, dao, proposal, _, voter, now) = org_with_open_proposal(35);

    // Weight 6 costs 36 — one unit short.
    let result = engine.vote(voter, &proposal, 6, true, now);
    assert!(matches!(
        result,
        Err(GovernanceError::InsufficientFunds {
            required: 36,
            available: 35,
        })
    ));
    assert!(engine.vote_record(&proposal, &voter).is_none());
    assert_eq!(engine.credential_balance(&dao, &voter), 35);

    // Weight 5 costs 25 and fits.
    engine.vote(voter, &proposal, 5, true, now).unwrap();
    assert_eq!(engine.credential_balance(&dao, &voter), 10);
}

#[test]
fn counters_always_sum_after_each_accepted_vote() {
    let (mut engine, dao, proposal, authority, _, now) = org_with_open_proposal(0);

    let voters: Vec<MemberId> = (0..5).map(|_| member()).collect();
    for (i, voter) in voters.iter().enumerate() {
        engine.add_to_whitelist(authority, &dao, *voter).unwrap();
        engine
            .credential_vault_mut(&dao)
            .unwrap()
            .mint_to(voter, 10_000)
            .unwrap();
        engine
            .vote(*voter, &proposal, (i as u64) + 1, i % 2 == 0, now)
            .unwrap();

        let record = engine.proposal(&proposal).unwrap();
        assert_eq!(record.total_votes_cast, record.yes_votes + record.no_votes);
    }

    let record = engine.proposal(&proposal).unwrap();
    // Weights 1,3,5 yes and 2,4 no.
    assert_eq!(record.yes_votes, 9);
    assert_eq!(record.no_votes, 6);
    assert_eq!(record.total_votes_cast, 15);
}

// ---------------------------------------------------------------------------
// Voting window
// ---------------------------------------------------------------------------

#[test]
fn vote_at_exact_end_time_counts() {
    let (mut engine, _, proposal, _, voter, _) = org_with_open_proposal(1000);
    let end_time = engine.proposal(&proposal).unwrap().end_time;

    engine.vote(voter, &proposal, 2, true, end_time).unwrap();
    assert_eq!(engine.proposal(&proposal).unwrap().yes_votes, 2);
}

#[test]
fn vote_after_end_time_is_closed() {
    let (mut engine, dao, proposal, _, voter, _) = org_with_open_proposal(1000);
    let end_time = engine.proposal(&proposal).unwrap().end_time;

    let result = engine.vote(voter, &proposal, 2, true, end_time + Duration::seconds(1));
    assert!(matches!(result, Err(GovernanceError::VotingClosed)));
    assert_eq!(engine.credential_balance(&dao, &voter), 1000);
}

#[test]
fn vote_record_captures_the_full_receipt() {
    let (mut engine, _, proposal, _, voter, now) = org_with_open_proposal(1000);
    let cast_at = now + Duration::seconds(30);

    engine.vote(voter, &proposal, 9, false, cast_at).unwrap();

    let record = engine.vote_record(&proposal, &voter).unwrap();
    assert_eq!(record.voter, voter);
    assert_eq!(record.proposal, proposal);
    assert_eq!(record.weight, 9);
    assert_eq!(record.credits_spent, 81);
    assert!(!record.support);
    assert_eq!(record.cast_at, cast_at);
}
