//! # Governance Constants
//!
//! Every magic number in the governance program lives here. The seed
//! tags are consensus-critical — change one and every client derives
//! different addresses for the same records.

/// Seed tag for organization records.
pub const DAO_SEED: &[u8] = b"dao";

/// Seed tag for an organization's credential asset.
pub const CREDENTIAL_MINT_SEED: &[u8] = b"credential_mint";

/// Seed tag for per-member issuance records.
pub const ISSUANCE_SEED: &[u8] = b"mint_record";

/// Seed tag for whitelist records.
pub const WHITELIST_SEED: &[u8] = b"whitelist";

/// Seed tag for proposals.
pub const PROPOSAL_SEED: &[u8] = b"proposal";

/// Seed tag for vote records.
pub const VOTE_SEED: &[u8] = b"vote";

/// Maximum organization name length in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Maximum proposal title length in bytes.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum proposal description length in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Units of credential granted per accepted issuance.
pub const ISSUE_AMOUNT: u64 = 100;

/// Issuance is refused once a member's balance reaches this many units.
pub const BALANCE_THRESHOLD: u64 = 50;

/// Hard cap on a member's post-issuance balance.
pub const MAX_BALANCE: u64 = 100;

/// Seconds a member must wait between issuances.
pub const ISSUE_COOLDOWN_SECS: i64 = 86_400;

/// Upper bound on a single vote's weight. Keeps `weight²` far inside
/// the u64 range of the credential's smallest units.
pub const MAX_VOTE_WEIGHT: u64 = 10_000;

/// Display decimals for credential assets. Display-only — all
/// arithmetic in this crate is in smallest units.
pub const CREDENTIAL_DECIMALS: u8 = 9;

/// Ticker symbol for credential assets.
pub const CREDENTIAL_SYMBOL: &str = "QVC";
