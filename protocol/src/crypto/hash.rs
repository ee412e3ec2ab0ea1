//! # Hashing
//!
//! QUADRA standardizes on a single hash function: BLAKE3. It is fast on
//! every platform we care about, parallelizable, and its keyed
//! `derive_key` mode gives us proper domain separation without ad-hoc
//! tag-prepending schemes. Address derivation, asset ids, and state
//! roots all bottom out in the functions below.
//!
//! There is deliberately no second hash function in this crate. Adding
//! one means every verifier forever has to carry it; the bar for that is
//! "a peer network we must interoperate with", and no such requirement
//! exists here.

/// Compute the BLAKE3 hash of the input data.
///
/// Returns the 32-byte digest as a fixed-size array. This is the
/// workhorse for single-buffer inputs.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Hash multiple byte slices together without concatenating them first.
///
/// The parts are fed into the hasher sequentially, so the result equals
/// hashing the concatenation — minus the temporary buffer. Used for
/// composite leaves like `(address || record bytes)`.
///
/// Note that this does NOT frame the parts: `["ab", "c"]` and
/// `["a", "bc"]` hash identically. Callers that need unambiguous
/// boundaries must frame segments themselves (address derivation does).
pub fn blake3_hash_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Compute a domain-separated hash using BLAKE3's `derive_key` mode.
///
/// Two calls with different `context` strings can never collide, even on
/// identical `data` — the context changes the hasher's internal IV, not
/// just the input stream. Use this whenever the same bytes could be
/// hashed for more than one purpose.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Compute a binary Merkle root over a list of leaf hashes.
///
/// Odd levels duplicate their last node. A single leaf is paired with
/// itself so the root is always the output of a hash operation, never a
/// raw leaf. The empty input returns the all-zero sentinel.
///
/// Duplicate leaves would make distinct trees indistinguishable, so
/// callers must enforce leaf uniqueness — the account store does, since
/// every leaf embeds a distinct address.
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<[u8; 32]> = leaves.to_vec();

    if level.len() == 1 {
        return blake3_hash_multi(&[level[0].as_slice(), level[0].as_slice()]);
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for pair in level.chunks(2) {
            let left = &pair[0];
            let right = if pair.len() == 2 { &pair[1] } else { &pair[0] };
            next.push(blake3_hash_multi(&[left.as_slice(), right.as_slice()]));
        }
        level = next;
    }

    level[0]
}
