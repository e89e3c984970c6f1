use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::pow::{calculate_hash, proof_of_work};
use super::{GENESIS_DIGEST, GENESIS_PAYLOAD};

/// A single ledger entry: opaque payload, link to its predecessor and the
/// proof-of-work solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub created_at: i64, // Unix timestamp (UTC)
    pub payload: String,
    pub previous_digest: String,
    pub digest: String,
    pub nonce: u64,
}

impl Block {
    /// The pre-agreed first block. Its digest is a sentinel, not a PoW result.
    pub fn genesis() -> Self {
        Self {
            created_at: 0,
            payload: GENESIS_PAYLOAD.to_string(),
            previous_digest: String::new(),
            digest: GENESIS_DIGEST.to_string(),
            nonce: 0,
        }
    }

    /// Create a new block stamped with the current time (not mined yet).
    /// Call `mine()` to perform PoW.
    pub fn new(payload: impl Into<String>, previous_digest: impl Into<String>) -> Self {
        Self::new_with_timestamp(payload, previous_digest, Utc::now().timestamp())
    }

    pub fn new_with_timestamp(
        payload: impl Into<String>,
        previous_digest: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            created_at,
            payload: payload.into(),
            previous_digest: previous_digest.into(),
            digest: String::new(),
            nonce: 0,
        }
    }

    /// Hash pre-image without the nonce: payload, previous digest and the
    /// decimal timestamp, concatenated with no separators.
    pub fn canonical(&self) -> String {
        format!("{}{}{}", self.payload, self.previous_digest, self.created_at)
    }

    /// Recompute the digest from the current fields and nonce.
    pub fn compute_digest(&self) -> String {
        calculate_hash(&self.canonical(), self.nonce)
    }

    /// Search nonces from 0 until the digest starts with `difficulty` zeros.
    pub fn mine(&mut self, difficulty: usize) {
        let (digest, nonce) = proof_of_work(&self.canonical(), difficulty);
        self.digest = digest;
        self.nonce = nonce;
    }

    /// Whether the stored digest matches the block's contents.
    /// The difficulty prefix is not checked here; chain validation does that.
    pub fn verify(&self) -> bool {
        self.digest == self.compute_digest()
    }
}

/// Consume an unsolved block and return it solved at `difficulty`.
pub fn mine(mut block: Block, difficulty: usize) -> Block {
    block.mine(difficulty);
    block
}
