use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::block::mine;
use super::consensus::{ConsensusPolicy, Decision, reconcile};
use super::model::LedgerError;
use super::{Block, Blockchain, DEFAULT_DIFFICULTY, MAX_DIFFICULTY};

/// Shared handle to a node's chain. Every read and mutation of the block
/// sequence goes through the one mutex held here.
#[derive(Debug)]
pub struct Ledger {
    inner: Mutex<Blockchain>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A ledger holding only the genesis block; new blocks are mined at the
    /// system difficulty.
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    /// Difficulty is capped at [`MAX_DIFFICULTY`] so mining always terminates.
    pub fn with_difficulty(difficulty: usize) -> Self {
        if difficulty > MAX_DIFFICULTY {
            warn!("difficulty {difficulty} exceeds digest length; capping at {MAX_DIFFICULTY}");
        }
        Self {
            inner: Mutex::new(Blockchain::new(difficulty.min(MAX_DIFFICULTY))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Blockchain> {
        // A panic mid-operation cannot leave the Vec half-written, so the
        // data behind a poisoned lock is still consistent.
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("ledger mutex was poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Mine a block carrying `payload` on top of the current tail and append it.
    ///
    /// The nonce search runs without the lock; the lock is only taken to read
    /// the tail and to install the finished block. If another block landed in
    /// between, the block is rebuilt on the new tail and mined again, so each
    /// call grows the chain by exactly one.
    pub fn append(&self, payload: &str) -> Block {
        loop {
            let (previous_digest, difficulty) = {
                let bc = self.lock();
                (bc.tail_digest(), bc.difficulty())
            };

            let block = mine(Block::new(payload, previous_digest), difficulty);

            let mut bc = self.lock();
            match bc.push_linked(block.clone()) {
                Ok(()) => {
                    info!(
                        "sealed block #{} (digest={}, nonce={})",
                        bc.len() - 1,
                        block.digest,
                        block.nonce
                    );
                    return block;
                }
                Err(e) => debug!("tail moved while mining, retrying: {e}"),
            }
        }
    }

    /// Append a block received from outside verbatim, provided it links to
    /// the tail. Proof of work is not re-checked.
    pub fn submit(&self, block: Block) -> Result<(), LedgerError> {
        self.lock().push_linked(block)
    }

    pub fn is_valid(&self) -> bool {
        self.lock().is_valid_chain()
    }

    /// Apply `policy` to a peer's chain under the ledger lock.
    pub fn reconcile(&self, candidate: Vec<Block>, policy: ConsensusPolicy) -> Decision {
        let mut bc = self.lock();
        reconcile(&mut bc, candidate, policy)
    }

    /// Copy of the full block sequence.
    pub fn snapshot(&self) -> Vec<Block> {
        self.lock().chain.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn difficulty(&self) -> usize {
        self.lock().difficulty()
    }

    #[cfg(test)]
    pub(crate) fn tail_digest(&self) -> String {
        self.lock().tail_digest()
    }

    #[cfg(test)]
    fn with_chain_mut<R>(&self, f: impl FnOnce(&mut Blockchain) -> R) -> R {
        f(&mut self.lock())
    }
}
