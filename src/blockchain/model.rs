use thiserror::Error;

use super::Block;
use super::pow::meets_difficulty;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("previous digest {found:?} does not match tail digest {expected:?}")]
    LinkMismatch { expected: String, found: String },
}

/// In-memory block sequence with Proof-of-Work. Not synchronised; see
/// [`Ledger`](super::Ledger) for the shared, lock-guarded handle.
#[derive(Debug, Clone)]
pub struct Blockchain {
    pub chain: Vec<Block>,
    pub difficulty: usize,
}

impl Blockchain {
    /// Initialize a new blockchain holding only the genesis block.
    pub fn new(difficulty: usize) -> Self {
        Self {
            chain: vec![Block::genesis()],
            difficulty,
        }
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.chain.last()
    }

    /// Digest new blocks must link to; empty when the chain is empty.
    pub fn tail_digest(&self) -> String {
        self.last_block()
            .map(|b| b.digest.clone())
            .unwrap_or_default()
    }

    /// Push a block if it links to the current tail. The block's proof of
    /// work is NOT checked.
    pub fn push_linked(&mut self, block: Block) -> Result<(), LedgerError> {
        if let Some(tail) = self.last_block() {
            if block.previous_digest != tail.digest {
                return Err(LedgerError::LinkMismatch {
                    expected: tail.digest.clone(),
                    found: block.previous_digest,
                });
            }
        }
        self.chain.push(block);
        Ok(())
    }

    /// Validate linkage, digest integrity and difficulty for every block
    /// after genesis.
    pub fn is_valid_chain(&self) -> bool {
        is_valid_sequence(&self.chain, self.difficulty)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Drop the local sequence and install `blocks` in its place.
    pub fn replace(&mut self, blocks: Vec<Block>) {
        self.chain = blocks;
    }
}

/// Check a block sequence: linkage, digest recomputation and the difficulty
/// prefix, in that order. Index 0 is exempt from all checks.
pub fn is_valid_sequence(blocks: &[Block], difficulty: usize) -> bool {
    blocks.windows(2).all(|pair| {
        let (prev, current) = (&pair[0], &pair[1]);
        current.previous_digest == prev.digest
            && current.verify()
            && meets_difficulty(&current.digest, difficulty)
    })
}
