pub mod block;
pub mod consensus;
pub mod ledger;
pub mod model;
pub mod pow;

pub use block::Block;
pub use consensus::{ConsensusPolicy, Decision};
pub use ledger::Ledger;
pub use model::Blockchain;

/// Default Proof-of-Work difficulty (number of leading '0' hex characters).
pub const DEFAULT_DIFFICULTY: usize = 4;

/// A digest has 64 hex characters; no nonce can satisfy more than that.
pub const MAX_DIFFICULTY: usize = 64;

/// Pre-agreed genesis values shared by every node.
pub const GENESIS_PAYLOAD: &str = "Genesis Block";
pub const GENESIS_DIGEST: &str = "0000000000000000";
