use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::model::is_valid_sequence;
use super::{Block, Blockchain};

/// Rule deciding whether a peer's chain replaces the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsensusPolicy {
    /// Adopt any strictly longer candidate. The candidate is never validated,
    /// so length alone governs adoption and a forged chain wins if it is longer.
    #[default]
    LongestChain,
    /// Adopt a strictly longer candidate only if it shares our genesis block
    /// and passes full chain validation.
    LongestValidChain,
}

impl FromStr for ConsensusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "longest" | "longest-chain" => Ok(Self::LongestChain),
            "longest-valid" | "longest-valid-chain" => Ok(Self::LongestValidChain),
            other => Err(format!("unknown consensus policy: {other}")),
        }
    }
}

impl fmt::Display for ConsensusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LongestChain => f.write_str("longest"),
            Self::LongestValidChain => f.write_str("longest-valid"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepReason {
    NotLonger,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Adopted { previous_len: usize, new_len: usize },
    Kept { reason: KeepReason },
}

impl Decision {
    pub fn adopted(&self) -> bool {
        matches!(self, Decision::Adopted { .. })
    }
}

/// Compare `local` against a peer's `candidate` and swap it in wholesale if
/// `policy` allows. Callers hold the ledger lock for the whole call.
pub fn reconcile(local: &mut Blockchain, candidate: Vec<Block>, policy: ConsensusPolicy) -> Decision {
    if candidate.len() <= local.len() {
        return Decision::Kept {
            reason: KeepReason::NotLonger,
        };
    }

    if policy == ConsensusPolicy::LongestValidChain {
        let same_genesis = match (local.chain.first(), candidate.first()) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => true,
        };
        if !same_genesis || !is_valid_sequence(&candidate, local.difficulty()) {
            return Decision::Kept {
                reason: KeepReason::Invalid,
            };
        }
    }

    let previous_len = local.len();
    let new_len = candidate.len();
    local.replace(candidate);
    Decision::Adopted {
        previous_len,
        new_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::block::mine;

    fn local_of_len(n: usize) -> Blockchain {
        let mut bc = Blockchain::new(2);
        for i in 1..n {
            let b = mine(
                Block::new_with_timestamp(format!("local-{i}"), bc.tail_digest(), i as i64),
                2,
            );
            bc.push_linked(b).unwrap();
        }
        bc
    }

    fn garbage(n: usize) -> Vec<Block> {
        (0..n)
            .map(|i| Block {
                created_at: i as i64,
                payload: format!("forged-{i}"),
                previous_digest: "nonsense".into(),
                digest: "also-nonsense".into(),
                nonce: 0,
            })
            .collect()
    }

    #[test]
    fn longer_candidate_is_adopted_without_validation() {
        let mut local = local_of_len(3);
        let candidate = garbage(5);
        let decision = reconcile(&mut local, candidate.clone(), ConsensusPolicy::LongestChain);
        assert_eq!(
            decision,
            Decision::Adopted {
                previous_len: 3,
                new_len: 5
            }
        );
        assert_eq!(local.chain, candidate);
        assert!(!local.is_valid_chain());
    }

    #[test]
    fn shorter_or_equal_candidate_is_kept() {
        let mut local = local_of_len(3);
        let before = local.chain.clone();
        for n in [2, 3] {
            let decision = reconcile(&mut local, garbage(n), ConsensusPolicy::LongestChain);
            assert_eq!(
                decision,
                Decision::Kept {
                    reason: KeepReason::NotLonger
                }
            );
        }
        assert_eq!(local.chain, before);
    }

    #[test]
    fn validating_policy_rejects_forged_chain() {
        let mut local = local_of_len(3);
        let before = local.chain.clone();
        let decision = reconcile(&mut local, garbage(5), ConsensusPolicy::LongestValidChain);
        assert_eq!(
            decision,
            Decision::Kept {
                reason: KeepReason::Invalid
            }
        );
        assert_eq!(local.chain, before);
    }

    #[test]
    fn validating_policy_adopts_valid_longer_chain() {
        let mut local = local_of_len(2);
        let remote = local_of_len(4);
        let decision = reconcile(
            &mut local,
            remote.chain.clone(),
            ConsensusPolicy::LongestValidChain,
        );
        assert!(decision.adopted());
        assert_eq!(local.chain, remote.chain);
        assert!(local.is_valid_chain());
    }

    #[test]
    fn validating_policy_rejects_foreign_genesis() {
        let mut local = local_of_len(3);
        let before = local.chain.clone();

        let mut other_genesis = Block::genesis();
        other_genesis.payload = "Other Genesis".into();
        let mut remote = Blockchain::new(2);
        remote.replace(vec![other_genesis]);
        for i in 1..5 {
            let b = mine(
                Block::new_with_timestamp(format!("remote-{i}"), remote.tail_digest(), i),
                2,
            );
            remote.push_linked(b).unwrap();
        }
        assert!(remote.is_valid_chain());

        let decision = reconcile(&mut local, remote.chain, ConsensusPolicy::LongestValidChain);
        assert_eq!(
            decision,
            Decision::Kept {
                reason: KeepReason::Invalid
            }
        );
        assert_eq!(local.chain, before);
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            "longest".parse::<ConsensusPolicy>().unwrap(),
            ConsensusPolicy::LongestChain
        );
        assert_eq!(
            " Longest-Valid ".parse::<ConsensusPolicy>().unwrap(),
            ConsensusPolicy::LongestValidChain
        );
        assert!("heaviest".parse::<ConsensusPolicy>().is_err());
        assert_eq!(ConsensusPolicy::default().to_string(), "longest");
    }
}
