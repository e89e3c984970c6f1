use log::{debug, info, warn};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::api::models::RegisterRequest;
use crate::blockchain::consensus::KeepReason;
use crate::blockchain::{Block, ConsensusPolicy, Decision, Ledger};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("peer answered with status {0}")]
    Status(u16),
    #[error("undecodable chain: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where candidate chains come from. The HTTP client is the real source;
/// tests plug in canned chains.
pub trait ChainSource {
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<Vec<Block>, SyncError>>;
}

/// HTTP client used to talk to other nodes.
#[derive(Debug, Clone)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Announce `own_address` to `peer` via `POST <peer>/register`.
    pub async fn register_with(&self, peer: &str, own_address: &str) -> Result<(), SyncError> {
        let url = endpoint(peer, "register");
        let resp = self
            .http
            .post(&url)
            .json(&RegisterRequest {
                address: own_address.to_string(),
            })
            .send()
            .await?;
        if resp.status() != reqwest::StatusCode::CREATED {
            return Err(SyncError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}

impl Default for PeerClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl ChainSource for PeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, SyncError> {
        let resp = self.http.get(endpoint(peer, "blockchain")).send().await?;
        if !resp.status().is_success() {
            return Err(SyncError::Status(resp.status().as_u16()));
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn endpoint(peer: &str, path: &str) -> String {
    format!("{}/{}", peer.trim_end_matches('/'), path)
}

/// What happened when reconciling against one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Adopted { previous_len: usize, new_len: usize },
    Kept { reason: KeepReason },
    Failed { error: String },
}

impl From<Decision> for SyncOutcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Adopted {
                previous_len,
                new_len,
            } => SyncOutcome::Adopted {
                previous_len,
                new_len,
            },
            Decision::Kept { reason } => SyncOutcome::Kept { reason },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub peer: String,
    pub outcome: SyncOutcome,
}

/// One reconciliation pass over `peers`, in order.
///
/// Each fetch happens without the ledger lock; only the compare-and-swap in
/// [`Ledger::reconcile`] takes it. A peer that cannot be reached or decoded
/// is logged and skipped. Adoptions from earlier peers raise the bar for
/// later ones in the same pass.
pub async fn sync_with_peers<S: ChainSource>(
    source: &S,
    ledger: &Ledger,
    peers: &[String],
    policy: ConsensusPolicy,
) -> Vec<SyncReport> {
    let mut reports = Vec::with_capacity(peers.len());
    let mut adoptions = 0;
    for peer in peers {
        let outcome = match source.fetch_chain(peer).await {
            Ok(candidate) => {
                let decision = ledger.reconcile(candidate, policy);
                if decision.adopted() {
                    adoptions += 1;
                    info!("synchronized with peer {peer}: {decision:?}");
                } else {
                    debug!("kept local chain against peer {peer}: {decision:?}");
                }
                SyncOutcome::from(decision)
            }
            Err(e) => {
                warn!("failed to fetch blockchain from peer {peer}: {e}");
                SyncOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        reports.push(SyncReport {
            peer: peer.clone(),
            outcome,
        });
    }
    debug!(
        "sync pass over {} peers done, {adoptions} adoption(s)",
        peers.len()
    );
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StubSource {
        chains: HashMap<String, Vec<Block>>,
    }

    impl ChainSource for StubSource {
        async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, SyncError> {
            match self.chains.get(peer) {
                Some(chain) => Ok(chain.clone()),
                None => Err(SyncError::Status(503)),
            }
        }
    }

    fn chain_of(len: usize) -> Vec<Block> {
        let ledger = Ledger::with_difficulty(1);
        for i in 1..len {
            ledger.append(&format!("remote-{i}"));
        }
        ledger.snapshot()
    }

    #[actix_web::test]
    async fn unreachable_peer_is_skipped() {
        let ledger = Ledger::with_difficulty(1);
        ledger.append("local");

        let longer = chain_of(4);
        let source = StubSource {
            chains: HashMap::from([("http://b".to_string(), longer.clone())]),
        };
        let peers = vec!["http://a".to_string(), "http://b".to_string()];

        let reports = sync_with_peers(&source, &ledger, &peers, ConsensusPolicy::LongestChain).await;

        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0].outcome, SyncOutcome::Failed { .. }));
        assert_eq!(
            reports[1].outcome,
            SyncOutcome::Adopted {
                previous_len: 2,
                new_len: 4
            }
        );
        assert_eq!(ledger.snapshot(), longer);
    }

    #[actix_web::test]
    async fn later_peer_must_beat_earlier_adoption() {
        let ledger = Ledger::with_difficulty(1);
        let source = StubSource {
            chains: HashMap::from([
                ("http://a".to_string(), chain_of(5)),
                ("http://b".to_string(), chain_of(3)),
            ]),
        };
        let peers = vec!["http://a".to_string(), "http://b".to_string()];

        let reports = sync_with_peers(&source, &ledger, &peers, ConsensusPolicy::LongestChain).await;

        assert!(matches!(reports[0].outcome, SyncOutcome::Adopted { .. }));
        assert_eq!(
            reports[1].outcome,
            SyncOutcome::Kept {
                reason: KeepReason::NotLonger
            }
        );
        assert_eq!(ledger.len(), 5);
    }

    #[test]
    fn report_json_shape() {
        let adopted = SyncReport {
            peer: "http://a".into(),
            outcome: SyncOutcome::Adopted {
                previous_len: 1,
                new_len: 3,
            },
        };
        assert_eq!(
            serde_json::to_value(&adopted).unwrap(),
            serde_json::json!({
                "peer": "http://a",
                "outcome": { "status": "adopted", "previous_len": 1, "new_len": 3 }
            })
        );

        let kept = SyncReport {
            peer: "http://b".into(),
            outcome: SyncOutcome::Kept {
                reason: KeepReason::Invalid,
            },
        };
        assert_eq!(
            serde_json::to_value(&kept).unwrap(),
            serde_json::json!({
                "peer": "http://b",
                "outcome": { "status": "kept", "reason": "invalid" }
            })
        );

        let failed = SyncReport {
            peer: "http://c".into(),
            outcome: SyncOutcome::Failed {
                error: "peer answered with status 503".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({
                "peer": "http://c",
                "outcome": { "status": "failed", "error": "peer answered with status 503" }
            })
        );
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(endpoint("http://x:1/", "blockchain"), "http://x:1/blockchain");
        assert_eq!(endpoint("http://x:1", "register"), "http://x:1/register");
    }
}
