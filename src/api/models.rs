use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::blockchain::{ConsensusPolicy, DEFAULT_DIFFICULTY, Ledger};
use crate::network::{PeerBook, PeerClient, SyncReport, sync_with_peers};

/// Shared application state: the node's ledger, its known peers and the
/// client used to reach them.
pub struct AppState {
    pub ledger: Ledger,
    pub peers: Mutex<PeerBook>,
    pub policy: ConsensusPolicy,
    pub client: PeerClient,
}

impl AppState {
    pub fn new(ledger: Ledger, policy: ConsensusPolicy, client: PeerClient) -> Self {
        Self {
            ledger,
            peers: Mutex::new(PeerBook::new()),
            policy,
            client,
        }
    }

    pub fn peers(&self) -> MutexGuard<'_, PeerBook> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one reconciliation pass against every known peer. The peer list
    /// is copied first so no lock is held across the network calls.
    pub async fn sync_with_peers(&self) -> Vec<SyncReport> {
        let peers = self.peers().list().to_vec();
        sync_with_peers(&self.client, &self.ledger, &peers, self.policy).await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Ledger::with_difficulty(DEFAULT_DIFFICULTY),
            ConsensusPolicy::default(),
            PeerClient::default(),
        )
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Deserialize)]
pub struct MineRequest {
    pub payload: String,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: usize,
}

/* ---------- Peer API Models ---------- */

/// Body of `POST /register`; also sent by [`PeerClient::register_with`].
#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub address: String,
}
