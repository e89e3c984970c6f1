/// Known peer base URLs (e.g. `http://localhost:8081`), kept in
/// registration order with no duplicates.
#[derive(Debug, Default, Clone)]
pub struct PeerBook {
    peers: Vec<String>,
}

impl PeerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `address` unless it is already known. Returns whether it was added.
    pub fn add(&mut self, address: &str) -> bool {
        let address = normalize(address);
        if address.is_empty() || self.contains(&address) {
            return false;
        }
        self.peers.push(address);
        true
    }

    pub fn contains(&self, address: &str) -> bool {
        let address = normalize(address);
        self.peers.iter().any(|p| *p == address)
    }

    pub fn list(&self) -> &[String] {
        &self.peers
    }
}

fn normalize(address: &str) -> String {
    address.trim().trim_end_matches('/').to_string()
}
