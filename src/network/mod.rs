pub mod peers;
pub mod sync;

pub use peers::PeerBook;
pub use sync::{PeerClient, SyncReport, sync_with_peers};
