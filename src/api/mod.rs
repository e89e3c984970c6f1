mod chain;
mod health;
pub mod models;
mod peers;

use actix_web::web::ServiceConfig;

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(health::health_check)
        .service(chain::get_blockchain)
        .service(chain::receive_block)
        .service(chain::mine_block)
        .service(chain::validate_chain)
        .service(peers::get_peers)
        .service(peers::register_peer)
        .service(peers::sync_now);
}
