mod api;
mod blockchain;
mod config;
mod network;

use actix_web::{App, HttpServer, middleware::Logger, rt, web};
use dotenvy::dotenv;
use log::{info, warn};
use std::io;

use api::AppState;
use blockchain::Ledger;
use config::NodeConfig;
use network::PeerClient;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let cfg = NodeConfig::from_env();
    info!(
        "⛓️ starting node at http://{}:{} (difficulty={}, policy={})",
        cfg.host, cfg.port, cfg.difficulty, cfg.policy
    );

    let client = PeerClient::new(cfg.peer_timeout).map_err(io::Error::other)?;
    let state = web::Data::new(AppState::new(
        Ledger::with_difficulty(cfg.difficulty),
        cfg.policy,
        client,
    ));

    let server = HttpServer::new({
        let state = state.clone();
        move || {
            App::new()
                .wrap(Logger::default())
                .app_data(state.clone())
                .configure(api::init_routes)
        }
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run();

    if let Some(peer) = cfg.peer.clone() {
        let state = state.clone();
        let own_address = cfg.public_address.clone();
        rt::spawn(async move {
            info!("registering with peer {peer} as {own_address}");
            match state.client.register_with(&peer, &own_address).await {
                Ok(()) => {
                    state.peers().add(&peer);
                    info!("registration with peer {peer} successful");
                }
                Err(e) => warn!("failed to register with peer {peer}: {e}"),
            }
        });
    }

    if let Some(every) = cfg.sync_interval {
        let state = state.clone();
        rt::spawn(async move {
            let mut ticker = rt::time::interval(every);
            loop {
                ticker.tick().await;
                state.sync_with_peers().await;
            }
        });
    }

    server.await
}
