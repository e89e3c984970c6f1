use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, RegisterRequest};

/// List registered peers.
#[get("/peers")]
pub async fn get_peers(state: web::Data<AppState>) -> impl Responder {
    let peers = state.peers().list().to_vec();
    HttpResponse::Ok().json(peers)
}

/// Register a new peer node by its base URL.
#[post("/register")]
pub async fn register_peer(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let req = match serde_json::from_slice::<RegisterRequest>(&body) {
        Ok(r) if !r.address.trim().is_empty() => r,
        _ => {
            warn!(
                "invalid registration payload: {}",
                String::from_utf8_lossy(&body)
            );
            return HttpResponse::BadRequest().body("Invalid payload");
        }
    };

    if !state.peers().add(&req.address) {
        info!("peer {} is already registered", req.address);
        return HttpResponse::Conflict().body("Peer already registered");
    }

    info!("peer {} registered", req.address);
    HttpResponse::Created().body(format!("Peer registered: {}", req.address))
}

/// Reconcile against every known peer now and report per-peer outcomes.
#[post("/sync")]
pub async fn sync_now(state: web::Data<AppState>) -> impl Responder {
    let reports = state.sync_with_peers().await;
    HttpResponse::Ok().json(reports)
}
