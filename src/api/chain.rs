use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, error, info, warn};

use super::models::{AppState, MineRequest, ValidateResponse};
use crate::blockchain::Block;

/// Get the full blockchain as a JSON array of blocks.
#[get("/blockchain")]
pub async fn get_blockchain(state: web::Data<AppState>) -> impl Responder {
    let blocks = state.ledger.snapshot();
    debug!("serving blockchain of {} blocks", blocks.len());
    HttpResponse::Ok().json(blocks)
}

/// Receive a block from a peer and append it if it links to our tail.
/// The block is taken verbatim: no re-mining and no PoW check.
#[post("/block")]
pub async fn receive_block(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let block: Block = match serde_json::from_slice(&body) {
        Ok(b) => b,
        Err(e) => {
            warn!("error decoding block: {e}");
            return HttpResponse::BadRequest().body("Invalid block data");
        }
    };

    match state.ledger.submit(block) {
        Ok(()) => {
            info!("block added via /block (length={})", state.ledger.len());
            HttpResponse::Created().body("Block added successfully")
        }
        Err(e) => {
            warn!("rejected block: {e}");
            HttpResponse::BadRequest().body("Block is invalid")
        }
    }
}

/// Mine a new block carrying `payload` and append it.
/// The nonce search runs on the blocking pool so workers stay responsive.
#[post("/mine")]
pub async fn mine_block(state: web::Data<AppState>, req: web::Json<MineRequest>) -> impl Responder {
    let payload = req.into_inner().payload;
    if payload.is_empty() {
        return HttpResponse::BadRequest().body("payload required");
    }

    let state = state.into_inner();
    match web::block(move || state.ledger.append(&payload)).await {
        Ok(block) => HttpResponse::Created().json(block),
        Err(e) => {
            error!("mining worker failed: {e}");
            HttpResponse::InternalServerError().body("mining failed")
        }
    }
}

/// Validate the whole chain.
#[get("/validate")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(ValidateResponse {
        valid: state.ledger.is_valid(),
        length: state.ledger.len(),
        difficulty: state.ledger.difficulty(),
    })
}
