use std::time::Instant;

use actix_web::{HttpResponse, Result, delete, get, post, web};
use log::{info, warn};

use super::errors::ErrorBody;
use super::models::{
    AlgorithmInfo, AppState, AppendRequest, ChainResponse, CreateChainRequest, DifficultyResponse,
    MessageResponse, MineResponse, SessionResponse, SetDifficultyRequest, TamperDemoRequest,
    TamperRequest, TamperResponse, ValidateResponse,
};
use crate::blockchain::{Blockchain, HashAlgorithm, tamper};
use crate::error::ChainError;
use crate::registry::SharedChain;

/// Run `f` against a chain on the blocking pool. The chain mutex is held for
/// the whole of an append, so it is never locked on a worker thread.
pub(super) async fn with_chain<T, F>(chain: SharedChain, f: F) -> Result<T>
where
    F: FnOnce(&mut Blockchain) -> Result<T, ChainError> + Send + 'static,
    T: Send + 'static,
{
    let out = web::block(move || {
        let mut bc = chain.lock().expect("mutex poisoned");
        f(&mut bc)
    })
    .await??;
    Ok(out)
}

/// List the supported digest algorithms.
#[get("/algorithms/")]
pub async fn list_algorithms() -> HttpResponse {
    let algorithms: Vec<AlgorithmInfo> = HashAlgorithm::ALL
        .iter()
        .map(|&name| AlgorithmInfo {
            name,
            digest_bits: name.digest_bits(),
        })
        .collect();
    HttpResponse::Ok().json(algorithms)
}

/// Create a chain (genesis only) and register it under a new session id.
#[post("/chains/")]
pub async fn create_chain(
    state: web::Data<AppState>,
    req: web::Json<CreateChainRequest>,
) -> Result<HttpResponse> {
    let algorithm: HashAlgorithm = req.algorithm.parse()?;
    let difficulty = state.check_difficulty(req.difficulty)?;

    let chain = Blockchain::new(algorithm, difficulty);
    let info = chain.info();
    let (session_id, _) = state.registry.insert(chain);
    info!(
        "Chain {} created ({}, difficulty {})",
        session_id, algorithm, difficulty
    );

    Ok(HttpResponse::Ok().json(SessionResponse {
        session_id,
        message: format!("Blockchain created with {algorithm} at difficulty {difficulty}"),
        info,
    }))
}

/// Get the full blockchain.
#[get("/chains/{id}/")]
pub async fn get_chain(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path.into_inner();
    let chain = state.registry.get(&id)?;
    let (info, blocks) = with_chain(chain, |bc| Ok((bc.info(), bc.blocks().to_vec()))).await?;
    Ok(HttpResponse::Ok().json(ChainResponse {
        session_id: &id,
        info,
        chain: &blocks,
    }))
}

/// Drop a chain from the registry. Unknown ids are not an error.
#[delete("/chains/{id}/")]
pub async fn reset_chain(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    let removed = state.registry.remove(&id);
    HttpResponse::Ok().json(MessageResponse {
        message: if removed {
            format!("Blockchain {id} reset")
        } else {
            format!("Blockchain {id} was not active")
        },
    })
}

/// Mine a new block carrying the request's data. The PoW search runs on the
/// blocking pool, bounded by the configured mining timeout.
#[post("/chains/{id}/blocks/")]
pub async fn append_block(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AppendRequest>,
) -> Result<HttpResponse> {
    let data = req.into_inner().data;
    if data.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorBody::new("data must not be empty")));
    }

    let chain = state.registry.get(&path)?;
    let control = state.mining_control();

    let resp = with_chain(chain, move |bc| {
        let started = Instant::now();
        let block = bc.append_with(data, &control)?.clone();
        Ok(MineResponse {
            block,
            elapsed_secs: started.elapsed().as_secs_f64(),
            length: bc.len(),
        })
    })
    .await?;

    info!(
        "Chain {} sealed block #{} (nonce={}, {:.3}s)",
        path.as_str(),
        resp.block.index,
        resp.block.nonce,
        resp.elapsed_secs
    );
    Ok(HttpResponse::Ok().json(resp))
}

/// Validate the whole chain.
#[get("/chains/{id}/validate/")]
pub async fn validate_chain(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let chain = state.registry.get(&path)?;
    let resp = with_chain(chain, |bc| {
        Ok(ValidateResponse {
            report: bc.validate(),
            length: bc.len(),
            difficulty: bc.difficulty(),
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(resp))
}

/// Overwrite a block's data without re-mining it.
#[post("/chains/{id}/tamper/")]
pub async fn tamper_block(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<TamperRequest>,
) -> Result<HttpResponse> {
    let TamperRequest { index, data } = req.into_inner();
    let chain = state.registry.get(&path)?;
    let resp = with_chain(chain, move |bc| {
        let previous_data = tamper::tamper(bc, index, data.clone())?;
        Ok(TamperResponse {
            index,
            previous_data,
            data,
            hash: bc.get(index)?.hash.clone(),
        })
    })
    .await?;

    warn!("Chain {} block #{} tampered", path.as_str(), index);
    Ok(HttpResponse::Ok().json(resp))
}

/// Validate, tamper, validate again and restore.
#[post("/chains/{id}/tamper-demo/")]
pub async fn tamper_demo(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<TamperDemoRequest>,
) -> Result<HttpResponse> {
    let TamperDemoRequest { index, data } = req.into_inner();
    let chain = state.registry.get(&path)?;
    let demo = with_chain(chain, move |bc| tamper::demonstrate(bc, index, data)).await?;
    Ok(HttpResponse::Ok().json(demo))
}

/// Update PoW difficulty (affects future blocks only).
#[post("/chains/{id}/difficulty/")]
pub async fn set_difficulty(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SetDifficultyRequest>,
) -> Result<HttpResponse> {
    let difficulty = state.check_difficulty(body.difficulty)?;
    let chain = state.registry.get(&path)?;
    let difficulty = with_chain(chain, move |bc| {
        bc.set_difficulty(difficulty);
        Ok(bc.difficulty())
    })
    .await?;
    info!("Chain {} difficulty set to {}", path.as_str(), difficulty);
    Ok(HttpResponse::Ok().json(DifficultyResponse { difficulty }))
}
