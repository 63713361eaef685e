use actix_web::{HttpResponse, Result, delete, get, post, web};
use log::info;

use super::chain::with_chain;
use super::models::{
    AppState, HistoryResponse, LoadRequest, MessageResponse, SaveRequest, SaveResponse,
    SessionResponse,
};
use crate::blockchain::Blockchain;
use crate::store::HistoryStore;

/// Save an active chain to the history directory.
#[post("/chains/{id}/save/")]
pub async fn save_chain(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: Option<web::Json<SaveRequest>>,
) -> Result<HttpResponse> {
    let name = req
        .and_then(|r| r.into_inner().name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(HistoryStore::default_name);

    let chain = state.registry.get(&path)?;
    let snapshot_name = name.clone();
    let store = state.store.clone();
    let filename = with_chain(chain, move |bc| store.save(&snapshot_name, bc)).await?;

    Ok(HttpResponse::Ok().json(SaveResponse { name, filename }))
}

/// List saved snapshots, newest first.
#[get("/history/")]
pub async fn list_history(state: web::Data<AppState>) -> Result<HttpResponse> {
    let history = state.store.list()?;
    Ok(HttpResponse::Ok().json(HistoryResponse { history }))
}

/// Load a snapshot into a new session. Hashes are taken as stored.
#[post("/history/load/")]
pub async fn load_history(
    state: web::Data<AppState>,
    req: web::Json<LoadRequest>,
) -> Result<HttpResponse> {
    let snapshot = state.store.load(&req.filename)?;
    state.check_difficulty(snapshot.difficulty)?;
    let name = snapshot.name.clone();
    let chain = Blockchain::from_snapshot(snapshot)?;
    let info = chain.info();
    let (session_id, _) = state.registry.insert(chain);
    info!("Snapshot '{}' loaded as chain {}", name, session_id);

    Ok(HttpResponse::Ok().json(SessionResponse {
        session_id,
        message: format!("Loaded blockchain: {name}"),
        info,
    }))
}

#[delete("/history/{filename}")]
pub async fn delete_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    state.store.delete(&path)?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "History deleted successfully".to_string(),
    }))
}
