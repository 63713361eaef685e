use actix_web::{HttpResponse, Result, get, web};

use super::models::{AppState, AvalancheQuery, CompareQuery};
use crate::blockchain::compare::{self, COMPARISON_DATA};
use crate::blockchain::{DEFAULT_DIFFICULTY, HashAlgorithm};

/// Mine one block with every algorithm at the same difficulty.
#[get("/compare/")]
pub async fn compare_algorithms(
    state: web::Data<AppState>,
    query: web::Query<CompareQuery>,
) -> Result<HttpResponse> {
    let CompareQuery { difficulty, data } = query.into_inner();
    let difficulty = state.check_difficulty(difficulty.unwrap_or(DEFAULT_DIFFICULTY))?;
    let data = data.unwrap_or_else(|| COMPARISON_DATA.to_string());
    let control = state.mining_control();

    let summary =
        web::block(move || compare::compare_with(&HashAlgorithm::ALL, difficulty, &data, &control))
            .await??;
    Ok(HttpResponse::Ok().json(summary))
}

/// Hash two near-identical inputs with every algorithm and report bit drift.
#[get("/avalanche/")]
pub async fn avalanche(query: web::Query<AvalancheQuery>) -> HttpResponse {
    let AvalancheQuery { input1, input2 } = query.into_inner();
    let input1 = input1.unwrap_or_else(|| "Hello World".to_string());
    let input2 = input2.unwrap_or_else(|| "Hello World!".to_string());
    HttpResponse::Ok().json(compare::avalanche(&HashAlgorithm::ALL, &input1, &input2))
}
