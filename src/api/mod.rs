mod chain;
mod compare;
pub mod errors;
mod health;
mod history;
pub mod models;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::list_algorithms)
            .service(chain::create_chain)
            .service(chain::get_chain)
            .service(chain::reset_chain)
            .service(chain::append_block)
            .service(chain::validate_chain)
            .service(chain::tamper_block)
            .service(chain::tamper_demo)
            .service(chain::set_difficulty)
            .service(history::save_chain)
            .service(history::list_history)
            .service(history::load_history)
            .service(history::delete_history)
            .service(compare::compare_algorithms)
            .service(compare::avalanche),
    );
}
