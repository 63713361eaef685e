use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use pow_hashchain::api::{self, AppState};
use pow_hashchain::config::Settings;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let settings = Settings::from_env();
    let (host, port) = (settings.host.clone(), settings.port);
    info!(
        "history dir={} max difficulty={} mining timeout={:?}",
        settings.history_dir, settings.max_difficulty, settings.mining_timeout
    );

    let state = AppState::new(settings).map_err(std::io::Error::other)?;
    let state = web::Data::new(state);

    println!("⛓️ Starting hash-chain lab API at http://{host}:{port}");

    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    info!("Shutting down, dropping {} active chain(s)", state.registry.len());
    state.registry.clear();
    Ok(())
}
