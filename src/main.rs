use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use log::info;

use real_estate_api::config::Config;
use real_estate_api::{handlers, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = Config::parse();
    let state = web::Data::new(AppState::load(&config));

    info!(
        "model loaded: {}, serving on http://{}:{}",
        state.predictions.is_model_loaded(),
        config.host,
        config.port
    );

    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(handlers::configure)
    });

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind(config.bind_address())?.run().await
}
