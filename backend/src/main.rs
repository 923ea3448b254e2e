mod config;
mod error;
mod model;
mod pipeline;
mod report;
mod routes;
mod upload;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use model::ModelLoader;
use model::loader::available_runtimes;
use pipeline::DetectionPipeline;
use routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::other(format!("Configuration failed: {}", e))
    })?;

    log::info!("Inference runtimes: {}", available_runtimes().join(", "));

    let (primary, secondary) = ModelLoader::new()
        .load_pair(&config.models)
        .await
        .map_err(|e| {
            log::error!("Failed to load models at startup: {}", e);
            std::io::Error::other(format!("Model loading failed: {}", e))
        })?;

    let pipeline = web::Data::new(DetectionPipeline::from_models(Some(primary), Some(secondary)));
    let upload_config = web::Data::new(config.upload.clone());

    let frontend_dir = config.server.frontend_dir.clone().filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            log::warn!(
                "Frontend directory {} not found; serving the API only",
                dir.display()
            );
        }
        exists
    });

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .expose_headers(vec![actix_web::http::header::CONTENT_DISPOSITION])
                    .max_age(3600),
            )
            .app_data(pipeline.clone())
            .app_data(upload_config.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server.bind(&bind_address)?.run().await
}
