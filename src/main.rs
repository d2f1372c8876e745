mod api;
mod bot;
mod commands;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod store;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::commands::CommandDispatcher;
use crate::config::{AppConfig, StoreBackend};
use crate::services::UserRepository;
use crate::store::{MemoryStore, MongoStore, RecordStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    log::info!("🚀 Starting Assignment Bot...");

    let store: Arc<dyn RecordStore> = match config.database.backend {
        StoreBackend::Mongodb => {
            log::info!("📊 Database: {}", config.database.url);
            let db = database::MongoDB::new(&config.database.url, &config.database.name)
                .await
                .map_err(|e| {
                    log::error!("❌ Failed to connect to MongoDB: {}", e);
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
                })?;
            log::info!("✅ MongoDB connected successfully");
            Arc::new(MongoStore::new(db))
        }
        StoreBackend::Memory => {
            log::warn!("⚠️  Using in-memory store, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let repository = UserRepository::new(store);
    let dispatcher = CommandDispatcher::new(
        repository.clone(),
        &config.bot.prefix,
        config.bot.invite_link(),
    );

    start_chat_bot(&config, dispatcher);

    let repo_data = web::Data::new(repository);
    let host = config.server.host.clone();
    let port = config.server.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        let cors = if config.server.allows_any_origin() {
            Cors::default().allow_any_origin()
        } else {
            config
                .server
                .allowed_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        };
        let cors = cors
            .allowed_methods(vec!["GET", "HEAD", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::HeaderName::from_static(middleware::api_key::API_KEY_HEADER),
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();
        let auth_config = config.clone();

        App::new()
            .app_data(repo_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .route("/", web::get().to(api::index))
            .route("/health", web::get().to(api::health::health_check))
            .configure(|cfg| api::configure_v1(cfg, auth_config))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

#[cfg(feature = "discord")]
fn start_chat_bot(config: &AppConfig, dispatcher: CommandDispatcher) {
    let bot_config = config.bot.clone();
    actix_rt::spawn(async move {
        if let Err(e) = bot::discord::run(&bot_config, dispatcher).await {
            log::error!("❌ Discord client stopped: {}", e);
        }
    });
}

#[cfg(not(feature = "discord"))]
fn start_chat_bot(_config: &AppConfig, _dispatcher: CommandDispatcher) {
    log::info!("ℹ️  Built without the `discord` feature, chat bot disabled");
}
