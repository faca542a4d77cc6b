use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use presence_service::{
    handlers::{register_interactions, register_websocket},
    logging,
    metrics::{self, MetricsMiddleware},
    middleware::JwtValidator,
    AppError, AppState, Config, InMemoryStore,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();

    let cfg = Config::from_env()?;
    tracing::info!(env = %cfg.app.env, "Starting presence service");

    // Document store is external; the in-memory backend serves local runs
    let store = match &cfg.app.seed_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("read seed file {}: {e}", path.display()))
            })?;
            let store = InMemoryStore::from_seed_json(&raw)
                .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
            tracing::info!(
                users = store.user_count(),
                posts = store.post_count(),
                "Loaded seed data from {}",
                path.display()
            );
            store
        }
        None => {
            tracing::warn!("SEED_FILE not set; in-memory store starts empty");
            InMemoryStore::new()
        }
    };
    let state = AppState::new(Arc::new(store), cfg.websocket);
    let validator = web::Data::new(JwtValidator::new(&cfg.auth.jwt_secret));

    tracing::info!(
        heartbeat_secs = cfg.websocket.heartbeat_interval.as_secs(),
        timeout_secs = cfg.websocket.client_timeout.as_secs(),
        "WebSocket presence initialized"
    );

    let addr = format!("0.0.0.0:{}", cfg.app.port);
    let cors_origin = cfg.app.cors_origin.clone();
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(validator.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(MetricsMiddleware)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(|cfg| {
                register_websocket(cfg);
                register_interactions(cfg);
            })
    })
    .bind(&addr)
    .map_err(|e| AppError::StartServer(format!("bind {addr}: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(format!("run HTTP: {e}")))
}
