use actix_web::{middleware::Compress, App, HttpServer};
use actix_cors::Cors;
use utoipa_swagger_ui::SwaggerUi;

use alarmsus::openapi::ApiDoc;
use alarmsus::rate_limit::{InMemoryRateLimiter, RateLimitConfig, RateLimiterFacade};
use alarmsus::routes::{config, AppState};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env automatically only in debug builds to reduce manual setup
    // overhead; production environments set variables externally.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Bootstrapping alarmsus API server");

    #[cfg(all(feature = "inmem-store", not(feature = "postgres-store")))]
    let repo = {
        info!("Using in-memory repository backend");
        alarmsus::repo::inmem::InMemRepo::new()
    };

    #[cfg(feature = "postgres-store")]
    let repo = {
        use sqlx::postgres::PgPoolOptions;
        let db_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres-store");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .expect("Failed to connect to Postgres");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        info!("Using Postgres repository backend");
        alarmsus::repo::pg::PgRepo::new(pool)
    };

    let rl_enabled = std::env::var("RL_ENABLED")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(true);
    let limits = RateLimiterFacade::new(
        InMemoryRateLimiter::new(rl_enabled),
        RateLimitConfig::from_env(),
    );

    let openapi = ApiDoc::openapi();
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let state = AppState {
        repo: Arc::new(repo),
        limits,
    };

    let server = HttpServer::new(move || {
        let cors = {
            let mut c = Cors::default()
                // Expo dev server + web preview defaults
                .allowed_origin("http://localhost:8081")
                .allowed_origin("http://localhost:19006")
                .allow_any_header()
                .allowed_methods(["GET", "POST", "OPTIONS"])
                .max_age(3600);
            if let Ok(front) = std::env::var("FRONTEND_URL") {
                c = c.allowed_origin(&front);
            }
            c
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
            .app_data(actix_web::web::Data::new(state.clone()))
    })
    .bind(("0.0.0.0", port))?;

    info!("Listening on http://0.0.0.0:{port}");
    info!("Health check: http://0.0.0.0:{port}/health");
    info!("Reports endpoint: http://0.0.0.0:{port}/api/reports");

    server.run().await
}
