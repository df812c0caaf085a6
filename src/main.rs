use tracing::info;

use baseconnect_server::{
    config::AppConfig,
    database::client::{Database, DbConfig},
    init,
    middleware::mw_ctx::create_ctx_state,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "baseconnect_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env();

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await;

    init::run_migrations(&db.client)
        .await
        .expect("migrations failed");
    init::seed_waitlist(&db.client)
        .await
        .expect("waitlist seed failed");

    let ctx_state = create_ctx_state(db, &config).await;
    let router = init::main_router(&ctx_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("could not bind 0.0.0.0:8080");
    info!("->> listening on {:?}", listener.local_addr());
    axum::serve(listener, router).await.expect("server failed");
}
