use std::sync::Arc;

use flight_profile::{
    app::router,
    config::Settings,
    models::app_state::AppState,
    services::profile::ProfileService,
    store::postgres::PgProfileStore,
    uploads::HttpObjectStore,
};
use shuttle_axum::ShuttleAxum;
use shuttle_runtime::{CustomError, SecretStore};
use sqlx::postgres::PgPoolOptions;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] conn_str: String,
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleAxum {
    let settings = Settings::from_lookup(|key| secrets.get(key)).map_err(CustomError::new)?;

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&conn_str)
        .await
        .map_err(CustomError::new)?;

    let store = PgProfileStore::new(db);
    store.ensure_collection().await.map_err(CustomError::new)?;

    let uploads = HttpObjectStore::new(&settings).map_err(CustomError::new)?;

    let profiles = ProfileService::new(Arc::new(store), Arc::new(uploads), settings.io_timeout());
    let state = AppState::new(profiles, &settings.jwt_secret, settings.max_picture_bytes);

    tracing::info!(
        "Profile service ready (io timeout {:?}, max picture {} bytes)",
        settings.io_timeout(),
        settings.max_picture_bytes
    );

    Ok(router(state).into())
}
