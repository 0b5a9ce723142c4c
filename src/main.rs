use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Result;

use accounts::{config, db, handlers};

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load configuration
    let config = config::init()?;

    // Initialize the selected storage backend and its schema
    let store = db::connect(&config).await?;
    store.create_tables().await?;
    log::info!("database ready ({:?} backend)", config.db_type);

    let data = web::Data::from(store.clone());
    let addr = ("0.0.0.0", config.port);
    log::info!("listening on {}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(handlers::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    store.close().await;
    log::info!("store closed, shutting down");

    Ok(())
}
