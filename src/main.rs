use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod payroll;
mod repository;
mod routes;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::payroll::PayrollBatch;
use crate::payroll::clock::LocalClock;
use crate::payroll::dispatcher::{Notifier, SendGridTransport};
use crate::payroll::schedule;
use crate::payroll::store::{DocumentStore, FsDocumentStore};
use crate::repository::{EmployeeRepository, InMemoryRoster, MySqlRoster};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Nómina en línea"
}

async fn build_roster(config: &Config) -> anyhow::Result<Arc<dyn EmployeeRepository>> {
    if let Some(url) = &config.database_url {
        let pool = init_db(url).await.context("Failed to connect to database")?;
        info!("Roster backed by MySQL");
        return Ok(Arc::new(MySqlRoster::new(pool)));
    }

    match &config.roster_file {
        Some(path) => Ok(Arc::new(InMemoryRoster::from_json_file(path)?)),
        None => {
            info!("No DATABASE_URL or ROSTER_FILE, starting with an empty in-memory roster");
            Ok(Arc::new(InMemoryRoster::default()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "nomina.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let roster = build_roster(&config).await?;
    let fs_store = FsDocumentStore::new(&config.payslip_dir);
    info!(dir = %fs_store.root().display(), "Payslips stored on disk");
    let store: Arc<dyn DocumentStore> = Arc::new(fs_store);
    let transport = Arc::new(SendGridTransport::new(
        &config.sendgrid_endpoint,
        &config.sendgrid_api_key,
    ));
    let notifier = Notifier::new(transport, store.clone(), &config.sender_email);
    let batch = Arc::new(PayrollBatch::new(
        roster.clone(),
        store,
        notifier,
        Arc::new(LocalClock),
        config.payroll_time,
    ));

    // Daily payroll at the configured time
    schedule::spawn_daily(batch.clone());

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(Data::from(roster.clone()))
            .app_data(Data::from(batch.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
