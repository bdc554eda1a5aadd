// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use vitrine_storefront::config::{AppConfig, LogFormat};
use vitrine_storefront::{build_state, init_tracing, web};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // LOG_FORMAT is read before the rest of the config so that config loading
  // itself is logged.
  let log_format = match std::env::var("LOG_FORMAT").map(|v| v.to_lowercase()) {
    Ok(v) if v == "json" => LogFormat::Json,
    _ => LogFormat::Pretty,
  };
  init_tracing(log_format);

  tracing::info!("Starting storefront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);

  let app_state = match build_state(app_config).await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise the storefront.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
