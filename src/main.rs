#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use storefront::{
    handlers::{configure_services, spawn_visitor_sweeper, ROUTES},
    settings::StorefrontSettings,
    AppState, VERSION,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = StorefrontSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let state = AppState::from_settings(settings.clone())
        .map_err(|e| std::io::Error::other(format!("Failed to initialize storefront: {e}")))?;

    // Warm the vendor SDKs; failures only mean a later login retries the load
    state.social.preload().await;

    let state = web::Data::new(state);
    let _sweeper = spawn_visitor_sweeper(state.clone().into_inner());

    start_server(state, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(state: web::Data<AppState>, settings: StorefrontSettings) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    // Configure CORS for the storefront pages
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &StorefrontSettings) {
    println!("Starting Lenny storefront core v{VERSION} on http://{bind_address}");
    println!("Backend: {}", settings.backend.base_url);
    println!(
        "Email registry: {}",
        settings
            .storage
            .registry_file
            .as_deref()
            .unwrap_or("in memory")
    );
    println!();
    println!("Endpoints:");
    for (method, path, description) in ROUTES {
        println!("  {method:<5}{path:<28} - {description}");
    }
}
