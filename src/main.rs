use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audiobooks::domain::DomainError;
use audiobooks::services::{export_service, indexing_service};
use audiobooks::{config, db, import, seed, server, AppState};

/// Value following `flag` on the command line, e.g. `--profile staging`.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|arg| arg == flag)?;
    args.get(pos + 1).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

/// Report the outcome of a one-shot command as the process exit code.
fn exit_with(command: &str, result: Result<(), DomainError>) -> ExitCode {
    match result {
        Ok(()) => {
            tracing::info!("{} completed", command);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{} failed: {}", command, e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audiobooks=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();

    // --profile overrides the PROFILE variable
    let profile = flag_value(&args, "--profile");
    let config = config::Config::from_lookup(|key| match (key, &profile) {
        ("PROFILE", Some(profile)) => Some(profile.clone()),
        _ => std::env::var(key).ok(),
    });

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database {}: {}", config.database_url, e);
            return ExitCode::FAILURE;
        }
    };

    // Check for seed flag
    if std::env::var("SEED_DEMO").is_ok() {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    let port = config.port;
    let state = match AppState::new(db, config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to build application state: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(file) = flag_value(&args, "--import") {
        let result = import::import_file(state.db(), Path::new(&file))
            .await
            .map(|summary| tracing::info!("Imported {}: {}", file, summary));
        return exit_with("Import", result);
    }

    if has_flag(&args, "--push-search-index") {
        let result = match state.require_search() {
            Ok(index) => indexing_service::push_search_index(state.db(), index.as_ref())
                .await
                .map(|_| ()),
            Err(e) => Err(e),
        };
        return exit_with("Search index push", result);
    }

    if has_flag(&args, "--generate-data-json") {
        let result = export_service::generate_snapshot(state.db(), &state.snapshots)
            .await
            .map(|_| ());
        return exit_with("Data snapshot", result);
    }

    // Start server
    if let Err(e) = server::serve(state, port).await {
        tracing::error!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
