use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::application::{
    ExportOptions, FuelStationExportUseCase, GeoPriorityResolver, PlaceImportUseCase, PlaceService,
};
use crate::domain::error::Result;
use crate::domain::fuel_station::FuelFilterMode;
use crate::domain::import::{ImportOutcome, ImportReport};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::SqlitePlaceRepository;
use crate::infrastructure::geocoding::HttpMapsUrlResolver;
use crate::infrastructure::kml::HttpKmlSource;
use crate::interfaces::cli::{Cli, Command};
use crate::interfaces::http::{start_server, HttpState};

/// `RUST_LOG` when set, `info` otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Import { file } => {
            let use_case = build_import_use_case(&config).await?;

            info!(file = %file.display(), "Importing places");
            let report = use_case.import_file(&file).await?;
            print_report(&report);
            Ok(())
        }
        Command::ExportFuelStations {
            include_blends,
            out,
        } => {
            let source = HttpKmlSource::new(
                config.kml.kml_url(),
                config.kml.timeout_secs,
                &config.geocoding.user_agent,
            )?;
            let use_case = FuelStationExportUseCase::new(
                Arc::new(source),
                config.kml.bbox,
                config.kml.output_dir.clone(),
            );

            let options = ExportOptions {
                mode: FuelFilterMode::from_flag(include_blends),
                out,
            };
            let result = use_case.execute(&options).await?;
            println!("OK - wrote {} rows to: {}", result.rows, result.path.display());
            Ok(())
        }
        Command::Serve => serve(&config).await,
    }
}

async fn build_import_use_case(config: &AppConfig) -> Result<PlaceImportUseCase> {
    let repository = Arc::new(SqlitePlaceRepository::connect(&config.database_url).await?);
    let resolver = HttpMapsUrlResolver::new(
        config.geocoding.timeout_secs,
        &config.geocoding.user_agent,
    )?;
    Ok(PlaceImportUseCase::new(
        repository,
        GeoPriorityResolver::new(Arc::new(resolver)),
    ))
}

async fn serve(config: &AppConfig) -> Result<()> {
    let repository = Arc::new(SqlitePlaceRepository::connect(&config.database_url).await?);
    let resolver = HttpMapsUrlResolver::new(
        config.geocoding.timeout_secs,
        &config.geocoding.user_agent,
    )?;

    let state = HttpState {
        import_use_case: Arc::new(PlaceImportUseCase::new(
            repository.clone(),
            GeoPriorityResolver::new(Arc::new(resolver)),
        )),
        place_service: Arc::new(PlaceService::new(repository)),
    };

    let server = start_server(state, &config.http.bind_host, config.http.port)?;
    if let Err(e) = server.await {
        error!(error = %e, "HTTP server stopped");
        return Err(e.into());
    }
    Ok(())
}

fn print_report(report: &ImportReport) {
    let s = &report.summary;
    println!(
        "created: {}, updated: {}, skipped: {}, error: {}",
        s.created, s.updated, s.skipped, s.error
    );
    for outcome in &report.results {
        let (status, message) = match outcome {
            ImportOutcome::Created { .. } => ("created", None),
            ImportOutcome::Updated { .. } => ("updated", None),
            ImportOutcome::Skipped { message, .. } => ("skipped", Some(message)),
            ImportOutcome::Error { message, .. } => ("error", Some(message)),
        };
        match message {
            Some(message) => println!("  {:<8} {} ({})", status, outcome.place_name(), message),
            None => println!("  {:<8} {}", status, outcome.place_name()),
        }
    }
}
