use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use staff_stats_core::adapters::config::app_config::AppConfig;
use staff_stats_core::ports::command_handler::Command;
use staff_stats_core::prettyprint::PrettyFormatter;
use std::env;
use std::sync::Arc;
use tracing::{error, info, instrument};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod application_service_factory;
mod cli_adapter;

use application_service_factory::{ApplicationServiceFactory, StoreMode};
use cli_adapter::CliAdapter;

const LOCAL_FLAG: &str = "--local";
const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing()?;
    setup_panic_hook();

    let args: Vec<String> = env::args().skip(1).collect();
    let mode = if args.iter().any(|arg| arg == LOCAL_FLAG) {
        StoreMode::Local
    } else {
        StoreMode::Spreadsheet
    };
    let args: Vec<String> = args.into_iter().filter(|arg| arg != LOCAL_FLAG).collect();

    info!(?mode, "Starting staff-stats CLI");

    let command = CliAdapter::parse_args(&args).map_err(|e| {
        eprintln!("{}", e);
        e
    })?;
    let secrets_path = AppConfig::secrets_path();

    let app_service = match command {
        Command::Check => None,
        _ => Some(ApplicationServiceFactory::create(mode, &secrets_path).await.map_err(|e| {
            error!("Could not prepare the record store: {:?}", e);
            e
        })?),
    };

    let today = chrono::Local::now().date_naive();
    let cli_adapter = Arc::new(CliAdapter::new(app_service, secrets_path, today));

    let result = match cli_adapter.run(command).await {
        Ok(_) => {
            info!("CLI execution completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("CLI execution failed: {:?}", e);
            Err(e)
        }
    };

    opentelemetry::global::shutdown_tracer_provider();
    result
}

fn setup_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(std::io::stderr);

    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(std::fs::File::create("staff_stats.log")?)
        .with_ansi(false);

    // Traces are exported only when a collector is configured.
    let otel_layer = match env::var(OTLP_ENDPOINT_ENV) {
        Ok(endpoint) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "staff_stats_cli"),
                ])))
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;

            Some(OpenTelemetryLayer::new(tracer))
        }
        Err(_) => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("staff_stats_cli", tracing::Level::TRACE)
                .with_target("staff_stats_core", tracing::Level::TRACE),
        )
        .with(otel_layer)
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));
}
