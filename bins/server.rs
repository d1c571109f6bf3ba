use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    // .env first so RUST_LOG, DATABASE_URL and DB_* take effect
    dotenv().ok();

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "subscriptions", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    common::utils::logging::init_logging(cfg.logging.format == LogFormat::Json);
    info!(service = "subscriptions", event = "logger_init", "tracing subscriber initialized");

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "subscriptions",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "subscriptions", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "subscriptions",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "subscription service starting"
    );

    // server::run owns graceful shutdown, so it returns once in-flight requests drain
    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "subscriptions", event = "stop", %service_id, pid, "subscription service stopped");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "subscriptions", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
