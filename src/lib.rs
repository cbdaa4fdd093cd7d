pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod records;
pub mod revision;
pub mod routes;
pub mod seed;
pub mod state;
pub mod storage;
pub mod temporal;

/// Load config, start logging and build the file-backed application state.
pub fn bootstrap() -> state::app::AppState {
    let config = config::get_engine_config().clone();
    // Initialize structured logging first
    logging::init_logging(&config);

    match config::engine::get_config_source() {
        config::engine::ConfigSource::File(path) => {
            tracing::info!(path = ?path, "Loaded engine config");
        }
        config::engine::ConfigSource::Defaults { reason } => {
            tracing::info!(reason = %reason, "Using default engine config");
        }
    }
    tracing::info!(data_dir = ?config.data_dir, "leetspace starting");

    state::app::AppState::from_config(config)
}
