use anyhow::{Context, Result, anyhow};
use eframe::egui;
use lca_dashboard::app::DashboardApp;
use lca_dashboard::config::DashboardConfig;
use lca_dashboard::data::store::DataStore;
use lca_dashboard::state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::load().context("loading configuration")?;
    log::info!("Reading data from {}", config.data_dir.display());

    let store = DataStore::new(&config);
    // Without the state lookup the map cannot be built; stop before the UI.
    let reference = store.reference_table().map_err(|e| {
        log::error!("{e}");
        anyhow!(e)
    })?;

    let state = AppState::new(config, store, reference);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "H1B Visa Data Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the UI: {e}"))
}
