mod app;
mod color;
mod config;
mod data;
mod export;
mod render;
mod state;
mod ui;

use app::LulcViewerApp;
use config::{ViewerConfig, TITLE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match ViewerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e:#}");
            std::process::exit(2);
        }
    };
    log::info!("Reading layers from {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(LulcViewerApp::new(config)))),
    )
}
