// GUI-subsystem binary: no console window on Windows.
#![windows_subsystem = "windows"]

use clap::Parser;
use eframe::egui;

use inkmint::app::InkmintApp;
use inkmint::cli::LaunchArgs;
use inkmint::config::AppConfig;
use inkmint::{log_info, logger};

fn main() -> Result<(), eframe::Error> {
    logger::init();
    let args = LaunchArgs::parse();
    let config = AppConfig::load(&args);
    log_info!(
        "Starting InkMint — chain {}, contract {}",
        config.required_chain_id,
        config.contract_address
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([900.0, 640.0])
            .with_title("InkMint"),
        ..Default::default()
    };
    eframe::run_native(
        "InkMint",
        options,
        Box::new(move |cc| Box::new(InkmintApp::new(cc, config))),
    )
}
