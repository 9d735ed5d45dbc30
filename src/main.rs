#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 发布时隐藏控制台

mod config;
mod utils;
mod logging;
mod message;
mod logic;
mod ui {
    pub mod app;
    pub mod fonts;
}

use ui::app::SettingsApp;

fn main() -> eframe::Result {
    // 初始化日志系统（可选）
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([880.0, 580.0])
            .with_title("Recipe Manager 设置面板"),
        ..Default::default()
    };

    eframe::run_native(
        "Recipe Settings Rust",
        options,
        Box::new(|cc| Ok(Box::new(SettingsApp::new(cc)))),
    )
}
