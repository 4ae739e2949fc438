//! Storefront Frontend Entry Point

mod api;
mod app;
mod browser;
mod components;
mod config;
mod context;
mod models;
mod store;
mod tracking;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    let level = if config::get().test_mode { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    if let Err(e) = rolling_logger::init_logger("Storefront", level) {
        web_sys::console::error_1(&format!("logger init failed: {}", e).into());
    }
    tracking::init();
    mount_to_body(App);
}
