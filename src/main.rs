mod app;
mod config;
mod controller;
mod engine;
mod library;
mod logging;
mod mpris;
mod presence;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
