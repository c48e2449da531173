mod app;
mod audio;
mod cache;
mod catalog;
mod config;
mod player;
mod runtime;
mod timer;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
