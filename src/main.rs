mod app;
mod clipboard;
mod commands;
mod config;
mod history;
mod logging;
mod playback;
mod recording;
mod session;
mod setup;
mod translation;
mod ui;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
