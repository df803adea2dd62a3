use std::sync::Arc;

use anyhow::Result;

mod app;
mod config;
mod decode;
mod error;
mod gemini;
mod handler;
mod ops;
mod panel;
mod request;
mod schema;
mod speech;
mod tui;
mod ui;

use app::App;
use config::Config;
use gemini::GeminiClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());

    // Single static credential, resolved once at startup. Missing key is
    // fatal before the terminal is touched.
    let api_key = std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .or_else(|| config.api_key.clone());

    let Some(api_key) = api_key else {
        eprintln!("GEMINI_API_KEY is not set.");
        if let Ok(path) = Config::config_path() {
            eprintln!("Export it, or add \"api_key\" to {}.", path.display());
        }
        std::process::exit(1);
    };

    let mut client = GeminiClient::new(&api_key);
    if let Some(model) = &config.text_model {
        client = client.with_text_model(model);
    }
    if let Some(model) = &config.image_model {
        client = client.with_image_model(model);
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(Arc::new(client));
    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        }
    }

    Ok(())
}
