use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use gallery_feed::app::{App, Message};
use gallery_feed::cli::{Cli, Commands, ConfigArgs, ConfigCommands, OutputFormat};
use gallery_feed::event::{Event, EventHandler};
use gallery_feed::settings::{self, Settings};
use gallery_feed::{keys, logging, theme, tui, views};

const TICK_MS: u64 = 100;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = settings::config_dir(cli.config_dir.as_ref());

    let mut settings = match &config_dir {
        Some(dir) => Settings::load(&settings::settings_path(dir)).unwrap_or_else(|e| {
            eprintln!("Warning: {}", e);
            Settings::default()
        }),
        None => Settings::default(),
    };
    cli.apply_overrides(&mut settings);

    if let Some(Commands::Config(args)) = &cli.command {
        return handle_config_command(args, &settings, config_dir.as_ref());
    }

    let config_dir = config_dir.context("Could not determine config directory")?;
    let log_path = settings::log_path(&config_dir);
    let _log_guard = logging::init(&log_path, cli.verbose)?;
    info!(api = %settings.api_base, "starting");

    let result = run_tui(settings).await;
    if let Err(e) = &result {
        error!(error = %e, "exited with error");
    }
    if cli.verbose {
        eprintln!("Log written to {}", log_path.display());
    }
    result
}

fn handle_config_command(
    args: &ConfigArgs,
    settings: &Settings,
    config_dir: Option<&PathBuf>,
) -> Result<()> {
    match &args.command {
        ConfigCommands::Show { format } => match format {
            OutputFormat::Toml => {
                let toml =
                    toml::to_string_pretty(settings).context("Failed to serialize settings")?;
                println!("{}", toml);
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(settings)
                    .context("Failed to serialize settings to JSON")?;
                println!("{}", json);
            }
        },
        ConfigCommands::Path => {
            if let Some(config_dir) = config_dir {
                println!("settings: {}", settings::settings_path(config_dir).display());
                println!("log:      {}", settings::log_path(config_dir).display());
            } else {
                eprintln!("Could not determine config directory");
            }
        }
    }
    Ok(())
}

async fn run_tui(settings: Settings) -> Result<()> {
    let resolved_theme = theme::resolve(settings.theme.as_deref());
    let mut app = App::new(settings, resolved_theme)?;
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_MS);
    let mut last_height: Option<u16> = None;

    app.start();

    let result = async {
        loop {
            terminal.draw(|frame| views::render(frame, &app))?;

            // Track viewport height changes; the list geometry feeds the triggers
            let current_height = terminal.size()?.height;
            if last_height != Some(current_height) {
                last_height = Some(current_height);
                app.update(Message::UpdateViewportHeight(current_height));
            }
            app.after_render(Instant::now());

            // Apply settled fetches and async results (non-blocking)
            app.poll_loaders();
            while let Ok(result) = app.result_rx.try_recv() {
                app.handle_async_result(result);
            }

            if app.should_quit {
                break;
            }

            match events.next().await? {
                Event::Key(key) => {
                    if let Some(msg) = keys::handle_key(key, &app) {
                        app.update(msg);
                    }
                }
                Event::Tick | Event::Resize => {}
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}
