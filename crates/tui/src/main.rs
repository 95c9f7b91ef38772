use clap::Parser;
use color_eyre::eyre::WrapErr;
use directories::ProjectDirs;
use eudiplo_shop::app::App;
use eudiplo_shop::config::{default_config_path, Config};
use ratatui::crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Terminal wine shop gated by EUDI wallet age verification.
#[derive(Parser, Debug)]
#[command(name = "eudiplo-shop", version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the public demo verifier instead of the configuration file.
    #[arg(long)]
    demo: bool,

    /// Where to write logs; the terminal belongs to the UI.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn default_log_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "eudiplo", "eudiplo-shop") {
        proj_dirs.data_dir().join("eudiplo-shop.log")
    } else {
        PathBuf::from("eudiplo-shop.log")
    }
}

fn init_logging(path: &Path) -> color_eyre::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eudiplo_shop=info,eudiplo_shop_verifier=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    init_logging(&cli.log_file.clone().unwrap_or_else(default_log_path))?;

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = if cli.demo {
        Config::demo()
    } else {
        Config::load_or_default(&config_path).with_env_overrides()
    };

    let rt = tokio::runtime::Runtime::new()?;
    let _runtime = rt.enter();

    let mut app = App::new(config, config_path);
    app.init();
    tracing::info!("Starting eudiplo-shop");

    let mut terminal = ratatui::init();
    ratatui::crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let result = run(&mut terminal, &mut app);

    let _ = ratatui::crossterm::execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    ratatui::restore();

    result
}

fn run(terminal: &mut ratatui::DefaultTerminal, app: &mut App) -> color_eyre::Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(Duration::from_millis(50))? {
            match app.handle_event(event::read()?) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => tracing::warn!("Event handling failed: {e:#}"),
            }
        }

        app.process_async_events();
    }

    app.close_modal();
    Ok(())
}
