mod action;
mod api;
mod app;
mod async_state;
mod auth;
mod client;
mod config;
mod detail;
mod error;
mod helpers;
mod list;
mod pagination;
mod search;
mod session;
mod tui;
mod types;
mod ui;

use std::fs::File;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::api::PokemonApi;
use crate::app::App;
use crate::client::HttpClient;
use crate::config::Config;
use crate::detail::DetailLoader;
use crate::error::DexError;
use crate::helpers::{format_abilities, format_height, format_pokemon_name, format_types, format_weight};
use crate::list::{ListOrchestrator, ListView};
use crate::session::{
    is_authenticated, CredentialProvider, FileSessionStore, SessionStore, StaticCredential,
    StoredCredential,
};
use crate::tui::{Event, EventHandler};
use crate::types::{LoginCredentials, PageRequest};

const TOKEN_ENV: &str = "DEXVIEW_TOKEN";

#[derive(Parser, Debug)]
#[command(name = "dexview", version, about = "Browse a Pokemon catalog API from the terminal")]
struct Cli {
    /// Path to config.toml (default: ~/.config/dexview/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overrides the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Initial page size
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,

    /// Bearer token to use instead of the stored session
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive browser (default)
    Browse,
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Remove the stored session
    Logout,
    /// Print one page of the catalog
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Look up an entry by exact name
    Search { name: String },
    /// Print the full record for an id
    Show { id: u64 },
}

type BoxError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = Config::load(cli.config.as_deref()).with_overrides(cli.api_url.clone(), cli.page_size);
    tracing::debug!(base_url = %config.api.base_url, page_size = config.list.page_size, "config loaded");

    let store: Arc<dyn SessionStore> = Arc::new(
        FileSessionStore::default_location()
            .ok_or_else(|| DexError::Config("could not determine config directory".to_string()))?,
    );

    match cli.command.unwrap_or(Command::Browse) {
        Command::Login { username, password } => {
            let credentials = LoginCredentials { username, password };
            let response = auth::login(&config.api.base_url, store.as_ref(), &credentials).await?;
            match response.user {
                Some(user) => match user.email {
                    Some(email) => println!("Logged in as {} <{}>", user.username, email),
                    None => println!("Logged in as {}", user.username),
                },
                None => println!("Logged in as {}", credentials.username),
            }
            Ok(())
        }
        Command::Logout => {
            auth::logout(store.as_ref())?;
            println!("Logged out");
            Ok(())
        }
        command => {
            let credentials = credentials(cli.token, store);
            if !is_authenticated(credentials.as_ref()) {
                return Err("Not logged in. Run `dexview login` first.".into());
            }
            let api: Arc<dyn PokemonApi> =
                Arc::new(HttpClient::new(config.api.base_url.clone(), credentials));
            let list = Arc::new(ListOrchestrator::new(Arc::clone(&api), config.list.page_size));

            match command {
                Command::List { limit, offset } => {
                    let limit = limit.unwrap_or(config.list.page_size);
                    list.fetch_page(PageRequest { limit, offset }.into()).await;
                    print_view(&list.snapshot())
                }
                Command::Search { name } => {
                    list.search_entities(&name).await;
                    print_view(&list.snapshot())
                }
                Command::Show { id } => print_detail(&DetailLoader::new(api), id).await,
                _ => browse(list, api, config).await,
            }
        }
    }
}

fn init_logging(log_file: Option<&std::path::Path>) -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

fn credentials(token: Option<String>, store: Arc<dyn SessionStore>) -> Arc<dyn CredentialProvider> {
    match token.filter(|t| !t.trim().is_empty()) {
        Some(token) => Arc::new(StaticCredential(token)),
        None => Arc::new(StoredCredential::new(store)),
    }
}

fn print_view(view: &ListView) -> Result<(), BoxError> {
    if let Some(error) = &view.error {
        return Err(error.clone().into());
    }
    if !view.has_pokemons {
        println!("No Pokemon found");
        return Ok(());
    }
    for pokemon in &view.entities {
        println!(
            "#{:<5} {:<24} {}",
            pokemon.id,
            format_pokemon_name(&pokemon.name),
            format_types(&pokemon.types)
        );
    }
    if !view.is_search_active {
        println!(
            "page {}/{} ({} total)",
            view.current_page, view.total_pages, view.pagination.total
        );
    }
    Ok(())
}

async fn print_detail(details: &DetailLoader, id: u64) -> Result<(), BoxError> {
    let Some(pokemon) = details.load(id).await else {
        let error = details
            .error()
            .unwrap_or_else(|| "Pokemon not found.".to_string());
        return Err(error.into());
    };
    println!("#{} {}", pokemon.id, format_pokemon_name(&pokemon.name));
    println!("Types:     {}", format_types(&pokemon.types));
    println!("Height:    {}", format_height(pokemon.height));
    println!("Weight:    {}", format_weight(pokemon.weight));
    println!("Abilities: {}", format_abilities(&pokemon.abilities));
    if let Some(image) = &pokemon.image {
        println!("Image:     {}", image);
    }
    Ok(())
}

async fn browse(
    list: Arc<ListOrchestrator>,
    api: Arc<dyn PokemonApi>,
    config: Config,
) -> Result<(), BoxError> {
    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let details = Arc::new(DetailLoader::new(api));
    let result = run(list, details, config).await;

    tui::restore()?;

    result
}

async fn run(
    list: Arc<ListOrchestrator>,
    details: Arc<DetailLoader>,
    config: Config,
) -> Result<(), BoxError> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(list, details, config, action_tx.clone());

    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
