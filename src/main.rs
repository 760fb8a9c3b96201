// src/main.rs
//
// Console shell for the movie journal client.
// Wires the concrete adapters, starts the services and reads commands from
// stdin; every reply is printed as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_journal::application::commands::*;
use movie_journal::application::dto::{ReviewDto, SignInDto, SignUpDto};
use movie_journal::application::state::AppState;
use movie_journal::config::AppConfig;
use movie_journal::db::{create_connection_pool, get_database_path, prepare_database};
use movie_journal::events::NotificationRaised;
use movie_journal::integrations::{
    AuthProvider, ChangeFeed, MetadataClient, OmdbClient, PollingChangeFeed, SupabaseAuthClient,
    SupabaseHttp,
};
use movie_journal::repositories::{LocalStorage, MovieRepository, SqliteLocalStorage, SupabaseMovieRepository};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "movie-journal")]
#[command(about = "Personal movie journal client")]
#[command(version)]
struct Args {
    /// Backend project URL
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: String,

    /// Backend public anon key
    #[arg(long, env = "SUPABASE_ANON_KEY")]
    supabase_anon_key: String,

    /// Movie metadata API key
    #[arg(long, env = "OMDB_API_KEY")]
    omdb_api_key: String,

    /// Local storage database file
    #[arg(long, env = "MOVIE_JOURNAL_DB")]
    database: Option<PathBuf>,

    /// Origin used for auth redirect links
    #[arg(long, default_value = "http://localhost:8080", env = "MOVIE_JOURNAL_SITE_URL")]
    site_url: String,

    /// Poll interval of the movie change feed, in milliseconds
    #[arg(long, default_value = "5000")]
    poll_ms: u64,
}

impl Args {
    fn into_config(self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url,
            supabase_anon_key: self.supabase_anon_key,
            omdb_api_key: self.omdb_api_key,
            database_path: self.database,
            site_url: self.site_url,
            change_feed_poll_ms: self.poll_ms,
            ..AppConfig::default()
        }
    }
}

const HELP: &str = "\
commands:
  status                          current session
  go <path>                       navigate (e.g. go /dashboard)
  signup <email> <user> <pw> <pw> create an account
  signin <email> <pw>             sign in with a password
  google                          print the Google sign-in URL
  callback <url>                  finish Google sign-in
  forgot <email>                  request a password reset
  signout                         sign out
  search <text>                   search movies (debounced)
  results                         show the search panel
  pick <imdb id>                  select a search result
  review <1-5> <fav|-> [text]     submit a review for the selection
  cancel                          abandon the selection
  dashboard | movie <id> | profile
  quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; `log` records from the library are bridged in
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_journal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Args::parse().into_config();
    config.validate().context("Invalid configuration")?;

    // 1. LOCAL STORAGE
    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => get_database_path()?,
    };
    info!("Local storage: {}", db_path.display());
    let pool = Arc::new(create_connection_pool(&db_path)?);
    let stats = prepare_database(&pool).context("Local storage is unusable")?;
    info!(
        "Local storage ready: schema v{}, {} entries",
        stats.schema_version, stats.storage_entries
    );
    let storage: Arc<dyn LocalStorage> = Arc::new(SqliteLocalStorage::new(pool));

    // 2. REMOTE ADAPTERS
    // `Arc<dyn Trait>` matches the service constructor signatures exactly.
    let auth_client = Arc::new(SupabaseAuthClient::new(&config, storage)?);
    let auth: Arc<dyn AuthProvider> = auth_client.clone();
    let repository: Arc<dyn MovieRepository> = Arc::new(SupabaseMovieRepository::new(
        SupabaseHttp::new(&config)?,
        Arc::clone(&auth),
    ));
    let change_feed: Arc<dyn ChangeFeed> = Arc::new(PollingChangeFeed::new(
        Arc::clone(&repository),
        config.change_feed_interval(),
    ));
    let metadata: Arc<dyn MetadataClient> = Arc::new(OmdbClient::new(&config)?);

    // 3. APPLICATION STATE
    let state = AppState::new(config, auth, repository, change_feed, metadata);

    let _notifications = state.event_bus.subscribe::<NotificationRaised, _>(|event| {
        let n = &event.notification;
        if n.is_error() {
            eprintln!("[!] {}: {}", n.title, n.description);
        } else {
            eprintln!("[*] {}: {}", n.title, n.description);
        }
    });

    state.start().await;
    auth_client.start_auto_refresh()?;

    println!("{}", HELP);
    run_shell(&state).await?;

    auth_client.stop_auto_refresh();
    info!("Bye");
    Ok(())
}

async fn run_shell(state: &AppState) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        match command {
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "status" => print(get_session(state).await),
            "go" => print(navigate(state, rest.trim().to_string()).await),
            "signup" => match args.as_slice() {
                [email, username, password, confirm] => print(
                    sign_up(
                        state,
                        SignUpDto {
                            email: email.to_string(),
                            password: password.to_string(),
                            confirm_password: confirm.to_string(),
                            username: username.to_string(),
                        },
                    )
                    .await,
                ),
                _ => println!("usage: signup <email> <username> <password> <confirm>"),
            },
            "signin" => match args.as_slice() {
                [email, password] => print(
                    sign_in(
                        state,
                        SignInDto {
                            email: email.to_string(),
                            password: password.to_string(),
                        },
                    )
                    .await,
                ),
                _ => println!("usage: signin <email> <password>"),
            },
            "google" => print(sign_in_with_google(state).await),
            "callback" => print(complete_oauth(state, rest.trim().to_string()).await),
            "forgot" => print(request_password_reset(state, rest.trim().to_string()).await),
            "signout" => print(sign_out(state).await),
            "search" => print(search_input(state, rest.to_string()).await),
            "results" => print(get_search_state(state).await),
            "pick" => print(select_search_result(state, rest.trim().to_string()).await),
            "review" => match args.as_slice() {
                [rating, favorite, ..] => match rating.parse::<u8>() {
                    Ok(rating) => {
                        let text = args[2..].join(" ");
                        print(
                            submit_review(
                                state,
                                ReviewDto {
                                    rating,
                                    review: text,
                                    is_favorite: *favorite == "fav",
                                },
                            )
                            .await,
                        )
                    }
                    Err(_) => println!("rating must be a number from 1 to 5"),
                },
                _ => println!("usage: review <1-5> <fav|-> [text]"),
            },
            "cancel" => print(cancel_review(state).await),
            "dashboard" => print(get_dashboard(state).await),
            "movie" => print(get_movie(state, rest.trim().to_string()).await),
            "profile" => print(get_profile(state).await),
            other => println!("unknown command '{}', try help", other),
        }
    }

    Ok(())
}

fn print<T: Serialize>(result: Result<T, String>) {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("error: {}", e),
        },
        Err(message) => println!("error: {}", message),
    }
}
