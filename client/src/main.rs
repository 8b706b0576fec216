//! `libris` command-line client.
//!
//! Signs in against a Libris backend, manages favorites and prints ranked
//! comment threads. The token is kept in the credential directory between
//! runs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use libris_client::comments::{
    CommentsAction, DEFAULT_MAX_INDENT, RankingPolicy, flatten_for_display,
};
use libris_client::http::{ApiClient, HttpAuthService, HttpCommentService, HttpFavoritesService};
use libris_client::providers::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, TracingNavigator, TracingNotifier,
};
use libris_client::validation::password_strength;
use libris_client::{App, AppContext, ClientConfig, ItemId, LoginCredentials, Registration};
use libris_core::environment::SystemClock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type HttpApp = App<HttpAuthService, HttpFavoritesService, HttpCommentService>;

/// Libris library client
#[derive(Parser, Debug)]
#[command(name = "libris", version)]
#[command(about = "Command-line client for the Libris library catalog")]
struct Args {
    /// API base URL (overrides `LIBRIS_API_URL`)
    #[arg(long)]
    api_url: Option<String>,

    /// Credential directory (overrides `LIBRIS_CREDENTIAL_DIR`)
    #[arg(long)]
    credential_dir: Option<String>,

    /// Keep the token in memory only
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and forget the token
    Logout,
    /// Show the current session
    Whoami,
    /// List favorite book ids
    Favorites,
    /// Add a book to the favorites
    Favorite {
        /// Book id
        book_id: String,
    },
    /// Remove a book from the favorites
    Unfavorite {
        /// Book id
        book_id: String,
    },
    /// Print the comments of a book
    Comments {
        /// Book id
        book_id: String,
        /// relevant, unpopular, recent or oldest
        #[arg(short, long, default_value = "relevant")]
        sort: RankingPolicy,
    },
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login { email, .. } => f
                .debug_struct("Login")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Self::Register { name, email, .. } => f
                .debug_struct("Register")
                .field("name", name)
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Self::Logout => f.write_str("Logout"),
            Self::Whoami => f.write_str("Whoami"),
            Self::Favorites => f.write_str("Favorites"),
            Self::Favorite { book_id } => {
                f.debug_struct("Favorite").field("book_id", book_id).finish()
            },
            Self::Unfavorite { book_id } => {
                f.debug_struct("Unfavorite").field("book_id", book_id).finish()
            },
            Self::Comments { book_id, sort } => f
                .debug_struct("Comments")
                .field("book_id", book_id)
                .field("sort", sort)
                .finish(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = &args.api_url {
        config = config.with_api_url(url);
    }
    if let Some(dir) = &args.credential_dir {
        config = config.with_credential_dir(dir);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("libris={0},libris_client={0}", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = build(&config, args.ephemeral).context("invalid configuration")?;
    app.start().await?;

    run(&app, args.command).await?;

    app.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

fn build(config: &ClientConfig, ephemeral: bool) -> anyhow::Result<HttpApp> {
    let credentials: Arc<dyn CredentialStore> = if ephemeral {
        Arc::new(MemoryCredentialStore::new())
    } else {
        Arc::new(FileCredentialStore::new(&config.credential_dir))
    };

    let context = AppContext {
        clock: Arc::new(SystemClock),
        credentials: Arc::clone(&credentials),
        navigator: Arc::new(TracingNavigator::new()),
        notifier: Arc::new(TracingNotifier),
    };

    let api = ApiClient::new(config, credentials, Arc::clone(&context.navigator))?;

    Ok(App::new(
        context,
        HttpAuthService::new(api.clone()),
        HttpFavoritesService::new(api.clone()),
        HttpCommentService::new(api),
    ))
}

async fn run(app: &HttpApp, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let session = app.login(&LoginCredentials::new(email, password)).await?;
            if session.is_authenticated {
                let name = session.user_name.or(session.user_id).unwrap_or_default();
                println!("Signed in as {name}");
            } else {
                anyhow::bail!("the backend issued a token that could not be used");
            }
        },

        Command::Register { name, email, password } => {
            let registration = Registration::new(name, email, password);
            println!("Password strength: {}/4", password_strength(&registration.password));
            app.register(&registration).await?;
            println!("Account created. Run `libris login` to sign in.");
        },

        Command::Logout => {
            app.logout().await?;
            println!("Signed out");
        },

        Command::Whoami => {
            let session = app.session().await;
            if session.is_authenticated {
                println!("user:  {}", session.user_id.unwrap_or_default());
                if let Some(name) = session.user_name {
                    println!("name:  {name}");
                }
                let roles: Vec<_> = session.roles.into_iter().collect();
                println!("roles: {}", roles.join(", "));
            } else {
                println!("Not signed in");
            }
        },

        Command::Favorites => {
            require_session(app).await?;
            let favorites = app.favorites().await;
            if let Some(error) = favorites.last_error {
                anyhow::bail!("could not load favorites: {error}");
            }
            for id in &favorites.ids {
                println!("{id}");
            }
            println!("{} favorite(s)", favorites.count());
        },

        Command::Favorite { book_id } => toggle(app, book_id, true).await?,
        Command::Unfavorite { book_id } => toggle(app, book_id, false).await?,

        Command::Comments { book_id, sort } => {
            let store = app.comments();
            store.send(CommentsAction::SetPolicy(sort)).await?.wait().await;
            store.send(CommentsAction::Load { book_id: book_id.clone() }).await?.wait().await;

            let state = store.state(Clone::clone).await;
            if let Some(error) = &state.last_error {
                anyhow::bail!("could not load comments for {book_id}: {error}");
            }
            let ranked = state.ranked();
            for (indent, comment) in flatten_for_display(&ranked, DEFAULT_MAX_INDENT) {
                println!(
                    "{:indent$}{} ({} helpful, {} not) {}: {}",
                    "",
                    comment.created_at.format("%Y-%m-%d"),
                    comment.helpful_count,
                    comment.not_helpful_count,
                    comment.author_name,
                    comment.content,
                    indent = indent * 2,
                );
            }
            store.shutdown(Duration::from_secs(1)).await?;
        },
    }
    Ok(())
}

async fn require_session(app: &HttpApp) -> anyhow::Result<()> {
    if app.session().await.is_authenticated {
        Ok(())
    } else {
        anyhow::bail!("not signed in; run `libris login` first")
    }
}

async fn toggle(app: &HttpApp, book_id: String, make_favorite: bool) -> anyhow::Result<()> {
    require_session(app).await?;
    let item = ItemId::new(book_id);
    app.toggle_favorite(item.clone(), make_favorite).await?;

    let favorites = app.favorites().await;
    if favorites.contains(&item) == make_favorite {
        println!("{} {item}", if make_favorite { "Favorited" } else { "Unfavorited" });
        Ok(())
    } else {
        anyhow::bail!(
            "could not update {item}: {}",
            favorites.last_error.unwrap_or_else(|| "unknown error".to_owned())
        )
    }
}
