use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::AppState;
use crate::config::Config;
use crate::db::Database;
use crate::error::DataTableError;
use crate::query::{DataTableService, TableParams, TableRequest};
use crate::table::client::{apply_visit, PageClient};
use crate::table::{render_table, ChannelNavigator, History, SortDescriptor, TableView, Visit, VisitOptions};
use crate::users::{user_columns, User, USERS_PATH};

#[derive(Parser)]
#[command(
    name = "datatable",
    version,
    about = "datatable: searchable, sortable, paginated tables served over HTTP"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the server (default if no command specified)
    Serve,

    /// Insert demo users into the database
    Seed {
        /// Number of users to insert
        #[arg(long, short = 'c', default_value_t = 50)]
        count: u32,
    },

    /// Print one page of the users table
    List {
        /// Case-insensitive substring matched against name and email
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Column to sort by (name, email, created_at)
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction: asc or desc
        #[arg(long, short = 'd')]
        direction: Option<String>,

        /// 1-based page number
        #[arg(long, short = 'p')]
        page: Option<u32>,

        /// Rows per page (defaults to the configured page size)
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Browse the users table of a running server interactively
    Browse {
        /// Base URL of the server
        #[arg(long, default_value = "http://127.0.0.1:8080/")]
        url: String,
    },
}

/// A line typed into the interactive browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseInput {
    Search(String),
    Sort(String),
    Next,
    Previous,
    Quit,
    /// A recognized command typed without its argument.
    Usage(&'static str),
}

impl BrowseInput {
    /// Lines starting with `/` are commands; anything else is the new search text.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some(("/sort", key)) if !key.trim().is_empty() => {
                BrowseInput::Sort(key.trim().to_string())
            }
            _ => match trimmed {
                "/sort" => BrowseInput::Usage("usage: /sort <column>"),
                "/next" | "/n" => BrowseInput::Next,
                "/prev" | "/p" => BrowseInput::Previous,
                "/quit" | "/q" => BrowseInput::Quit,
                _ => BrowseInput::Search(line.trim_end_matches(['\r', '\n']).to_string()),
            },
        }
    }
}

impl Cli {
    pub fn handle_command_line() -> Result<(), DataTableError> {
        let args = Cli::parse();

        // Default to Serve if no command specified
        match args.command.unwrap_or(Command::Serve) {
            Command::Serve => Self::start_server(),
            Command::Seed { count } => Self::seed(count),
            Command::List {
                search,
                sort,
                direction,
                page,
                per_page,
            } => Self::list(
                TableParams {
                    search,
                    sort,
                    direction,
                    page,
                },
                per_page,
            ),
            Command::Browse { url } => Self::browse(&url),
        }
    }

    fn open_database() -> Result<Database, DataTableError> {
        let path = Config::get().database_path();
        info!("Using database {}", path.display());
        Database::open(&path)
    }

    fn runtime() -> Result<tokio::runtime::Runtime, DataTableError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| DataTableError::Error(format!("Failed to create runtime: {}", e)))
    }

    fn start_server() -> Result<(), DataTableError> {
        let host = Config::get_server_host();
        let port = Config::get_server_port();
        let service = DataTableService::new(Config::get().table.per_page());
        let state = AppState::new(Self::open_database()?, service);

        info!("Starting server on {}:{}", host, port);

        Self::runtime()?.block_on(async {
            let web_server = crate::server::WebServer::new(host, port);
            web_server.start(state).await
        })
    }

    fn seed(count: u32) -> Result<(), DataTableError> {
        let db = Self::open_database()?;
        let inserted = User::seed(&db, count, Utc::now())?;
        println!("Inserted {} users", inserted);
        Ok(())
    }

    fn list(params: TableParams, per_page: Option<u32>) -> Result<(), DataTableError> {
        let db = Self::open_database()?;
        let service = DataTableService::new(per_page.unwrap_or(Config::get().table.per_page()));
        let request = TableRequest::from_params(USERS_PATH, &params);
        let result = User::list_page(&db, &service, &request)?;

        let filters = params.filters();
        let sorting = SortDescriptor::from_filters(&filters);
        let rendered = render_table(
            &user_columns(),
            &result.items,
            &result.page_info,
            sorting.as_ref(),
            filters.search.as_deref().unwrap_or_default(),
        );
        println!("{}", rendered.to_text());
        if let Some(next) = &result.links.next {
            println!("next: {}", next);
        }
        Ok(())
    }

    fn browse(base: &str) -> Result<(), DataTableError> {
        Self::runtime()?.block_on(browse_users(base))
    }
}

async fn browse_users(base: &str) -> Result<(), DataTableError> {
    let debounce = Duration::from_millis(Config::get().table.debounce_ms());
    let client = PageClient::new(base)?;

    let initial = Visit {
        path: USERS_PATH.to_string(),
        params: TableParams::default(),
        options: VisitOptions::default(),
    };
    let page = client.fetch::<User>(&initial).await?;
    let mut history = History::new(page.url);

    let (navigator, mut visits) = ChannelNavigator::new();
    let mut view = TableView::new(
        USERS_PATH,
        user_columns(),
        page.props,
        Arc::new(navigator),
        debounce,
    );

    println!("{}", view.render().to_text());
    println!("Type to search; /sort <column>, /next, /prev, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match BrowseInput::parse(&line) {
                    BrowseInput::Quit => break,
                    BrowseInput::Next => {
                        if !view.on_next() {
                            println!("Already on the last page");
                        }
                    }
                    BrowseInput::Previous => {
                        if !view.on_previous() {
                            println!("Already on the first page");
                        }
                    }
                    BrowseInput::Sort(key) => {
                        if !view.on_header_click(&key) {
                            println!("Column '{}' is not sortable", key);
                        }
                    }
                    BrowseInput::Usage(usage) => println!("{}", usage),
                    BrowseInput::Search(text) => view.on_search_input(&text),
                }
            }
            Some(visit) = visits.recv() => {
                match apply_visit(&client, &mut history, &mut view, visit).await {
                    Ok(()) => println!("{}", view.render().to_text()),
                    Err(e) => {
                        error!("Visit failed: {}", e);
                        eprintln!("Could not load page: {}", e);
                    }
                }
            }
        }
    }

    info!("Browsed {} history entries", history.len());
    Ok(())
}
