//! Bookstore CLI - operator client
//!
//! Runs a single command, or the interactive menu when no command is given.

use anyhow::Result;
use bookstore_client::workflow::{self, DeleteOutcome, UpdateOutcome};
use bookstore_client::{BookApi, BookstoreClient, ClientError, ConsolePrompter, Prompter};
use bookstore_common::{Book, ClientConfig};
use clap::{Parser, Subcommand};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bookstore-cli")]
#[command(about = "Bookstore operator client")]
#[command(version)]
struct Args {
    /// API base URL, including the /api prefix
    #[arg(short, long, env = "BOOKSTORE_URL")]
    url: Option<String>,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all books
    List,
    /// Show one book
    Show {
        /// Book ID
        id: String,
    },
    /// Add a book (prompts for fields)
    Add,
    /// Edit a book (prompts for fields, blank keeps the current value)
    Update {
        /// Book ID
        id: String,
    },
    /// Delete a book after confirmation
    Delete {
        /// Book ID
        id: String,
    },
    /// Search by title or author
    Search {
        /// Text to look for
        query: String,
    },
    /// Interactive menu
    Menu,
}

const TABLE_WIDTH: usize = 88;

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}

fn format_book_row(book: &Book) -> String {
    format!(
        "{:<6} {:<36} {:<24} {:>10} {:<8}",
        truncate(&book.id, 6),
        truncate(&book.title, 36),
        truncate(&book.author, 24),
        format!("${:.2}", book.price),
        if book.in_stock { "Yes" } else { "No" }
    )
}

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("No books found.");
        return;
    }
    println!(
        "{:<6} {:<36} {:<24} {:>10} {:<8}",
        "ID", "TITLE", "AUTHOR", "PRICE", "IN STOCK"
    );
    println!("{}", "-".repeat(TABLE_WIDTH));
    for book in books {
        println!("{}", format_book_row(book));
    }
}

fn report(err: &ClientError) {
    eprintln!("Error: {err}");
}

async fn show_book(api: &impl BookApi, id: &str) -> bookstore_client::Result<()> {
    match api.get_book(id).await? {
        Some(book) => print_books(&[book]),
        None => eprintln!("Error: There is no book with ID {id}."),
    }
    Ok(())
}

async fn add_book(api: &impl BookApi, prompter: &mut impl Prompter) -> bookstore_client::Result<()> {
    let book = workflow::create_book(api, prompter).await?;
    println!("Book was successfully added with ID {}.", book.id);
    Ok(())
}

async fn update_book(
    api: &impl BookApi,
    prompter: &mut impl Prompter,
    id: &str,
) -> bookstore_client::Result<()> {
    match workflow::update_book(api, prompter, id).await? {
        UpdateOutcome::Updated(book) => {
            println!("Book was successfully updated.");
            print_books(&[book]);
        }
        UpdateOutcome::NotFound => eprintln!("Error: There is no book with ID {id}."),
    }
    Ok(())
}

async fn delete_book(
    api: &impl BookApi,
    prompter: &mut impl Prompter,
    id: &str,
) -> bookstore_client::Result<()> {
    match workflow::delete_book(api, prompter, id).await? {
        DeleteOutcome::Deleted(ack) => println!("{}", ack.message),
        DeleteOutcome::Cancelled => println!("Delete cancelled."),
        DeleteOutcome::NotFound => eprintln!("Error: There is no book with ID {id}."),
    }
    Ok(())
}

async fn search_books(api: &impl BookApi, query: &str) -> bookstore_client::Result<()> {
    print_books(&workflow::search(api, query).await?);
    Ok(())
}

fn print_menu() {
    println!();
    println!("{}", "=".repeat(50));
    println!("{:^50}", "BOOKSTORE CLIENT");
    println!("{}", "=".repeat(50));
    println!("1. View All Books");
    println!("2. View Book Details");
    println!("3. Add New Book");
    println!("4. Update Book");
    println!("5. Delete Book");
    println!("6. Search Books");
    println!("7. Exit");
    println!("{}", "=".repeat(50));
}

async fn run_menu(
    api: &impl BookApi,
    prompter: &mut impl Prompter,
) -> bookstore_client::Result<()> {
    loop {
        print_menu();
        let choice = match prompter.ask("Enter your choice (1-7): ") {
            Ok(choice) => choice,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };

        let result = match choice.trim() {
            "1" => api.list_books().await.map(|books| print_books(&books)),
            "2" => match workflow::prompt_book_id(prompter) {
                Ok(Some(id)) => show_book(api, &id).await,
                other => other.map(drop),
            },
            "3" => add_book(api, prompter).await,
            "4" => match workflow::prompt_book_id(prompter) {
                Ok(Some(id)) => update_book(api, prompter, &id).await,
                other => other.map(drop),
            },
            "5" => match workflow::prompt_book_id(prompter) {
                Ok(Some(id)) => delete_book(api, prompter, &id).await,
                other => other.map(drop),
            },
            "6" => match prompter.ask("Search for: ") {
                Ok(query) => search_books(api, &query).await,
                Err(e) => Err(e.into()),
            },
            "7" => {
                println!("Exiting Bookstore Client. Goodbye!");
                break;
            }
            _ => {
                eprintln!("Error: Invalid choice. Please enter a number between 1 and 7.");
                continue;
            }
        };

        // Closed input at any prompt ends the session like it does at the menu.
        match result {
            Err(ClientError::Input(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => report(&e),
            Ok(()) => {}
        }

        if prompter.ask("\nPress Enter to continue...").is_err() {
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        config.base_url = url;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    let client = BookstoreClient::new(&config)?;
    tracing::debug!("Using API at {}", client.base_url());

    let mut prompter = ConsolePrompter;
    match args.command.unwrap_or(Commands::Menu) {
        Commands::List => print_books(&client.list_books().await?),
        Commands::Show { id } => show_book(&client, &id).await?,
        Commands::Add => add_book(&client, &mut prompter).await?,
        Commands::Update { id } => update_book(&client, &mut prompter, &id).await?,
        Commands::Delete { id } => delete_book(&client, &mut prompter, &id).await?,
        Commands::Search { query } => search_books(&client, &query).await?,
        Commands::Menu => run_menu(&client, &mut prompter).await?,
    }

    Ok(())
}
