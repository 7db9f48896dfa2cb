mod command;
mod config;
mod contact;
mod search;
mod storage;
mod store;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use command::{Book, Command, Outcome};
use config::DisplayConfig;
use contact::{Contact, ContactId, Letter};
use storage::JsonFileStorage;
use store::StoreError;

#[derive(Parser, Debug)]
#[command(name = "alphabook", about = "Alphabetical contact book")]
struct Cli {
    /// Configuration file (defaults to <config dir>/alphabook/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Contact list file, overriding `store_path` from the configuration
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Add a new contact
    Add(ContactArgs),
    /// Change the fields of an existing contact
    Edit(EditArgs),
    /// Delete a contact
    Delete(LocateArgs),
    /// Delete every contact
    Clear,
    /// Find contacts whose name starts with the query
    Search(SearchArgs),
    /// Show all contacts grouped by letter
    List,
    /// Show the A-Z overview with contact counts
    Letters,
    /// Check fields without storing anything
    Validate(ContactArgs),
}

#[derive(Args, Debug)]
struct ContactArgs {
    name: String,
    job: String,
    /// Phone number in the form "+X XXX-XXX-XX-XX"
    phone: String,
}

#[derive(Args, Debug)]
struct LocateArgs {
    /// Letter the contact is filed under
    letter: Letter,
    id: ContactId,
}

#[derive(Args, Debug)]
struct EditArgs {
    #[command(flatten)]
    target: LocateArgs,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    job: Option<String>,

    #[arg(long)]
    phone: Option<String>,
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(default_value = "")]
    query: String,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.config.as_deref())?;
    if let Some(path) = &config.config_path {
        tracing::debug!("loaded configuration from {}", path.display());
    }
    let store_path = cli.store.unwrap_or_else(|| config.store_path.clone());

    if let Action::Validate(args) = &cli.action {
        validate::validate(&args.name, &args.job, &args.phone)?;
        println!("Contact is valid");
        return Ok(());
    }

    let storage = JsonFileStorage::new(store_path);
    tracing::debug!("using contact list at {}", storage.path().display());
    let mut book = Book::open(storage);

    match cli.action {
        Action::Add(args) => {
            let outcome = book.execute(Command::AddContact {
                name: args.name,
                job: args.job,
                phone: args.phone,
            })?;
            report(&outcome);
            if let Outcome::Added(contact) = &outcome {
                println!("id: {}", contact.id);
            }
        }
        Action::Edit(args) => handle_edit(&mut book, args)?,
        Action::Delete(args) => {
            let outcome = book.execute(Command::DeleteContact {
                letter: args.letter,
                id: args.id,
            })?;
            report(&outcome);
        }
        Action::Clear => report(&book.execute(Command::ClearAll)?),
        Action::Search(args) => {
            let query = args.query.clone();
            let search = Command::Search { query: args.query };
            if let Outcome::Matches(matches) = book.execute(search)? {
                if matches.is_empty() {
                    println!("No matches for \"{}\"", query.trim());
                }
                for (letter, contact) in &matches {
                    println!("{}", contact_line(*letter, contact, &config.display));
                }
            }
        }
        Action::List => {
            if let Outcome::Matches(all) = book.execute(Command::ListAll)? {
                print_grouped(&all, &config.display);
            }
        }
        Action::Letters => print_letters(&book, &config.display),
        Action::Validate(_) => {}
    }

    Ok(())
}

/// Fields not given on the command line keep their current value.
fn handle_edit(book: &mut Book<JsonFileStorage>, args: EditArgs) -> Result<()> {
    let LocateArgs { letter, id } = args.target;
    let current = book
        .store()
        .get(letter, &id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound {
            letter,
            id: id.clone(),
        })?;

    let outcome = book.execute(Command::EditContact {
        letter,
        id,
        name: args.name.unwrap_or(current.name),
        job: args.job.unwrap_or(current.job),
        phone: args.phone.unwrap_or(current.phone),
    })?;
    report(&outcome);
    Ok(())
}

fn report(outcome: &Outcome) {
    if let Some(message) = outcome.message() {
        println!("{}", message);
    }
}

fn contact_line(letter: Letter, contact: &Contact, display: &DisplayConfig) -> String {
    let mut line = format!(
        "Name: {}  Job: {}  Phone: {}",
        contact.name, contact.job, contact.phone
    );
    if display.show_ids {
        line.push_str(&format!("  [{} {}]", letter.upper(), contact.id));
    }
    line
}

fn print_grouped(all: &[(Letter, Contact)], display: &DisplayConfig) {
    if all.is_empty() {
        println!("No contacts.");
        return;
    }

    // contacts arrive already grouped by letter
    for group in all.chunk_by(|a, b| a.0 == b.0) {
        let letter = group[0].0;
        println!("{} ({})", letter.upper(), group.len());
        for (_, contact) in group {
            println!("  {}", contact_line(letter, contact, display));
        }
    }
}

fn print_letters(book: &Book<JsonFileStorage>, display: &DisplayConfig) {
    let store = book.store();
    for letter in Letter::all() {
        match store.bucket(letter).len() {
            0 if display.show_empty_letters => println!("{}", letter.upper()),
            0 => {}
            count => println!("{} ({})", letter.upper(), count),
        }
    }
    tracing::debug!("{} contacts in {} letters", store.len(), store.letter_counts().count());
}
