//! Library checkout manager CLI
//!
//! Runs the interactive menu by default, or a single command when one is given.

use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use library_checkout::{
    book::Book,
    clock::SystemClock,
    config::LibraryConfig,
    engine::RuleEngine,
    error::Result,
    member::{Member, MemberStatus},
    menu::Menu,
    observers::{EventLogger, NotificationService},
    persistence::JsonFileStore,
    report::Report,
    sample,
};

/// Library checkout manager
#[derive(Parser, Debug)]
#[command(
    name = "library-checkout",
    version,
    about = "Track books, members and checkouts"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "library.toml")]
    config: PathBuf,

    /// Override the data file named in the configuration
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Command to run (the interactive menu if omitted)
    #[command(subcommand)]
    command: Option<Command>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive menu
    Menu,

    /// Catalog operations
    Books {
        /// Catalog action
        #[command(subcommand)]
        action: BookCommand,
    },

    /// Roster operations
    Members {
        /// Roster action
        #[command(subcommand)]
        action: MemberCommand,
    },

    /// Lend a book to a member
    Checkout {
        /// Borrowing member
        member_id: String,
        /// Book to lend
        isbn: String,
    },

    /// Return a checked-out book
    Return {
        /// Loan to close
        checkout_id: String,
    },

    /// Extend a loan by one loan period from today
    Renew {
        /// Loan to extend
        checkout_id: String,
    },

    /// Show the overdue fee accrued on a loan
    Fee {
        /// Loan to price
        checkout_id: String,
    },

    /// List overdue loans with their fees
    Overdue,

    /// Label every loan past its due date as overdue
    RefreshOverdue,

    /// Show library statistics
    Stats,

    /// Add the sample catalog and roster if the library is empty
    Seed,
}

/// Catalog actions
#[derive(Subcommand, Debug)]
enum BookCommand {
    /// List books
    List {
        /// Only books with a copy on the shelf
        #[arg(long)]
        available: bool,
    },

    /// Search by title or author keyword
    Search {
        /// Title keyword
        #[arg(long)]
        title: Option<String>,
        /// Author keyword
        #[arg(long)]
        author: Option<String>,
    },

    /// Add a new title
    Add {
        /// Catalog key
        isbn: String,
        /// Book title
        title: String,
        /// Book author
        author: String,
        /// Shelf genre
        genre: String,
        /// Number of copies owned
        #[arg(default_value_t = 1)]
        copies: u32,
    },

    /// Add copies of an existing title
    AddCopies {
        /// Title to extend
        isbn: String,
        /// Copies to add
        count: u32,
    },

    /// Remove a title with no copies on loan
    Remove {
        /// Title to remove
        isbn: String,
    },

    /// Show every loan of a title
    History {
        /// Title to look up
        isbn: String,
    },
}

/// Roster actions
#[derive(Subcommand, Debug)]
enum MemberCommand {
    /// List members
    List,

    /// Register a new member
    Add {
        /// Roster key
        member_id: String,
        /// Full name
        name: String,
        /// Contact email
        email: String,
        /// Contact phone
        phone: String,
        /// Checkout cap (defaults to the configured cap)
        #[arg(long)]
        max_checkouts: Option<u32>,
    },

    /// Change contact details
    Update {
        /// Member to update
        member_id: String,
        /// New email
        #[arg(long)]
        email: Option<String>,
        /// New phone
        #[arg(long)]
        phone: Option<String>,
    },

    /// Change standing (active, inactive or suspended)
    Status {
        /// Member to update
        member_id: String,
        /// New standing
        status: MemberStatus,
    },

    /// Change the checkout cap
    Limit {
        /// Member to update
        member_id: String,
        /// New cap
        max_checkouts: u32,
    },

    /// Remove a member with nothing on loan
    Remove {
        /// Member to remove
        member_id: String,
    },

    /// Show a member's loans
    History {
        /// Member to look up
        member_id: String,
        /// Only loans still out
        #[arg(long)]
        active: bool,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Open the library named by the configuration and wire up observers.
fn open_engine(config: &LibraryConfig) -> RuleEngine {
    let store = JsonFileStore::new(config.data_file.clone());
    let mut engine = RuleEngine::open(Box::new(store), Box::new(SystemClock), config.rules);
    engine.register_observer(Box::new(EventLogger));
    engine.register_observer(Box::new(NotificationService));
    engine
}

/// Print a success line, or the error in red.
fn report<T>(result: Result<T>, success: impl FnOnce(T) -> String) {
    match result {
        Ok(value) => println!("{}", success(value).green()),
        Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
    }
}

/// Run one catalog action
fn run_book_command(engine: &mut RuleEngine, action: BookCommand) {
    match action {
        BookCommand::List { available: false } => {
            let text = Report::books("All Books", &engine.list_books(), "No books in library.");
            print!("{text}");
        }
        BookCommand::List { available: true } => {
            let text = Report::books(
                "Available Books",
                &engine.list_available_books(),
                "No books available.",
            );
            print!("{text}");
        }
        BookCommand::Search { title, author } => {
            let mut found = Vec::new();
            if let Some(keyword) = title {
                found.extend(engine.search_by_title(&keyword));
            }
            if let Some(keyword) = author {
                let by_author: Vec<Book> = engine
                    .search_by_author(&keyword)
                    .into_iter()
                    .filter(|book| !found.iter().any(|seen| seen.isbn() == book.isbn()))
                    .collect();
                found.extend(by_author);
            }
            let text = Report::books("Search Results", &found, "No books found.");
            print!("{text}");
        }
        BookCommand::Add {
            isbn,
            title,
            author,
            genre,
            copies,
        } => {
            report(engine.add_book(Book::new(isbn, title, author, genre, copies)), |()| {
                "Book added successfully!".to_string()
            });
        }
        BookCommand::AddCopies { isbn, count } => {
            report(engine.add_copies(&isbn, count), |()| {
                format!("Added {count} copies of {isbn}")
            });
        }
        BookCommand::Remove { isbn } => {
            report(engine.remove_book(&isbn), |book| {
                format!("Removed {}", book.title())
            });
        }
        BookCommand::History { isbn } => {
            let text = Report::checkouts(
                "Book History",
                &engine.book_history(&isbn),
                "No checkouts for this book.",
            );
            print!("{text}");
        }
    }
}

/// Run one roster action
fn run_member_command(engine: &mut RuleEngine, action: MemberCommand) {
    match action {
        MemberCommand::List => {
            let text = Report::members(
                "All Members",
                &engine.list_members(),
                "No members in library.",
            );
            print!("{text}");
        }
        MemberCommand::Add {
            member_id,
            name,
            email,
            phone,
            max_checkouts,
        } => {
            let cap = max_checkouts.unwrap_or(engine.rules().default_max_checkouts);
            let member = Member::new(member_id, name, email, phone).with_max_checkouts(cap);
            report(engine.add_member(member), |()| {
                "Member added successfully!".to_string()
            });
        }
        MemberCommand::Update {
            member_id,
            email,
            phone,
        } => {
            if engine.update_member_contact(&member_id, email.as_deref(), phone.as_deref()) {
                println!("{}", "Member information updated successfully!".green());
            } else {
                eprintln!("{} member {member_id} not found", "Error:".red().bold());
            }
        }
        MemberCommand::Status { member_id, status } => {
            if engine.update_member_status(&member_id, status) {
                println!("{}", format!("Member {member_id} is now {status}").green());
            } else {
                eprintln!("{} member {member_id} not found", "Error:".red().bold());
            }
        }
        MemberCommand::Limit {
            member_id,
            max_checkouts,
        } => {
            if engine.update_member_limit(&member_id, max_checkouts) {
                let message = format!("Member {member_id} may now hold {max_checkouts} books");
                println!("{}", message.green());
            } else {
                eprintln!("{} member {member_id} not found", "Error:".red().bold());
            }
        }
        MemberCommand::Remove { member_id } => {
            report(engine.remove_member(&member_id), |member| {
                format!("Removed {}", member.name())
            });
        }
        MemberCommand::History {
            member_id,
            active: false,
        } => {
            let text = Report::checkouts(
                "Member Checkouts",
                &engine.member_history(&member_id),
                "No checkouts for this member.",
            );
            print!("{text}");
        }
        MemberCommand::History {
            member_id,
            active: true,
        } => {
            let text = Report::checkouts(
                "Active Checkouts",
                &engine.member_active_checkouts(&member_id),
                "No active checkouts for this member.",
            );
            print!("{text}");
        }
    }
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = LibraryConfig::load_or_default(&cli.config);
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    config.validate()?;
    log::info!("Using data file {}", config.data_file.display());

    let mut engine = open_engine(&config);
    let command = cli.command.unwrap_or(Command::Menu);
    if config.seed_sample_data && matches!(command, Command::Menu) {
        sample::seed_if_empty(&mut engine)?;
    }

    match command {
        Command::Menu => {
            let mut menu = Menu::new(&mut engine, io::stdin().lock(), io::stdout());
            menu.run()?;
        }
        Command::Books { action } => run_book_command(&mut engine, action),
        Command::Members { action } => run_member_command(&mut engine, action),
        Command::Checkout { member_id, isbn } => {
            report(engine.checkout_book(&member_id, &isbn), |checkout| {
                format!(
                    "Checked out as {}, due {}",
                    checkout.checkout_id(),
                    checkout.due_date()
                )
            });
        }
        Command::Return { checkout_id } => {
            let fee = engine.overdue_fee(&checkout_id);
            report(engine.return_book(&checkout_id), |_| {
                if fee > 0.0 {
                    format!("Book returned successfully! Overdue fee due: ${fee:.2}")
                } else {
                    "Book returned successfully!".to_string()
                }
            });
        }
        Command::Renew { checkout_id } => {
            report(engine.renew_checkout(&checkout_id), |checkout| {
                format!(
                    "Renewed {}, now due {}",
                    checkout.checkout_id(),
                    checkout.due_date()
                )
            });
        }
        Command::Fee { checkout_id } => {
            if engine.get_checkout(&checkout_id).is_some() {
                println!(
                    "{checkout_id}: {} day(s) overdue, fee ${:.2}",
                    engine.overdue_days(&checkout_id),
                    engine.overdue_fee(&checkout_id)
                );
            } else {
                eprintln!("{} checkout {checkout_id} not found", "Error:".red().bold());
            }
        }
        Command::Overdue => print!("{}", Report::overdue(&engine)),
        Command::RefreshOverdue => {
            let changed = engine.refresh_overdue_labels();
            let message = format!("Marked {changed} checkout(s) overdue");
            println!("{}", message.yellow());
        }
        Command::Stats => print!("{}", Report::statistics(&engine.statistics())),
        Command::Seed => {
            if sample::seed_if_empty(&mut engine)? {
                println!("{}", "Sample data added".green());
            } else {
                println!("{}", "Library already has data; nothing added".yellow());
            }
        }
    }
    Ok(())
}
