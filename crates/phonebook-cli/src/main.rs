mod cmd;
mod output;
mod root;
mod session;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, contact::FormArgs};
use phonebook_core::types::FilterMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "phonebook",
    about = "Phone book with age-range filtering, stored per project directory",
    version,
    propagate_version = true
)]
struct Cli {
    /// Phone book root (default: auto-detect from .phonebook/)
    #[arg(long, global = true, env = "PHONEBOOK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Date ages are computed against (default: today)
    #[arg(long, global = true, env = "PHONEBOOK_TODAY", hide = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .phonebook/ with a default config
    Init,

    /// List contacts, optionally filtered
    List {
        /// Filter text: a name pattern, or an age expression (>N, <=N, N-M, N,M, =N)
        #[arg(long, short = 'f', default_value = "")]
        filter: String,

        /// How to interpret --filter
        #[arg(long, default_value = "age")]
        mode: FilterMode,
    },

    /// Show one contact
    Show { id: i64 },

    /// Add a contact
    Create {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Change a contact; omitted or blank fields keep their value
    Update {
        id: i64,
        #[command(flatten)]
        form: FormArgs,
    },

    /// Remove a contact
    Delete { id: i64 },

    /// Replace every contact with the demo list
    Reset,

    /// Print the quick-filter age ranges
    Ranges,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::List { filter, mode } => cmd::list::run(&root, today, &filter, mode, cli.json),
        Commands::Show { id } => cmd::list::show(&root, today, id, cli.json),
        Commands::Create { form } => cmd::contact::create(&root, today, form, cli.json),
        Commands::Update { id, form } => cmd::contact::update(&root, today, id, form, cli.json),
        Commands::Delete { id } => cmd::contact::delete(&root, today, id, cli.json),
        Commands::Reset => cmd::contact::reset(&root, today, cli.json),
        Commands::Ranges => cmd::ranges::run(cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
