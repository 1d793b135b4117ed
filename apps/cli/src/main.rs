mod commands;

use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "houdini")]
#[command(
    about = "Escape and unescape text for HTML, XML, URIs and JavaScript",
    long_about = None
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Call {
        name: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    Pipe {
        name: String,

        #[arg(long)]
        unsecure: bool,
    },
    List {
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(error) = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {error}");
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Call { name, args } => commands::call(&config, &name, &args),
        Commands::Pipe { name, unsecure } => commands::pipe(&config, &name, unsecure),
        Commands::List { json } => commands::list(&config, json),
    });

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
