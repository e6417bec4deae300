pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "ambel",
    about = "Ambel chatbot operator CLI",
    long_about = "Inspect configuration, check readiness, manage the database, and prepare the professional directory and FAQ knowledge base.",
    after_help = "Examples:\n  ambel doctor --json\n  ambel seed\n  ambel convert --input Ambel.txt --output Ambel.json\n  ambel load-knowledge --input Ambel.json --skip-embeddings"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Replace the professional directory with the embedded sample records")]
    Seed,
    #[command(about = "Split extracted FAQ document text into a Q&A JSON file")]
    Convert {
        #[arg(long, default_value = "Ambel.txt", help = "Plain text extracted from the FAQ document")]
        input: PathBuf,
        #[arg(long, default_value = "Ambel.json", help = "Where to write the Q&A JSON array")]
        output: PathBuf,
    },
    #[command(about = "Replace the knowledge base with the pairs from a Q&A JSON file")]
    LoadKnowledge {
        #[arg(long, default_value = "Ambel.json", help = "Q&A JSON produced by `ambel convert`")]
        input: PathBuf,
        #[arg(long, help = "Store entries without computing embeddings")]
        skip_embeddings: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, LLM credential readiness, and DB connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Convert { input, output } => commands::convert::run(&input, &output),
        Command::LoadKnowledge { input, skip_embeddings } => {
            commands::load_knowledge::run(&input, skip_embeddings)
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
