//! Vocabulary store CLI.
//!
//! Provides the `vocab` binary, which drives the command surface against a
//! SQLite-backed store. Every subcommand builds one [`Command`], runs it
//! through the same `VocabService::execute` path other callers use, and
//! prints the JSON response.
//!
//! Reads configuration from environment variables:
//! - `VOCAB_DB_PATH`: SQLite database file (default: `vocab.db`)
//! - `VOCAB_DEVICE_ID`: device identifier (default: persisted in the store)

use std::process;

use clap::{Parser, Subcommand};
use serde_json::Value;

use vocab_engine::schema::commands::{
    AddQuote, ImportAsset, MarkAssetWritten, QuoteIds, RateWord, ReviewQueueRequest, SetWordNote,
    SetWordStatus, UpsertWord, WordIds,
};
use vocab_engine::{Command, Entitlements, VocabService};
use vocab_storage::SqliteStore;

/// Vocabulary store tools.
#[derive(Parser)]
#[command(name = "vocab", about = "Vocabulary store tools")]
struct Cli {
    /// Path to the store database file.
    #[arg(long, env = "VOCAB_DB_PATH", default_value = "vocab.db", global = true)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the full state: flat layout, lists and asset metadata.
    State,
    /// Print the asset snapshot.
    Export,
    /// Merge an exported asset snapshot from a JSON file.
    Import {
        /// Path to the asset JSON file.
        file: String,
    },
    /// Acknowledge that the asset with this content hash was written out.
    MarkWritten {
        content_hash: String,
    },
    /// Create or update a word.
    Upsert {
        word: String,
        #[arg(short, long)]
        meaning: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
        /// red, yellow or green.
        #[arg(short, long)]
        status: Option<String>,
        /// English meaning; repeat for several.
        #[arg(short, long = "en")]
        english: Vec<String>,
        #[arg(long)]
        source_url: Option<String>,
    },
    /// Set a word's note; an empty note clears it.
    Note {
        word: String,
        #[arg(default_value = "")]
        note: String,
    },
    /// Set the status of one or more words.
    Status {
        status: String,
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Soft-delete words.
    Delete {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Permanently delete words.
    Purge {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Rate a review (0 = forgot, 5 = perfect).
    Rate {
        word: String,
        quality: i64,
    },
    /// List words due for review.
    Due {
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Capture a quote.
    AddQuote {
        text: String,
        #[arg(short, long, default_value = "")]
        translation: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Soft-delete quotes by id.
    DeleteQuotes {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let exit_code = run(&cli.db, cli.command);
    process::exit(exit_code);
}

/// Runs one subcommand.
///
/// Returns exit code: 0 = success, 1 = command failed, 3 = I/O error.
fn run(db_path: &str, command: Commands) -> i32 {
    let command = match build_command(command) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 3;
        }
    };

    let store = match SqliteStore::new(db_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: failed to open database '{}': {}", db_path, e);
            return 3;
        }
    };
    let service = match VocabService::open(store, Entitlements::unlimited()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: failed to initialize store '{}': {}", db_path, e);
            return 3;
        }
    };

    let response = service.execute(command);
    match serde_json::to_string_pretty(&response) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: failed to render response: {}", e);
            return 3;
        }
    }
    if response.ok {
        0
    } else {
        1
    }
}

fn build_command(command: Commands) -> Result<Command, String> {
    let command = match command {
        Commands::State => Command::GetState,
        Commands::Export => Command::ExportAsset,
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|e| format!("failed to read '{}': {}", file, e))?;
            let asset: Value = serde_json::from_str(&text)
                .map_err(|e| format!("'{}' is not JSON: {}", file, e))?;
            Command::ImportAsset(ImportAsset { asset })
        }
        Commands::MarkWritten { content_hash } => {
            Command::MarkAssetWritten(MarkAssetWritten { content_hash })
        }
        Commands::Upsert {
            word,
            meaning,
            note,
            status,
            english,
            source_url,
        } => Command::UpsertWord(UpsertWord {
            meaning,
            note,
            status,
            english_meaning: (!english.is_empty()).then_some(english),
            source_url,
            ..UpsertWord::new(word)
        }),
        Commands::Note { word, note } => Command::SetWordNote(SetWordNote { word, note }),
        Commands::Status { status, words } => {
            Command::SetWordStatus(SetWordStatus { words, status })
        }
        Commands::Delete { words } => Command::DeleteWords(WordIds { words }),
        Commands::Purge { words } => Command::HardDeleteWords(WordIds { words }),
        Commands::Rate { word, quality } => Command::RateWord(RateWord { word, quality }),
        Commands::Due { limit } => Command::ReviewQueue(ReviewQueueRequest { limit }),
        Commands::AddQuote {
            text,
            translation,
            url,
            title,
            note,
        } => Command::AddQuote(AddQuote {
            text,
            translation,
            url,
            title,
            note,
            ..AddQuote::default()
        }),
        Commands::DeleteQuotes { ids } => Command::DeleteQuotes(QuoteIds { ids }),
    };
    Ok(command)
}
