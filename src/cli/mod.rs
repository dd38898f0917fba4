//! Command-line interface for myelts.
//!
//! Provides commands for registering categories and question/answer cards,
//! listing a category's cards, running a study session and inspecting the
//! resolved configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{GoogleTts, LocalStorage, ObjectStore, OpenAiVocabulary, SupabaseStorage};
use crate::auth::{current_user, require_user, UserId};
use crate::config::{self, ResolvedConfig, StorageBackend};
use crate::core::{CategoryRegistry, QaInput, Registrar};
use crate::domain::Category;
use crate::error::MyeltsError;
use crate::store::{load_cards_or_empty, Database};

pub mod study;

/// myelts - Flashcards with synthesized audio for speaking-exam practice
#[derive(Parser, Debug)]
#[command(name = "myelts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Register question/answer cards
    Qa {
        #[command(subcommand)]
        command: QaCommands,
    },

    /// List your cards in a category
    Cards {
        /// Category ID
        category_id: String,
    },

    /// Study a category as flip cards
    Study {
        /// Category ID
        category_id: String,

        /// Start auto-play immediately
        #[arg(long)]
        auto: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Register a new (part, theme, period) category
    Add {
        /// Exam part, e.g. "Part 2"
        #[arg(long)]
        part: String,

        /// Theme, e.g. "Describe a place"
        #[arg(long)]
        theme: String,

        /// Period, e.g. "2024-Q1"
        #[arg(long)]
        period: String,
    },

    /// List categories
    List {
        /// Only show categories whose part, theme or period contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum QaCommands {
    /// Register a question and its model answer
    Add {
        /// Category ID
        #[arg(short, long)]
        category: String,

        /// Question text
        #[arg(short, long)]
        question: String,

        /// Answer text
        #[arg(short, long)]
        answer: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Category { command } => match command {
                CategoryCommands::Add {
                    part,
                    theme,
                    period,
                } => add_category(&part, &theme, &period),
                CategoryCommands::List { search } => list_categories(search.as_deref()),
            },
            Commands::Qa { command } => match command {
                QaCommands::Add {
                    category,
                    question,
                    answer,
                } => add_qa(&category, &question, &answer).await,
            },
            Commands::Cards { category_id } => list_cards(&category_id),
            Commands::Study { category_id, auto } => {
                let cfg = config::config()?;
                let user = current_user();
                let user = require_user(user.as_ref())?;
                let db = open_database(cfg)?;
                let category = find_category(&db, &category_id)?;
                study::run(&db, user, &category, auto, &cfg.study).await
            }
            Commands::Config => show_config(),
        }
    }
}

fn open_database(cfg: &ResolvedConfig) -> Result<Database> {
    Database::open(&cfg.database_path())
        .with_context(|| format!("Failed to open database: {}", cfg.database_path().display()))
}

fn find_category(db: &Database, category_id: &str) -> Result<Category> {
    let category = CategoryRegistry::new(db.clone())
        .get(category_id)?
        .ok_or_else(|| MyeltsError::NotFound(format!("category {}", category_id)))?;
    Ok(category)
}

/// Build the registration pipeline from configuration and environment
fn build_registrar(cfg: &ResolvedConfig, db: Database) -> Result<Registrar> {
    let speech = Arc::new(GoogleTts::from_env(cfg.voice.clone())?);
    let vocabulary = Arc::new(OpenAiVocabulary::from_env(cfg.vocabulary_model.clone())?);

    let storage: Arc<dyn ObjectStore> = match cfg.storage_backend {
        StorageBackend::Supabase => {
            let bucket = cfg
                .storage_bucket
                .clone()
                .context("Supabase storage needs a bucket (storage.bucket or SUPABASE_BUCKET_NAME)")?;
            Arc::new(SupabaseStorage::from_env(bucket)?)
        }
        StorageBackend::Local => Arc::new(LocalStorage::new(cfg.audio_dir())),
    };

    Ok(Registrar::new(speech, vocabulary, storage, db).with_limits(cfg.limits.clone()))
}

/// Register a category
fn add_category(part: &str, theme: &str, period: &str) -> Result<()> {
    let cfg = config::config()?;
    let db = open_database(cfg)?;
    let user = current_user();

    match CategoryRegistry::new(db).register(user.as_ref(), part, theme, period) {
        Ok(category) => {
            println!("Registered category: {}", category.label());
            println!("ID: {}", category.id);
            Ok(())
        }
        Err(MyeltsError::Duplicate(label)) => {
            eprintln!("Category already exists: {}", label);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// List categories, optionally filtered
fn list_categories(search: Option<&str>) -> Result<()> {
    let cfg = config::config()?;
    let db = open_database(cfg)?;

    let categories = CategoryRegistry::new(db).search_or_empty(search.unwrap_or(""));

    if categories.is_empty() {
        match search {
            Some(query) => println!("No categories match: {}", query),
            None => println!("No categories yet. Use 'myelts category add' to create one."),
        }
        return Ok(());
    }

    println!("{:<38} {}", "ID", "CATEGORY");
    println!("{}", "-".repeat(80));
    for category in &categories {
        println!("{:<38} {}", category.id, category.label());
    }

    println!("\nTotal: {} categories", categories.len());

    Ok(())
}

/// Run the registration pipeline for one question/answer pair
async fn add_qa(category_id: &str, question: &str, answer: &str) -> Result<()> {
    let cfg = config::config()?;
    let user = current_user();
    let user = require_user(user.as_ref())?;
    let db = open_database(cfg)?;
    let registrar = build_registrar(cfg, db)?;

    eprintln!("Generating audio and vocabulary...");

    match registrar
        .register_qa(Some(user), QaInput::new(question, answer, category_id))
        .await
    {
        Ok(registered) => {
            println!("Registered card {}", registered.card.id);
            println!("  Question audio: {}", registered.question.audio_url);
            println!("  Answer audio:   {}", registered.answer.audio_url);
            if registered.words.is_empty() {
                println!("  Vocabulary:     (none)");
            } else {
                println!("  Vocabulary:");
                for word in &registered.words {
                    println!("    {:<20} {}", word.word, word.ipa);
                }
            }
            Ok(())
        }
        Err(e) if e.is_user_error() => {
            eprintln!("Registration rejected: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Registration failed, nothing was saved: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print every card of a category with its vocabulary
fn list_cards(category_id: &str) -> Result<()> {
    let cfg = config::config()?;
    let user = current_user();
    let user: &UserId = require_user(user.as_ref())?;
    let db = open_database(cfg)?;
    let category = find_category(&db, category_id)?;

    let cards = load_cards_or_empty(&db.card_query(), user, &category.id);

    println!("{}", category.label());
    println!("{}", "-".repeat(80));

    if cards.is_empty() {
        println!("No cards yet. Use 'myelts qa add' to register one.");
        return Ok(());
    }

    for (i, card) in cards.iter().enumerate() {
        println!("[{}] Q: {}", i + 1, card.question);
        println!("    A: {}", card.answer);
        for word in &card.words {
            println!("       {:<20} {}", word.word, word.ipa);
        }
    }

    println!("\nTotal: {} cards", cards.len());

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("myelts configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:     {}", cfg.home.display());
    println!("  Database: {}", cfg.database_path().display());
    println!("  Audio:    {}", cfg.audio_dir().display());
    println!();
    println!("Identity: {}", current_user().map(|u| u.to_string()).unwrap_or_else(|| "(not set)".to_string()));
    println!();
    println!("Voice:");
    println!("  Language: {}", cfg.voice.language_code);
    println!("  Name:     {}", cfg.voice.name);
    println!("  Gender:   {}", cfg.voice.gender);
    println!("  Rate:     {}", cfg.voice.speaking_rate);
    println!();
    println!("Vocabulary model: {}", cfg.vocabulary_model);
    println!();
    println!("Storage:");
    println!("  Backend: {:?}", cfg.storage_backend);
    println!("  Bucket:  {}", cfg.storage_bucket.as_deref().unwrap_or("(none)"));
    println!();
    println!("Study:");
    println!("  Settle delay: {}ms", cfg.study.settle_delay_ms);
    println!("  Player:       {}", cfg.study.player.as_deref().unwrap_or("(silent)"));
    println!();
    println!("Limits:");
    println!("  Upstream timeout: {}s", cfg.limits.upstream_timeout_seconds);
    println!("  Max text length:  {} chars", cfg.limits.max_text_chars);

    Ok(())
}
