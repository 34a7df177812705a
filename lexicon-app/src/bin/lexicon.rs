//! `lexicon`: command-line front end for Lexicon Luminary.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexicon_app::{AppError, Session, resolve_api_key};
use lexicon_core::LexiconConfig;
use lexicon_core::quest::{QuestState, Verdict};
use lexicon_core::types::{Theme, Word, WordAction, WordFilter, WordId};
use lexicon_llm::GenerationClient;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "lexicon.toml";

#[derive(Parser)]
#[command(name = "lexicon", about = "Lexicon Luminary: grow your vocabulary", version)]
struct Cli {
    /// Configuration file (default: ./lexicon.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a batch of new words
    Generate {
        /// Academic, Scientific, Literary, Corporate, or any custom theme
        #[arg(long)]
        theme: Option<String>,
        /// Number of words (default: generation.batch_size)
        #[arg(long)]
        count: Option<usize>,
    },

    /// List collected words
    List {
        /// Show only favorites
        #[arg(long)]
        favorites: bool,
    },

    /// Show one word in full
    Show {
        /// Word id
        id: String,
    },

    /// Toggle thumbs up on a word
    Like {
        /// Word id
        id: String,
    },

    /// Toggle thumbs down on a word
    Dislike {
        /// Word id
        id: String,
    },

    /// Toggle the favorite star on a word
    Favorite {
        /// Word id
        id: String,
    },

    /// Pronounce a word
    Speak {
        /// Word id
        id: String,
    },

    /// Play the etymology quest interactively
    Quest {
        /// Start at this level
        #[arg(long)]
        level: Option<u32>,
    },

    /// Export the word bank to a JSON file
    Export {
        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Print to stdout instead
        #[arg(long)]
        stdout: bool,
    },

    /// Replace the word bank with an exported file ("-" for stdin)
    Import {
        /// File to import
        file: PathBuf,
    },

    /// Delete all saved data
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show progress counters
    Stats,
}

fn load_config(path: Option<&Path>) -> Result<LexiconConfig> {
    match path {
        Some(path) => LexiconConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            LexiconConfig::from_file(Path::new(DEFAULT_CONFIG)).context("failed to load lexicon.toml")
        }
        None => Ok(LexiconConfig::default()),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.general.log_level);

    let api_key = resolve_api_key(&config.llm, |name| std::env::var(name).ok())?;
    let generator = GenerationClient::from_config(&config.llm, api_key)?;
    let mut session = Session::open(config, generator)?;

    match cli.command {
        Command::Generate { theme, count } => {
            let theme = match theme {
                Some(t) => t.parse::<Theme>().map_err(anyhow::Error::msg)?,
                None => session.default_theme(),
            };
            let count = count.unwrap_or(session.config().generation.batch_size);
            let words = session.generate_words_n(&theme, count).await?;
            print_words(words.iter(), &cli.format)?;
        }
        Command::List { favorites } => {
            let filter = if favorites { WordFilter::FavoritesOnly } else { WordFilter::All };
            print_words(session.words(filter), &cli.format)?;
        }
        Command::Show { id } => {
            let word = session.word(&WordId::from(id.as_str()))?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(word)?),
                OutputFormat::Plain => print_entry(word),
            }
        }
        Command::Like { id } => act(&mut session, &id, WordAction::Like)?,
        Command::Dislike { id } => act(&mut session, &id, WordAction::Dislike)?,
        Command::Favorite { id } => act(&mut session, &id, WordAction::Favorite)?,
        Command::Speak { id } => {
            if !session.speak(&WordId::from(id.as_str()))? {
                eprintln!("Speech synthesis not supported on this system.");
            }
        }
        Command::Quest { level } => run_quest(&mut session, level).await?,
        Command::Export { dir, stdout } => {
            if stdout {
                println!("{}", session.export_text()?);
            } else {
                let path = session.export_to_dir(&dir)?;
                println!("Exported {} words to {}", session.bank().len(), path.display());
            }
        }
        Command::Import { file } => {
            let text = if file.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?
            };
            session.import_text(&text)?;
            println!("Imported {} words.", session.bank().len());
        }
        Command::Clear { yes } => {
            if !yes && !confirm("Delete all saved words? [y/N] ")? {
                println!("Nothing deleted.");
                return Ok(());
            }
            session.clear_storage()?;
            println!("All saved data cleared.");
        }
        Command::Stats => {
            let stats = session.stats();
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Plain => {
                    println!("Words collected: {}", stats.words);
                    println!("Favorites:       {}", stats.favorites);
                    println!("Liked:           {}", stats.liked);
                    println!("Disliked:        {}", stats.disliked);
                }
            }
        }
    }

    Ok(())
}

fn act(session: &mut Session<GenerationClient>, id: &str, action: WordAction) -> Result<()> {
    if session.apply_action(&WordId::from(id), action)? {
        let word = session.word(&WordId::from(id))?;
        println!("{}  {}", word.word, flags(word));
    } else {
        eprintln!("No word with id '{id}'; nothing changed.");
    }
    Ok(())
}

fn flags(word: &Word) -> String {
    let mut out = String::new();
    if word.favorited {
        out.push('★');
    }
    if word.liked {
        out.push_str("👍");
    }
    if word.disliked {
        out.push_str("👎");
    }
    out
}

fn print_words<'a>(words: impl Iterator<Item = &'a Word>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let words: Vec<&Word> = words.collect();
            println!("{}", serde_json::to_string_pretty(&words)?);
        }
        OutputFormat::Plain => {
            let mut any = false;
            for word in words {
                any = true;
                println!("{}  {:<20} {:<12} {}", word.id, word.word, word.theme, flags(word));
                println!("    {}", word.definition);
            }
            if !any {
                println!("(no words yet; try `lexicon generate`)");
            }
        }
    }
    Ok(())
}

fn print_entry(word: &Word) {
    println!("{}  {}", word.word, word.ipa);
    println!("Theme: {}  {}", word.theme, flags(word));
    println!();
    println!("Definition: {}", word.definition);
    println!("Etymology:  {}", word.etymology);
    println!("History:    {}", word.history);
    println!("Mnemonic:   {}", word.mnemonic);
    println!("Spelling:   {}", word.spelling_tip);
    for example in &word.examples {
        println!("  • {example}");
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

async fn run_quest(session: &mut Session<GenerationClient>, level: Option<u32>) -> Result<()> {
    println!("Etymology quest. Type your answer, :next, :level N, or :quit.");

    let mut pending = Some(match level {
        Some(level) => session.set_level(level),
        None => session.begin_quest(),
    });

    let stdin = std::io::stdin();
    loop {
        if let Some(request) = pending.take() {
            println!("\nLevel {} ... consulting the archives", request.level);
            let result = request.fetch(session.generator().as_ref()).await;
            if let Err(e) = session.finish_quest(request.ticket, result) {
                eprintln!("Could not load a riddle: {e}. Type :next to retry.");
            }
        }

        if let QuestState::Presented { quest } = session.quest().state() {
            println!("\n[{} · level {}]\n{}", quest.difficulty, quest.level, quest.riddle);
        }

        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            ":quit" | ":q" => break,
            ":next" | ":n" => pending = Some(session.begin_quest()),
            _ if input.starts_with(":level") => {
                match input.trim_start_matches(":level").trim().parse::<u32>() {
                    Ok(level) => pending = Some(session.set_level(level)),
                    Err(_) => eprintln!("Usage: :level N"),
                }
            }
            _ => match session.submit_answer(input).await {
                Ok(Some(outcome)) => {
                    let judgement = outcome.judgement;
                    if judgement.verdict == Verdict::Correct {
                        println!("Correct! +{} points (score {})", judgement.points, judgement.score);
                        if let Some(word) = outcome.unlocked {
                            println!("\"{}\" has been added to your collection.", word.word);
                        }
                    } else {
                        println!("Not quite. The answer was \"{}\".", judgement.answer);
                    }
                    println!("Type :next for another riddle.");
                }
                Ok(None) => {}
                Err(AppError::NoActiveQuest) => println!("No riddle on screen; type :next."),
                Err(e) => return Err(e.into()),
            },
        }
    }

    println!("Final score: {} (level {})", session.quest().score(), session.quest().level());
    Ok(())
}
