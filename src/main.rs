mod config;
mod error;
mod game;
mod notify;
mod scores;
mod ui;
mod words;

use config::{AppPaths, GameConfig};
use error::{Error, Result};
use game::GameSession;
use notify::BellNotifier;
use scores::ScoreLedger;
use std::env;
use std::fs::File;
use std::sync::Mutex;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;
use words::WordSource;

fn main()
{
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()>
{
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {}
        Some("-h") | Some("--help") => {
            print_help();
            return Ok(());
        }
        Some(other) => {
            return Err(Error::Usage(format!("Unknown argument '{other}'. Run with --help.")));
        }
    }

    let paths = AppPaths::from_env();
    init_logging(&paths);
    info!("Falling Words starting");

    let words = WordSource::load(&paths.words);
    info!("Levels: {}", words.levels().collect::<Vec<_>>().join(", "));
    let ledger = ScoreLedger::load(&paths.scores);

    let start = Instant::now();
    let mut session = GameSession::new(
        GameConfig::default(),
        words,
        ledger,
        BellNotifier::spawn(),
        rand::random(),
        0,
    );
    ui::run(&mut session, start)
}

fn init_logging(paths: &AppPaths)
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("falling_words=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);
    match File::create(&paths.log) {
        Ok(file) => builder.with_writer(Mutex::new(file)).init(),
        Err(_) => builder.with_writer(std::io::sink).init(),
    }
}

fn print_help()
{
    println!("falling-words");
    println!("\nUsage:");
    println!("  falling-words");
    println!("\nKeys:");
    println!("  type letters, Space/Enter to submit, Backspace to delete");
    println!("  Ctrl+K clear input, Ctrl+R reset, Ctrl+D difficulty, Ctrl+L level");
    println!("  Ctrl+F toggle background sprites, Esc to quit");
    println!("\nEnvironment:");
    println!("  FALLING_WORDS_CONFIG  word list file (default words_config.json)");
    println!("  FALLING_WORDS_SCORES  high score file (default highscores.json)");
    println!("  FALLING_WORDS_LOG     log file (default falling-words.log)");
    println!("  RUST_LOG              log filter (default falling_words=info)");
}
