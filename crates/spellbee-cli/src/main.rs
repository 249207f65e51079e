//! spellbee CLI — spelling quiz server and terminal game.
//!
//! ```text
//! spellbee serve [--port 2004] [--host 127.0.0.1] [--words words.txt] ...
//! spellbee play [--rounds 10] [--voice af_heart] [--rate slow]
//! spellbee leaderboard [--limit 10]
//! spellbee words [--words words.txt]
//! ```

mod playback;
mod quiz;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use spellbee_lib::audio::HttpSynthesizer;
use spellbee_lib::game::SpellingGame;
use spellbee_lib::spellbee_core::types::{GameConfig, Rate, SynthesisConfig, VoiceParams};

/// spellbee — hear a word, spell it
#[derive(Parser)]
#[command(name = "spellbee", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the quiz HTTP server
    Serve {
        /// Listen port
        #[arg(long, default_value = "2004")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Play in the terminal
    Play {
        /// Number of words to play
        #[arg(long, default_value = "10")]
        rounds: usize,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Print the leaderboard
    Leaderboard {
        /// Leaderboard file
        #[arg(long, default_value = "leaderboard.json")]
        leaderboard: PathBuf,
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Validate the word list
    Words {
        /// Word list, one word per line
        #[arg(long, default_value = "words.txt")]
        words: PathBuf,
    },
}

#[derive(Args)]
struct GameArgs {
    /// Word list, one word per line
    #[arg(long, default_value = "words.txt")]
    words: PathBuf,
    /// Directory for synthesized audio
    #[arg(long, default_value = "word_files")]
    cache_dir: PathBuf,
    /// Leaderboard file
    #[arg(long, default_value = "leaderboard.json")]
    leaderboard: PathBuf,
    /// Kokoro TTS server URL
    #[arg(long, default_value = "http://localhost:3001")]
    kokoro_url: String,
    /// TTS voice
    #[arg(long, default_value = "af_heart")]
    voice: String,
    /// TTS language code
    #[arg(long, default_value = "en-us")]
    language: String,
    /// Speaking rate: normal or slow
    #[arg(long, default_value = "normal")]
    rate: Rate,
    /// Seconds to wait for synthesis before giving up on a word
    #[arg(long, default_value = "15")]
    synth_timeout: u64,
    /// Minutes before an idle session expires
    #[arg(long, default_value = "30")]
    session_ttl: u64,
}

impl GameArgs {
    fn config(self) -> GameConfig {
        GameConfig {
            words_path: self.words,
            cache_dir: self.cache_dir,
            leaderboard_path: self.leaderboard,
            session_ttl: Duration::from_secs(self.session_ttl * 60),
            synthesis: SynthesisConfig {
                url: self.kokoro_url,
                voice: VoiceParams {
                    voice: self.voice,
                    language: self.language,
                    rate: self.rate,
                },
                timeout: Duration::from_secs(self.synth_timeout),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // The server logs its activity; the terminal game keeps stdout for play.
    let default_filter = match cli.command {
        Command::Serve { .. } => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { port, host, game } => {
            let config = game.config();
            let synth = HttpSynthesizer::new(&config.synthesis)?;
            let game = Arc::new(SpellingGame::open(&config, synth).await?);
            let app = spellbee_lib::server::router(game);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("spellbee listening on {addr}");

            axum::serve(listener, app).await?;
        }

        Command::Play { rounds, game } => {
            let config = game.config();
            let synth = HttpSynthesizer::new(&config.synthesis)?;
            let game = SpellingGame::open(&config, synth).await?;
            quiz::run(&game, rounds).await?;
        }

        Command::Leaderboard { leaderboard, limit } => {
            let board = spellbee_lib::leaderboard::load(&leaderboard).await;
            quiz::print_leaderboard(board.top(limit));
        }

        Command::Words { words } => {
            let catalog = spellbee_lib::catalog::load(&words).await?;
            println!("{} words", catalog.len());
            for line in catalog.skipped() {
                println!("skipped: {line}");
            }
        }
    }

    Ok(())
}
