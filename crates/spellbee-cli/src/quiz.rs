//! Terminal quiz — the interactive command-line variant of the game.

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use spellbee_lib::audio::Synthesizer;
use spellbee_lib::error::{GameError, SessionError};
use spellbee_lib::game::SpellingGame;
use spellbee_lib::spellbee_core::session::GuessOutcome;

use crate::playback;

const RULE: &str = "----------------------------------------------------------";

/// Play `rounds` words with one player, then record and show the result.
pub async fn run<S: Synthesizer>(game: &SpellingGame<S>, rounds: usize) -> Result<(), GameError> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let token = game.new_session();

    loop {
        let Some(name) = prompt(&mut input, "Your name: ").await? else {
            return Ok(());
        };
        match game.set_name(token, &name) {
            Ok(_) => break,
            Err(SessionError::InvalidIdentity) => println!("Please enter a name."),
            Err(e) => return Err(e.into()),
        }
    }

    'rounds: for round in 1..=rounds {
        let artifact = match game.play(token).await {
            Ok(artifact) => artifact,
            Err(GameError::Synthesis(e)) => {
                println!("Audio unavailable for round {round} ({e}), skipping.");
                continue;
            }
            Err(e) => return Err(e),
        };

        println!("{RULE}");
        println!("Round {round}/{rounds}: enter your spelling of the word just played");
        println!("Input '?' to replay the sound of the word");
        println!("{RULE}");
        play(artifact.path.clone()).await;

        loop {
            let Some(text) = prompt(&mut input, "> ").await? else {
                break 'rounds;
            };
            match game.submit_guess(token, &text)? {
                GuessOutcome::Replay { artifact, .. } => {
                    println!("Replaying sound");
                    if let Some(artifact) = artifact {
                        play(artifact.path).await;
                    }
                }
                GuessOutcome::Correct { word } => {
                    println!("Correct! - {word}");
                    break;
                }
                GuessOutcome::Wrong { expected, guess } => {
                    println!("Wrong! You spelled {guess}. It should be {expected}");
                    break;
                }
            }
        }
        game.next_round(token);
    }

    let summary = game.session_summary(token);
    if let Some(entry) = game.finish_session(token).await? {
        println!("{RULE}");
        println!(
            "{}: {} correct ({}%)",
            entry.name, entry.final_score, entry.correct_percentage
        );
        if !summary.wrong_words.is_empty() {
            println!("Practice these: {}", summary.wrong_words.join(", "));
        }
    }

    println!("{RULE}");
    print_leaderboard(&game.leaderboard().top(5).await);
    Ok(())
}

/// Print ranked entries as a numbered table.
pub fn print_leaderboard(entries: &[spellbee_lib::spellbee_core::leaderboard::LeaderboardEntry]) {
    if entries.is_empty() {
        println!("Leaderboard is empty.");
        return;
    }
    for (i, e) in entries.iter().enumerate() {
        println!(
            "{:>3}. {:<20} {:>4}  {:>6.2}%",
            i + 1,
            e.name,
            e.final_score,
            e.correct_percentage
        );
    }
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, label: &str) -> std::io::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?.map(|line| line.trim_end_matches(['\r', '\n']).to_string()))
}

async fn play(path: PathBuf) {
    let result = tokio::task::spawn_blocking(move || playback::play_file(&path)).await;
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("playback: {e}"),
        Err(e) => warn!("playback task failed: {e}"),
    }
}
