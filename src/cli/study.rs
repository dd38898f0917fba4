//! Interactive study screen.
//!
//! Reads one-letter commands from stdin while the session driver plays
//! audio and advances auto-play in the background.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::adapters::{AudioPlayer, CommandPlayer, NullPlayer};
use crate::auth::UserId;
use crate::config::StudySettings;
use crate::domain::{Category, Side};
use crate::store::{load_cards_or_empty, Database};
use crate::study::{SessionDriver, StudyEvent, StudySession};

/// A parsed keyboard command
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Event(StudyEvent),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let event = match line.trim().to_lowercase().as_str() {
        "f" | "flip" => StudyEvent::Flip,
        "n" | "next" => StudyEvent::Next,
        "p" | "play" => StudyEvent::TogglePlayAudio,
        "a" | "auto" => StudyEvent::ToggleAutoPlay,
        "q" | "quit" => return Some(Input::Quit),
        _ => return None,
    };
    Some(Input::Event(event))
}

/// Player configured under `study.player`, or a silent one
fn build_player(settings: &StudySettings) -> Result<Arc<dyn AudioPlayer>> {
    match settings.player.as_deref() {
        Some(command) => Ok(Arc::new(CommandPlayer::from_command_line(command)?)),
        None => Ok(Arc::new(NullPlayer::new())),
    }
}

/// What the screen shows; redraw only when it changes
type Screen = (usize, Side, bool, bool);

fn screen(session: &StudySession) -> Screen {
    (
        session.current_index(),
        session.side(),
        session.is_auto_play(),
        session.is_audio_playing(),
    )
}

fn render(session: &StudySession, category: &Category) {
    println!();
    println!("{}", category.label());
    println!("{}", "-".repeat(60));

    let Some(card) = session.current_card() else {
        println!("No cards in this category yet. Use 'myelts qa add' to register one.");
        println!("[q] quit");
        return;
    };

    let mut status = format!(
        "Card {}/{}  [{}]",
        session.current_index() + 1,
        session.cards().len(),
        session.side()
    );
    if session.is_auto_play() {
        status.push_str("  auto-play");
    }
    if session.is_audio_playing() {
        status.push_str("  ♪");
    }
    println!("{}", status);
    println!();
    println!("  {}", card.text(session.side()));

    if session.side() == Side::Answer && !card.words.is_empty() {
        println!();
        println!("  Vocabulary:");
        for word in &card.words {
            println!("    {:<20} {}", word.word, word.ipa);
        }
    }

    let mut controls = Vec::new();
    if session.can_flip() {
        controls.push("[f] flip");
    }
    if session.can_next() {
        controls.push("[n] next");
    }
    if session.can_play_audio() {
        controls.push(if session.is_audio_playing() {
            "[p] stop"
        } else {
            "[p] play"
        });
    }
    if session.can_auto_play() {
        controls.push(if session.is_auto_play() {
            "[a] stop auto-play"
        } else {
            "[a] auto-play"
        });
    }
    controls.push("[q] quit");

    println!();
    println!("{}", controls.join("  "));
}

/// Run the study screen until the user quits or stdin closes
pub async fn run(
    db: &Database,
    user: &UserId,
    category: &Category,
    auto: bool,
    settings: &StudySettings,
) -> Result<()> {
    let cards = load_cards_or_empty(&db.card_query(), user, &category.id);
    let player = build_player(settings)?;

    let mut driver = SessionDriver::new(StudySession::new(settings.settle_delay()), player);
    driver.dispatch(StudyEvent::SelectCategory {
        category_id: category.id.clone(),
        cards,
    });
    if auto {
        driver.dispatch(StudyEvent::ToggleAutoPlay);
    }

    render(driver.session(), category);
    let mut shown = screen(driver.session());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    Some(Input::Quit) => break,
                    Some(Input::Event(event)) => driver.dispatch(event),
                    None => {
                        if !line.trim().is_empty() {
                            println!("Unknown command: {}", line.trim());
                        }
                        continue;
                    }
                }
            }
            Some(event) = driver.next_event() => driver.dispatch(event),
        }

        let current = screen(driver.session());
        if current != shown {
            render(driver.session(), category);
            shown = current;
        }
    }

    driver.teardown();
    Ok(())
}
