//! Study Session Integration Tests
//!
//! Drives the session reducer by hand (completing every effect
//! immediately) and through the tokio driver with a silent player.

use std::sync::Arc;
use std::time::Duration;

use myelts::adapters::NullPlayer;
use myelts::domain::{CardView, ExtractedWord, Side};
use myelts::{Effect, SessionDriver, StudyEvent, StudySession};

fn cards(count: usize) -> Vec<CardView> {
    (0..count)
        .map(|n| CardView {
            card_id: format!("card_{}", n),
            question: format!("Question {}", n),
            question_audio: format!("file:///audio/q{}.mp3", n),
            answer: format!("Answer {}", n),
            answer_audio: format!("file:///audio/a{}.mp3", n),
            words: vec![ExtractedWord::new("quiet", "/ˈkwaɪ.ət/")],
        })
        .collect()
}

fn select(session: &mut StudySession, count: usize) {
    session.dispatch(StudyEvent::SelectCategory {
        category_id: "category".to_string(),
        cards: cards(count),
    });
}

/// Complete every effect at once and return the audio played, in order
fn run_auto_play(session: &mut StudySession) -> Vec<String> {
    let mut played = Vec::new();
    let mut pending = session.dispatch(StudyEvent::ToggleAutoPlay);

    while let Some(effect) = pending.pop() {
        let follow_up = match effect {
            Effect::PlayAudio { url, epoch } => {
                played.push(url);
                session.dispatch(StudyEvent::AudioFinished { epoch })
            }
            Effect::ScheduleSettle { epoch, .. } => {
                session.dispatch(StudyEvent::SettleElapsed { epoch })
            }
            Effect::StopAudio | Effect::CancelSettle => Vec::new(),
        };
        pending.extend(follow_up);
        assert!(played.len() <= 100, "auto-play did not terminate");
    }

    played
}

#[test]
fn test_auto_play_visits_every_side_once_then_stops() {
    let mut session = StudySession::new(Duration::from_millis(1500));
    select(&mut session, 3);

    let played = run_auto_play(&mut session);

    assert_eq!(
        played,
        vec![
            "file:///audio/q0.mp3",
            "file:///audio/a0.mp3",
            "file:///audio/q1.mp3",
            "file:///audio/a1.mp3",
            "file:///audio/q2.mp3",
            "file:///audio/a2.mp3",
        ]
    );
    assert!(!session.is_auto_play());
    assert!(!session.is_audio_playing());
    assert_eq!((session.current_index(), session.side()), (2, Side::Answer));
}

#[test]
fn test_auto_play_starts_from_current_position() {
    let mut session = StudySession::new(Duration::from_millis(1500));
    select(&mut session, 2);
    session.dispatch(StudyEvent::Flip);

    let played = run_auto_play(&mut session);

    assert_eq!(
        played,
        vec![
            "file:///audio/a0.mp3",
            "file:///audio/q1.mp3",
            "file:///audio/a1.mp3",
        ]
    );
}

#[test]
fn test_cancel_during_settle() {
    let mut session = StudySession::new(Duration::from_millis(1500));
    select(&mut session, 2);

    let effects = session.dispatch(StudyEvent::ToggleAutoPlay);
    let Some(Effect::PlayAudio { epoch, .. }) = effects.into_iter().last() else {
        panic!("auto-play should start playback");
    };

    let effects = session.dispatch(StudyEvent::AudioFinished { epoch });
    assert_eq!(
        effects,
        vec![Effect::ScheduleSettle {
            delay: Duration::from_millis(1500),
            epoch,
        }]
    );

    // User stops auto-play inside the settle window
    let effects = session.dispatch(StudyEvent::ToggleAutoPlay);
    assert_eq!(effects, vec![Effect::CancelSettle]);

    // The timer fires anyway: nothing happens
    assert!(session
        .dispatch(StudyEvent::SettleElapsed { epoch })
        .is_empty());
    assert_eq!((session.current_index(), session.side()), (0, Side::Question));
    assert!(!session.is_auto_play());
}

#[test]
fn test_empty_category_is_inert() {
    let mut session = StudySession::new(Duration::from_millis(1500));
    select(&mut session, 0);

    assert!(session.is_empty());
    assert!(session.current_card().is_none());

    let played = run_auto_play(&mut session);
    assert!(played.is_empty());
    assert!(!session.is_auto_play());

    for event in [StudyEvent::Flip, StudyEvent::Next, StudyEvent::TogglePlayAudio] {
        assert!(session.dispatch(event).is_empty());
    }
    assert_eq!(session.side(), Side::Question);
}

#[test]
fn test_next_shows_question_side() {
    let mut session = StudySession::new(Duration::from_millis(1500));
    select(&mut session, 3);

    session.dispatch(StudyEvent::Flip);
    assert_eq!(session.side(), Side::Answer);
    assert_eq!(session.current_card().unwrap().text(session.side()), "Answer 0");

    session.dispatch(StudyEvent::Next);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.side(), Side::Question);
    assert_eq!(session.current_card().unwrap().text(session.side()), "Question 1");
}

#[test]
fn test_reselecting_category_exits_auto_play() {
    let mut session = StudySession::new(Duration::from_millis(1500));
    select(&mut session, 2);
    session.dispatch(StudyEvent::ToggleAutoPlay);
    assert!(session.is_audio_playing());

    let effects = session.dispatch(StudyEvent::SelectCategory {
        category_id: "other".to_string(),
        cards: cards(1),
    });

    assert_eq!(effects, vec![Effect::StopAudio]);
    assert!(!session.is_auto_play());
    assert_eq!(session.cards().len(), 1);
}

#[tokio::test]
async fn test_driver_auto_play_with_silent_player() {
    let player = Arc::new(NullPlayer::with_duration(Duration::from_millis(5)));
    let mut driver = SessionDriver::new(StudySession::new(Duration::from_millis(5)), player);
    driver.dispatch(StudyEvent::SelectCategory {
        category_id: "category".to_string(),
        cards: cards(3),
    });
    driver.dispatch(StudyEvent::ToggleAutoPlay);

    let mut visited = vec![(driver.session().current_index(), driver.session().side())];

    tokio::time::timeout(Duration::from_secs(5), async {
        while driver.session().is_auto_play() {
            let event = driver.next_event().await.unwrap();
            driver.dispatch(event);
            let position = (driver.session().current_index(), driver.session().side());
            if visited.last() != Some(&position) {
                visited.push(position);
            }
        }
    })
    .await
    .expect("auto-play should finish");

    assert_eq!(
        visited,
        vec![
            (0, Side::Question),
            (0, Side::Answer),
            (1, Side::Question),
            (1, Side::Answer),
            (2, Side::Question),
            (2, Side::Answer),
        ]
    );
}

#[tokio::test]
async fn test_driver_stop_audio_drops_completion() {
    let player = Arc::new(NullPlayer::with_duration(Duration::from_millis(100)));
    let mut driver = SessionDriver::new(StudySession::new(Duration::from_millis(5)), player);
    driver.dispatch(StudyEvent::SelectCategory {
        category_id: "category".to_string(),
        cards: cards(1),
    });

    driver.dispatch(StudyEvent::TogglePlayAudio);
    assert!(driver.session().is_audio_playing());

    driver.dispatch(StudyEvent::TogglePlayAudio);
    assert!(!driver.session().is_audio_playing());

    // The aborted playback never reports back
    let next = tokio::time::timeout(Duration::from_millis(300), driver.next_event()).await;
    assert!(next.is_err());
}
