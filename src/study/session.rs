//! Flip-card study session as an explicit state machine.
//!
//! `StudySession::dispatch` is a pure reducer: it takes one `StudyEvent`,
//! updates the state and returns the `Effect`s the caller must perform
//! (start or stop audio, schedule or cancel the settle timer). Nothing here
//! touches clocks or audio devices.
//!
//! Every playback and every settle timer is tagged with the session epoch.
//! Stopping audio, cancelling auto-play or tearing the session down bumps
//! the epoch, so completion events from the old epoch are ignored.

use std::time::Duration;

use crate::domain::{CardView, Side};

/// Inputs to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyEvent {
    /// Load the cards of a category and start from the first question
    SelectCategory {
        category_id: String,
        cards: Vec<CardView>,
    },
    Flip,
    Next,
    TogglePlayAudio,
    ToggleAutoPlay,
    /// Playback started in `epoch` ended on its own
    AudioFinished { epoch: u64 },
    /// Settle timer started in `epoch` fired
    SettleElapsed { epoch: u64 },
    /// The view is going away; nothing may fire afterwards
    Teardown,
}

/// Side effects requested by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PlayAudio { url: String, epoch: u64 },
    StopAudio,
    ScheduleSettle { delay: Duration, epoch: u64 },
    CancelSettle,
}

/// Study session state
#[derive(Debug, Clone)]
pub struct StudySession {
    category_id: Option<String>,
    cards: Vec<CardView>,
    current_index: usize,
    side: Side,
    auto_play: bool,
    audio_playing: bool,
    settle_pending: bool,
    epoch: u64,
    settle_delay: Duration,
    torn_down: bool,
}

impl StudySession {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            category_id: None,
            cards: Vec::new(),
            current_index: 0,
            side: Side::Question,
            auto_play: false,
            audio_playing: false,
            settle_pending: false,
            epoch: 0,
            settle_delay,
            torn_down: false,
        }
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn current_card(&self) -> Option<&CardView> {
        self.cards.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn is_audio_playing(&self) -> bool {
        self.audio_playing
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.cards.len()
    }

    pub fn can_flip(&self) -> bool {
        !self.is_empty() && !self.auto_play
    }

    pub fn can_next(&self) -> bool {
        !self.is_empty() && !self.auto_play && !self.is_last()
    }

    pub fn can_play_audio(&self) -> bool {
        !self.is_empty() && !self.auto_play
    }

    pub fn can_auto_play(&self) -> bool {
        !self.is_empty()
    }

    /// Apply one event and return the effects to perform
    pub fn dispatch(&mut self, event: StudyEvent) -> Vec<Effect> {
        if self.torn_down {
            return Vec::new();
        }

        match event {
            StudyEvent::SelectCategory { category_id, cards } => {
                self.auto_play = false;
                let effects = self.halt();
                self.category_id = Some(category_id);
                self.cards = cards;
                self.current_index = 0;
                self.side = Side::Question;
                effects
            }

            StudyEvent::Flip => {
                if !self.can_flip() {
                    return Vec::new();
                }
                let effects = self.halt();
                self.side = self.side.flipped();
                effects
            }

            StudyEvent::Next => {
                if !self.can_next() {
                    return Vec::new();
                }
                let effects = self.halt();
                self.current_index += 1;
                self.side = Side::Question;
                effects
            }

            StudyEvent::TogglePlayAudio => {
                if !self.can_play_audio() {
                    return Vec::new();
                }
                if self.audio_playing {
                    self.halt()
                } else {
                    self.play_current()
                }
            }

            StudyEvent::ToggleAutoPlay => {
                if self.auto_play {
                    self.auto_play = false;
                    return self.halt();
                }
                if !self.can_auto_play() {
                    return Vec::new();
                }
                let mut effects = self.halt();
                self.auto_play = true;
                effects.extend(self.play_current());
                effects
            }

            StudyEvent::AudioFinished { epoch } => {
                if epoch != self.epoch || !self.audio_playing {
                    return Vec::new();
                }
                self.audio_playing = false;
                if !self.auto_play {
                    return Vec::new();
                }
                self.settle_pending = true;
                vec![Effect::ScheduleSettle {
                    delay: self.settle_delay,
                    epoch: self.epoch,
                }]
            }

            StudyEvent::SettleElapsed { epoch } => {
                if epoch != self.epoch || !self.settle_pending || !self.auto_play {
                    return Vec::new();
                }
                self.settle_pending = false;
                self.advance_auto_play()
            }

            StudyEvent::Teardown => {
                self.auto_play = false;
                let effects = self.halt();
                self.torn_down = true;
                effects
            }
        }
    }

    /// Step auto-play after a settle delay: question → answer → next card.
    /// The last card's answer ends auto-play.
    fn advance_auto_play(&mut self) -> Vec<Effect> {
        match self.side {
            Side::Question => {
                self.side = Side::Answer;
            }
            Side::Answer if !self.is_last() => {
                self.current_index += 1;
                self.side = Side::Question;
            }
            Side::Answer => {
                self.auto_play = false;
                self.epoch += 1;
                return Vec::new();
            }
        }
        self.play_current()
    }

    /// Start playback of the visible side in a fresh epoch
    fn play_current(&mut self) -> Vec<Effect> {
        let Some(card) = self.cards.get(self.current_index) else {
            return Vec::new();
        };
        let url = card.audio(self.side).to_string();

        self.epoch += 1;
        self.audio_playing = true;
        vec![Effect::PlayAudio {
            url,
            epoch: self.epoch,
        }]
    }

    /// Stop audio, cancel the settle timer and invalidate the epoch
    fn halt(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.audio_playing {
            self.audio_playing = false;
            effects.push(Effect::StopAudio);
        }
        if self.settle_pending {
            self.settle_pending = false;
            effects.push(Effect::CancelSettle);
        }
        self.epoch += 1;
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(n: usize) -> CardView {
        CardView {
            card_id: format!("card_{}", n),
            question: format!("Question {}", n),
            question_audio: format!("q{}.mp3", n),
            answer: format!("Answer {}", n),
            answer_audio: format!("a{}.mp3", n),
            words: Vec::new(),
        }
    }

    fn session_with(count: usize) -> StudySession {
        let mut session = StudySession::new(Duration::from_millis(1500));
        session.dispatch(StudyEvent::SelectCategory {
            category_id: "cat".to_string(),
            cards: (0..count).map(card).collect(),
        });
        session
    }

    fn play_epoch(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::PlayAudio { epoch, .. } => Some(*epoch),
                _ => None,
            })
            .expect("expected PlayAudio")
    }

    #[test]
    fn test_select_category_resets_position() {
        let mut session = session_with(3);
        session.dispatch(StudyEvent::Next);
        session.dispatch(StudyEvent::Flip);
        assert_eq!((session.current_index(), session.side()), (1, Side::Answer));

        session.dispatch(StudyEvent::SelectCategory {
            category_id: "other".to_string(),
            cards: vec![card(9)],
        });
        assert_eq!(session.category_id(), Some("other"));
        assert_eq!((session.current_index(), session.side()), (0, Side::Question));
    }

    #[test]
    fn test_flip_stops_audio() {
        let mut session = session_with(2);
        session.dispatch(StudyEvent::TogglePlayAudio);
        assert!(session.is_audio_playing());

        let effects = session.dispatch(StudyEvent::Flip);
        assert_eq!(effects, vec![Effect::StopAudio]);
        assert_eq!(session.side(), Side::Answer);
        assert!(!session.is_audio_playing());
    }

    #[test]
    fn test_next_resets_side_and_stops_at_last() {
        let mut session = session_with(2);
        session.dispatch(StudyEvent::Flip);
        session.dispatch(StudyEvent::Next);
        assert_eq!((session.current_index(), session.side()), (1, Side::Question));

        assert!(session.dispatch(StudyEvent::Next).is_empty());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_play_audio_uses_current_side() {
        let mut session = session_with(1);
        let effects = session.dispatch(StudyEvent::TogglePlayAudio);
        assert!(matches!(&effects[0], Effect::PlayAudio { url, .. } if url == "q0.mp3"));

        // Natural completion clears the flag, no settle outside auto-play
        let epoch = play_epoch(&effects);
        assert!(session.dispatch(StudyEvent::AudioFinished { epoch }).is_empty());
        assert!(!session.is_audio_playing());

        session.dispatch(StudyEvent::Flip);
        let effects = session.dispatch(StudyEvent::TogglePlayAudio);
        assert!(matches!(&effects[0], Effect::PlayAudio { url, .. } if url == "a0.mp3"));

        // Toggling again stops
        assert_eq!(session.dispatch(StudyEvent::TogglePlayAudio), vec![Effect::StopAudio]);
    }

    #[test]
    fn test_manual_controls_disabled_during_auto_play() {
        let mut session = session_with(2);
        session.dispatch(StudyEvent::ToggleAutoPlay);

        assert!(session.dispatch(StudyEvent::Flip).is_empty());
        assert!(session.dispatch(StudyEvent::Next).is_empty());
        assert!(session.dispatch(StudyEvent::TogglePlayAudio).is_empty());
        assert_eq!((session.current_index(), session.side()), (0, Side::Question));
    }

    #[test]
    fn test_stale_audio_event_ignored() {
        let mut session = session_with(2);
        let effects = session.dispatch(StudyEvent::ToggleAutoPlay);
        let stale = play_epoch(&effects);

        session.dispatch(StudyEvent::ToggleAutoPlay);
        session.dispatch(StudyEvent::ToggleAutoPlay);

        assert!(session
            .dispatch(StudyEvent::AudioFinished { epoch: stale })
            .is_empty());
        assert!(session.is_audio_playing());
    }

    #[test]
    fn test_empty_session_is_inert() {
        let mut session = session_with(0);

        assert!(session.current_card().is_none());
        assert!(!session.can_flip());
        assert!(!session.can_next());
        assert!(!session.can_play_audio());
        assert!(!session.can_auto_play());

        for event in [
            StudyEvent::Flip,
            StudyEvent::Next,
            StudyEvent::TogglePlayAudio,
            StudyEvent::ToggleAutoPlay,
        ] {
            assert!(session.dispatch(event).is_empty());
        }
        assert!(!session.is_auto_play());
    }

    #[test]
    fn test_teardown_cancels_everything() {
        let mut session = session_with(2);
        let effects = session.dispatch(StudyEvent::ToggleAutoPlay);
        let epoch = play_epoch(&effects);
        session.dispatch(StudyEvent::AudioFinished { epoch });

        let effects = session.dispatch(StudyEvent::Teardown);
        assert_eq!(effects, vec![Effect::CancelSettle]);

        assert!(session
            .dispatch(StudyEvent::SettleElapsed { epoch })
            .is_empty());
        assert!(session.dispatch(StudyEvent::ToggleAutoPlay).is_empty());
        assert_eq!(session.side(), Side::Question);
    }
}
