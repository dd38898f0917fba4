//! Async runtime for a study session.
//!
//! Applies each event to the reducer and carries out the returned effects:
//! playback and settle timers run as tokio tasks that report back through
//! an internal channel. Stopping or cancelling aborts the task; dropping a
//! playback future kills any player process it spawned.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adapters::AudioPlayer;

use super::session::{Effect, StudyEvent, StudySession};

/// Owns a `StudySession` and the tasks its effects started
pub struct SessionDriver {
    session: StudySession,
    player: Arc<dyn AudioPlayer>,
    events_tx: mpsc::UnboundedSender<StudyEvent>,
    events_rx: mpsc::UnboundedReceiver<StudyEvent>,
    playback: Option<JoinHandle<()>>,
    settle: Option<JoinHandle<()>>,
}

impl SessionDriver {
    pub fn new(session: StudySession, player: Arc<dyn AudioPlayer>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session,
            player,
            events_tx,
            events_rx,
            playback: None,
            settle: None,
        }
    }

    pub fn session(&self) -> &StudySession {
        &self.session
    }

    /// Apply an event and perform its effects. Must be called from within
    /// a tokio runtime.
    pub fn dispatch(&mut self, event: StudyEvent) {
        debug!(?event, "Study event");
        for effect in self.session.dispatch(event) {
            self.execute(effect);
        }
    }

    /// Wait for the next completion event (audio finished, settle elapsed).
    /// The driver holds a sender itself, so this never returns `None`
    /// while the driver is alive.
    pub async fn next_event(&mut self) -> Option<StudyEvent> {
        self.events_rx.recv().await
    }

    /// Stop everything; later completions are dropped
    pub fn teardown(&mut self) {
        self.dispatch(StudyEvent::Teardown);
        abort(&mut self.playback);
        abort(&mut self.settle);
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::PlayAudio { url, epoch } => {
                abort(&mut self.playback);
                let player = Arc::clone(&self.player);
                let tx = self.events_tx.clone();
                self.playback = Some(tokio::spawn(async move {
                    // A failed playback still completes so auto-play moves on
                    if let Err(e) = player.play(&url).await {
                        warn!(player = player.name(), %url, error = %e, "Playback failed");
                    }
                    let _ = tx.send(StudyEvent::AudioFinished { epoch });
                }));
            }
            Effect::StopAudio => abort(&mut self.playback),
            Effect::ScheduleSettle { delay, epoch } => {
                abort(&mut self.settle);
                let tx = self.events_tx.clone();
                self.settle = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(StudyEvent::SettleElapsed { epoch });
                }));
            }
            Effect::CancelSettle => abort(&mut self.settle),
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        abort(&mut self.playback);
        abort(&mut self.settle);
    }
}

fn abort(handle: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = handle.take() {
        handle.abort();
    }
}
