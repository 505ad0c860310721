use morselink_core::{SignalEvent, SignalLevel};
use tokio::time::{sleep, Duration};
use tracing::debug;

// MARK: - SignalSink

/// Applies flash effects. Supplied by the presentation layer; the player
/// never knows how a level is rendered.
pub trait SignalSink: Send {
    fn set_level(&mut self, level: SignalLevel);

    /// Called exactly once when the timeline ends, or by the owner after
    /// aborting playback early.
    fn finish(&mut self);
}

// MARK: - Playback

/// Cursor over a materialised timeline.
///
/// A single external driver applies the current step and advances after the
/// step's duration. There is no internal timer and no recursion, so the
/// position is inspectable and cancellable at any step.
#[derive(Debug)]
pub struct Playback {
    timeline: Vec<SignalEvent>,
    index: usize,
    aborted: bool,
}

impl Playback {
    pub fn new(timeline: Vec<SignalEvent>) -> Self {
        Self { timeline, index: 0, aborted: false }
    }

    /// Step the cursor sits on, if any.
    pub fn current(&self) -> Option<&SignalEvent> {
        if self.aborted {
            None
        } else {
            self.timeline.get(self.index)
        }
    }

    /// Move past the current step and return the next one.
    pub fn advance(&mut self) -> Option<&SignalEvent> {
        if self.aborted {
            return None;
        }
        if self.index < self.timeline.len() {
            self.index += 1;
        }
        self.timeline.get(self.index)
    }

    /// Terminal: no further steps are produced.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_finished(&self) -> bool {
        self.aborted || self.index >= self.timeline.len()
    }
}

// MARK: - play

/// Drive a timeline against `sink`, one pending timer at a time.
///
/// Each step applies its level, sleeps for its duration, then advances.
/// `sink.finish()` runs exactly once when the timeline is exhausted. To end
/// playback early, abort the task driving this future and call `finish`
/// from the owner.
pub async fn play<S: SignalSink>(timeline: Vec<SignalEvent>, sink: &mut S) {
    debug!("playing timeline of {} steps", timeline.len());
    let mut playback = Playback::new(timeline);
    while let Some(step) = playback.current().copied() {
        sink.set_level(step.level);
        sleep(Duration::from_millis(step.duration_ms)).await;
        playback.advance();
    }
    sink.finish();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        levels: Vec<SignalLevel>,
        finished: u32,
    }

    impl SignalSink for RecordingSink {
        fn set_level(&mut self, level: SignalLevel) {
            self.levels.push(level);
        }

        fn finish(&mut self) {
            self.finished += 1;
        }
    }

    fn short_timeline() -> Vec<SignalEvent> {
        vec![
            SignalEvent::new(SignalLevel::Off, 1),
            SignalEvent::new(SignalLevel::On, 1),
            SignalEvent::new(SignalLevel::Off, 1),
        ]
    }

    #[test]
    fn cursor_walks_the_timeline_once() {
        let mut playback = Playback::new(short_timeline());

        assert_eq!(playback.current().unwrap().level, SignalLevel::Off);
        assert_eq!(playback.advance().unwrap().level, SignalLevel::On);
        assert_eq!(playback.advance().unwrap().level, SignalLevel::Off);
        assert!(playback.advance().is_none());
        assert!(playback.is_finished());
        // Advancing past the end stays terminal.
        assert!(playback.advance().is_none());
    }

    #[test]
    fn abort_is_terminal() {
        let mut playback = Playback::new(short_timeline());
        playback.advance();
        playback.abort();

        assert!(playback.is_finished());
        assert!(playback.current().is_none());
        assert!(playback.advance().is_none());
    }

    #[test]
    fn empty_timeline_is_immediately_finished() {
        let playback = Playback::new(Vec::new());
        assert!(playback.is_finished());
        assert!(playback.current().is_none());
    }

    #[tokio::test]
    async fn play_applies_levels_in_order_and_finishes_once() {
        let mut sink = RecordingSink::default();
        play(short_timeline(), &mut sink).await;

        assert_eq!(sink.levels, vec![SignalLevel::Off, SignalLevel::On, SignalLevel::Off]);
        assert_eq!(sink.finished, 1);
    }

    #[tokio::test]
    async fn play_of_empty_timeline_still_finishes() {
        let mut sink = RecordingSink::default();
        play(Vec::new(), &mut sink).await;

        assert!(sink.levels.is_empty());
        assert_eq!(sink.finished, 1);
    }
}
