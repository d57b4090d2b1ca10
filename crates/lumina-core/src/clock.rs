// crates/lumina-core/src/clock.rs
//
// The single authoritative playback clock.
//
// `tick()` integrates `dt * playback_rate` into `current_time` on EVERY call
// while playing. Observers are told to publish only every
// `publish_interval` of wall time (or immediately after a discrete change
// such as play / pause / seek / end-of-timeline), so UI refresh cost is
// bounded independently of the tick rate.
//
// Media elements are followers of this clock (see audio_mix); nothing here
// reads a media element's own position.

use std::time::Duration;

use tracing::debug;

use crate::state::PlaybackState;

/// Play pressed within this distance of the end restarts from 0.
const RESTART_MARGIN: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// `current_time` moved this tick.
    pub advanced:    bool,
    /// Playback hit `total_duration` this tick and stopped.
    pub reached_end: bool,
    /// Observers should refresh now.
    pub publish:     bool,
}

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    publish_interval: Duration,
    since_publish:    Duration,
    force_publish:    bool,
}

impl PlaybackClock {
    pub fn new(publish_interval: Duration) -> Self {
        Self {
            publish_interval,
            since_publish: Duration::ZERO,
            force_publish: true,
        }
    }

    /// Advance time by one scheduling tick of wall-clock length `dt`.
    pub fn tick(&mut self, playback: &mut PlaybackState, total: f64, dt: Duration) -> TickOutcome {
        let mut out = TickOutcome::default();
        self.since_publish += dt;

        if playback.is_playing {
            let before = playback.current_time;
            let next = before + dt.as_secs_f64() * playback.playback_rate;
            if next >= total {
                playback.current_time = total;
                playback.is_playing   = false;
                out.reached_end       = true;
                self.force_publish    = true;
                debug!("[clock] reached end at {total:.3}");
            } else {
                playback.current_time = next;
            }
            out.advanced = playback.current_time != before;
        }

        if self.force_publish || self.since_publish >= self.publish_interval {
            out.publish        = true;
            self.force_publish = false;
            self.since_publish = Duration::ZERO;
        }
        out
    }

    /// Jump to `t` (clamped to `[0, total]`). Play state is left untouched.
    pub fn seek(&mut self, playback: &mut PlaybackState, t: f64, total: f64) {
        let t = if t.is_finite() { t } else { 0.0 };
        playback.current_time = t.clamp(0.0, total.max(0.0));
        self.force_publish = true;
    }

    /// Start playback. Pressing play at (or right before) the end rewinds.
    pub fn play(&mut self, playback: &mut PlaybackState, total: f64) {
        if total > 0.0 && playback.current_time >= total - RESTART_MARGIN {
            playback.current_time = 0.0;
        }
        playback.is_playing = true;
        self.force_publish  = true;
    }

    pub fn pause(&mut self, playback: &mut PlaybackState) {
        playback.is_playing = false;
        self.force_publish  = true;
    }

    /// Ask for a publish on the next tick (e.g. after an edit).
    pub fn mark_dirty(&mut self) {
        self.force_publish = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn playing() -> PlaybackState {
        PlaybackState { is_playing: true, ..PlaybackState::default() }
    }

    #[test]
    fn time_scales_with_rate() {
        let mut clock = PlaybackClock::new(Duration::from_millis(50));
        let mut p = playing();
        p.set_playback_rate(2.0);
        clock.tick(&mut p, 100.0, Duration::from_millis(500));
        assert!((p.current_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut clock = PlaybackClock::new(Duration::from_millis(50));
        let mut p = PlaybackState::default();
        let out = clock.tick(&mut p, 10.0, FRAME);
        assert!(!out.advanced);
        assert_eq!(p.current_time, 0.0);
    }

    #[test]
    fn end_clamps_and_stops() {
        let mut clock = PlaybackClock::new(Duration::from_millis(50));
        let mut p = playing();
        p.current_time = 9.99;
        let out = clock.tick(&mut p, 10.0, FRAME);
        assert!(out.reached_end && out.publish);
        assert_eq!(p.current_time, 10.0);
        assert!(!p.is_playing);
        let again = clock.tick(&mut p, 10.0, FRAME);
        assert!(!again.reached_end);
    }

    #[test]
    fn publishes_are_throttled() {
        let mut clock = PlaybackClock::new(Duration::from_millis(50));
        let mut p = playing();
        let published = (0..60).filter(|_| clock.tick(&mut p, 100.0, FRAME).publish).count();
        // first tick (initial force) + one per ~3 frames
        assert!((18..=22).contains(&published), "published {published}");
    }

    #[test]
    fn seek_does_not_start_playback() {
        let mut clock = PlaybackClock::new(Duration::from_millis(50));
        let mut p = PlaybackState::default();
        clock.seek(&mut p, 4.0, 10.0);
        assert_eq!(p.current_time, 4.0);
        assert!(!p.is_playing);
        clock.seek(&mut p, 40.0, 10.0);
        assert_eq!(p.current_time, 10.0);
        clock.seek(&mut p, -1.0, 10.0);
        assert_eq!(p.current_time, 0.0);
    }

    #[test]
    fn play_at_end_rewinds() {
        let mut clock = PlaybackClock::new(Duration::from_millis(50));
        let mut p = PlaybackState { current_time: 10.0, ..PlaybackState::default() };
        clock.play(&mut p, 10.0);
        assert_eq!(p.current_time, 0.0);
        assert!(p.is_playing);
    }
}
