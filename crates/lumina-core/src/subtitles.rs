// crates/lumina-core/src/subtitles.rs
//
// Clean-up pass for externally generated subtitle cues (transcription / AI).
//
//   1. sort by start
//   2. a cue running into the next one is cut to
//      max(MIN_RUN_IN, next.start - start - GAP)
//   3. drop cues shorter than MIN_CUE, empty after trimming, or "[...]"
//   4. negative starts clamp to 0

use serde::{Deserialize, Serialize};

use crate::state::Subtitle;

const MIN_RUN_IN: f64 = 0.5;
const GAP:        f64 = 0.1;
const MIN_CUE:    f64 = 0.3;
const ELIDED:     &str = "[...]";

/// A cue as it arrives on the wire, before clean-up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CueInput {
    pub text:     String,
    pub start:    f64,
    pub duration: f64,
}

pub fn cleanup_cues(raw: &[CueInput]) -> Vec<Subtitle> {
    let mut sorted: Vec<&CueInput> = raw
        .iter()
        .filter(|c| c.start.is_finite() && c.duration.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut out = Vec::with_capacity(sorted.len());
    for (i, cur) in sorted.iter().enumerate() {
        let mut dur = cur.duration;
        if let Some(next) = sorted.get(i + 1) {
            if cur.start + dur > next.start {
                dur = (next.start - cur.start - GAP).max(MIN_RUN_IN);
            }
        }

        let text = cur.text.trim();
        if dur < MIN_CUE || text.is_empty() || text == ELIDED {
            continue;
        }
        out.push(Subtitle::new(text, cur.start.max(0.0), dur));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(text: &str, start: f64, duration: f64) -> CueInput {
        CueInput { text: text.into(), start, duration }
    }

    #[test]
    fn overlapping_cue_is_cut_before_next() {
        let out = cleanup_cues(&[cue("b", 3.0, 1.0), cue("a", 0.0, 5.0)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "a");
        assert!((out[0].timeline_duration - 2.9).abs() < 1e-9);
    }

    #[test]
    fn run_in_has_a_minimum() {
        let out = cleanup_cues(&[cue("a", 0.0, 2.0), cue("b", 0.2, 1.0)]);
        assert_eq!(out[0].timeline_duration, 0.5);
    }

    #[test]
    fn junk_is_dropped() {
        let out = cleanup_cues(&[
            cue("  ", 0.0, 2.0),
            cue("[...]", 3.0, 2.0),
            cue("blink", 6.0, 0.2),
            cue(" keep ", -1.0, 1.0),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "keep");
        assert_eq!(out[0].timeline_start, 0.0);
    }
}
