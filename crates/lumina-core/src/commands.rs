// crates/lumina-core/src/commands.rs
//
// Every edit in Lumina is expressed as an EditAction, whether it comes from a
// pointer gesture in a UI or from the AI command interpreter. The session
// applies both through the same match (session.rs), so a feature added here
// behaves identically for either origin.
//
// Wire shape (stable, shared with the interpreter):
//   { "action": "split_clip", "parameters": { "timestamp": 4.0, "targetClipId": "…" } }
//
// Action names are snake_case, parameter keys camelCase. Numbers may arrive as
// JSON numbers or numeric strings ("0.9"). Clip references from the
// interpreter are plain strings; anything that is not a known clip UUID makes
// the action a logged no-op rather than a parse failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::error::ActionError;
use crate::subtitles::CueInput;
use crate::timeline::{EdgeSelector, TimeRange};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "snake_case")]
pub enum EditAction {
    // ── Interpreter vocabulary ───────────────────────────────────────────────
    #[serde(rename_all = "camelCase")]
    SeekTo {
        #[serde(deserialize_with = "lenient_f64")]
        timestamp: f64,
    },
    /// Named preset, `"none"`, or (for unknown names) a raw effect string.
    #[serde(rename_all = "camelCase")]
    ApplyFilter {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_clip_id: Option<String>,
    },
    /// Raw passthrough effect string, never matched against presets.
    #[serde(rename_all = "camelCase")]
    SetCustomFilter {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_clip_id: Option<String>,
    },
    /// Without a target: every boundary where two clips touch.
    #[serde(rename_all = "camelCase")]
    SetTransition {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_clip_id: Option<String>,
        #[serde(default)]
        edge: EdgeSelector,
    },
    /// Remove seconds from each end of one clip.
    #[serde(rename_all = "camelCase")]
    TrimClip {
        target_clip_id: String,
        #[serde(default, deserialize_with = "lenient_f64")]
        start_offset: f64,
        #[serde(default, deserialize_with = "lenient_f64")]
        end_offset: f64,
    },
    #[serde(rename_all = "camelCase")]
    SplitClip {
        #[serde(deserialize_with = "lenient_f64")]
        timestamp: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_clip_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveClip {
        target_clip_id: String,
    },
    SetSpeed {
        #[serde(deserialize_with = "lenient_f64")]
        value: f64,
    },
    SetVolume {
        #[serde(deserialize_with = "lenient_f64")]
        value: f64,
    },
    /// Keep only `ranges`, packed from 0, with `transition` at each inner join
    /// and `filter` on every kept video piece.
    KeepOnlyHighlights {
        ranges: Vec<TimeRange>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transition: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
    },
    /// Replace all cues (after clean-up). An empty list is ignored: cue
    /// generation itself happens outside the engine.
    AddSubtitles {
        #[serde(default)]
        cues: Vec<CueInput>,
    },

    // ── UI vocabulary ────────────────────────────────────────────────────────
    MoveClip { id: Uuid, start: f64 },
    MoveAudioClip { id: Uuid, start: f64 },
    /// Trim at an absolute playhead time; all containing clips unless `id`.
    TrimLeft {
        time: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Uuid>,
    },
    TrimRight {
        time: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Uuid>,
    },
    SplitAtPlayhead {},
    DeleteAtPlayhead {},
    ToggleMute { id: Uuid },
    SetClipVolume { id: Uuid, volume: f32 },
    SetAdjustments { brightness: f32, contrast: f32, saturation: f32 },
    #[serde(rename_all = "camelCase")]
    SetFade { fade_in: f64, fade_out: f64 },
    Play {},
    Pause {},
    Undo {},
    Redo {},
}

impl EditAction {
    /// Wire name of the action.
    pub fn name(&self) -> &'static str {
        match self {
            EditAction::SeekTo { .. }             => "seek_to",
            EditAction::ApplyFilter { .. }        => "apply_filter",
            EditAction::SetCustomFilter { .. }    => "set_custom_filter",
            EditAction::SetTransition { .. }      => "set_transition",
            EditAction::TrimClip { .. }           => "trim_clip",
            EditAction::SplitClip { .. }          => "split_clip",
            EditAction::RemoveClip { .. }         => "remove_clip",
            EditAction::SetSpeed { .. }           => "set_speed",
            EditAction::SetVolume { .. }          => "set_volume",
            EditAction::KeepOnlyHighlights { .. } => "keep_only_highlights",
            EditAction::AddSubtitles { .. }       => "add_subtitles",
            EditAction::MoveClip { .. }           => "move_clip",
            EditAction::MoveAudioClip { .. }      => "move_audio_clip",
            EditAction::TrimLeft { .. }           => "trim_left",
            EditAction::TrimRight { .. }          => "trim_right",
            EditAction::SplitAtPlayhead {}        => "split_at_playhead",
            EditAction::DeleteAtPlayhead {}       => "delete_at_playhead",
            EditAction::ToggleMute { .. }         => "toggle_mute",
            EditAction::SetClipVolume { .. }      => "set_clip_volume",
            EditAction::SetAdjustments { .. }     => "set_adjustments",
            EditAction::SetFade { .. }            => "set_fade",
            EditAction::Play {}                   => "play",
            EditAction::Pause {}                  => "pause",
            EditAction::Undo {}                   => "undo",
            EditAction::Redo {}                   => "redo",
        }
    }

    /// True for actions that change the timeline collections and therefore
    /// get an undo snapshot.
    pub fn is_timeline_edit(&self) -> bool {
        matches!(
            self,
            EditAction::ApplyFilter { .. }
                | EditAction::SetCustomFilter { .. }
                | EditAction::SetTransition { .. }
                | EditAction::TrimClip { .. }
                | EditAction::SplitClip { .. }
                | EditAction::RemoveClip { .. }
                | EditAction::KeepOnlyHighlights { .. }
                | EditAction::AddSubtitles { .. }
                | EditAction::MoveClip { .. }
                | EditAction::MoveAudioClip { .. }
                | EditAction::TrimLeft { .. }
                | EditAction::TrimRight { .. }
                | EditAction::SplitAtPlayhead {}
                | EditAction::DeleteAtPlayhead {}
                | EditAction::ToggleMute { .. }
                | EditAction::SetClipVolume { .. }
        )
    }

    /// Parse one action from a JSON value. A missing `parameters` object is
    /// treated as empty, so `{"action": "play"}` is accepted.
    pub fn from_value(mut value: Value) -> Result<Self, ActionError> {
        if let Value::Object(map) = &mut value {
            map.entry("parameters").or_insert_with(|| Value::Object(Default::default()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a batch: `{"actions": [...]}` or a bare array. Entries that do
    /// not deserialize (unknown action names, missing fields) are skipped.
    pub fn parse_batch(json: &str) -> Result<Vec<EditAction>, ActionError> {
        let root: Value = serde_json::from_str(json)?;
        let entries = match root {
            Value::Array(v) => v,
            Value::Object(mut map) => match map.remove("actions") {
                Some(Value::Array(v)) => v,
                _ => return Err(ActionError::Shape),
            },
            _ => return Err(ActionError::Shape),
        };

        let mut out = Vec::with_capacity(entries.len());
        for (i, entry) in entries.into_iter().enumerate() {
            let label = entry.get("action").and_then(Value::as_str).unwrap_or("?").to_string();
            match EditAction::from_value(entry) {
                Ok(a) => out.push(a),
                Err(e) => warn!("[actions] skipping entry {i} ({label}): {e}"),
            }
        }
        Ok(out)
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// Valid, but nothing changed (e.g. no clip under the playhead).
    Unchanged,
    /// The referenced clip does not exist.
    NoTarget,
    /// A parameter could not be interpreted (e.g. unknown transition name).
    Invalid(String),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }

    pub(crate) fn from_count(n: usize) -> Self {
        if n > 0 { ActionOutcome::Applied } else { ActionOutcome::Unchanged }
    }

    pub(crate) fn from_found(found: bool) -> Self {
        if found { ActionOutcome::Applied } else { ActionOutcome::NoTarget }
    }
}

/// A clip reference as the interpreter writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipRef {
    Id(Uuid),
    /// `split_{i}`: piece `i` (in time order, from 0) of the most recent
    /// chain of targeted splits.
    SplitPiece(usize),
}

/// A UUID or `split_{i}`; anything else matches nothing.
pub fn parse_clip_ref(s: &str) -> Option<ClipRef> {
    let s = s.trim();
    if let Ok(id) = Uuid::parse_str(s) {
        return Some(ClipRef::Id(id));
    }
    s.strip_prefix("split_")
        .and_then(|i| i.parse().ok())
        .map(ClipRef::SplitPiece)
}

/// Accept `1.5`, `"1.5"` or `" 1.5 "` for a number.
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    match NumOrStr::deserialize(d)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {s:?}"))),
    }
}
