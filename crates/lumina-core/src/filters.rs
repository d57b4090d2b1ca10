// crates/lumina-core/src/filters.rs
//
// Filter vocabulary.
//
//   FilterPreset: closed set of named looks, each a fixed composition of
//                  primitive image operations (`FilterOp`).
//   Filter      : what a clip / the global state carries: none, a preset, or
//                  a raw passthrough effect string (open-ended AI effects).
//   FilterChain : the descriptor handed to the presentation layer. Rendered
//                  with `Display` as a CSS-style filter list.
//
// On the wire a Filter is a plain string: "none", a preset name, or anything
// else (kept verbatim as Custom).

use std::fmt;

use serde::{Deserialize, Serialize};

/// One primitive image operation. Percentages are 100 = neutral.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    Grayscale(f32),
    Sepia(f32),
    Invert(f32),
    /// Degrees.
    HueRotate(f32),
    /// Pixels.
    Blur(f32),
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterOp::Brightness(v) => write!(f, "brightness({}%)", trim_num(v)),
            FilterOp::Contrast(v)   => write!(f, "contrast({}%)", trim_num(v)),
            FilterOp::Saturate(v)   => write!(f, "saturate({}%)", trim_num(v)),
            FilterOp::Grayscale(v)  => write!(f, "grayscale({}%)", trim_num(v)),
            FilterOp::Sepia(v)      => write!(f, "sepia({}%)", trim_num(v)),
            FilterOp::Invert(v)     => write!(f, "invert({}%)", trim_num(v)),
            FilterOp::HueRotate(v)  => write!(f, "hue-rotate({}deg)", trim_num(v)),
            FilterOp::Blur(v)       => write!(f, "blur({}px)", trim_num(v)),
        }
    }
}

/// `100.0` → `"100"`, `2.5` → `"2.5"`, `0.333333` → `"0.33"`.
fn trim_num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" { "0".to_string() } else { s.to_string() }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterPreset {
    Grayscale,
    Sepia,
    Vintage,
    Cyberpunk,
    Warm,
    Invert,
    Blur,
    Dramatic,
    Noir,
    Technicolor,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 10] = [
        FilterPreset::Grayscale,
        FilterPreset::Sepia,
        FilterPreset::Vintage,
        FilterPreset::Cyberpunk,
        FilterPreset::Warm,
        FilterPreset::Invert,
        FilterPreset::Blur,
        FilterPreset::Dramatic,
        FilterPreset::Noir,
        FilterPreset::Technicolor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterPreset::Grayscale   => "grayscale",
            FilterPreset::Sepia       => "sepia",
            FilterPreset::Vintage     => "vintage",
            FilterPreset::Cyberpunk   => "cyberpunk",
            FilterPreset::Warm        => "warm",
            FilterPreset::Invert      => "invert",
            FilterPreset::Blur        => "blur",
            FilterPreset::Dramatic    => "dramatic",
            FilterPreset::Noir        => "noir",
            FilterPreset::Technicolor => "technicolor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// The fixed primitive composition for this look.
    pub fn ops(self) -> &'static [FilterOp] {
        use FilterOp::*;
        match self {
            FilterPreset::Grayscale   => &[Grayscale(100.0)],
            FilterPreset::Sepia       => &[Sepia(100.0)],
            FilterPreset::Vintage     => &[Sepia(50.0), Contrast(120.0), Brightness(90.0), Saturate(80.0)],
            FilterPreset::Cyberpunk   => &[Saturate(180.0), HueRotate(290.0), Contrast(120.0)],
            FilterPreset::Warm        => &[Sepia(30.0), Saturate(140.0), Brightness(105.0)],
            FilterPreset::Invert      => &[Invert(100.0)],
            FilterPreset::Blur        => &[Blur(3.0)],
            FilterPreset::Dramatic    => &[Contrast(150.0), Brightness(90.0), Saturate(120.0)],
            FilterPreset::Noir        => &[Grayscale(100.0), Contrast(160.0), Brightness(80.0)],
            FilterPreset::Technicolor => &[Saturate(200.0), Contrast(110.0)],
        }
    }
}

/// A clip-level or global filter selection.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Filter {
    #[default]
    None,
    Preset(FilterPreset),
    /// Raw passthrough effect string, applied verbatim by the presenter.
    Custom(String),
}

impl Filter {
    /// `"none"` / empty → None, a preset name → Preset, anything else → Custom.
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        if t.is_empty() || t.eq_ignore_ascii_case("none") {
            return Filter::None;
        }
        match FilterPreset::from_name(t) {
            Some(p) => Filter::Preset(p),
            None    => Filter::Custom(t.to_string()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Filter::None)
    }

    /// Clip-level override wins unless it is `None`.
    pub fn effective<'a>(clip: &'a Filter, global: &'a Filter) -> &'a Filter {
        if clip.is_none() { global } else { clip }
    }

    pub fn label(&self) -> String {
        match self {
            Filter::None      => "none".to_string(),
            Filter::Preset(p) => p.name().to_string(),
            Filter::Custom(s) => s.clone(),
        }
    }
}

impl From<String> for Filter {
    fn from(s: String) -> Self {
        Filter::parse(&s)
    }
}

impl From<Filter> for String {
    fn from(f: Filter) -> Self {
        f.label()
    }
}

/// Filter descriptor for one frame: primitive ops in application order, then
/// an optional raw passthrough string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterChain {
    pub ops:    Vec<FilterOp>,
    pub custom: Option<String>,
}

impl FilterChain {
    pub fn push(&mut self, op: FilterOp) {
        self.ops.push(op);
    }

    /// Append the ops (or the raw string) a `Filter` stands for.
    pub fn extend_with(&mut self, filter: &Filter) {
        match filter {
            Filter::None      => {}
            Filter::Preset(p) => self.ops.extend_from_slice(p.ops()),
            Filter::Custom(s) => self.custom = Some(s.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.custom.is_none()
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for op in &self.ops {
            if !first { f.write_str(" ")?; }
            write!(f, "{op}")?;
            first = false;
        }
        if let Some(raw) = &self.custom {
            if !first { f.write_str(" ")?; }
            f.write_str(raw)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_maps_names_to_presets() {
        assert_eq!(Filter::parse("Noir"), Filter::Preset(FilterPreset::Noir));
        assert_eq!(Filter::parse(" none "), Filter::None);
        assert_eq!(Filter::parse(""), Filter::None);
        assert_eq!(
            Filter::parse("hue-rotate(45deg) blur(2px)"),
            Filter::Custom("hue-rotate(45deg) blur(2px)".into()),
        );
    }

    #[test]
    fn filter_serializes_as_plain_string() {
        let f = Filter::Preset(FilterPreset::Sepia);
        assert_eq!(serde_json::to_string(&f).unwrap(), "\"sepia\"");
        let back: Filter = serde_json::from_str("\"drop-shadow(2px 2px red)\"").unwrap();
        assert_eq!(back, Filter::Custom("drop-shadow(2px 2px red)".into()));
    }

    #[test]
    fn every_preset_round_trips_by_name() {
        for p in FilterPreset::ALL {
            assert_eq!(FilterPreset::from_name(p.name()), Some(p));
            assert!(!p.ops().is_empty());
        }
    }

    #[test]
    fn chain_renders_css_list() {
        let mut chain = FilterChain::default();
        chain.push(FilterOp::Brightness(100.0));
        chain.extend_with(&Filter::Preset(FilterPreset::Noir));
        chain.extend_with(&Filter::Custom("url(#glitch)".into()));
        assert_eq!(
            chain.to_string(),
            "brightness(100%) grayscale(100%) contrast(160%) brightness(80%) url(#glitch)",
        );
    }

    #[test]
    fn clip_filter_overrides_global() {
        let global = Filter::Preset(FilterPreset::Warm);
        assert_eq!(Filter::effective(&Filter::None, &global), &global);
        let clip = Filter::Preset(FilterPreset::Invert);
        assert_eq!(Filter::effective(&clip, &global), &clip);
    }

    #[test]
    fn numbers_render_compactly() {
        assert_eq!(FilterOp::Blur(2.5).to_string(), "blur(2.5px)");
        assert_eq!(FilterOp::HueRotate(0.0).to_string(), "hue-rotate(0deg)");
    }
}
