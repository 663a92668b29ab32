//! Final output size specifications.
//!
//! A [`DimensionSpec`] is parsed once and then resolved against whatever size the operation
//! stack produced:
//!
//! | Input | Variant | Result for a `100x200` render |
//! |---|---|---|
//! | `""`, `auto`, `unchanged` | [`DimensionSpec::Unchanged`] | `100x200` |
//! | `50x60`, `width=50,height=60` | [`DimensionSpec::Exact`] | `50x60` |
//! | `50x`, `width=50` | [`DimensionSpec::Width`] | `50x100` |
//! | `x50`, `height=50` | [`DimensionSpec::Height`] | `25x50` |
//! | `^80x80`, `max=80x80` | [`DimensionSpec::Fit`] | `40x80` |

use std::str::FromStr;

use crate::foundation::core::Size;
use crate::foundation::error::{PixstackError, PixstackResult};

/// Desired final size, relative to the rendered size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DimensionSpec {
    /// Keep whatever size the operations produced.
    #[default]
    Unchanged,
    /// Force both axes.
    Exact(Size),
    /// Fixed width, height follows the aspect ratio.
    Width(u32),
    /// Fixed height, width follows the aspect ratio.
    Height(u32),
    /// Scale down (never up) until both axes fit inside the box.
    Fit(Size),
}

impl DimensionSpec {
    /// Resolve against the rendered size.
    ///
    /// Pure: the same spec and `current` always yield the same size.
    pub fn resolve(&self, current: Size) -> PixstackResult<Size> {
        if current.is_empty() {
            return Err(PixstackError::invalid_dimensions(format!(
                "cannot resolve against empty size {current}"
            )));
        }
        let (cw, ch) = (f64::from(current.width), f64::from(current.height));

        let out = match *self {
            Self::Unchanged => current,
            Self::Exact(size) => size,
            Self::Width(w) => Size::new(w, scaled_axis(ch, f64::from(w) / cw)),
            Self::Height(h) => Size::new(scaled_axis(cw, f64::from(h) / ch), h),
            Self::Fit(max) => {
                if current.width <= max.width && current.height <= max.height {
                    current
                } else {
                    let ratio = (f64::from(max.width) / cw).min(f64::from(max.height) / ch);
                    Size::new(
                        scaled_axis(cw, ratio).min(max.width),
                        scaled_axis(ch, ratio).min(max.height),
                    )
                }
            }
        };

        if out.is_empty() {
            return Err(PixstackError::invalid_dimensions(format!(
                "'{self}' resolves to non-positive size {out}"
            )));
        }
        Ok(out)
    }
}

fn scaled_axis(len: f64, ratio: f64) -> u32 {
    ((len * ratio).round() as u32).max(1)
}

fn parse_axis(raw: &str, input: &str) -> PixstackResult<u32> {
    let v: i64 = raw.trim().parse().map_err(|_| {
        PixstackError::invalid_dimensions(format!("'{input}': '{raw}' is not an integer"))
    })?;
    if v <= 0 {
        return Err(PixstackError::invalid_dimensions(format!(
            "'{input}': dimensions must be > 0, got {v}"
        )));
    }
    u32::try_from(v)
        .map_err(|_| PixstackError::invalid_dimensions(format!("'{input}': {v} is too large")))
}

/// Parses `WxH`, `Wx` or `xH`.
fn parse_axes(raw: &str, input: &str) -> PixstackResult<(Option<u32>, Option<u32>)> {
    let Some((w, h)) = raw.split_once(['x', 'X']) else {
        return Err(PixstackError::invalid_dimensions(format!(
            "'{input}': expected WxH, Wx or xH"
        )));
    };
    let w = (!w.trim().is_empty())
        .then(|| parse_axis(w, input))
        .transpose()?;
    let h = (!h.trim().is_empty())
        .then(|| parse_axis(h, input))
        .transpose()?;
    Ok((w, h))
}

fn from_axes(w: Option<u32>, h: Option<u32>, input: &str) -> PixstackResult<DimensionSpec> {
    match (w, h) {
        (Some(w), Some(h)) => Ok(DimensionSpec::Exact(Size::new(w, h))),
        (Some(w), None) => Ok(DimensionSpec::Width(w)),
        (None, Some(h)) => Ok(DimensionSpec::Height(h)),
        (None, None) => Err(PixstackError::invalid_dimensions(format!(
            "'{input}': at least one axis is required"
        ))),
    }
}

fn parse_fit(raw: &str, input: &str) -> PixstackResult<DimensionSpec> {
    match parse_axes(raw, input)? {
        (Some(w), Some(h)) => Ok(DimensionSpec::Fit(Size::new(w, h))),
        _ => Err(PixstackError::invalid_dimensions(format!(
            "'{input}': max constraint needs both axes"
        ))),
    }
}

impl FromStr for DimensionSpec {
    type Err = PixstackError;

    fn from_str(input: &str) -> PixstackResult<Self> {
        let s = input.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("auto") || s.eq_ignore_ascii_case("unchanged") {
            return Ok(Self::Unchanged);
        }
        if let Some(rest) = s.strip_prefix('^') {
            return parse_fit(rest, input);
        }
        if !s.contains('=') {
            let (w, h) = parse_axes(s, input)?;
            return from_axes(w, h, input);
        }

        let mut width = None;
        let mut height = None;
        let mut max = None;
        for part in s.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                return Err(PixstackError::invalid_dimensions(format!(
                    "'{input}': expected key=value, got '{part}'"
                )));
            };
            let key = key.trim().to_ascii_lowercase();
            let slot = match key.as_str() {
                "width" | "w" => &mut width,
                "height" | "h" => &mut height,
                "max" => &mut max,
                other => {
                    return Err(PixstackError::invalid_dimensions(format!(
                        "'{input}': unknown key '{other}'"
                    )));
                }
            };
            if slot.replace(value).is_some() {
                return Err(PixstackError::invalid_dimensions(format!(
                    "'{input}': '{key}' given more than once"
                )));
            }
        }

        if let Some(max) = max {
            if width.is_some() || height.is_some() {
                return Err(PixstackError::invalid_dimensions(format!(
                    "'{input}': max cannot be combined with width or height"
                )));
            }
            return parse_fit(max, input);
        }
        let width = width.map(|v| parse_axis(v, input)).transpose()?;
        let height = height.map(|v| parse_axis(v, input)).transpose()?;
        from_axes(width, height, input)
    }
}

impl std::fmt::Display for DimensionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unchanged => f.write_str("unchanged"),
            Self::Exact(s) => write!(f, "{}x{}", s.width, s.height),
            Self::Width(w) => write!(f, "{w}x"),
            Self::Height(h) => write!(f, "x{h}"),
            Self::Fit(s) => write!(f, "^{}x{}", s.width, s.height),
        }
    }
}

impl serde::Serialize for DimensionSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for DimensionSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dimension/spec.rs"]
mod tests;
