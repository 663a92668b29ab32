//! Typed readers for JSON operation settings.
//!
//! These only check shapes and types; value ranges are each operation's `validate_settings`
//! concern. A missing key falls back to the caller's default.

use crate::foundation::core::Point;
use crate::foundation::error::{PixstackError, PixstackResult};

fn entry<'a>(
    id: &str,
    obj: &'a serde_json::Value,
    key: &str,
) -> PixstackResult<Option<&'a serde_json::Value>> {
    match obj {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(map.get(key).filter(|v| !v.is_null())),
        _ => Err(PixstackError::invalid_settings(
            id,
            "settings must be a JSON object",
        )),
    }
}

pub(crate) fn get_f64(
    id: &str,
    obj: &serde_json::Value,
    key: &str,
    default: f64,
) -> PixstackResult<f64> {
    let Some(v) = entry(id, obj, key)? else {
        return Ok(default);
    };
    v.as_f64()
        .ok_or_else(|| PixstackError::invalid_settings(id, format!("'{key}' must be a number")))
}

pub(crate) fn get_opt_f64(
    id: &str,
    obj: &serde_json::Value,
    key: &str,
) -> PixstackResult<Option<f64>> {
    entry(id, obj, key)?
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                PixstackError::invalid_settings(id, format!("'{key}' must be a number"))
            })
        })
        .transpose()
}

pub(crate) fn get_u32(
    id: &str,
    obj: &serde_json::Value,
    key: &str,
    default: u32,
) -> PixstackResult<u32> {
    let Some(v) = entry(id, obj, key)? else {
        return Ok(default);
    };
    let Some(n) = v.as_u64() else {
        return Err(PixstackError::invalid_settings(
            id,
            format!("'{key}' must be a non-negative integer"),
        ));
    };
    u32::try_from(n)
        .map_err(|_| PixstackError::invalid_settings(id, format!("'{key}' is out of range")))
}

pub(crate) fn get_bool(
    id: &str,
    obj: &serde_json::Value,
    key: &str,
    default: bool,
) -> PixstackResult<bool> {
    let Some(v) = entry(id, obj, key)? else {
        return Ok(default);
    };
    v.as_bool()
        .ok_or_else(|| PixstackError::invalid_settings(id, format!("'{key}' must be a boolean")))
}

pub(crate) fn get_string(
    id: &str,
    obj: &serde_json::Value,
    key: &str,
) -> PixstackResult<Option<String>> {
    entry(id, obj, key)?
        .map(|v| {
            v.as_str().map(str::to_owned).ok_or_else(|| {
                PixstackError::invalid_settings(id, format!("'{key}' must be a string"))
            })
        })
        .transpose()
}

/// `[x, y]` pair.
pub(crate) fn get_point(
    id: &str,
    obj: &serde_json::Value,
    key: &str,
    default: Point,
) -> PixstackResult<Point> {
    let Some(v) = entry(id, obj, key)? else {
        return Ok(default);
    };
    let bad = || PixstackError::invalid_settings(id, format!("'{key}' must be [x, y]"));
    let arr = v.as_array().ok_or_else(bad)?;
    let [x, y] = arr.as_slice() else {
        return Err(bad());
    };
    Ok(Point::new(
        x.as_f64().ok_or_else(bad)?,
        y.as_f64().ok_or_else(bad)?,
    ))
}

/// `[r, g, b, a]` with 0..=255 channels.
pub(crate) fn get_rgba(
    id: &str,
    obj: &serde_json::Value,
    key: &str,
    default: [u8; 4],
) -> PixstackResult<[u8; 4]> {
    let Some(v) = entry(id, obj, key)? else {
        return Ok(default);
    };
    let bad =
        || PixstackError::invalid_settings(id, format!("'{key}' must be [r, g, b, a] in 0..=255"));
    let arr = v.as_array().ok_or_else(bad)?;
    if arr.len() != 4 {
        return Err(bad());
    }
    let mut out = [0u8; 4];
    for (o, c) in out.iter_mut().zip(arr) {
        *o = c
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(bad)?;
    }
    Ok(out)
}
