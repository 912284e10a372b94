//! Wire codecs for annotation time values.
//!
//! Bubbles carry `MM:SS:mmm` strings (zero-padded minutes, seconds and
//! milliseconds). Comments carry a plain number of seconds. Both decode into
//! a [`TimeOffset`], which is what the store persists.

use std::fmt;

// ---------------------------------------------------------------------------
// Time value
// ---------------------------------------------------------------------------

/// Offset from the start of a track, in seconds.
///
/// Always finite, non-negative and at most [`TimeOffset::MAX_SECS`]. Seconds
/// are kept as the exact `f64` the client sent so comment times survive a
/// store/load cycle unchanged.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeOffset(f64);

/// Largest offset in whole milliseconds (2^50). Every millisecond count up
/// to here survives `ms / 1000 * 1000` in `f64` and rounds back exactly.
pub const MAX_MILLIS: u64 = 1 << 50;

impl TimeOffset {
    pub const ZERO: Self = Self(0.0);

    /// [`MAX_MILLIS`] in seconds.
    pub const MAX_SECS: f64 = 1_125_899_906_842.624;

    /// Build an offset from a number of seconds.
    pub fn from_secs(secs: f64) -> Result<Self, TimeFormatError> {
        if !(0.0..=Self::MAX_SECS).contains(&secs) {
            return Err(TimeFormatError::OutOfRange(secs));
        }
        Ok(Self(secs))
    }

    /// Build an offset from whole milliseconds.
    pub fn from_millis(millis: u64) -> Result<Self, TimeFormatError> {
        if millis > MAX_MILLIS {
            return Err(TimeFormatError::OutOfRange(millis as f64 / 1000.0));
        }
        Ok(Self(millis as f64 / 1000.0))
    }

    /// Total seconds as a float.
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// Total milliseconds, rounded to the nearest one.
    pub fn as_millis(self) -> u64 {
        (self.0 * 1000.0).round() as u64
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A time value that could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeFormatError {
    #[error("Invalid time format '{0}'. Use MM:SS:MMM")]
    BubbleTime(String),

    #[error("Invalid time value. Use seconds as float")]
    CommentTime,

    #[error("Time value {0} must be a number of seconds between 0 and 1125899906842.624")]
    OutOfRange(f64),
}

// ---------------------------------------------------------------------------
// Bubble codec (MM:SS:mmm)
// ---------------------------------------------------------------------------

/// Decode a bubble time string such as `"00:05:445"`.
///
/// The string must split on `:` into exactly three non-negative integers.
/// Components are not range-checked, so `"00:75:000"` is 75 seconds, but the
/// total must not exceed [`MAX_MILLIS`].
pub fn decode_bubble_time(input: &str) -> Result<TimeOffset, TimeFormatError> {
    let invalid = || TimeFormatError::BubbleTime(input.to_string());

    let parts: Vec<&str> = input.split(':').collect();
    let [minutes, seconds, millis] = parts[..] else {
        return Err(invalid());
    };

    let parse = |part: &str| part.trim().parse::<u64>().map_err(|_| invalid());
    let (minutes, seconds, millis) = (parse(minutes)?, parse(seconds)?, parse(millis)?);

    let total_millis = minutes
        .checked_mul(60_000)
        .and_then(|m| seconds.checked_mul(1000).and_then(|s| m.checked_add(s)))
        .and_then(|ms| ms.checked_add(millis))
        .ok_or(TimeFormatError::OutOfRange(f64::INFINITY))?;

    TimeOffset::from_millis(total_millis)
}

/// Encode an offset as `MM:SS:mmm`.
///
/// Milliseconds are rounded to the nearest whole millisecond; a round-up to
/// 1000 carries into the seconds. Minutes are not wrapped at 60.
pub fn encode_bubble_time(offset: TimeOffset) -> String {
    let total_millis = offset.as_millis();
    let minutes = total_millis / 60_000;
    let seconds = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{minutes:02}:{seconds:02}:{millis:03}")
}

// ---------------------------------------------------------------------------
// Comment codec (float seconds)
// ---------------------------------------------------------------------------

/// Decode a comment time from its JSON wire value.
///
/// Accepts a JSON number or a string holding a float (`"7.5"`).
pub fn decode_comment_time(value: &serde_json::Value) -> Result<TimeOffset, TimeFormatError> {
    let secs = match value {
        serde_json::Value::Number(n) => n.as_f64().ok_or(TimeFormatError::CommentTime)?,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| TimeFormatError::CommentTime)?,
        _ => return Err(TimeFormatError::CommentTime),
    };
    TimeOffset::from_secs(secs)
}

/// Encode an offset as float seconds, unrounded.
pub fn encode_comment_time(offset: TimeOffset) -> f64 {
    offset.as_secs()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
