use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Fixed-point steps per whole unit: meters keep two decimal digits.
pub const FLOAT_INT_SCALE: i32 = 100;

/// Quantize a real value to meter fixed-point, rounding half away from zero.
/// No clamping is applied.
pub fn from_float(value: f32) -> i32 {
    (f64::from(value) * f64::from(FLOAT_INT_SCALE)).round() as i32
}

pub fn to_float(value: i32) -> f32 {
    (f64::from(value) / f64::from(FLOAT_INT_SCALE)) as f32
}

/// Current/initial pair of a single object attribute, stored fixed-point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Meter {
    cur: i32,
    init: i32,
}

/// Error raised when packed meter text does not begin with a usable integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeterDecodeError {
    #[error("meter text {0:?} does not start with an integer")]
    NotAnInteger(String),
    #[error("meter text {0:?} starts with a value outside the meter range")]
    OutOfRange(String),
}

impl Meter {
    pub const DEFAULT_VALUE: f32 = 0.0;
    /// Sentinel for "not disclosed"; also the upper clamp bound.
    pub const LARGE_VALUE: f32 = 65536.0;
    pub const INVALID_VALUE: f32 = -Self::LARGE_VALUE;

    pub fn new(current: f32, initial: f32) -> Self {
        Self {
            cur: from_float(current),
            init: from_float(initial),
        }
    }

    pub fn from_raw(current: i32, initial: i32) -> Self {
        Self {
            cur: current,
            init: initial,
        }
    }

    /// The masked meter disclosed to observers that may only know it exists.
    pub fn undisclosed() -> Self {
        Self::new(Self::LARGE_VALUE, Self::LARGE_VALUE)
    }

    /// True when both halves carry the `LARGE_VALUE` sentinel.
    pub fn is_undisclosed(&self) -> bool {
        let large = from_float(Self::LARGE_VALUE);
        self.cur == large && self.init == large
    }

    pub fn current(&self) -> f32 {
        to_float(self.cur)
    }

    pub fn initial(&self) -> f32 {
        to_float(self.init)
    }

    pub fn raw_current(&self) -> i32 {
        self.cur
    }

    pub fn raw_initial(&self) -> i32 {
        self.init
    }

    pub fn set_current(&mut self, value: f32) {
        self.cur = from_float(value);
    }

    pub fn set(&mut self, current: f32, initial: f32) {
        self.cur = from_float(current);
        self.init = from_float(initial);
    }

    pub fn add_to_current(&mut self, adjustment: f32) {
        self.cur = self.cur.saturating_add(from_float(adjustment));
    }

    pub fn reset_current(&mut self) {
        self.cur = from_float(Self::DEFAULT_VALUE);
    }

    pub fn reset(&mut self) {
        self.cur = from_float(Self::DEFAULT_VALUE);
        self.init = from_float(Self::DEFAULT_VALUE);
    }

    /// Commit the settled current value as next turn's baseline.
    pub fn back_propagate(&mut self) {
        self.init = self.cur;
    }

    /// Clamp `current` only. When `min > max` the result is `min`.
    pub fn clamp_current_to_range(&mut self, min: f32, max: f32) {
        self.cur = self.cur.min(from_float(max)).max(from_float(min));
    }

    pub fn clamp_current(&mut self) {
        self.clamp_current_to_range(Self::DEFAULT_VALUE, Self::LARGE_VALUE);
    }

    /// Packed persistence form: `"<current> <initial>"` as base-10 integers.
    pub fn encode_text(&self) -> String {
        format!("{} {}", self.cur, self.init)
    }

    /// Parse packed text produced by [`Meter::encode_text`].
    ///
    /// `current` must parse or the meter is left untouched and an error is
    /// returned. After one separating space, `initial` is parsed too; if that
    /// fails the previous `initial` is kept and the call still succeeds.
    pub fn decode_text(&mut self, text: &str) -> Result<(), MeterDecodeError> {
        let (cur, rest) = leading_int(text).map_err(|err| err.into_decode_error(text))?;
        self.cur = cur;
        if let Some(rest) = rest.strip_prefix(' ') {
            if let Ok((init, _)) = leading_int(rest) {
                self.init = init;
            }
        }
        Ok(())
    }

    pub fn from_text(text: &str) -> Result<Self, MeterDecodeError> {
        let mut meter = Self::default();
        meter.decode_text(text)?;
        Ok(meter)
    }

    /// Diagnostic rendering, e.g. `"Cur: 45.5 Init: 4.00"`. Never parsed back.
    pub fn format_human(&self) -> String {
        format!(
            "Cur: {} Init: {}",
            human_value(self.current()),
            human_value(self.initial())
        )
    }
}

fn human_value(value: f32) -> String {
    if value.abs() < 10.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.1}")
    }
}

enum LeadingIntError {
    Missing,
    Overflow,
}

impl LeadingIntError {
    fn into_decode_error(self, text: &str) -> MeterDecodeError {
        match self {
            LeadingIntError::Missing => MeterDecodeError::NotAnInteger(text.to_string()),
            LeadingIntError::Overflow => MeterDecodeError::OutOfRange(text.to_string()),
        }
    }
}

/// Parse an optionally negative run of ASCII digits at the start of `text`,
/// returning the value and the unparsed remainder.
fn leading_int(text: &str) -> Result<(i32, &str), LeadingIntError> {
    let bytes = text.as_bytes();
    let sign_len = usize::from(bytes.first() == Some(&b'-'));
    let digits = bytes[sign_len..]
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits == 0 {
        return Err(LeadingIntError::Missing);
    }
    let end = sign_len + digits;
    let value = text[..end]
        .parse::<i32>()
        .map_err(|_| LeadingIntError::Overflow)?;
    Ok((value, &text[end..]))
}

impl FromStr for Meter {
    type Err = MeterDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl fmt::Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_human())
    }
}
