//! Rate-of-Change Estimation and Display
//!
//! ## Overview
//!
//! Given a channel's finalized minute buckets with the live point appended
//! as the last element, the estimator computes a thermal gradient by
//! comparing the point at `index` against the point a fixed number of
//! *buckets* earlier:
//!
//! ```text
//! rate = (points[i].value - points[i - lookback].value) / (lookback / 60)
//! ```
//!
//! expressed in channel units per hour. Below warm-up (`index < lookback`)
//! there is no estimate: absent, not zero.
//!
//! ## Index offset, not time offset
//!
//! Comparing against a fixed index keeps the estimator O(1) per point and
//! immune to missing-bucket gaps shifting the window, at the cost of the
//! comparison silently spanning more than `lookback` real minutes across a
//! gap. That trade-off is intentional and preserved here; the estimate
//! carries `elapsed_minutes` (the actual wall-clock span between the two
//! endpoints) so callers can detect a gap-stretched baseline.
//!
//! ## Display contract
//!
//! [`format_rate`] renders an estimate for the dashboard:
//! - absent, or magnitude under the stable band: `"stable"`, no arrow
//! - magnitude up to the per-minute switch: `±X.X °F/hr` with a
//!   directional arrow, tagged rising or falling
//! - above the switch: the same slope rendered per minute (`rate/60`), so
//!   an extreme short-term gradient does not read as a forecast.

use core::fmt::Write;

use libm::fabsf;

use crate::{
    channels::Channel,
    constants::{
        display::{PER_MINUTE_SWITCH_PER_HOUR, STABLE_BAND_PER_HOUR},
        time::{DEFAULT_LOOKBACK_BUCKETS, MINUTES_PER_HOUR, MS_PER_MINUTE},
    },
    time::Timestamp,
};

/// One point of a rate series: a finalized bucket average or the live value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatePoint {
    /// Minute-aligned timestamp of the point
    pub minute_start: Timestamp,
    /// Point value; `None` marks a slot whose value is unknown
    pub value: Option<f32>,
}

/// A rate-of-change estimate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RateEstimate {
    /// Gradient in channel units per hour
    pub per_hour: f32,
    /// Actual wall-clock span between the two endpoints, in minutes.
    /// Greater than the lookback when the baseline stretched across a gap.
    pub elapsed_minutes: u32,
}

/// Direction tag of a displayed rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Trend {
    /// Gradient is positive and displayable
    Rising,
    /// Gradient is negative and displayable
    Falling,
    /// No estimate, or gradient within the stable band
    Stable,
}

impl Trend {
    /// Directional arrow glyph ("" for stable)
    pub const fn arrow(&self) -> &'static str {
        match self {
            Trend::Rising => "↑",
            Trend::Falling => "↓",
            Trend::Stable => "",
        }
    }
}

/// Human-facing rendering of a rate estimate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDisplay {
    /// Direction tag
    pub trend: Trend,
    /// Rendered text, e.g. `"↑ +2.4 °F/hr"` or `"stable"`
    pub text: heapless::String<32>,
}

/// Rate of change at `index`, against the point `lookback` buckets back
///
/// `points` is the channel's finalized history with the live point
/// appended as the final element. Returns `None` (never zero) when the
/// index is out of range, below warm-up, either endpoint's value is
/// unknown, or `lookback` is zero.
pub fn rate_at(points: &[RatePoint], index: usize, lookback: usize) -> Option<RateEstimate> {
    if lookback == 0 || index < lookback || index >= points.len() {
        return None;
    }

    let newest = points[index];
    let baseline = points[index - lookback];

    let dv = newest.value? - baseline.value?;
    let per_hour = dv / (lookback as f32 / MINUTES_PER_HOUR as f32);

    let elapsed_minutes =
        (newest.minute_start.saturating_sub(baseline.minute_start) / MS_PER_MINUTE) as u32;

    Some(RateEstimate { per_hour, elapsed_minutes })
}

/// Rate of change at `index` with the default lookback
pub fn rate_at_default(points: &[RatePoint], index: usize) -> Option<RateEstimate> {
    rate_at(points, index, DEFAULT_LOOKBACK_BUCKETS)
}

/// Apply [`rate_at`] over every index of `points`
///
/// The output is aligned 1:1 with the input; the leading `lookback`
/// entries are absent until enough history exists. `M` bounds the output
/// length and must be at least `points.len()`.
pub fn rate_series<const M: usize>(
    points: &[RatePoint],
    lookback: usize,
) -> heapless::Vec<Option<RateEstimate>, M> {
    points
        .iter()
        .enumerate()
        .map(|(i, _)| rate_at(points, i, lookback))
        .collect()
}

/// Render a rate estimate for display on `channel`
pub fn format_rate(rate: Option<&RateEstimate>, channel: Channel) -> RateDisplay {
    let mut text = heapless::String::new();

    let per_hour = match rate {
        Some(r) => r.per_hour,
        None => {
            let _ = text.push_str("stable");
            return RateDisplay { trend: Trend::Stable, text };
        }
    };

    if fabsf(per_hour) < STABLE_BAND_PER_HOUR {
        let _ = text.push_str("stable");
        return RateDisplay { trend: Trend::Stable, text };
    }

    let trend = if per_hour > 0.0 { Trend::Rising } else { Trend::Falling };

    if fabsf(per_hour) > PER_MINUTE_SWITCH_PER_HOUR {
        let per_minute = per_hour / MINUTES_PER_HOUR as f32;
        let _ = write!(text, "{} {:+.2} {}/min", trend.arrow(), per_minute, channel.unit());
    } else {
        let _ = write!(text, "{} {:+.1} {}/hr", trend.arrow(), per_hour, channel.unit());
    }

    RateDisplay { trend, text }
}
