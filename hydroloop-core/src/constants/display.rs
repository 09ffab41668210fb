//! Rate Display Thresholds
//!
//! The rendering contract for rate-of-change values. Thresholds are in
//! channel units per hour (°F/hr for every registered channel).

/// Magnitude below which a rate renders as "stable" (units/hr).
///
/// Gradients under half a degree per hour are within sensor noise and are
/// not worth an arrow.
pub const STABLE_BAND_PER_HOUR: f32 = 0.5;

/// Magnitude above which the display switches to per-minute units
/// (units/hr).
///
/// Past ten units per hour a per-hour figure reads as alarmingly large for
/// what is usually a short-lived slope; the per-minute form keeps extreme
/// short-term gradients honest.
pub const PER_MINUTE_SWITCH_PER_HOUR: f32 = 10.0;
