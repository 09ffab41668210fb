//! Lumped-Parameter Thermal Energy-Flow Model
//!
//! ## Overview
//!
//! A stateless model of where energy is flowing in the heating loop,
//! computed from the *current* values of the temperature channels plus the
//! heater and pump states. Four lumped nodes (tank, floor, room,
//! outdoors) exchange heat through fixed coupling coefficients:
//!
//! ```text
//!            heater_input
//!                 │
//!                 ▼
//!   ┌──────┐ water_to_floor ┌───────┐ floor_output ┌──────┐
//!   │ tank │ ──────────────▶│ floor │ ────────────▶│ room │
//!   └──────┘    (pump on)   └───────┘              └──────┘
//!       │ tank_loss                                    │ building_loss
//!       ▼                                              ▼
//!     room                                          outside
//! ```
//!
//! The model explains *why* a temperature is changing: a depleting tank
//! with the pump on means heat is moving into the floor; a building loss
//! above heater power means the room will not hold temperature.
//!
//! ## Validity contract
//!
//! Missing inputs degrade the result, never corrupt it. If either
//! mandatory input (tank, room) is absent, the snapshot is `valid: false`
//! with every numeric field `None`. Otherwise each field is individually
//! `None` whenever one of *its own* inputs is missing, so consumers can
//! tell "known zero" from "unknown". Degenerate denominators (a zero
//! coefficient) also yield `None`, never infinity or NaN.
//!
//! All coefficients live in [`ThermalConfig`]; the defaults in
//! [`constants::thermal`](crate::constants::thermal) are empirical fits
//! for one shed, not physical truths.

use crate::constants::{thermal as defaults, time::SECONDS_PER_HOUR};

/// Named coefficients of the thermal model
///
/// Temperatures are °F, powers are watts, so every coupling coefficient
/// is W/°F. Construct with [`Default`] and override per installation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThermalConfig {
    /// Tank thermal mass (J/°F)
    pub tank_thermal_mass_j_per_deg: f32,
    /// Tank-to-room standing loss coefficient (W/°F)
    pub tank_loss_w_per_deg: f32,
    /// Floor-to-room transfer coefficient (W/°F)
    pub floor_transfer_w_per_deg: f32,
    /// Building-envelope loss coefficient (W/°F)
    pub envelope_w_per_deg: f32,
    /// Rated heater power (W), used when no measured draw is reported
    pub heater_power_w: f32,
    /// Circulation loop mass flow (kg/s)
    pub loop_flow_kg_per_s: f32,
    /// Specific heat of the loop water (J/(kg·°F))
    pub water_heat_j_per_kg_deg: f32,
    /// Loop transit time (minutes) pairing past supply with present return
    pub transit_minutes: u32,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            tank_thermal_mass_j_per_deg: defaults::TANK_THERMAL_MASS_J_PER_F,
            tank_loss_w_per_deg: defaults::TANK_LOSS_W_PER_F,
            floor_transfer_w_per_deg: defaults::FLOOR_TRANSFER_W_PER_F,
            envelope_w_per_deg: defaults::ENVELOPE_UA_W_PER_F,
            heater_power_w: defaults::HEATER_RATED_POWER_W,
            loop_flow_kg_per_s: defaults::LOOP_FLOW_KG_PER_S,
            water_heat_j_per_kg_deg: defaults::WATER_HEAT_J_PER_KG_F,
            transit_minutes: crate::constants::time::DEFAULT_TRANSIT_MINUTES,
        }
    }
}

impl ThermalConfig {
    /// Set the rated heater power
    pub fn with_heater_power(mut self, watts: f32) -> Self {
        self.heater_power_w = watts;
        self
    }

    /// Set the building-envelope loss coefficient
    pub fn with_envelope_ua(mut self, w_per_deg: f32) -> Self {
        self.envelope_w_per_deg = w_per_deg;
        self
    }

    /// Set the tank thermal mass
    pub fn with_tank_mass(mut self, j_per_deg: f32) -> Self {
        self.tank_thermal_mass_j_per_deg = j_per_deg;
        self
    }

    /// Set the loop transit time
    pub fn with_transit_minutes(mut self, minutes: u32) -> Self {
        self.transit_minutes = minutes;
        self
    }
}

/// Inputs to one model evaluation
///
/// Current channel values, device states, the tank's rate of change, and
/// the two time-shifted loop temperatures. Every temperature is optional;
/// the model degrades field by field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThermalInputs {
    /// Tank water temperature (mandatory for a valid snapshot)
    pub tank: Option<f32>,
    /// Floor surface temperature
    pub floor: Option<f32>,
    /// Room reference temperature (mandatory for a valid snapshot)
    pub room: Option<f32>,
    /// Outdoor temperature
    pub outside: Option<f32>,
    /// Whether the heater is on
    pub heater_on: bool,
    /// Measured heater draw (W); overrides the rated power when present
    pub heater_power_w: Option<f32>,
    /// Whether the circulation pump is on
    pub pump_on: bool,
    /// Tank rate of change (°F/hr) from the rate estimator
    pub tank_rate_per_hour: Option<f32>,
    /// Loop supply temperature sampled `transit_minutes` in the past
    pub loop_supply_past: Option<f32>,
    /// Loop return temperature now
    pub loop_return_now: Option<f32>,
}

/// One computed energy-flow result
///
/// All flows in watts, all deltas in °F. Absent fields mean "unknown",
/// never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThermalSnapshot {
    /// False when a mandatory input (tank, room) was missing; every
    /// numeric field is `None` in that case
    pub valid: bool,
    /// Electrical input: rated (or measured) power while the heater is on
    pub heater_input_w: Option<f32>,
    /// Standing loss from the tank jacket into the room
    pub tank_loss_w: Option<f32>,
    /// Rate of energy storage in the tank; positive = storing,
    /// negative = depleting
    pub tank_accumulation_w: Option<f32>,
    /// Radiant output of the floor into the room, clamped at zero when
    /// the floor is not warmer than the room
    pub floor_output_w: Option<f32>,
    /// Conduction/infiltration loss through the building envelope
    pub building_loss_w: Option<f32>,
    /// Heat carried from the tank circuit into the floor; defined as zero
    /// while the pump is off
    pub water_to_floor_w: Option<f32>,
    /// Heat extracted from the loop water across the floor circuit,
    /// from the transit-shifted supply/return pair (pump on only)
    pub water_side_extraction_w: Option<f32>,
    /// Steady-state indoor-outdoor delta the heater can sustain (°F)
    pub max_capacity_delta: Option<f32>,
    /// Whether the heater covers the current building loss
    pub is_keeping_up: Option<bool>,
    /// Floor minus room (°F)
    pub floor_to_room_delta: Option<f32>,
    /// Room minus outside (°F)
    pub room_to_outside_delta: Option<f32>,
    /// Tank minus room (°F)
    pub tank_to_room_delta: Option<f32>,
    /// Steady-state room temperature if the current heater state
    /// persists indefinitely (°F)
    pub equilibrium_room_temp: Option<f32>,
}

impl ThermalSnapshot {
    /// The all-absent, invalid snapshot
    pub const INVALID: Self = Self {
        valid: false,
        heater_input_w: None,
        tank_loss_w: None,
        tank_accumulation_w: None,
        floor_output_w: None,
        building_loss_w: None,
        water_to_floor_w: None,
        water_side_extraction_w: None,
        max_capacity_delta: None,
        is_keeping_up: None,
        floor_to_room_delta: None,
        room_to_outside_delta: None,
        tank_to_room_delta: None,
        equilibrium_room_temp: None,
    };
}

/// The thermal model: configuration plus pure evaluation
///
/// Holds no state between evaluations; the time-shifted inputs come from
/// the minute aggregator's history, not from the model.
#[derive(Debug, Clone, Default)]
pub struct ThermalModel {
    config: ThermalConfig,
}

/// Drop non-finite values at the model boundary
fn finite(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite())
}

impl ThermalModel {
    /// Create a model with the given coefficients
    pub fn new(config: ThermalConfig) -> Self {
        Self { config }
    }

    /// The model's coefficients
    pub fn config(&self) -> &ThermalConfig {
        &self.config
    }

    /// Effective heater power: measured draw when reported, else rated
    fn effective_heater_power(&self, measured: Option<f32>) -> f32 {
        finite(measured).unwrap_or(self.config.heater_power_w)
    }

    /// Steady-state room-temperature forecast for a given outdoor
    /// temperature and heater power
    ///
    /// `outside + heater_power / envelope_ua`; `None` when the envelope
    /// coefficient is zero.
    pub fn equilibrium_prediction(&self, outside: f32, heater_power_w: f32) -> Option<f32> {
        if self.config.envelope_w_per_deg == 0.0 {
            return None;
        }
        Some(outside + heater_power_w / self.config.envelope_w_per_deg)
    }

    /// Evaluate the model against current inputs
    pub fn snapshot(&self, inputs: &ThermalInputs) -> ThermalSnapshot {
        let cfg = &self.config;

        let (tank, room) = match (finite(inputs.tank), finite(inputs.room)) {
            (Some(t), Some(r)) => (t, r),
            _ => return ThermalSnapshot::INVALID,
        };

        let floor = finite(inputs.floor);
        let outside = finite(inputs.outside);
        let heater_power = self.effective_heater_power(inputs.heater_power_w);

        let heater_input_w = Some(if inputs.heater_on { heater_power } else { 0.0 });

        let tank_to_room_delta = Some(tank - room);
        let tank_loss_w = Some(cfg.tank_loss_w_per_deg * (tank - room));

        // °F/hr from the rate estimator, °F/s for the energy balance
        let tank_accumulation_w = finite(inputs.tank_rate_per_hour)
            .map(|rate| cfg.tank_thermal_mass_j_per_deg * (rate / SECONDS_PER_HOUR as f32));

        let floor_to_room_delta = floor.map(|f| f - room);
        let floor_output_w =
            floor_to_room_delta.map(|d| cfg.floor_transfer_w_per_deg * d.max(0.0));

        let room_to_outside_delta = outside.map(|o| room - o);
        let building_loss_w = room_to_outside_delta.map(|d| cfg.envelope_w_per_deg * d);

        // No circulation, no transfer: defined zero with the pump off
        let water_to_floor_w = if inputs.pump_on {
            match (heater_input_w, tank_accumulation_w, tank_loss_w) {
                (Some(hi), Some(acc), Some(loss)) => Some((hi - acc - loss).max(0.0)),
                _ => None,
            }
        } else {
            Some(0.0)
        };

        let water_side_extraction_w = if inputs.pump_on {
            match (finite(inputs.loop_supply_past), finite(inputs.loop_return_now)) {
                (Some(supply_past), Some(return_now)) => Some(
                    cfg.loop_flow_kg_per_s
                        * cfg.water_heat_j_per_kg_deg
                        * (supply_past - return_now),
                ),
                _ => None,
            }
        } else {
            None
        };

        let max_capacity_delta = if cfg.envelope_w_per_deg != 0.0 {
            Some(heater_power / cfg.envelope_w_per_deg)
        } else {
            None
        };

        let is_keeping_up = building_loss_w.map(|bl| bl <= heater_power);

        let equilibrium_room_temp =
            outside.and_then(|o| self.equilibrium_prediction(o, heater_power));

        ThermalSnapshot {
            valid: true,
            heater_input_w,
            tank_loss_w,
            tank_accumulation_w,
            floor_output_w,
            building_loss_w,
            water_to_floor_w,
            water_side_extraction_w,
            max_capacity_delta,
            is_keeping_up,
            floor_to_room_delta,
            room_to_outside_delta,
            tank_to_room_delta,
            equilibrium_room_temp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ThermalConfig {
        // Round numbers so expected flows are exact
        ThermalConfig {
            tank_thermal_mass_j_per_deg: 360_000.0,
            tank_loss_w_per_deg: 2.0,
            floor_transfer_w_per_deg: 50.0,
            envelope_w_per_deg: 20.0,
            heater_power_w: 1400.0,
            loop_flow_kg_per_s: 0.05,
            water_heat_j_per_kg_deg: 2000.0,
            transit_minutes: 3,
        }
    }

    fn full_inputs() -> ThermalInputs {
        ThermalInputs {
            tank: Some(150.0),
            floor: Some(80.0),
            room: Some(70.0),
            outside: Some(30.0),
            heater_on: true,
            heater_power_w: None,
            pump_on: true,
            tank_rate_per_hour: Some(-2.0),
            loop_supply_past: Some(110.0),
            loop_return_now: Some(100.0),
        }
    }

    #[test]
    fn missing_mandatory_input_invalidates() {
        let model = ThermalModel::new(config());

        let snapshot = model.snapshot(&ThermalInputs {
            tank: Some(150.0),
            room: None,
            ..Default::default()
        });

        assert!(!snapshot.valid);
        assert_eq!(snapshot, ThermalSnapshot::INVALID);
    }

    #[test]
    fn partial_inputs_degrade_field_by_field() {
        let model = ThermalModel::new(config());

        let snapshot = model.snapshot(&ThermalInputs {
            tank: Some(150.0),
            room: Some(70.0),
            ..Default::default()
        });

        assert!(snapshot.valid);
        // Tank-room pair is enough for these
        assert_eq!(snapshot.tank_loss_w, Some(160.0));
        assert_eq!(snapshot.tank_to_room_delta, Some(80.0));
        // Outside missing: envelope fields unknown, not zero
        assert!(snapshot.building_loss_w.is_none());
        assert!(snapshot.room_to_outside_delta.is_none());
        assert!(snapshot.is_keeping_up.is_none());
        assert!(snapshot.equilibrium_room_temp.is_none());
        // Floor missing
        assert!(snapshot.floor_output_w.is_none());
        assert!(snapshot.floor_to_room_delta.is_none());
        // No rate available
        assert!(snapshot.tank_accumulation_w.is_none());
    }

    #[test]
    fn full_energy_balance() {
        let model = ThermalModel::new(config());
        let snapshot = model.snapshot(&full_inputs());

        assert!(snapshot.valid);
        assert_eq!(snapshot.heater_input_w, Some(1400.0));
        // 2.0 W/°F * 80 °F
        assert_eq!(snapshot.tank_loss_w, Some(160.0));
        // 360 kJ/°F * (-2 °F/hr / 3600 s/hr) = -200 W (depleting)
        assert_eq!(snapshot.tank_accumulation_w, Some(-200.0));
        // 50 W/°F * 10 °F
        assert_eq!(snapshot.floor_output_w, Some(500.0));
        // 20 W/°F * 40 °F
        assert_eq!(snapshot.building_loss_w, Some(800.0));
        // 1400 - (-200) - 160 = 1440
        assert_eq!(snapshot.water_to_floor_w, Some(1440.0));
        // 0.05 kg/s * 2000 J/(kg·°F) * 10 °F
        assert_eq!(snapshot.water_side_extraction_w, Some(1000.0));
        // 1400 W / 20 W/°F
        assert_eq!(snapshot.max_capacity_delta, Some(70.0));
        assert_eq!(snapshot.is_keeping_up, Some(true));
        // 30 + 70
        assert_eq!(snapshot.equilibrium_room_temp, Some(100.0));
    }

    #[test]
    fn heater_off_inputs_zero() {
        let model = ThermalModel::new(config());
        let snapshot = model.snapshot(&ThermalInputs {
            heater_on: false,
            ..full_inputs()
        });

        assert_eq!(snapshot.heater_input_w, Some(0.0));
        // Depleting tank, no electrical input: everything flowing to the
        // floor comes out of storage. 0 - (-200) - 160 = 40
        assert_eq!(snapshot.water_to_floor_w, Some(40.0));
        // Capacity is about the rating, not the current switch state
        assert_eq!(snapshot.max_capacity_delta, Some(70.0));
    }

    #[test]
    fn pump_off_clamps_water_to_floor() {
        let model = ThermalModel::new(config());

        for heater_on in [true, false] {
            for rate in [Some(5.0), Some(-5.0), None] {
                let snapshot = model.snapshot(&ThermalInputs {
                    pump_on: false,
                    heater_on,
                    tank_rate_per_hour: rate,
                    ..full_inputs()
                });

                assert_eq!(snapshot.water_to_floor_w, Some(0.0));
                assert!(snapshot.water_side_extraction_w.is_none());
            }
        }
    }

    #[test]
    fn water_to_floor_clamped_at_zero() {
        let model = ThermalModel::new(config());
        // Storing faster than the heater supplies: balance would be negative
        let snapshot = model.snapshot(&ThermalInputs {
            tank_rate_per_hour: Some(20.0), // +2000 W accumulation
            ..full_inputs()
        });

        assert_eq!(snapshot.water_to_floor_w, Some(0.0));
    }

    #[test]
    fn floor_cooler_than_room_outputs_nothing() {
        let model = ThermalModel::new(config());
        let snapshot = model.snapshot(&ThermalInputs {
            floor: Some(65.0),
            ..full_inputs()
        });

        // Heat does not flow backward in this model
        assert_eq!(snapshot.floor_output_w, Some(0.0));
        assert_eq!(snapshot.floor_to_room_delta, Some(-5.0));
    }

    #[test]
    fn measured_power_overrides_rating() {
        let model = ThermalModel::new(config());
        let snapshot = model.snapshot(&ThermalInputs {
            heater_power_w: Some(1350.0),
            ..full_inputs()
        });

        assert_eq!(snapshot.heater_input_w, Some(1350.0));
        assert_eq!(snapshot.max_capacity_delta, Some(67.5));
    }

    #[test]
    fn not_keeping_up_when_loss_exceeds_power() {
        let model = ThermalModel::new(config());
        let snapshot = model.snapshot(&ThermalInputs {
            outside: Some(-10.0), // 80 °F delta: 1600 W loss > 1400 W
            ..full_inputs()
        });

        assert_eq!(snapshot.building_loss_w, Some(1600.0));
        assert_eq!(snapshot.is_keeping_up, Some(false));
    }

    #[test]
    fn zero_envelope_coefficient_guarded() {
        let model = ThermalModel::new(ThermalConfig {
            envelope_w_per_deg: 0.0,
            ..config()
        });
        let snapshot = model.snapshot(&full_inputs());

        assert!(snapshot.max_capacity_delta.is_none());
        assert!(snapshot.equilibrium_room_temp.is_none());
        // Loss is a multiplication; zero coefficient gives a known zero
        assert_eq!(snapshot.building_loss_w, Some(0.0));
    }

    #[test]
    fn non_finite_inputs_treated_as_missing() {
        let model = ThermalModel::new(config());
        let snapshot = model.snapshot(&ThermalInputs {
            outside: Some(f32::NAN),
            ..full_inputs()
        });

        assert!(snapshot.valid);
        assert!(snapshot.building_loss_w.is_none());
    }

    #[test]
    fn equilibrium_prediction_standalone() {
        let model = ThermalModel::new(config());

        assert_eq!(model.equilibrium_prediction(30.0, 1400.0), Some(100.0));
        assert_eq!(model.equilibrium_prediction(30.0, 0.0), Some(30.0));
    }
}
