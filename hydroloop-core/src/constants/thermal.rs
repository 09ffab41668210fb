//! Thermal Coefficients of the Shed Heating Loop
//!
//! Empirical lumped-parameter constants for the hydronic loop: one storage
//! tank, one floor circuit, one heated room, the outdoors. All temperatures
//! are °F, all energy flows are watts, so the coupling coefficients are
//! watts per °F of temperature difference (UA values).
//!
//! These are fitted to one particular shed, not laws of nature. Every value
//! here is the `Default` of [`ThermalConfig`](crate::thermal::ThermalConfig)
//! and can be overridden per installation.

// ===== STORAGE TANK =====

/// Thermal mass of the storage tank (J/°F).
///
/// ~200 L of water: 200 kg x 4186 J/(kg.K) / 1.8 K/°F. Determines how much
/// energy a 1 °F change of tank temperature represents.
pub const TANK_THERMAL_MASS_J_PER_F: f32 = 465_000.0;

/// Tank standing-loss coefficient (W/°F).
///
/// Heat leaking through the tank jacket into the room per °F of
/// tank-to-room difference. Fitted from overnight cooldown curves with the
/// pump off.
pub const TANK_LOSS_W_PER_F: f32 = 1.5;

// ===== FLOOR CIRCUIT =====

/// Floor-to-room transfer coefficient (W/°F).
///
/// Radiant output of the floor slab per °F of floor-surface-to-air
/// difference. Roughly 2 BTU/(hr.ft².°F) over the heated area.
pub const FLOOR_TRANSFER_W_PER_F: f32 = 70.0;

// ===== BUILDING ENVELOPE =====

/// Building-envelope loss coefficient (W/°F).
///
/// Whole-shed conduction and infiltration loss per °F of indoor-outdoor
/// difference. Fitted from steady-state nights: 1.4 kW holds roughly 90 °F
/// of delta.
pub const ENVELOPE_UA_W_PER_F: f32 = 15.0;

// ===== HEATER AND LOOP =====

/// Rated electric heater power (W).
///
/// Nameplate rating of the inline loop heater. Overridden by the measured
/// plug power when the smart-plug meter reports one.
pub const HEATER_RATED_POWER_W: f32 = 1400.0;

/// Circulation loop mass flow (kg/s).
///
/// ~3 L/min from the circulator on its usual speed setting.
pub const LOOP_FLOW_KG_PER_S: f32 = 0.05;

/// Specific heat of water (J/(kg.°F)).
///
/// 4186 J/(kg.K) / 1.8 K/°F.
pub const WATER_HEAT_J_PER_KG_F: f32 = 2326.0;
