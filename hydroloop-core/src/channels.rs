//! Channel and Device Registry
//!
//! The static catalog of telemetry channels: each channel is a named scalar
//! source with a unit and display label. The registry is pure data defined
//! at build time; the engine allocates one aggregator per entry and the
//! connector boundary maps wire identifiers back to entries with
//! [`Channel::from_id`].
//!
//! Devices are the two controllable nodes of the loop. Their states are
//! supplied by an external collaborator and are read-only to this crate.

use crate::time::Timestamp;

/// Number of registered channels
pub const CHANNEL_COUNT: usize = 6;

/// Number of registered devices
pub const DEVICE_COUNT: usize = 2;

/// A telemetry channel of the heating loop
///
/// Maps to a temperature sensor at a fixed location in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Channel {
    /// Storage tank water temperature
    Tank = 0,
    /// Floor slab surface temperature
    Floor = 1,
    /// Room reference (desk height) temperature
    Room = 2,
    /// Outdoor temperature
    Outside = 3,
    /// Loop supply (heater outlet) water temperature
    LoopSupply = 4,
    /// Loop return (pre-tank) water temperature
    LoopReturn = 5,
}

impl Channel {
    /// All registered channels, in index order
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Tank,
        Channel::Floor,
        Channel::Room,
        Channel::Outside,
        Channel::LoopSupply,
        Channel::LoopReturn,
    ];

    /// Stable wire identifier (also the topic suffix)
    pub const fn id(&self) -> &'static str {
        match self {
            Channel::Tank => "heating.tank",
            Channel::Floor => "heating.floor",
            Channel::Room => "ambient.room",
            Channel::Outside => "outside.main",
            Channel::LoopSupply => "heating.supply",
            Channel::LoopReturn => "heating.return",
        }
    }

    /// Unit of measurement
    pub const fn unit(&self) -> &'static str {
        match self {
            Channel::Tank
            | Channel::Floor
            | Channel::Room
            | Channel::Outside
            | Channel::LoopSupply
            | Channel::LoopReturn => "°F",
        }
    }

    /// Human-readable display label
    pub const fn label(&self) -> &'static str {
        match self {
            Channel::Tank => "Tank",
            Channel::Floor => "Floor",
            Channel::Room => "Room",
            Channel::Outside => "Outside",
            Channel::LoopSupply => "Loop supply",
            Channel::LoopReturn => "Loop return",
        }
    }

    /// Dense index for per-channel storage
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a channel by its wire identifier
    pub fn from_id(id: &str) -> Option<Channel> {
        Channel::ALL.iter().copied().find(|c| c.id() == id)
    }
}

/// A controllable node of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Device {
    /// Inline electric loop heater
    Heater = 0,
    /// Circulation pump
    Pump = 1,
}

impl Device {
    /// All registered devices, in index order
    pub const ALL: [Device; DEVICE_COUNT] = [Device::Heater, Device::Pump];

    /// Stable wire name
    pub const fn name(&self) -> &'static str {
        match self {
            Device::Heater => "heater",
            Device::Pump => "pump",
        }
    }

    /// Dense index for per-device storage
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a device by its wire name
    pub fn from_name(name: &str) -> Option<Device> {
        Device::ALL.iter().copied().find(|d| d.name() == name)
    }
}

/// Last reported state of a device
///
/// Supplied by the device-state collaborator; read-only here.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceState {
    /// Whether the device is switched on
    pub is_on: bool,
    /// Measured power draw in watts, when the plug meter reports one
    pub power_w: Option<f32>,
    /// When the state was reported
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_round_trips_ids() {
        for channel in Channel::ALL {
            assert_eq!(Channel::from_id(channel.id()), Some(channel));
        }
        assert_eq!(Channel::from_id("heating.unknown"), None);
    }

    #[test]
    fn device_names() {
        assert_eq!(Device::from_name("pump"), Some(Device::Pump));
        assert_eq!(Device::from_name("heater"), Some(Device::Heater));
        assert_eq!(Device::from_name("fan"), None);
    }

    #[test]
    fn indices_are_dense() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
        for (i, device) in Device::ALL.iter().enumerate() {
            assert_eq!(device.index(), i);
        }
    }
}
