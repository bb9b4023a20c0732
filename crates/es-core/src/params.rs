//! Custom (real-time) design parameters and the bounds the simulator accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::BuildingType;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowType {
    Single,
    #[default]
    Double,
    Triple,
}

impl WindowType {
    pub const ALL: [WindowType; 3] = [WindowType::Single, WindowType::Double, WindowType::Triple];

    pub fn id(self) -> &'static str {
        match self {
            WindowType::Single => "single",
            WindowType::Double => "double",
            WindowType::Triple => "triple",
        }
    }

    /// Glazing U-value in W/m²K.
    pub fn u_value(self) -> f64 {
        match self {
            WindowType::Single => 2.8,
            WindowType::Double => 2.3,
            WindowType::Triple => 1.8,
        }
    }
}

impl FromStr for WindowType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WindowType::ALL
            .into_iter()
            .find(|w| w.id() == s)
            .ok_or_else(|| CoreError::Unknown {
                what: "window type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VentilationType {
    /// Natural ventilation only.
    SelfPropelled,
    MechanicalExhaust,
    /// Mechanical exhaust with heat recovery.
    #[default]
    MechanicalExhaustHr,
}

impl VentilationType {
    pub const ALL: [VentilationType; 3] = [
        VentilationType::SelfPropelled,
        VentilationType::MechanicalExhaust,
        VentilationType::MechanicalExhaustHr,
    ];

    pub fn id(self) -> &'static str {
        match self {
            VentilationType::SelfPropelled => "self-propelled",
            VentilationType::MechanicalExhaust => "mechanical-exhaust",
            VentilationType::MechanicalExhaustHr => "mechanical-exhaust-hr",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VentilationType::SelfPropelled => "Self-propelled",
            VentilationType::MechanicalExhaust => "Mechanical Exhaust",
            VentilationType::MechanicalExhaustHr => "Mechanical Exhaust with Heat Recovery",
        }
    }
}

impl FromStr for VentilationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VentilationType::ALL
            .into_iter()
            .find(|v| v.id() == s)
            .ok_or_else(|| CoreError::Unknown {
                what: "ventilation type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for VentilationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Inclusive slider range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn check(self, what: &'static str, value: f64) -> CoreResult<f64> {
        let value = crate::ensure_finite(value, what)?;
        if value < self.min || value > self.max {
            return Err(CoreError::OutOfRange {
                what,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }
}

pub const WALL_U_BOUNDS: Bounds = Bounds::new(0.1, 1.0);
pub const ATTIC_U_BOUNDS: Bounds = Bounds::new(0.1, 0.5);
pub const GROUND_U_BOUNDS: Bounds = Bounds::new(0.1, 0.5);
pub const ACH_BOUNDS: Bounds = Bounds::new(0.0, 1.0);
pub const WWR_OPTIONS: [u32; 4] = [15, 20, 30, 40];

/// Floor count choices per typology.
pub fn floor_options(building_type: BuildingType) -> &'static [u32] {
    match building_type {
        BuildingType::MidRiseApartment => &[3, 4, 5],
        _ => &[1, 2, 3],
    }
}

/// Envelope and geometry inputs of a real-time run.
///
/// Field names serialize in the simulation service's camelCase wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomParameters {
    pub wall_u: f64,
    pub attic_u: f64,
    pub ground_u: f64,
    pub ach: f64,
    pub window_type: WindowType,
    /// Window-to-wall ratio in percent.
    pub wwr: u32,
    pub ventilation_type: VentilationType,
    pub heated_floor_area: f64,
    pub number_of_floors: u32,
}

impl Default for CustomParameters {
    fn default() -> Self {
        Self::defaults_for(BuildingType::SingleFamilyHouse)
    }
}

impl CustomParameters {
    pub fn defaults_for(building_type: BuildingType) -> Self {
        let mut params = Self {
            wall_u: 0.3,
            attic_u: 0.2,
            ground_u: 0.2,
            ach: 0.5,
            window_type: WindowType::Double,
            wwr: 15,
            ventilation_type: VentilationType::MechanicalExhaustHr,
            heated_floor_area: 125.0,
            number_of_floors: 2,
        };
        params.apply_building_type_defaults(building_type);
        params
    }

    /// Reset the geometry fields that depend on the typology.
    pub fn apply_building_type_defaults(&mut self, building_type: BuildingType) {
        if building_type == BuildingType::MidRiseApartment {
            self.heated_floor_area = 3135.0;
            self.number_of_floors = 4;
            self.wwr = 20;
        } else {
            self.heated_floor_area = 125.0;
            self.number_of_floors = 2;
            self.wwr = 15;
        }
    }

    pub fn validate(&self, building_type: BuildingType) -> CoreResult<()> {
        WALL_U_BOUNDS.check("wall U-value", self.wall_u)?;
        ATTIC_U_BOUNDS.check("attic U-value", self.attic_u)?;
        GROUND_U_BOUNDS.check("ground slab U-value", self.ground_u)?;
        ACH_BOUNDS.check("air infiltration", self.ach)?;

        if !WWR_OPTIONS.contains(&self.wwr) {
            return Err(CoreError::NotAllowed {
                what: "window-to-wall ratio",
                value: self.wwr.to_string(),
                allowed: format!("{WWR_OPTIONS:?}"),
            });
        }

        let floors = floor_options(building_type);
        if !floors.contains(&self.number_of_floors) {
            return Err(CoreError::NotAllowed {
                what: "number of floors",
                value: self.number_of_floors.to_string(),
                allowed: format!("{floors:?}"),
            });
        }

        let area = crate::ensure_finite(self.heated_floor_area, "heated floor area")?;
        if area <= 0.0 {
            return Err(CoreError::OutOfRange {
                what: "heated floor area",
                value: area,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        Ok(())
    }

    /// Exterior wall area implied by the floor area and floor count.
    pub fn estimated_wall_area(&self, building_type: BuildingType) -> f64 {
        let floors = f64::from(self.number_of_floors.max(1));
        let area_per_floor = self.heated_floor_area / floors;

        if building_type == BuildingType::MidRiseApartment {
            // Zones have independent exterior walls, so scale the archetype's wall area.
            const BASE_WALL_PER_FLOOR: f64 = 385.5;
            const BASE_FLOOR_AREA_PER_FLOOR: f64 = 783.7;
            let linear_scale = (area_per_floor / BASE_FLOOR_AREA_PER_FLOOR).sqrt();
            BASE_WALL_PER_FLOOR * linear_scale * floors
        } else {
            const BASE_FLOOR_AREA: f64 = 62.5;
            const BASE_PERIMETER: f64 = 2.0 * (7.8125 + 8.0);
            const FLOOR_HEIGHT: f64 = 3.0;
            let linear_scale = (area_per_floor / BASE_FLOOR_AREA).sqrt();
            BASE_PERIMETER * linear_scale * FLOOR_HEIGHT * floors
        }
    }

    /// Window area for a given window-to-wall ratio (percent).
    pub fn estimated_window_area(&self, building_type: BuildingType, wwr: u32) -> f64 {
        self.estimated_wall_area(building_type) * f64::from(wwr) / 100.0
    }
}
