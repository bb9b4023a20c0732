//! Static catalog: building typologies, construction periods, Swedish weather
//! stations, simulation modes and the locked archetype parameters shown for pre-configured runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// How a run is configured: a locked archetype, user-edited parameters, or
/// many archetypes at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimulationMode {
    #[default]
    PreConfigured,
    RealTime,
    Batch,
}

impl SimulationMode {
    pub const ALL: [SimulationMode; 3] = [
        SimulationMode::PreConfigured,
        SimulationMode::RealTime,
        SimulationMode::Batch,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SimulationMode::PreConfigured => "pre-configured",
            SimulationMode::RealTime => "real-time",
            SimulationMode::Batch => "batch",
        }
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SimulationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SimulationMode::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| CoreError::Unknown {
                what: "simulation type",
                value: s.to_string(),
            })
    }
}

/// Building typology offered by the simulator.
///
/// Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildingType {
    SingleFamilyHouse,
    MidRiseApartment,
    Office,
    School,
    Retail,
    Hotel,
    Warehouse,
    Hospital,
}

impl BuildingType {
    pub const ALL: [BuildingType; 8] = [
        BuildingType::SingleFamilyHouse,
        BuildingType::MidRiseApartment,
        BuildingType::Office,
        BuildingType::School,
        BuildingType::Retail,
        BuildingType::Hotel,
        BuildingType::Warehouse,
        BuildingType::Hospital,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BuildingType::SingleFamilyHouse => "single-family-house",
            BuildingType::MidRiseApartment => "mid-rise-apartment",
            BuildingType::Office => "office",
            BuildingType::School => "school",
            BuildingType::Retail => "retail",
            BuildingType::Hotel => "hotel",
            BuildingType::Warehouse => "warehouse",
            BuildingType::Hospital => "hospital",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BuildingType::SingleFamilyHouse => "Single Family House",
            BuildingType::MidRiseApartment => "Mid-Rise Apartment",
            BuildingType::Office => "Office",
            BuildingType::School => "School",
            BuildingType::Retail => "Retail",
            BuildingType::Hotel => "Hotel",
            BuildingType::Warehouse => "Warehouse",
            BuildingType::Hospital => "Hospital",
        }
    }

    /// Abbreviation used in history summaries ("2 SFH + 1 MFD").
    pub fn short_label(self) -> &'static str {
        match self {
            BuildingType::SingleFamilyHouse => "SFH",
            BuildingType::MidRiseApartment => "MFD",
            other => other.id(),
        }
    }

    /// Whether the simulation service has archetypes for this typology.
    pub fn is_available(self) -> bool {
        matches!(
            self,
            BuildingType::SingleFamilyHouse | BuildingType::MidRiseApartment
        )
    }

    pub fn ensure_available(self) -> Result<Self, CoreError> {
        if self.is_available() {
            Ok(self)
        } else {
            Err(CoreError::Unavailable(self.id().to_string()))
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BuildingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildingType::ALL
            .into_iter()
            .find(|bt| bt.id() == s)
            .ok_or_else(|| CoreError::Unknown {
                what: "building type",
                value: s.to_string(),
            })
    }
}

/// Construction period of an archetype, in chronological order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ConstructionPeriod {
    #[serde(rename = "before-1961")]
    Before1961,
    #[serde(rename = "1961-1975")]
    From1961To1975,
    #[serde(rename = "1976-1985")]
    From1976To1985,
    #[serde(rename = "1986-1995")]
    #[default]
    From1986To1995,
    #[serde(rename = "1996-2005")]
    From1996To2005,
}

impl ConstructionPeriod {
    pub const ALL: [ConstructionPeriod; 5] = [
        ConstructionPeriod::Before1961,
        ConstructionPeriod::From1961To1975,
        ConstructionPeriod::From1976To1985,
        ConstructionPeriod::From1986To1995,
        ConstructionPeriod::From1996To2005,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ConstructionPeriod::Before1961 => "before-1961",
            ConstructionPeriod::From1961To1975 => "1961-1975",
            ConstructionPeriod::From1976To1985 => "1976-1985",
            ConstructionPeriod::From1986To1995 => "1986-1995",
            ConstructionPeriod::From1996To2005 => "1996-2005",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConstructionPeriod::Before1961 => "Before 1961",
            other => other.id(),
        }
    }
}

impl fmt::Display for ConstructionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ConstructionPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConstructionPeriod::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| CoreError::Unknown {
                what: "construction period",
                value: s.to_string(),
            })
    }
}

/// Locked envelope and geometry parameters of one archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DesignParameters {
    pub wall_u: f64,
    pub attic_u: f64,
    pub ground_slab_u: f64,
    pub window_u: f64,
    pub infiltration_ach: f64,
    pub floor_area_m2: f64,
    pub number_of_floors: u32,
    pub window_area_m2: f64,
}

const fn sfh(
    wall_u: f64,
    attic_u: f64,
    ground_slab_u: f64,
    window_u: f64,
    ach: f64,
) -> DesignParameters {
    DesignParameters {
        wall_u,
        attic_u,
        ground_slab_u,
        window_u,
        infiltration_ach: ach,
        floor_area_m2: 125.0,
        number_of_floors: 2,
        window_area_m2: 28.0,
    }
}

const fn mfd(
    wall_u: f64,
    attic_u: f64,
    ground_slab_u: f64,
    window_u: f64,
    ach: f64,
) -> DesignParameters {
    DesignParameters {
        wall_u,
        attic_u,
        ground_slab_u,
        window_u,
        infiltration_ach: ach,
        floor_area_m2: 3135.0,
        number_of_floors: 4,
        window_area_m2: 307.0,
    }
}

// Indexed by ConstructionPeriod::ALL order.
const SFH_PARAMETERS: [DesignParameters; 5] = [
    sfh(0.60, 0.29, 0.28, 2.34, 0.15),
    sfh(0.31, 0.21, 0.32, 2.30, 0.15),
    sfh(0.21, 0.15, 0.27, 2.01, 0.15),
    sfh(0.17, 0.12, 0.24, 1.94, 0.15),
    sfh(0.20, 0.12, 0.18, 1.87, 0.08),
];

// U-values include film resistances.
const MFD_PARAMETERS: [DesignParameters; 5] = [
    mfd(0.58, 0.36, 0.36, 2.22, 0.05),
    mfd(0.50, 0.28, 0.32, 2.22, 0.05),
    mfd(0.41, 0.20, 0.28, 2.22, 0.05),
    mfd(0.22, 0.15, 0.26, 1.80, 0.05),
    mfd(0.20, 0.13, 0.22, 1.97, 0.04),
];

/// Locked parameters of the archetype simulated for a pre-configured run.
///
/// Mid-rise apartments use their own table; every other typology falls back
/// to the single family house archetype.
pub fn design_parameters(
    building_type: BuildingType,
    period: ConstructionPeriod,
) -> DesignParameters {
    let idx = period as usize;
    match building_type {
        BuildingType::MidRiseApartment => MFD_PARAMETERS[idx],
        _ => SFH_PARAMETERS[idx],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherStation {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct County {
    pub code: &'static str,
    pub name: &'static str,
    pub stations: &'static [WeatherStation],
}

const fn ws(id: &'static str, name: &'static str) -> WeatherStation {
    WeatherStation { id, name }
}

/// Swedish weather stations with TMYx data, grouped by county (north to south).
pub const SWEDEN_COUNTIES: &[County] = &[
    County {
        code: "BD",
        name: "Norrbotten",
        stations: &[
            ws("kiruna", "Kiruna"),
            ws("gallivare", "Gällivare"),
            ws("lulea", "Luleå"),
            ws("boden", "Boden"),
            ws("haparanda", "Haparanda"),
            ws("pajala", "Pajala"),
            ws("jokkmokk", "Jokkmokk"),
            ws("arvidsjaur", "Arvidsjaur"),
        ],
    },
    County {
        code: "AC",
        name: "Västerbotten",
        stations: &[
            ws("umea", "Umeå"),
            ws("skelleftea", "Skellefteå"),
            ws("lycksele", "Lycksele"),
            ws("vilhelmina", "Vilhelmina"),
            ws("storuman", "Storuman"),
        ],
    },
    County {
        code: "Z",
        name: "Jämtland",
        stations: &[ws("ostersund", "Östersund"), ws("are", "Åre"), ws("sveg", "Sveg")],
    },
    County {
        code: "Y",
        name: "Västernorrland",
        stations: &[
            ws("sundsvall", "Sundsvall"),
            ws("harnosand", "Härnösand"),
            ws("ornskoldsvik", "Örnsköldsvik"),
        ],
    },
    County {
        code: "X",
        name: "Gävleborg",
        stations: &[ws("gavle", "Gävle"), ws("soderhamn", "Söderhamn")],
    },
    County {
        code: "W",
        name: "Dalarna",
        stations: &[
            ws("borlange", "Borlänge"),
            ws("mora", "Mora"),
            ws("malung", "Malung"),
            ws("idre", "Idre"),
        ],
    },
    County {
        code: "S",
        name: "Värmland",
        stations: &[
            ws("karlstad", "Karlstad"),
            ws("arvika", "Arvika"),
            ws("torsby", "Torsby"),
        ],
    },
    County {
        code: "T",
        name: "Örebro",
        stations: &[ws("orebro", "Örebro")],
    },
    County {
        code: "U",
        name: "Västmanland",
        stations: &[ws("vasteras", "Västerås")],
    },
    County {
        code: "C",
        name: "Uppsala",
        stations: &[ws("uppsala", "Uppsala")],
    },
    County {
        code: "AB",
        name: "Stockholm",
        stations: &[
            ws("stockholm", "Stockholm"),
            ws("stockholm-arlanda", "Stockholm-Arlanda"),
            ws("stockholm-bromma", "Stockholm-Bromma"),
        ],
    },
    County {
        code: "D",
        name: "Södermanland",
        stations: &[ws("eskilstuna", "Eskilstuna"), ws("nykoping", "Nyköping")],
    },
    County {
        code: "E",
        name: "Östergötland",
        stations: &[ws("norrkoping", "Norrköping"), ws("linkoping", "Linköping")],
    },
    County {
        code: "F",
        name: "Jönköping",
        stations: &[ws("jonkoping", "Jönköping")],
    },
    County {
        code: "G",
        name: "Kronoberg",
        stations: &[ws("vaxjo", "Växjö"), ws("ljungby", "Ljungby")],
    },
    County {
        code: "H",
        name: "Kalmar",
        stations: &[ws("kalmar", "Kalmar")],
    },
    County {
        code: "I",
        name: "Gotland",
        stations: &[ws("visby", "Visby")],
    },
    County {
        code: "K",
        name: "Blekinge",
        stations: &[ws("karlskrona", "Karlskrona"), ws("ronneby", "Ronneby")],
    },
    County {
        code: "M",
        name: "Skåne",
        stations: &[
            ws("malmo", "Malmö"),
            ws("lund", "Lund"),
            ws("helsingborg", "Helsingborg"),
            ws("kristianstad", "Kristianstad"),
            ws("angelholm", "Ängelholm"),
        ],
    },
    County {
        code: "N",
        name: "Halland",
        stations: &[ws("halmstad", "Halmstad")],
    },
    County {
        code: "O",
        name: "Västra Götaland",
        stations: &[
            ws("goteborg", "Göteborg"),
            ws("goteborg-landvetter", "Göteborg-Landvetter"),
            ws("trollhattan", "Trollhättan"),
            ws("skovde", "Skövde"),
            ws("satenas", "Såtenäs"),
        ],
    },
];

pub const DEFAULT_STATION: &str = "lund";

pub fn find_station(id: &str) -> Option<&'static WeatherStation> {
    SWEDEN_COUNTIES
        .iter()
        .flat_map(|county| county.stations.iter())
        .find(|s| s.id == id)
}

/// Display name of a station, or the id itself when it is not in the catalog.
pub fn station_name(id: &str) -> &str {
    find_station(id).map(|s| s.name).unwrap_or(id)
}

/// County name of a station, or an empty string when unknown.
pub fn county_of(station_id: &str) -> &'static str {
    SWEDEN_COUNTIES
        .iter()
        .find(|county| county.stations.iter().any(|s| s.id == station_id))
        .map(|county| county.name)
        .unwrap_or("")
}
