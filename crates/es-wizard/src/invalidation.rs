//! Which computed results each wizard input invalidates.

/// User-editable inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Mode,
    BuildingType,
    WeatherStation,
    ConstructionPeriod,
    BatchCounts,
    BatchPeriods,
    CustomParameters,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Mode,
        Field::BuildingType,
        Field::WeatherStation,
        Field::ConstructionPeriod,
        Field::BatchCounts,
        Field::BatchPeriods,
        Field::CustomParameters,
    ];
}

/// Result slots held by the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derived {
    PreConfiguredResult,
    CustomResult,
    BatchResults,
}

const ALL_RESULTS: &[Derived] = &[
    Derived::PreConfiguredResult,
    Derived::CustomResult,
    Derived::BatchResults,
];

pub const INVALIDATION_TABLE: &[(Field, &[Derived])] = &[
    (Field::Mode, ALL_RESULTS),
    (
        Field::BuildingType,
        &[Derived::PreConfiguredResult, Derived::CustomResult],
    ),
    (Field::WeatherStation, ALL_RESULTS),
    (Field::ConstructionPeriod, &[Derived::PreConfiguredResult]),
    (Field::BatchCounts, &[Derived::BatchResults]),
    (Field::BatchPeriods, &[Derived::BatchResults]),
    (Field::CustomParameters, &[Derived::CustomResult]),
];

pub fn invalidated_by(field: Field) -> &'static [Derived] {
    INVALIDATION_TABLE
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, derived)| *derived)
        .unwrap_or(&[])
}
