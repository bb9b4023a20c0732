// es-core/src/units.rs

use uom::si::f64::{Area as UomArea, Energy as UomEnergy};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Energy = UomEnergy;

#[inline]
pub fn kwh(v: f64) -> Energy {
    use uom::si::energy::kilowatt_hour;
    Energy::new::<kilowatt_hour>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn as_kwh(e: Energy) -> f64 {
    use uom::si::energy::kilowatt_hour;
    e.get::<kilowatt_hour>()
}

/// Energy use intensity in kWh/m²/year; zero when the area is not positive.
pub fn eui(energy: Energy, area: Area) -> f64 {
    use uom::si::area::square_meter;
    let area_m2 = area.get::<square_meter>();
    if area_m2 > 0.0 {
        as_kwh(energy) / area_m2
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        assert!((as_kwh(kwh(1.5)) - 1.5).abs() < 1e-12);
        let _a = m2(125.0);
    }

    #[test]
    fn eui_guards_zero_area() {
        assert_eq!(eui(kwh(1000.0), m2(0.0)), 0.0);
        assert!((eui(kwh(60_000.0), m2(3385.0)) - 17.725_258).abs() < 1e-5);
    }
}
