//! Imperial/metric conversions and the measurement strings shown on wiki pages.
//!
//! The dump stores weights in pounds, volumes in millilitres and temperatures
//! in Fahrenheit. Fluid ounces are imperial (UK) ounces.

pub const KG_PER_POUND: f64 = 0.45359237;
pub const METERS_PER_INCH: f64 = 0.0254;
pub const METERS_PER_FOOT: f64 = 0.3048;
pub const LITERS_PER_FLUID_OUNCE: f64 = 0.02841306;
pub const ML_PER_FLUID_OUNCE: f64 = 28.41306;

/// Volumes above this are shown in litres.
const ML_DISPLAY_LIMIT: f64 = 1000.0;

pub fn pounds_to_kg(pounds: f64) -> f64 {
    pounds * KG_PER_POUND
}

pub fn inches_to_meters(inches: f64) -> f64 {
    inches * METERS_PER_INCH
}

pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}

pub fn fluid_ounces_to_liters(fluid_ounces: f64) -> f64 {
    fluid_ounces * LITERS_PER_FLUID_OUNCE
}

pub fn ml_to_fluid_ounces(ml: f64) -> f64 {
    ml / ML_PER_FLUID_OUNCE
}

/// Whole degrees Celsius.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> i64 {
    ((fahrenheit - 32.0) / 1.8).round() as i64
}

/// `10.0` -> `"10.00 lbs / 4.54 kg"`
pub fn weight_str(pounds: f64) -> String {
    format!("{:.2} lbs / {:.2} kg", pounds, pounds_to_kg(pounds))
}

/// `1000.0` -> `"35.195 fl. oz. / 1000.0 mL"`, `5000.0` -> `"175.975 fl. oz. / 5.0 L"`
pub fn fluid_volume_str(ml: f64) -> String {
    let fluid_ounces = ml_to_fluid_ounces(ml);
    if ml <= ML_DISPLAY_LIMIT {
        format!("{:.3} fl. oz. / {:.1} mL", fluid_ounces, ml)
    } else {
        format!("{:.3} fl. oz. / {:.1} L", fluid_ounces, ml / 1000.0)
    }
}

/// `23.0` -> `"23 °F / -5 °C"`
pub fn temperature_str(fahrenheit: f64) -> String {
    format!(
        "{} °F / {} °C",
        fahrenheit.round() as i64,
        fahrenheit_to_celsius(fahrenheit)
    )
}
