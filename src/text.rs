//! Helpful utilities for working with text.

use clap::ValueEnum;
use std::fmt;

/// Number of kilometers in a mile.
pub const KM_PER_MILE: f64 = 1.60934;

/// Unit in which distances are displayed.
///
/// The API always reports distances in miles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DistanceUnit {
    /// Kilometers.
    #[default]
    Km,

    /// Miles.
    Mi,
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Km => write!(f, "km"),
            DistanceUnit::Mi => write!(f, "mi"),
        }
    }
}

/// Formats a distance given in `miles` in the given `unit`, rounded to
/// the nearest whole number.
///
/// # Examples
///
/// ```
/// use tesla_cli::text::{DistanceUnit, format_distance};
/// assert_eq!(format_distance(100.0, DistanceUnit::Km), "161 km");
/// assert_eq!(format_distance(100.0, DistanceUnit::Mi), "100 mi");
/// ```
pub fn format_distance(miles: f64, unit: DistanceUnit) -> String {
    let value = match unit {
        DistanceUnit::Km => miles * KM_PER_MILE,
        DistanceUnit::Mi => miles,
    };
    format!("{value:.0} {unit}")
}

/// Something that can be read as yes or no.
///
/// The API is not consistent about how it reports flags: some are
/// booleans, some are integers, and some are strings.
pub trait Truthy {
    /// True if the value means "yes".
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for i64 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        matches!(
            self.to_lowercase().as_str(),
            "yes" | "true" | "1" | "y" | "on"
        )
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

/// Formats a flag as one of two labels.
///
/// # Examples
///
/// ```
/// use tesla_cli::text::format_bool;
/// assert_eq!(format_bool(&true, "On", "Off"), "On");
/// assert_eq!(format_bool("no", "Yes", "No"), "No");
/// assert_eq!(format_bool(&3_i64, "On", "Off"), "On");
/// ```
pub fn format_bool<'a, T: Truthy + ?Sized>(value: &T, yes: &'a str, no: &'a str) -> &'a str {
    if value.is_truthy() { yes } else { no }
}

/// Formats a number of `hours` as hours and whole minutes.
///
/// # Examples
///
/// ```
/// use tesla_cli::text::format_duration;
/// assert_eq!(format_duration(1.5), "1h 30m");
/// assert_eq!(format_duration(0.0), "0h 0m");
/// ```
pub fn format_duration(hours: f64) -> String {
    let minutes = (hours * 60.0) as i64;
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Formats an optional temperature in degrees Celsius.
pub fn format_temperature(celsius: Option<f64>) -> String {
    match celsius {
        Some(celsius) => format!("{celsius}C"),
        None => String::from("--"),
    }
}

/// Lays `rows` out as a table under `title`, with rules as wide as the
/// widest row above and below the rows.
///
/// # Examples
///
/// ```
/// use tesla_cli::text::table;
/// let rows = vec![String::from("Battery: 80%"), String::from("Range: 300 km")];
/// assert_eq!(
///     table("Charge", &rows),
///     "Charge\n-------------\nBattery: 80%\nRange: 300 km\n-------------"
/// );
/// ```
pub fn table(title: &str, rows: &[String]) -> String {
    let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
    let rule = "-".repeat(width);
    let mut lines = Vec::with_capacity(rows.len() + 3);
    if !title.is_empty() {
        lines.push(title.to_string());
    }
    lines.push(rule.clone());
    lines.extend(rows.iter().cloned());
    lines.push(rule);
    lines.join("\n")
}
