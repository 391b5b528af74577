//! Draws viewable objects into a terminal window.

use crate::tesla::thing::{ChargeState, ClimateState, VehicleState};
use crate::text::{
    DistanceUnit, format_bool, format_distance, format_duration, format_temperature, table,
};
use colored::Colorize;
use serde_json::Value;

/// View renderer options.
#[derive(Debug, Default)]
pub struct ViewOptions {
    unit: DistanceUnit,
}

impl ViewOptions {
    /// Sets the unit in which distances are displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tesla_cli::text::DistanceUnit;
    /// use tesla_cli::view::ViewOptions;
    /// let opts = ViewOptions::default().unit(DistanceUnit::Mi);
    /// ```
    pub fn unit(mut self, unit: DistanceUnit) -> Self {
        self.unit = unit;
        self
    }
}

/// Marks an item that can be converted into a string for display on a terminal.
pub trait Viewable {
    /// Converts the item into a string for display on a terminal.
    fn view(&self, opts: &ViewOptions) -> String;
}

impl Viewable for VehicleState {
    fn view(&self, opts: &ViewOptions) -> String {
        let rows = vec![
            format!("Name:        {}", self.vehicle_name.as_deref().unwrap_or("")),
            format!("Car Version: {}", self.car_version),
            format!("Locked:      {}", format_bool(&self.locked, "Yes", "No")),
            format!("Odometer:    {}", format_distance(self.odometer, opts.unit)),
            format!("Sentry Mode: {}", format_bool(&self.sentry_mode, "On", "Off")),
        ];
        table("Car State", &rows)
    }
}

impl Viewable for ChargeState {
    fn view(&self, opts: &ViewOptions) -> String {
        let rows = vec![
            format!("Battery:               {}%", self.battery_level),
            format!("Usable Battery:        {}%", self.usable_battery_level),
            format!(
                "Rated Range:           {}",
                format_distance(self.battery_range, opts.unit)
            ),
            format!(
                "Est. Range:            {}",
                format_distance(self.est_battery_range, opts.unit)
            ),
            format!("Charge State:          {}", self.charging_state),
            format!(
                "Charge Rate (Range):   {}/h",
                format_distance(self.charge_rate, opts.unit)
            ),
            format!("Charge Rate (Current): {} kW", self.charge_power()),
            format!(
                "Remaining Time:        {}",
                format_duration(self.time_to_full_charge)
            ),
        ];
        table("Charge State", &rows)
    }
}

impl Viewable for ClimateState {
    fn view(&self, _: &ViewOptions) -> String {
        let rows = vec![
            format!("Interior Temp:       {}", format_temperature(self.inside_temp)),
            format!("Exterior Temp:       {}", format_temperature(self.outside_temp)),
            format!(
                "Driver Temp Setting: {}",
                format_temperature(Some(self.driver_temp_setting))
            ),
            format!("Fan Status:          {}", format_bool(&self.fan_status, "On", "Off")),
            format!("Climate:             {}", format_bool(&self.is_climate_on, "On", "Off")),
        ];
        table("Climate State", &rows)
    }
}

/// Pretty-prints a raw API payload, with keys sorted, between rules.
pub fn debug_view(raw: &Value) -> String {
    let json = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
    format!(
        "{}\n{}\n{}",
        "DEBUG =======================================".yellow(),
        json.blue(),
        "=============================================".yellow(),
    )
}
