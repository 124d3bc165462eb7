//! Display formatting for times, paces and distances.

use crate::units::{meters_to_km, meters_to_miles, UnitSystem};
use crate::{Error, Result};

// Truncate to whole seconds, absorbing float error just below a boundary
fn whole_seconds(total_seconds: f64) -> u64 {
    (total_seconds + 1e-6).floor().max(0.0) as u64
}

/// Format seconds as `M:SS`
pub fn format_time(total_seconds: f64) -> String {
    let total = whole_seconds(total_seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format seconds as `H:MM:SS`, falling back to `M:SS` under an hour
pub fn format_time_with_hours(total_seconds: f64) -> String {
    let total = whole_seconds(total_seconds);
    let hours = total / 3600;
    if hours == 0 {
        return format_time(total_seconds);
    }
    format!("{}:{:02}:{:02}", hours, (total % 3600) / 60, total % 60)
}

/// Pace value without unit suffix (`M:SS`)
pub fn format_pace_value(pace_seconds: f64) -> String {
    format_time(pace_seconds)
}

pub fn format_pace_per_km(seconds_per_km: f64) -> String {
    format!("{}/km", format_pace_value(seconds_per_km))
}

pub fn format_pace_per_mile(seconds_per_mile: f64) -> String {
    format!("{}/mi", format_pace_value(seconds_per_mile))
}

/// Format a pace in the given unit system
pub fn format_pace(pace_seconds: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format_pace_per_km(pace_seconds),
        UnitSystem::Imperial => format_pace_per_mile(pace_seconds),
    }
}

/// Format a zone pace range, slower pace first
///
/// `pace_min` is the faster end, `pace_max` the slower end.
pub fn format_pace_range(pace_min: f64, pace_max: f64, units: UnitSystem) -> String {
    format!(
        "{} - {}",
        format_pace(pace_max, units),
        format_pace(pace_min, units)
    )
}

pub fn format_distance_km(meters: f64, decimals: usize) -> String {
    format!("{:.*} km", decimals, meters_to_km(meters))
}

pub fn format_distance_miles(meters: f64, decimals: usize) -> String {
    format!("{:.*} mi", decimals, meters_to_miles(meters))
}

pub fn format_velocity(velocity_ms: f64, decimals: usize) -> String {
    format!("{:.*} m/s", decimals, velocity_ms)
}

/// Parse `MM:SS` into seconds
pub fn parse_time_to_seconds(time: &str) -> Result<f64> {
    let parts: Vec<&str> = time.trim().split(':').collect();
    if parts.len() != 2 {
        return Err(Error::Other("Invalid time format. Use MM:SS".into()));
    }

    let minutes = parse_component(parts[0])?;
    let seconds = parse_component(parts[1])?;
    Ok(minutes * 60.0 + seconds)
}

/// Parse `HH:MM:SS` or `MM:SS` into seconds
pub fn parse_time_with_hours_to_seconds(time: &str) -> Result<f64> {
    let parts: Vec<&str> = time.trim().split(':').collect();
    match parts.len() {
        2 => parse_time_to_seconds(time),
        3 => {
            let hours = parse_component(parts[0])?;
            let minutes = parse_component(parts[1])?;
            let seconds = parse_component(parts[2])?;
            Ok(hours * 3600.0 + minutes * 60.0 + seconds)
        }
        _ => Err(Error::Other(
            "Invalid time format. Use HH:MM:SS or MM:SS".into(),
        )),
    }
}

fn parse_component(part: &str) -> Result<f64> {
    part.trim()
        .parse::<u32>()
        .map(f64::from)
        .map_err(|_| Error::Other(format!("Invalid time component: {:?}", part)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(226.67), "3:46");
        assert_eq!(format_time(313.1), "5:13");
        assert_eq!(format_time_with_hours(1799.0), "29:59");
        assert_eq!(format_time_with_hours(3723.4), "1:02:03");
        assert_eq!(format_time(1000.0 / (6000.0 / 1800.0)), "5:00");
    }

    #[test]
    fn test_format_paces() {
        assert_eq!(format_pace_per_km(250.0), "4:10/km");
        assert_eq!(format_pace_per_mile(402.335), "6:42/mi");
        assert_eq!(format_pace(250.0, UnitSystem::Imperial), "4:10/mi");
        assert_eq!(
            format_pace_range(240.0, 300.0, UnitSystem::Metric),
            "5:00/km - 4:00/km"
        );
    }

    #[test]
    fn test_format_distances() {
        assert_eq!(format_distance_km(21097.5, 2), "21.10 km");
        assert_eq!(format_distance_miles(1609.34, 1), "1.0 mi");
        assert_eq!(format_velocity(3.19444, 2), "3.19 m/s");
    }

    #[test]
    fn test_parse_times() {
        assert_eq!(parse_time_to_seconds("6:00").unwrap(), 360.0);
        assert_eq!(parse_time_with_hours_to_seconds("18:00").unwrap(), 1080.0);
        assert_eq!(parse_time_with_hours_to_seconds("1:00:05").unwrap(), 3605.0);
        assert!(parse_time_to_seconds("360").is_err());
        assert!(parse_time_to_seconds("a:10").is_err());
        assert!(parse_time_with_hours_to_seconds("1:2:3:4").is_err());
    }
}
