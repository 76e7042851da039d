//! Travel planning tools
//!
//! A fixed registry of destinations reachable from Lahore, a best-effort
//! parser for the free-form inputs models send as `Action Input`, and the
//! tool functions built on both. Tools never fail: problems come back as
//! `Error: ...` text so the agent can read them as an observation.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::str::FromStr;

use rand::RngExt;
use serde_json::Value;
use tracing::info;

use crate::agent::Tool;

/// Every trip starts here.
pub const ORIGIN: &str = "Lahore";

/// Weather reported for a destination missing from the weather table.
pub const FALLBACK_WEATHER: &str = "cloudy";

/// Daily cost used for a destination missing from the cost table.
pub const FALLBACK_COST_PER_DAY: i64 = 150;

/// An approved destination and its static travel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub name: &'static str,
    pub weather: &'static str,
    pub cost_per_day: i64,
    /// Road distance from [`ORIGIN`]
    pub distance_km: u32,
    /// Whether flights are available
    pub air_access: bool,
}

pub static DESTINATIONS: [Destination; 6] = [
    Destination {
        name: "Hunza",
        weather: "sunny",
        cost_per_day: 80,
        distance_km: 650,
        air_access: true,
    },
    Destination {
        name: "Naran",
        weather: "partly cloudy",
        cost_per_day: 60,
        distance_km: 400,
        air_access: false,
    },
    Destination {
        name: "Skardu",
        weather: "snowy",
        cost_per_day: 70,
        distance_km: 700,
        air_access: true,
    },
    Destination {
        name: "Murree",
        weather: "sunny",
        cost_per_day: 40,
        distance_km: 300,
        air_access: false,
    },
    Destination {
        name: "Swat",
        weather: "partly cloudy",
        cost_per_day: 50,
        distance_km: 450,
        air_access: false,
    },
    Destination {
        name: "Gilgit",
        weather: "sunny",
        cost_per_day: 65,
        distance_km: 600,
        air_access: false,
    },
];

impl Destination {
    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static Destination> {
        DESTINATIONS.iter().find(|d| d.name == name)
    }

    fn lookup_ignore_case(name: &str) -> Option<&'static Destination> {
        DESTINATIONS.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

/// Approved names as `Hunza, Naran, ..., or Gilgit`.
#[must_use]
pub fn approved_destinations_phrase() -> String {
    let names: Vec<&str> = DESTINATIONS.iter().map(|d| d.name).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        Some((last, _)) => (*last).to_string(),
        None => String::new(),
    }
}

/// Fields extracted from a tool input, e.g. `origin`, `destination`, `mode`.
pub type ToolInvocationArgs = BTreeMap<String, String>;

/// Reduces a free-form tool input to named fields.
///
/// Tries, in order: a JSON object, `"A to B"`, and `"A, B[, mode]"`.
/// Anything else gives an empty mapping.
#[must_use]
pub fn parse_tool_input(input: &str) -> ToolInvocationArgs {
    let text = input.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect();
    }

    if text.to_lowercase().contains(" to ") {
        let parts: Vec<&str> = text.split(" to ").map(str::trim).collect();
        if let [origin, destination] = parts[..] {
            return ToolInvocationArgs::from([
                ("origin".to_string(), origin.to_string()),
                ("destination".to_string(), destination.to_string()),
            ]);
        }
    }

    if text.contains(',') {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() >= 2 {
            let mut args = ToolInvocationArgs::from([
                ("origin".to_string(), parts[0].to_string()),
                ("destination".to_string(), parts[1].to_string()),
            ]);
            if let Some(mode) = parts.get(2) {
                args.insert("mode".to_string(), (*mode).to_string());
            }
            return args;
        }
    }

    ToolInvocationArgs::new()
}

/// Checks `destination` against the approved list.
pub fn validate_destination(destination: &str) -> Result<&'static Destination, String> {
    Destination::lookup(destination).ok_or_else(|| {
        format!(
            "Error: {destination} is not an approved destination. Use get_approved_destinations to see available options."
        )
    })
}

fn non_empty<'a>(args: &'a ToolInvocationArgs, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn weather_for(destination: &str) -> &'static str {
    Destination::lookup_ignore_case(destination).map_or(FALLBACK_WEATHER, |d| d.weather)
}

fn cost_per_day_for(destination: &str) -> i64 {
    Destination::lookup_ignore_case(destination).map_or(FALLBACK_COST_PER_DAY, |d| d.cost_per_day)
}

/// Always `Lahore`; the input is ignored.
pub fn get_user_location(_input: &str) -> String {
    ORIGIN.to_string()
}

pub fn get_approved_destinations(_input: &str) -> String {
    let names: Vec<&str> = DESTINATIONS.iter().map(|d| d.name).collect();
    format!("Approved destinations from {ORIGIN}: {}", names.join(", "))
}

/// Accepts a bare (optionally quoted) name or `{"destination": ...}`.
///
/// The `A to B` and comma forms are not unpacked: anything that is not an
/// approved name is rejected as a whole.
pub fn get_weather(input: &str) -> String {
    let text = input.trim();
    let destination = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => match map.get("destination") {
            Some(Value::String(d)) => d.clone(),
            _ => text.to_string(),
        },
        _ => text.trim_matches(|c| c == '"' || c == '\'').to_string(),
    };

    if let Err(error) = validate_destination(&destination) {
        return error;
    }

    let weather = weather_for(&destination);
    info!("🌤️  Weather in {}: {}", destination, weather);
    format!("Weather in {destination}: {weather}")
}

pub fn calculate_distance(input: &str) -> String {
    let args = parse_tool_input(input);
    let (Some(origin), Some(destination)) =
        (non_empty(&args, "origin"), non_empty(&args, "destination"))
    else {
        return r#"Error: Provide origin and destination. E.g., {"origin":"Lahore","destination":"Murree"}"#
            .to_string();
    };

    let target = match validate_destination(destination) {
        Ok(target) => target,
        Err(error) => return error,
    };

    if origin != ORIGIN {
        return format!("Error: No distance data for {origin} to {destination}");
    }

    info!("📏 Distance from {} to {}: {} km", origin, destination, target.distance_km);
    format!("{} km", target.distance_km)
}

/// Travel mode as given by the model, lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TravelMode {
    Road,
    Air,
    /// Any other word. Timed like a flight but not limited to airports.
    Other(String),
}

impl TravelMode {
    /// Inclusive range of hours a trip may take.
    #[must_use]
    pub fn hours_range(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            TravelMode::Road => 2..=12,
            TravelMode::Air | TravelMode::Other(_) => 1..=6,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            TravelMode::Road => "road",
            TravelMode::Air => "air",
            TravelMode::Other(mode) => mode,
        }
    }
}

impl FromStr for TravelMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "road" => TravelMode::Road,
            "air" => TravelMode::Air,
            other => TravelMode::Other(other.to_string()),
        })
    }
}

/// Hours are drawn at random from the mode's range on every call.
pub fn get_travel_time(input: &str) -> String {
    let args = parse_tool_input(input);
    let (Some(origin), Some(destination)) =
        (non_empty(&args, "origin"), non_empty(&args, "destination"))
    else {
        return r#"Error: Provide origin and destination. E.g., {"origin":"Lahore","destination":"Skardu","mode":"air"}"#
            .to_string();
    };

    let target = match validate_destination(destination) {
        Ok(target) => target,
        Err(error) => return error,
    };

    let Ok(mode) = non_empty(&args, "mode").unwrap_or("road").parse::<TravelMode>();

    if mode == TravelMode::Air && !target.air_access {
        return format!(
            "Error: Air travel is only available to Hunza and Skardu. {destination} only supports road travel."
        );
    }

    let hours = rand::rng().random_range(mode.hours_range());
    info!(
        "⏱️  Travel time from {} to {} by {}: {} hours",
        origin,
        destination,
        mode.as_str(),
        hours
    );
    format!("{hours} hours")
}

/// `cost = cost_per_day * days`; affordable iff `cost <= budget`.
///
/// The product is taken in `i128`, which no pair of `i64` factors overflows.
pub fn check_budget(input: &str) -> String {
    let args = parse_tool_input(input);
    let (Some(destination), Some(days), Some(budget)) = (
        non_empty(&args, "destination"),
        args.get("days"),
        args.get("budget"),
    ) else {
        return r#"Error: Provide destination, days, budget. E.g., {"destination":"Naran","days":3,"budget":400}"#
            .to_string();
    };

    let (Ok(days), Ok(budget)) = (days.trim().parse::<i64>(), budget.trim().parse::<f64>()) else {
        return "Error: days must be int and budget must be number.".to_string();
    };

    if let Err(error) = validate_destination(destination) {
        return error;
    }

    let total_cost = i128::from(cost_per_day_for(destination)) * i128::from(days);
    let status = if total_cost as f64 <= budget {
        "affordable"
    } else {
        "over budget"
    };

    info!("💰 Budget check for {}: Rs{} for {} days - {}", destination, total_cost, days, status);
    format!("Cost: Rs{total_cost} for {days} days, {status}")
}

/// The six travel tools, with the descriptions the agent sees.
#[must_use]
pub fn travel_tools() -> Vec<Tool> {
    let approved = approved_destinations_phrase();
    vec![
        Tool::new(
            "get_user_location",
            "Get user's current location. Always returns 'Lahore' in this demo. Pass any string as input (ignored).",
            get_user_location,
        ),
        Tool::new(
            "get_approved_destinations",
            "Get list of pre-approved destinations from Lahore. Only these destinations can be recommended.",
            get_approved_destinations,
        ),
        Tool::new(
            "get_weather",
            format!(
                "Get weather information for a pre-approved destination. Only works with approved destinations: {approved}."
            ),
            get_weather,
        ),
        Tool::new(
            "calculate_distance",
            r#"Calculate distance. Action Input formats accepted: JSON {"origin":"Lahore", "destination":"Murree"} or text "Lahore to Murree" or "Lahore, Murree". Returns distance in km."#,
            calculate_distance,
        ),
        Tool::new(
            "get_travel_time",
            r#"Get travel time. Action Input formats accepted: JSON {"origin":"Lahore", "destination":"Skardu", "mode":"air"} or text "Lahore, Skardu, air" or "Lahore to Skardu". Modes: road (default) or air (only Hunza/Skardu). Returns time in hours."#,
            get_travel_time,
        ),
        Tool::new(
            "check_budget",
            format!(
                r#"Check budget affordability. Action Input format: JSON {{"destination":"Naran","days":3,"budget":400}}. Only works with: {approved}. Returns total cost and affordability status."#
            ),
            check_budget,
        ),
    ]
}
