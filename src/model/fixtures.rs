//! JSON fixtures shaped like the launches query endpoint's documents.

use serde_json::{Value, json};

/// A minimal valid launch document: every required field, nothing else.
pub fn launch_json(id: &str, flight_number: u32, date_utc: &str, upcoming: bool) -> Value {
    json!({
        "links": {
            "patch": { "small": null, "large": null },
            "reddit": { "campaign": null, "launch": null, "media": null, "recovery": null },
            "flickr": { "small": [], "original": [] }
        },
        "net": false,
        "rocket": "5e9d0d95eda69955f709d1eb",
        "launchpad": "5e9e4502f5090995de566f86",
        "flight_number": flight_number,
        "name": format!("Mission {flight_number}"),
        "date_utc": date_utc,
        "date_unix": 0,
        "date_local": date_utc,
        "date_precision": "hour",
        "upcoming": upcoming,
        "auto_update": true,
        "tbd": false,
        "id": id
    })
}

/// A populated payload document.
pub fn payload_json(id: &str, mass_kg: Option<f64>) -> Value {
    json!({
        "name": format!("Payload {id}"),
        "type": "Satellite",
        "mass_kg": mass_kg,
        "orbit": "LEO",
        "customers": [],
        "id": id
    })
}

/// A past launch with an outcome and payload masses.
pub fn flown_launch_json(
    id: &str,
    flight_number: u32,
    date_utc: &str,
    success: Option<bool>,
    masses: &[Option<f64>],
) -> Value {
    let mut value = launch_json(id, flight_number, date_utc, false);
    value["success"] = json!(success);
    value["payloads"] = masses
        .iter()
        .enumerate()
        .map(|(i, mass)| payload_json(&format!("{id}-p{i}"), *mass))
        .collect();
    value
}
