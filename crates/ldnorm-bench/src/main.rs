//! Benchmark for flatten/unflatten/merge using city data.
//!
//! Each city is built as a nested record embedding its state, which embeds
//! its country. Reads a cities JSON file if one is given, otherwise
//! generates a synthetic dataset.

use std::collections::HashMap;
use std::fs;
use std::time::Instant;

use ldnorm::{
    FlatStore, Flattener, RecordBuilder, Reference, SeededIds, UnflattenOptions, Value, clean,
    merge_stores, unflatten,
};
use serde::Deserialize;

const SYNTHETIC_CITIES: u32 = 50_000;
const STATES_PER_COUNTRY: u32 = 20;
const CITIES_PER_STATE: u32 = 25;
const UNFLATTEN_ITERS: u32 = 3;

// =============================================================================
// JSON DATA STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct City {
    id: u32,
    name: String,
    state_id: u32,
    state_code: String,
    state_name: String,
    country_id: u32,
    country_code: String,
    country_name: String,
    latitude: String,
    longitude: String,
    #[serde(rename = "type")]
    city_type: Option<String>,
    population: Option<i64>,
    timezone: Option<String>,
    translations: Option<HashMap<String, String>>,
    #[serde(rename = "wikiDataId")]
    wikidata_id: Option<String>,
}

fn synthetic_cities(count: u32) -> Vec<City> {
    (0..count)
        .map(|id| {
            let state_id = id / CITIES_PER_STATE;
            let country_id = state_id / STATES_PER_COUNTRY;
            City {
                id,
                name: format!("City {id}"),
                state_id,
                state_code: format!("S{state_id}"),
                state_name: format!("State {state_id}"),
                country_id,
                country_code: format!("C{country_id}"),
                country_name: format!("Country {country_id}"),
                latitude: format!("{:.4}", (id % 180) as f64 - 90.0),
                longitude: format!("{:.4}", (id % 360) as f64 - 180.0),
                city_type: (id % 3 == 0).then(|| "town".to_string()),
                population: (id % 2 == 0).then_some(i64::from(id) * 100),
                timezone: Some("UTC".to_string()),
                translations: None,
                wikidata_id: Some(format!("Q{id}")),
            }
        })
        .collect()
}

// =============================================================================
// CONVERSION TO NESTED RECORDS
// =============================================================================

fn build_city(city: &City) -> Value {
    let mut builder = RecordBuilder::new("City")
        .id(format!("city-{}", city.id))
        .prop("name", city.name.as_str())
        .prop("type_name", city.city_type.clone())
        .prop("population", city.population)
        .prop("timezone", city.timezone.clone())
        .prop("wikiDataId", city.wikidata_id.clone());

    if let (Ok(lat), Ok(lon)) = (city.latitude.parse::<f64>(), city.longitude.parse::<f64>()) {
        builder = builder.prop("geo", RecordBuilder::untyped().prop("lat", lat).prop("lon", lon).into_value());
    }

    if let Some(translations) = &city.translations {
        for translation in translations.values() {
            builder = builder.push("alternateName", translation.as_str());
        }
    }

    builder
        .embed("containedIn", "State", |state| {
            state
                .id(format!("state-{}", city.state_id))
                .prop("name", city.state_name.as_str())
                .prop("code", city.state_code.as_str())
                .embed("containedIn", "Country", |country| {
                    country
                        .id(format!("country-{}", city.country_id))
                        .prop("name", city.country_name.as_str())
                        .prop("code", city.country_code.as_str())
                })
        })
        .into_value()
}

fn main() {
    let cities: Vec<City> = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading cities from: {}", path);
            let json_data = fs::read_to_string(&path).expect("Failed to read cities file");
            serde_json::from_str(&json_data).expect("Failed to parse JSON")
        }
        None => {
            println!("No input file, generating {} synthetic cities", SYNTHETIC_CITIES);
            synthetic_cities(SYNTHETIC_CITIES)
        }
    };

    let build_start = Instant::now();
    // Optional fields are absent members until cleaned
    let nested = clean(&Value::Array(cities.iter().map(build_city).collect()));
    println!("Built {} nested records in {:?}", cities.len(), build_start.elapsed());

    // Flatten
    let flatten_start = Instant::now();
    let store = Flattener::with_generator(SeededIds::new("bench")).flatten_to_store(&nested);
    let flatten_time = flatten_start.elapsed();

    println!("\nFlatten: {} records in {:?}", store.len(), flatten_time);
    println!(
        "  Throughput: {:.0} cities/s",
        cities.len() as f64 / flatten_time.as_secs_f64()
    );

    // Unflatten every city
    let references: Vec<Value> = cities
        .iter()
        .map(|city| Reference::new("City", format!("city-{}", city.id)).to_value())
        .collect();

    let unflatten_start = Instant::now();
    let mut rebuilt = 0;
    for _ in 0..UNFLATTEN_ITERS {
        rebuilt = references
            .iter()
            .filter_map(|reference| unflatten(reference, &store, UnflattenOptions::new()))
            .count();
    }
    let unflatten_time = unflatten_start.elapsed() / UNFLATTEN_ITERS;

    println!(
        "\nUnflatten: {} records in {:?} (avg of {} iterations)",
        rebuilt, unflatten_time, UNFLATTEN_ITERS
    );
    assert_eq!(rebuilt, cities.len());

    // Spot-check the round trip
    let first = unflatten(&references[0], &store, UnflattenOptions::new()).expect("Failed to unflatten");
    if let Value::Array(items) = &nested {
        assert_eq!(Value::Object(first), items[0]);
    }

    // Merge two snapshots of the same store
    let snapshot: FlatStore = store
        .iter()
        .map(|record| {
            let mut record = record.clone();
            record.insert("revision", 2);
            record
        })
        .collect();

    let merge_start = Instant::now();
    let merged = merge_stores(&store, &snapshot);
    let merge_time = merge_start.elapsed();

    println!("\nMerge: {} records in {:?}", merged.len(), merge_time);
    assert_eq!(merged.len(), store.len());

    // Clean
    let flat = store.into_value();
    let clean_start = Instant::now();
    let cleaned = clean(&flat);
    println!("\nClean: {:?}", clean_start.elapsed());
    assert_eq!(cleaned, flat);

    // Summary
    let json_size = serde_json::to_string(&nested).map(|s| s.len()).unwrap_or(0);
    let flat_size = serde_json::to_string(&flat).map(|s| s.len()).unwrap_or(0);

    println!("\n=== Summary ===");
    println!("Cities: {}", cities.len());
    println!("Flat records: {}", merged.len());
    println!(
        "Nested JSON: {} bytes ({:.1} MB)",
        json_size,
        json_size as f64 / 1_000_000.0
    );
    println!(
        "Flat JSON: {} bytes ({:.1} MB)",
        flat_size,
        flat_size as f64 / 1_000_000.0
    );
}
