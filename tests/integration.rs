#![allow(dead_code)]

use abrody_web::distance::{format_distance, format_feet};
use abrody_web::{OsClass, OsDetector, UaSignal, UnitSystem};
use fixtures::fixtures;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

// Global OsDetector instance that is initialized once
static DETECTOR_INSTANCE: OnceLock<Arc<OsDetector>> = OnceLock::new();

fn make_detector() -> Arc<OsDetector> {
    DETECTOR_INSTANCE
        .get_or_init(|| Arc::new(OsDetector::new().expect("failed to build OsDetector")))
        .clone()
}

// ---------------------------------------------------------------------------
// User-Agent fixtures
// ---------------------------------------------------------------------------

/// A fixture UA is a single header value, a list of values, or null.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UaInput {
    One(String),
    Many(Vec<String>),
}

fn signal_of(input: &UaInput) -> UaSignal {
    match input {
        UaInput::One(s) => UaSignal::from(s.as_str()),
        UaInput::Many(parts) => UaSignal::from_parts(parts),
    }
}

#[derive(Debug, Deserialize)]
struct UaFixture {
    #[serde(default)]
    user_agent: Option<UaInput>,
    os: String,
}

#[fixtures(["tests/fixtures/user_agents/*.yml"])]
#[test]
fn test_user_agent_fixtures(path: &std::path::Path) {
    let dd = make_detector();
    let content = std::fs::read_to_string(path).unwrap();
    let fixtures: Vec<UaFixture> = serde_yaml::from_str(&content).unwrap();
    assert!(!fixtures.is_empty(), "no fixtures in {}", path.display());

    for f in &fixtures {
        let expected = OsClass::from_str(&f.os)
            .unwrap_or_else(|| panic!("unknown os {:?} in {}", f.os, path.display()));
        let signal: UaSignal = f.user_agent.as_ref().map(signal_of).unwrap_or_default();

        let got = dd.detect(signal.clone());
        assert_eq!(got, expected, "os mismatch for UA: {:?}", f.user_agent);

        // Free function and a second call agree.
        assert_eq!(abrody_web::detect(signal.clone()), got);
        assert_eq!(dd.detect(signal), got);
    }
}

// ---------------------------------------------------------------------------
// Distance formatting fixtures
// ---------------------------------------------------------------------------

/// One row: a distance in `meters`, or in `feet` for imperial rows that pin
/// the mile thresholds without a meter conversion in between.
#[derive(Debug, Deserialize)]
struct DistanceFixture {
    #[serde(default)]
    meters: Option<f64>,
    #[serde(default)]
    feet: Option<f64>,
    expected: String,
}

fn units_for(path: &std::path::Path) -> UnitSystem {
    match path.file_stem().and_then(|s| s.to_str()) {
        Some("imperial") => UnitSystem::Imperial,
        Some("metric") => UnitSystem::Metric,
        other => panic!("no unit system for fixture file {other:?}"),
    }
}

#[fixtures(["tests/fixtures/distance/*.yml"])]
#[test]
fn test_distance_fixtures(path: &std::path::Path) {
    let units = units_for(path);
    let content = std::fs::read_to_string(path).unwrap();
    let fixtures: Vec<DistanceFixture> = serde_yaml::from_str(&content).unwrap();

    for f in &fixtures {
        let got = match (f.meters, f.feet) {
            (Some(m), None) => format_distance(m, units),
            (None, Some(ft)) => {
                assert_eq!(units, UnitSystem::Imperial, "feet rows are imperial only");
                format_feet(ft)
            }
            _ => panic!("fixture row needs exactly one of meters/feet: {f:?}"),
        };
        assert_eq!(got, f.expected, "{f:?} as {}", units.as_str());
    }
}

// ---------------------------------------------------------------------------
// Custom rule tables
// ---------------------------------------------------------------------------

#[test]
fn custom_rule_file_with_regex() {
    let dir = std::env::temp_dir().join(format!("abrody-rules-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("os_rules.yml");
    std::fs::write(
        &path,
        "ios:\n  contains: [iphone, ipad]\nandroid:\n  contains: [android]\n  regex: 'harmonyos(?! pc)'\n",
    )
    .unwrap();

    let dd = OsDetector::from_yaml_file(&path).unwrap();
    assert_eq!(dd.detect("Mozilla/5.0 (Phone; HarmonyOS 4.0)"), OsClass::Android);
    assert_eq!(dd.detect("Mozilla/5.0 (HarmonyOS PC)"), OsClass::Other);
    assert_eq!(dd.detect("Mozilla/5.0 (iPad)"), OsClass::Ios);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn malformed_rule_file_is_yaml_error() {
    let err = OsDetector::from_yaml_str("ios: [iphone").err().unwrap();
    assert!(matches!(err, abrody_web::Error::YAML(_)), "got {err:?}");
}
