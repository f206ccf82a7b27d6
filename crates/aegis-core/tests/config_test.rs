//! Configuration defaults, TOML loading, and band classification.

use aegis_core::config::{AegisConfig, ThresholdBands};
use aegis_core::models::{RecommendedAction, Severity};
use proptest::prelude::*;

#[test]
fn test_defaults() {
    let config = AegisConfig::default();
    assert_eq!(config.detection.window_secs, 86_400);
    assert_eq!(config.detection.min_sample_size, 100);
    assert_eq!(config.detection.error_rate.thresholds.warning, 50.0);
    assert_eq!(config.detection.error_rate.thresholds.critical, 70.0);
    assert_eq!(config.rate_limit.max_attempts, 10);
    assert_eq!(config.rate_limit.window_secs, 3_600);
    assert_eq!(config.notify.max_attempts, 5);
}

#[test]
fn test_default_action_tables() {
    let config = AegisConfig::default();
    assert_eq!(
        config.detection.error_rate.action_for(Severity::Critical),
        RecommendedAction::Investigate
    );
    assert_eq!(
        config.detection.spike.action_for(Severity::Severe),
        RecommendedAction::Suspend
    );
    assert_eq!(
        config.detection.pattern.action_for(Severity::Critical),
        RecommendedAction::Suspend
    );
}

#[test]
fn test_toml_overrides_with_fallback() {
    let config = AegisConfig::from_toml_str(
        r#"
        [detection]
        min_sample_size = 250

        [rate_limit]
        max_attempts = 3
        "#,
    )
    .unwrap();
    assert_eq!(config.detection.min_sample_size, 250);
    assert_eq!(config.rate_limit.max_attempts, 3);
    // Untouched sections keep defaults.
    assert_eq!(config.detection.window_secs, 86_400);
    assert_eq!(config.notify.max_attempts, 5);
}

#[test]
fn test_toml_rejects_garbage() {
    assert!(AegisConfig::from_toml_str("detection = 4").is_err());
}

#[test]
fn test_band_classification() {
    let bands = ThresholdBands {
        warning: 50.0,
        critical: 70.0,
        severe: 90.0,
    };
    assert_eq!(bands.classify(10.0), None);
    assert_eq!(bands.classify(49.9), None);
    assert_eq!(bands.classify(50.0), Some(Severity::Warning));
    assert_eq!(bands.classify(69.9), Some(Severity::Warning));
    assert_eq!(bands.classify(70.0), Some(Severity::Critical));
    assert_eq!(bands.classify(89.9), Some(Severity::Critical));
    assert_eq!(bands.classify(90.0), Some(Severity::Severe));
    assert_eq!(bands.classify(100.0), Some(Severity::Severe));
}

proptest! {
    /// A strictly higher metric value never yields a lower severity.
    #[test]
    fn prop_classification_is_monotonic(a in 0.0f64..200.0, b in 0.0f64..200.0) {
        let bands = ThresholdBands { warning: 50.0, critical: 70.0, severe: 90.0 };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo_sev = bands.classify(lo);
        let hi_sev = bands.classify(hi);
        match (lo_sev, hi_sev) {
            (Some(l), Some(h)) => prop_assert!(l <= h),
            (Some(_), None) => prop_assert!(false, "higher value lost its severity"),
            _ => {}
        }
    }
}
