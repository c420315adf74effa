//! Property tests for recursive forecasting and classification

mod common;

use aquaguard_core::{CancelToken, FeatureVector};
use aquaguard_ml::classifier::percent;
use aquaguard_ml::{forecast_recursive, AnomalyClassifier, FeatureThresholds, LastValueForecaster};
use common::*;
use proptest::prelude::*;

fn feature_vector() -> impl Strategy<Value = FeatureVector> {
    [0.0f64..120.0, 0.0f64..100.0, 0.0f64..100.0, -10.0f64..40.0]
}

proptest! {
    #[test]
    fn horizon_is_exact(
        time_step in 1usize..16,
        extra in 0usize..16,
        horizon in 0usize..64,
        step in -1.0f64..1.0,
    ) {
        let history: Vec<FeatureVector> = (0..time_step + extra).map(|i| [i as f64; 4]).collect();

        let naive = LastValueForecaster::new(time_step);
        let out = forecast_recursive(&naive, &history, horizon, &CancelToken::new()).unwrap();
        prop_assert_eq!(out.len(), horizon);

        let drift = DriftForecaster { time_step, step };
        let out = forecast_recursive(&drift, &history, horizon, &CancelToken::new()).unwrap();
        prop_assert_eq!(out.len(), horizon);
    }

    #[test]
    fn leak_never_exceeds_either_component(
        forecast in prop::collection::vec(feature_vector(), 0..64),
        actual in prop::collection::vec(feature_vector(), 0..64),
        temperature in 0.5f64..6.0,
    ) {
        let classifier = AnomalyClassifier::new(&FeatureThresholds::default(), temperature);
        let flags = classifier.classify(&forecast, &actual);

        prop_assert_eq!(flags.len(), forecast.len().min(actual.len()));
        let pct = flags.percentages();
        prop_assert!(pct.leak <= percent(&flags.pressure).min(percent(&flags.flow_rate)));
        for value in [pct.leak, pct.water_quality, pct.temperature] {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }
}
