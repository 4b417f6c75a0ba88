//! Property-based tests for the price ring and the threshold evaluator
//!
//! Run with: cargo test -p crypto-alert --test ring_properties --release

mod common;

use common::minute;
use crypto_alert::domain::{PriceChange, ThresholdEvaluator, THRESHOLD_TOLERANCE};
use crypto_alert::{CircularPriceCache, LaggedSample, MarketType, MonitorConfig, Sample, TradingPair};
use proptest::prelude::*;

// ============================================================================
// Ring Buffer Properties
// ============================================================================

fn price_for(tick: u64) -> f64 {
    1000.0 + tick as f64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// With every tick written, the lagged lookup returns exactly the sample
    /// written `window` ticks earlier, or insufficient history before that
    #[test]
    fn lagged_lookup_is_exact(capacity in 1usize..40, window_seed in 0usize..40, ticks in 1u64..150) {
        let window = window_seed % capacity + 1;
        let mut cache = CircularPriceCache::new(capacity);

        for tick in 0..ticks {
            cache.put(tick, Sample::new(price_for(tick), minute(tick as i64)));
            let lookup = cache.get_current_and_lagged(tick, window).unwrap();

            prop_assert_eq!(lookup.current.map(|s| s.price), Some(price_for(tick)));
            match lookup.lagged {
                LaggedSample::InsufficientHistory => {
                    prop_assert!(tick < window as u64, "tick {} window {}", tick, window);
                }
                LaggedSample::Available(sample) => {
                    let lagged_tick = tick - window as u64;
                    prop_assert_eq!(sample.price, price_for(lagged_tick));
                    prop_assert_eq!(sample.timestamp, minute(lagged_tick as i64));
                }
                LaggedSample::Missing { lagged_tick } => {
                    prop_assert!(false, "tick {} unexpectedly missing", lagged_tick);
                }
            }
        }
    }

    /// Slot indices never leave the ring, even for ticks before the window
    #[test]
    fn slot_indices_in_range(capacity in 1usize..1000, tick in 0u64..100_000, window_seed in 0usize..1000) {
        let window = window_seed % capacity + 1;
        let cache = CircularPriceCache::new(capacity);

        prop_assert!(cache.slot_index(tick) < capacity);
        let lagged = cache.lagged_slot_index(tick, window);
        prop_assert!(lagged < capacity);
        prop_assert_eq!((lagged + window) % capacity, cache.slot_index(tick));
    }

    /// A skipped tick is reported as missing, never as an older sample
    #[test]
    fn skipped_tick_never_aliases(capacity in 2usize..30, skip_seed in 0u64..60, window_seed in 0usize..30) {
        let window = window_seed % capacity + 1;
        let skipped = skip_seed;
        let last = skipped + window as u64;
        let mut cache = CircularPriceCache::new(capacity);

        for tick in 0..=last {
            if tick != skipped {
                cache.put(tick, Sample::new(price_for(tick), minute(tick as i64)));
            }
        }

        let lookup = cache.get_current_and_lagged(last, window).unwrap();
        prop_assert_eq!(lookup.lagged, LaggedSample::Missing { lagged_tick: skipped });
    }
}

// ============================================================================
// Evaluator Properties
// ============================================================================

fn evaluator(threshold: f64) -> ThresholdEvaluator {
    let config = MonitorConfig::new(TradingPair::new("BTC", "USD"), MarketType::Spot, 5, threshold, 720).unwrap();
    ThresholdEvaluator::new(&config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Percentage change does not depend on the unit of the price
    #[test]
    fn percentage_is_scale_invariant(lagged in 0.01..100_000.0f64, ratio in 0.5..1.5f64, scale in 0.001..1000.0f64) {
        let current = lagged * ratio;
        let a = PriceChange::between(&Sample::new(current, minute(5)), &Sample::new(lagged, minute(0))).unwrap();
        let b = PriceChange::between(&Sample::new(current * scale, minute(5)), &Sample::new(lagged * scale, minute(0))).unwrap();

        prop_assert!((a.percentage - b.percentage).abs() < 1e-6, "{} vs {}", a.percentage, b.percentage);
        prop_assert_eq!(a.direction, b.direction);
    }

    /// An alert fires exactly when the unrounded change reaches the threshold,
    /// give or take the comparison tolerance
    #[test]
    fn alert_iff_threshold_reached(lagged in 1.0..10_000.0f64, ratio in 0.8..1.2f64, threshold in 0.01..20.0f64) {
        let current_sample = Sample::new(lagged * ratio, minute(5));
        let lagged_sample = Sample::new(lagged, minute(0));

        let change = PriceChange::between(&current_sample, &lagged_sample).unwrap();
        let alert = evaluator(threshold).evaluate(&current_sample, &lagged_sample).unwrap();

        let slack = THRESHOLD_TOLERANCE * threshold.max(1.0);
        if change.percentage >= threshold {
            prop_assert!(alert.is_some());
        } else if change.percentage + slack < threshold {
            prop_assert!(alert.is_none());
        }
        if let Some(event) = alert {
            prop_assert_eq!(event.direction, change.direction);
            prop_assert!(event.percentage >= 0.0);
            prop_assert!((event.percentage - change.percentage).abs() <= 0.0005 + 1e-9);
        }
    }
}
