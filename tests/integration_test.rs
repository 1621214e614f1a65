//! Integration tests for the indicator, signal and backtest pipeline.
//!
//! Tests cover:
//! - Full pipeline with a mock data port
//! - Worked examples with known SMA values and trades
//! - Short histories (warm-up longer than the data)
//! - Input rejection before any computation
//! - Lookback windows over multi-year histories
//! - Determinism of every stage

mod common;

use approx::assert_relative_eq;
use common::*;
use stockboard::domain::backtest::{run_backtest, run_strategy, Trade};
use stockboard::domain::engine::{compute_indicators, IndicatorConfig};
use stockboard::domain::error::{InputError, StockboardError};
use stockboard::domain::lookback::Lookback;
use stockboard::domain::metrics::TradeStats;
use stockboard::domain::signal::{generate_signals, SignalPair, SignalStrategy};
use stockboard::domain::snapshot::Snapshot;
use stockboard::ports::data_port::DataPort;

const WORKED_CLOSES: [f64; 10] = [10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 10.0, 11.0, 12.0, 13.0];

fn flags(s: &str) -> Vec<bool> {
    s.chars().map(|c| c == 'T').collect()
}

fn all_strategies() -> Vec<SignalStrategy> {
    vec![
        SignalStrategy::MacdCross,
        SignalStrategy::rsi_default(),
        SignalStrategy::StochasticCross,
    ]
}

mod full_pipeline {
    use super::*;

    #[test]
    fn full_pipeline_with_mock_data_port() {
        let port = MockDataPort::new().with_bars("0050.TW", generate_bars("2023-01-01", 300));

        let bars = port.fetch_bars("0050.TW").unwrap();
        let indicators = compute_indicators(&bars, &IndicatorConfig::default()).unwrap();

        assert_eq!(indicators.len(), 300);
        for series in indicators.all_series() {
            assert_eq!(series.len(), 300, "{} misaligned", series.indicator_type);
        }

        for strategy in all_strategies() {
            let result = run_strategy(&bars, &indicators, &strategy).unwrap();
            assert!(result.trade_count > 0, "{} produced no trades", strategy);
            assert_eq!(result.trade_count, result.trades.len());
            assert!((0.0..=1.0).contains(&result.win_rate));
        }
    }

    #[test]
    fn trades_never_overlap() {
        let bars = generate_bars("2022-06-01", 400);
        let indicators = compute_indicators(&bars, &IndicatorConfig::default()).unwrap();

        for strategy in all_strategies() {
            let result = run_strategy(&bars, &indicators, &strategy).unwrap();
            for pair in result.trades.windows(2) {
                assert!(pair[1].entry_index > pair[0].exit_index);
            }
            for t in &result.trades {
                assert!(t.exit_index > t.entry_index);
                assert_eq!(t.entry_price, bars[t.entry_index].close);
                assert_eq!(t.exit_price, bars[t.exit_index].close);
            }
            if let (Some(open), Some(last)) = (&result.open_position, result.trades.last()) {
                assert!(open.entry_index > last.exit_index);
            }
        }
    }

    #[test]
    fn stats_agree_with_backtest_result() {
        let bars = generate_bars("2022-06-01", 400);
        let indicators = compute_indicators(&bars, &IndicatorConfig::default()).unwrap();
        let result = run_strategy(&bars, &indicators, &SignalStrategy::MacdCross).unwrap();
        let stats = TradeStats::compute(&result);

        assert_eq!(stats.total_trades, result.trade_count);
        assert_eq!(
            stats.trades_won + stats.trades_lost + stats.trades_breakeven,
            stats.total_trades
        );
        assert_relative_eq!(stats.win_rate, result.win_rate);
        let pnl: f64 = result.trades.iter().map(Trade::pnl).sum();
        assert_relative_eq!(stats.total_pnl, pnl, epsilon = 1e-9);
    }

    #[test]
    fn snapshot_matches_last_values() {
        let bars = generate_bars("2023-01-01", 300);
        let indicators = compute_indicators(&bars, &IndicatorConfig::default()).unwrap();
        let snap = Snapshot::from_indicators(&bars, &indicators).unwrap();

        assert_eq!(snap.date, bars[299].date);
        assert_eq!(snap.rsi, indicators.rsi.value_at(299));
        assert_eq!(snap.macd, indicators.macd.line.value_at(299));
        assert_eq!(snap.stoch_k, indicators.stochastic.k.value_at(299));
        assert!(snap.rsi.is_some());
    }
}

mod worked_examples {
    use super::*;

    #[test]
    fn sma3_over_ten_closes() {
        let bars = bars_from_closes("2024-01-01", &WORKED_CLOSES);
        let config = IndicatorConfig {
            sma_windows: vec![3],
            ..IndicatorConfig::default()
        };
        let indicators = compute_indicators(&bars, &config).unwrap();
        let sma = indicators.sma(3).unwrap();

        assert_eq!(sma.value_at(0), None);
        assert_eq!(sma.value_at(1), None);
        assert_relative_eq!(sma.value_at(2).unwrap(), 11.0);
        assert_relative_eq!(sma.value_at(9).unwrap(), 12.0);
    }

    #[test]
    fn two_round_trips() {
        let signals = SignalPair {
            entry: flags("FTFFFFTFFF"),
            exit: flags("FFFFTFFFFT"),
        };
        let result = run_backtest(&WORKED_CLOSES, &signals).unwrap();

        assert_eq!(
            result.trades,
            vec![
                Trade {
                    entry_index: 1,
                    exit_index: 4,
                    entry_price: 11.0,
                    exit_price: 10.0,
                },
                Trade {
                    entry_index: 6,
                    exit_index: 9,
                    entry_price: 10.0,
                    exit_price: 13.0,
                },
            ]
        );
        assert_eq!(result.trade_count, 2);
        assert_relative_eq!(result.win_rate, 0.5);
        assert!(result.open_position.is_none());
    }

    #[test]
    fn open_position_excluded_from_stats() {
        let signals = SignalPair {
            entry: flags("FTFFFFTFFF"),
            exit: flags("FFFFTFFFFF"),
        };
        let result = run_backtest(&WORKED_CLOSES, &signals).unwrap();

        assert_eq!(result.trade_count, 1);
        assert_eq!(result.win_rate, 0.0);
        assert_eq!(result.open_position.unwrap().entry_index, 6);
    }

    #[test]
    fn no_entries_is_not_an_error() {
        let signals = SignalPair {
            entry: vec![false; 10],
            exit: vec![true; 10],
        };
        let result = run_backtest(&WORKED_CLOSES, &signals).unwrap();
        assert_eq!(result.trade_count, 0);
        assert_eq!(result.win_rate, 0.0);
        assert_eq!(TradeStats::compute(&result).total_trades, 0);
    }
}

mod short_history {
    use super::*;

    #[test]
    fn five_bars_leave_long_windows_undefined() {
        let bars = bars_from_closes("2024-01-01", &[10.0, 11.0, 12.0, 13.0, 14.0]);
        let indicators = compute_indicators(&bars, &IndicatorConfig::default()).unwrap();

        let sma240 = indicators.sma(240).unwrap();
        assert_eq!(sma240.len(), 5);
        assert!(sma240.values().iter().all(Option::is_none));
        assert!(indicators.rsi.values().iter().all(Option::is_none));
        assert!(indicators.stochastic.d.values().iter().all(Option::is_none));
    }

    #[test]
    fn short_history_backtest_runs() {
        let bars = bars_from_closes("2024-01-01", &[10.0, 11.0, 12.0, 13.0, 14.0]);
        let indicators = compute_indicators(&bars, &IndicatorConfig::default()).unwrap();

        for strategy in all_strategies() {
            let result = run_strategy(&bars, &indicators, &strategy).unwrap();
            assert!(result.trades.len() <= 2);
        }
    }

    #[test]
    fn single_bar() {
        let bars = bars_from_closes("2024-01-01", &[10.0]);
        let indicators = compute_indicators(&bars, &IndicatorConfig::default()).unwrap();
        assert_eq!(indicators.len(), 1);
        assert_eq!(indicators.sma(20).unwrap().value_at(0), None);
    }
}

mod input_rejection {
    use super::*;

    #[test]
    fn empty_bars_rejected() {
        let err = compute_indicators(&[], &IndicatorConfig::default()).unwrap_err();
        assert_eq!(err, InputError::Empty);
    }

    #[test]
    fn non_monotonic_dates_rejected() {
        let bars = vec![
            make_bar("2024-01-01", 10.0),
            make_bar("2024-01-03", 11.0),
            make_bar("2024-01-02", 12.0),
        ];
        let err = compute_indicators(&bars, &IndicatorConfig::default()).unwrap_err();
        assert!(matches!(err, InputError::NonMonotonicDates { index: 2, .. }));
    }

    #[test]
    fn duplicate_dates_rejected() {
        let bars = vec![make_bar("2024-01-01", 10.0), make_bar("2024-01-01", 11.0)];
        assert!(matches!(
            compute_indicators(&bars, &IndicatorConfig::default()),
            Err(InputError::NonMonotonicDates { .. })
        ));
    }

    #[test]
    fn non_positive_close_rejected() {
        let mut bars = bars_from_closes("2024-01-01", &[10.0, 11.0, 12.0]);
        bars[1].close = 0.0;
        let err = compute_indicators(&bars, &IndicatorConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            InputError::NonPositivePrice { index: 1, field: "close", .. }
        ));
    }

    #[test]
    fn signal_length_mismatch_rejected() {
        let signals = SignalPair {
            entry: vec![false; 9],
            exit: vec![false; 10],
        };
        assert!(matches!(
            run_backtest(&WORKED_CLOSES, &signals),
            Err(InputError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn input_error_maps_to_exit_status() {
        let err: StockboardError = InputError::Empty.into();
        assert_eq!(err.exit_status(), 4);
    }
}

mod lookback_windows {
    use super::*;

    #[test]
    fn one_year_window_of_multi_year_history() {
        let bars = generate_bars("2020-01-01", 365 * 4);
        let last = bars.last().unwrap().date;

        let window = Lookback::OneYear.apply(&bars);
        assert!(window.len() >= 364 && window.len() <= 366);
        assert_eq!(window.last().unwrap().date, last);

        let indicators = compute_indicators(window, &IndicatorConfig::default()).unwrap();
        assert_eq!(indicators.len(), window.len());
    }

    #[test]
    fn longer_windows_keep_more_bars() {
        let bars = generate_bars("2010-01-01", 365 * 12);
        let lens: Vec<usize> = [
            Lookback::OneYear,
            Lookback::ThreeYears,
            Lookback::FiveYears,
            Lookback::TenYears,
            Lookback::Max,
        ]
        .iter()
        .map(|l| l.apply(&bars).len())
        .collect();

        assert!(lens.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*lens.last().unwrap(), bars.len());
    }
}

mod determinism {
    use super::*;

    #[test]
    fn every_stage_is_idempotent() {
        let bars = generate_bars("2023-01-01", 250);
        let config = IndicatorConfig::default();

        let first = compute_indicators(&bars, &config).unwrap();
        let second = compute_indicators(&bars, &config).unwrap();
        assert_eq!(first, second);

        for strategy in all_strategies() {
            let s1 = generate_signals(&strategy, &first).unwrap();
            let s2 = generate_signals(&strategy, &second).unwrap();
            assert_eq!(s1, s2);

            let r1 = run_strategy(&bars, &first, &strategy).unwrap();
            let r2 = run_strategy(&bars, &second, &strategy).unwrap();
            assert_eq!(r1, r2);
        }
    }
}
