// ═══════════════════════════════════════════════════════════════════
// Indicator Tests: moving averages, least-squares trend, selection
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use ticker_dashboard_core::errors::CoreError;
use ticker_dashboard_core::models::indicator::{Indicator, IndicatorOutput, IndicatorSelection};
use ticker_dashboard_core::models::ohlc::{OhlcRecord, Series};
use ticker_dashboard_core::services::indicator_service::{
    least_squares_line, simple_moving_average, IndicatorService,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Series with one record per calendar day starting 2021-01-01, closes as given.
fn series_from_closes(closes: &[f64]) -> Series {
    let start = d(2021, 1, 1);
    let records = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let date = start + chrono::Duration::days(i as i64);
            OhlcRecord::new(date, c, c + 1.0, c - 1.0, c)
        })
        .collect();
    Series::new("TEST", records).unwrap()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

fn line_values(outputs: &ticker_dashboard_core::models::indicator::IndicatorOutputs, i: Indicator) -> Vec<Option<f64>> {
    match outputs.get(&i) {
        Some(IndicatorOutput::Line(derived)) => derived.values.clone(),
        other => panic!("Expected line output for {i}, got {other:?}"),
    }
}

// ── simple_moving_average ───────────────────────────────────────────

mod sma {
    use super::*;

    #[test]
    fn window_three() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = simple_moving_average(&values, 3);
        assert_eq!(sma.len(), 5);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        assert_close(sma[2].unwrap(), 2.0);
        assert_close(sma[3].unwrap(), 3.0);
        assert_close(sma[4].unwrap(), 4.0);
    }

    #[test]
    fn spike_leaves_no_residue() {
        let sma = simple_moving_average(&[1e16, 1.0, 1.0, 1.0, 1.0], 3);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        assert!(sma[2].unwrap() > 3e15);
        assert_eq!(sma[3], Some(1.0));
        assert_eq!(sma[4], Some(1.0));
    }

    #[test]
    fn each_value_is_trailing_mean() {
        let values: Vec<f64> = (0..250).map(|i| ((i * 37) % 101) as f64 + 0.25).collect();
        for window in [30, 100, 200] {
            let sma = simple_moving_average(&values, window);
            for (i, v) in sma.iter().enumerate() {
                if i + 1 < window {
                    assert_eq!(*v, None, "window {window} index {i}");
                } else {
                    let expected: f64 =
                        values[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                    assert!((v.unwrap() - expected).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn shorter_than_window_all_absent() {
        let sma = simple_moving_average(&[10.0, 11.0, 12.0, 13.0, 14.0], 30);
        assert_eq!(sma, vec![None; 5]);
    }

    #[test]
    fn exactly_window_length() {
        let sma = simple_moving_average(&[2.0, 4.0, 6.0], 3);
        assert_eq!(sma[..2], [None, None]);
        assert_close(sma[2].unwrap(), 4.0);
    }

    #[test]
    fn empty_input() {
        assert!(simple_moving_average(&[], 30).is_empty());
    }

    #[test]
    fn zero_window_all_absent() {
        assert_eq!(simple_moving_average(&[1.0, 2.0], 0), vec![None, None]);
    }
}

// ── least_squares_line ──────────────────────────────────────────────

mod least_squares {
    use super::*;

    #[test]
    fn perfect_line_recovers_coefficients() {
        let (a, b) = (1.75, -20.5);
        let values: Vec<f64> = (0..50).map(|i| a * i as f64 + b).collect();
        let (slope, intercept) = least_squares_line(&values);
        assert!((slope - a).abs() < 1e-9);
        assert!((intercept - b).abs() < 1e-9);
    }

    #[test]
    fn flat_series() {
        let (slope, intercept) = least_squares_line(&[5.0, 5.0, 5.0, 5.0]);
        assert_close(slope, 0.0);
        assert_close(intercept, 5.0);
    }

    #[test]
    fn noisy_symmetric_points() {
        // Points (0,1), (1,3), (2,2): slope 0.5, intercept 1.5
        let (slope, intercept) = least_squares_line(&[1.0, 3.0, 2.0]);
        assert_close(slope, 0.5);
        assert_close(intercept, 1.5);
    }

    #[test]
    fn single_value_has_zero_slope() {
        let (slope, intercept) = least_squares_line(&[42.0]);
        assert_close(slope, 0.0);
        assert_close(intercept, 42.0);
    }
}

// ── IndicatorService::compute ───────────────────────────────────────

mod compute {
    use super::*;

    #[test]
    fn empty_selection_yields_nothing() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        let outputs = IndicatorService::new()
            .compute(&series, &IndicatorSelection::new())
            .unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn sma30_on_five_records_all_absent() {
        let series = series_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let selection: IndicatorSelection = [Indicator::Sma30].into_iter().collect();
        let outputs = IndicatorService::new().compute(&series, &selection).unwrap();

        let values = line_values(&outputs, Indicator::Sma30);
        assert_eq!(values, vec![None; 5]);
    }

    #[test]
    fn sma_outputs_are_index_aligned() {
        let closes: Vec<f64> = (1..=120).map(f64::from).collect();
        let series = series_from_closes(&closes);
        let selection: IndicatorSelection =
            [Indicator::Sma30, Indicator::Sma100, Indicator::Sma200].into_iter().collect();
        let outputs = IndicatorService::new().compute(&series, &selection).unwrap();

        for indicator in [Indicator::Sma30, Indicator::Sma100, Indicator::Sma200] {
            match &outputs[&indicator] {
                IndicatorOutput::Line(derived) => {
                    assert_eq!(derived.len(), series.len());
                    assert_eq!(derived.dates[0], series.first().unwrap().date);
                }
                other => panic!("Expected line, got {other:?}"),
            }
        }

        let sma30 = line_values(&outputs, Indicator::Sma30);
        assert_eq!(sma30[28], None);
        // Mean of 1..=30
        assert_close(sma30[29].unwrap(), 15.5);
        // Mean of 91..=120
        assert_close(sma30[119].unwrap(), 105.5);

        let sma100 = line_values(&outputs, Indicator::Sma100);
        assert_close(sma100[99].unwrap(), 50.5);

        // 120 records never fill a 200 window
        assert!(line_values(&outputs, Indicator::Sma200).iter().all(Option::is_none));
    }

    #[test]
    fn trend_on_linear_series() {
        let closes: Vec<f64> = (0..10).map(|i| 3.0 * i as f64 + 7.0).collect();
        let series = series_from_closes(&closes);
        let selection: IndicatorSelection = [Indicator::LinearTrend].into_iter().collect();
        let outputs = IndicatorService::new().compute(&series, &selection).unwrap();

        match outputs[&Indicator::LinearTrend] {
            IndicatorOutput::Segment(segment) => {
                assert!((segment.slope - 3.0).abs() < 1e-9);
                assert!((segment.intercept - 7.0).abs() < 1e-9);
                assert_eq!(segment.start_date, d(2021, 1, 1));
                assert_eq!(segment.end_date, d(2021, 1, 10));
                assert!((segment.start_value - 7.0).abs() < 1e-9);
                assert!((segment.end_value - 34.0).abs() < 1e-9);
            }
            ref other => panic!("Expected segment, got {other:?}"),
        }
    }

    #[test]
    fn trend_slope_is_per_record_not_per_day() {
        // Gaps between dates must not change the fit.
        let records = vec![
            OhlcRecord::new(d(2021, 1, 4), 10.0, 10.0, 10.0, 10.0),
            OhlcRecord::new(d(2021, 1, 5), 11.0, 11.0, 11.0, 11.0),
            OhlcRecord::new(d(2021, 1, 11), 12.0, 12.0, 12.0, 12.0),
            OhlcRecord::new(d(2021, 2, 1), 13.0, 13.0, 13.0, 13.0),
        ];
        let series = Series::new("GAPS", records).unwrap();
        let selection: IndicatorSelection = [Indicator::LinearTrend].into_iter().collect();
        let outputs = IndicatorService::new().compute(&series, &selection).unwrap();

        match outputs[&Indicator::LinearTrend] {
            IndicatorOutput::Segment(segment) => {
                assert!((segment.slope - 1.0).abs() < 1e-9);
                assert!((segment.end_value - 13.0).abs() < 1e-9);
            }
            ref other => panic!("Expected segment, got {other:?}"),
        }
    }

    #[test]
    fn trend_needs_two_records() {
        let selection: IndicatorSelection = [Indicator::LinearTrend].into_iter().collect();
        for closes in [&[][..], &[5.0][..]] {
            let series = series_from_closes(closes);
            let err = IndicatorService::new().compute(&series, &selection).unwrap_err();
            match err {
                CoreError::InsufficientData { required, actual, .. } => {
                    assert_eq!(required, 2);
                    assert_eq!(actual, closes.len());
                }
                other => panic!("Expected InsufficientData, got {other:?}"),
            }
        }
    }

    #[test]
    fn sma_alone_works_on_single_record() {
        let series = series_from_closes(&[5.0]);
        let outputs = IndicatorService::new()
            .compute(&series, &[Indicator::Sma30].into_iter().collect())
            .unwrap();
        assert_eq!(line_values(&outputs, Indicator::Sma30), vec![None]);
    }

    #[test]
    fn deterministic() {
        let closes: Vec<f64> = (0..300).map(|i| (i as f64 * 0.37).sin() * 50.0 + 100.0).collect();
        let series = series_from_closes(&closes);
        let service = IndicatorService::new();
        let selection = IndicatorSelection::all();

        let first = service.compute(&series, &selection).unwrap();
        let second = service.compute(&series, &selection).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}

// ── Indicator vocabulary ────────────────────────────────────────────

mod vocabulary {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(Indicator::Sma30.to_string(), "30 Day SMA");
        assert_eq!(Indicator::Sma100.to_string(), "100 Day SMA");
        assert_eq!(Indicator::Sma200.to_string(), "200 Day SMA");
        assert_eq!(Indicator::LinearTrend.to_string(), "Linear Regression Line");
    }

    #[test]
    fn parse_display_name_and_id() {
        assert_eq!("30 Day SMA".parse::<Indicator>().unwrap(), Indicator::Sma30);
        assert_eq!("sma-100".parse::<Indicator>().unwrap(), Indicator::Sma100);
        assert_eq!(" SMA-200 ".parse::<Indicator>().unwrap(), Indicator::Sma200);
        assert_eq!("Linear-Trend".parse::<Indicator>().unwrap(), Indicator::LinearTrend);
        assert_eq!(
            "linear regression line".parse::<Indicator>().unwrap(),
            Indicator::LinearTrend
        );
    }

    #[test]
    fn parse_unknown_fails() {
        assert!(matches!(
            "EMA-20".parse::<Indicator>(),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn windows() {
        assert_eq!(Indicator::Sma30.window(), Some(30));
        assert_eq!(Indicator::Sma100.window(), Some(100));
        assert_eq!(Indicator::Sma200.window(), Some(200));
        assert_eq!(Indicator::LinearTrend.window(), None);
    }

    #[test]
    fn selection_collapses_duplicates() {
        let (selection, ignored) =
            IndicatorSelection::parse(&["SMA-30", "30 Day SMA", "sma-30"]);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(Indicator::Sma30));
        assert!(ignored.is_empty());
    }

    #[test]
    fn selection_order_irrelevant() {
        let (a, _) = IndicatorSelection::parse(&["Linear-Trend", "SMA-30"]);
        let (b, _) = IndicatorSelection::parse(&["SMA-30", "Linear-Trend"]);
        assert_eq!(a, b);
    }

    #[test]
    fn selection_reports_unknown_names() {
        let (selection, ignored) = IndicatorSelection::parse(&["SMA-30", "MACD", "", "RSI"]);
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![Indicator::Sma30]);
        assert_eq!(ignored, vec!["MACD".to_string(), String::new(), "RSI".to_string()]);
    }

    #[test]
    fn selection_all() {
        let all = IndicatorSelection::all();
        assert_eq!(all.len(), 4);
        assert_eq!(all.iter().collect::<Vec<_>>(), Indicator::ALL.to_vec());
    }
}
