use crate::errors::CoreError;
use crate::models::indicator::{
    DerivedSeries, Indicator, IndicatorOutput, IndicatorOutputs, IndicatorSelection, TrendSegment,
};
use crate::models::ohlc::Series;

/// Computes indicator overlays from a price series.
///
/// Pure: the same series and selection always give the same outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorService;

impl IndicatorService {
    pub fn new() -> Self {
        Self
    }

    /// Compute every selected indicator over `series`.
    ///
    /// Moving averages are index-aligned to the series. The linear trend
    /// needs at least two records and fails with `InsufficientData` otherwise.
    pub fn compute(
        &self,
        series: &Series,
        selection: &IndicatorSelection,
    ) -> Result<IndicatorOutputs, CoreError> {
        let mut outputs = IndicatorOutputs::new();
        let closes = series.closes();

        for indicator in selection.iter() {
            let output = match indicator.window() {
                Some(window) => IndicatorOutput::Line(DerivedSeries {
                    dates: series.records().iter().map(|r| r.date).collect(),
                    values: simple_moving_average(&closes, window),
                }),
                None => IndicatorOutput::Segment(self.trend_segment(series, indicator)?),
            };
            outputs.insert(indicator, output);
        }

        Ok(outputs)
    }

    fn trend_segment(&self, series: &Series, indicator: Indicator) -> Result<TrendSegment, CoreError> {
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) if series.len() >= 2 => (first, last),
            _ => {
                return Err(CoreError::InsufficientData {
                    indicator: indicator.display_name().to_string(),
                    required: 2,
                    actual: series.len(),
                })
            }
        };

        let (slope, intercept) = least_squares_line(&series.closes());
        let last_index = (series.len() - 1) as f64;

        Ok(TrendSegment {
            start_date: first.date,
            start_value: intercept,
            end_date: last.date,
            end_value: slope * last_index + intercept,
            slope,
            intercept,
        })
    }
}

/// Trailing simple moving average over `window` values.
///
/// Position `i` holds the mean of `values[i + 1 - window..=i]`, or `None`
/// while fewer than `window` values are available.
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    // Summed per window: values outside the window never touch the result.
    let window_f64 = window as f64;
    for (offset, slice) in values.windows(window).enumerate() {
        result[offset + window - 1] = Some(slice.iter().sum::<f64>() / window_f64);
    }

    result
}

/// Ordinary least-squares fit of `values[i]` against `i`.
/// Returns `(slope, intercept)`. With fewer than two values the slope is 0.
pub fn least_squares_line(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let n_f64 = n as f64;
    let mean_x = (n_f64 - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f64;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    if sxx == 0.0 {
        return (0.0, mean_y);
    }
    let slope = sxy / sxx;
    (slope, mean_y - slope * mean_x)
}
