use crate::errors::CoreError;
use crate::models::chart::{
    AxisRange, CandleBody, CandleKind, Chart, ChartStyle, Overlay, OverlayKind, OverlayPoint, Wick,
    XAxis, BODY_WIDTH_MS, DAY_MS, GAIN_COLOR, LOSS_COLOR, WICK_COLOR,
};
use crate::models::indicator::{IndicatorOutput, IndicatorOutputs, IndicatorSelection};
use crate::models::ohlc::{date_to_epoch_ms, Series};
use crate::services::indicator_service::IndicatorService;

/// Generates chart descriptions from price series.
///
/// The core computes all the geometry; the frontend only renders it.
/// A chart holds:
/// - One high-low wick per record
/// - One open-close body per gain or loss record (flat records get none)
/// - One overlay per computed indicator
pub struct ChartService {
    indicator_service: IndicatorService,
}

impl ChartService {
    pub fn new() -> Self {
        Self {
            indicator_service: IndicatorService::new(),
        }
    }

    /// Compute the selected indicators and build the chart in one step.
    pub fn build_with_indicators(
        &self,
        series: &Series,
        selection: &IndicatorSelection,
        shared_axis: Option<&XAxis>,
    ) -> Result<Chart, CoreError> {
        let outputs = self.indicator_service.compute(series, selection)?;
        Ok(self.build(series, &outputs, shared_axis))
    }

    /// Build a chart from a series and precomputed indicator outputs.
    ///
    /// With `shared_axis`, the chart is bound to that axis and widens it to
    /// cover its own data; otherwise it gets a new axis of its own.
    pub fn build(
        &self,
        series: &Series,
        outputs: &IndicatorOutputs,
        shared_axis: Option<&XAxis>,
    ) -> Chart {
        let wicks = series
            .records()
            .iter()
            .map(|r| Wick {
                x_ms: r.timestamp_ms(),
                high: r.high,
                low: r.low,
                color: WICK_COLOR,
            })
            .collect();

        let bodies = series
            .records()
            .iter()
            .filter_map(|r| {
                let (kind, color) = if r.is_gain() {
                    (CandleKind::Gain, GAIN_COLOR)
                } else if r.is_loss() {
                    (CandleKind::Loss, LOSS_COLOR)
                } else {
                    return None;
                };
                Some(CandleBody {
                    x_ms: r.timestamp_ms(),
                    width_ms: BODY_WIDTH_MS,
                    open: r.open,
                    close: r.close,
                    kind,
                    color,
                })
            })
            .collect();

        let overlays = outputs
            .iter()
            .map(|(indicator, output)| {
                let (kind, points) = match output {
                    IndicatorOutput::Line(derived) => (
                        OverlayKind::Line,
                        derived
                            .points()
                            .map(|(date, y)| OverlayPoint {
                                x_ms: date_to_epoch_ms(date),
                                y,
                            })
                            .collect(),
                    ),
                    IndicatorOutput::Segment(segment) => (
                        OverlayKind::Segment,
                        vec![
                            OverlayPoint {
                                x_ms: date_to_epoch_ms(segment.start_date),
                                y: segment.start_value,
                            },
                            OverlayPoint {
                                x_ms: date_to_epoch_ms(segment.end_date),
                                y: segment.end_value,
                            },
                        ],
                    ),
                };
                Overlay {
                    indicator: *indicator,
                    label: indicator.display_name(),
                    color: indicator.color(),
                    kind,
                    points,
                }
            })
            .collect();

        let extent = data_extent(series);
        let x_axis = match shared_axis {
            Some(axis) => {
                axis.include(extent);
                axis.clone()
            }
            None => XAxis::new(extent),
        };

        Chart {
            wicks,
            bodies,
            overlays,
            x_axis,
            style: ChartStyle::default(),
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

/// Time span of the series, padded by half a body on each side so the
/// outermost candles are fully visible. An empty series spans one day
/// from the epoch.
fn data_extent(series: &Series) -> AxisRange {
    let pad = (BODY_WIDTH_MS / 2) as f64;
    match series.time_extent_ms() {
        Some((first, last)) => AxisRange::new(first as f64 - pad, last as f64 + pad),
        None => AxisRange::new(0.0, DAY_MS as f64),
    }
}
