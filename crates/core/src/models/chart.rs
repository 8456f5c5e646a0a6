use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::indicator::Indicator;

/// One calendar day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Candle body width: half a day, so neighbouring bodies never touch.
pub const BODY_WIDTH_MS: i64 = DAY_MS / 2;

pub const GAIN_COLOR: &str = "#007f3e";
pub const LOSS_COLOR: &str = "#ae0e23";
pub const WICK_COLOR: &str = "black";

/// Visible horizontal range of a chart, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub start_ms: f64,
    pub end_ms: f64,
}

impl AxisRange {
    pub fn new(start_ms: f64, end_ms: f64) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn width(&self) -> f64 {
        self.end_ms - self.start_ms
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(&self, other: &AxisRange) -> AxisRange {
        AxisRange {
            start_ms: self.start_ms.min(other.start_ms),
            end_ms: self.end_ms.max(other.end_ms),
        }
    }
}

#[derive(Debug)]
struct AxisState {
    range: AxisRange,
    data_extent: AxisRange,
}

/// Horizontal (time) axis of a chart.
///
/// Cloning an `XAxis` shares it: every clone observes and moves the same
/// range, which is how two charts stay in sync while panning and zooming.
#[derive(Debug, Clone)]
pub struct XAxis {
    id: Uuid,
    state: Arc<RwLock<AxisState>>,
}

impl XAxis {
    /// A fresh, unshared axis showing `extent`.
    pub fn new(extent: AxisRange) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Arc::new(RwLock::new(AxisState {
                range: extent,
                data_extent: extent,
            })),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Currently visible range.
    pub fn range(&self) -> AxisRange {
        self.read().range
    }

    /// Range covering the data of every chart bound to this axis.
    pub fn data_extent(&self) -> AxisRange {
        self.read().data_extent
    }

    /// `true` when both handles drive the same range.
    pub fn is_shared_with(&self, other: &XAxis) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Widen the axis to also cover `extent` (a newly bound chart's data).
    pub fn include(&self, extent: AxisRange) {
        let mut state = self.write();
        state.data_extent = state.data_extent.union(&extent);
        state.range = state.range.union(&extent);
    }

    pub fn set_range(&self, start_ms: f64, end_ms: f64) -> Result<(), CoreError> {
        if !start_ms.is_finite() || !end_ms.is_finite() || start_ms >= end_ms {
            return Err(CoreError::ValidationError(format!(
                "Invalid axis range [{start_ms}, {end_ms}]: start must be before end"
            )));
        }
        self.write().range = AxisRange::new(start_ms, end_ms);
        Ok(())
    }

    /// Shift the visible window by `delta_ms` (positive moves later in time).
    pub fn pan(&self, delta_ms: f64) -> Result<(), CoreError> {
        if !delta_ms.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Pan offset must be a finite number, got {delta_ms}"
            )));
        }
        let mut state = self.write();
        state.range.start_ms += delta_ms;
        state.range.end_ms += delta_ms;
        Ok(())
    }

    /// Scale the visible width by `factor` around `anchor_ms`.
    /// A factor below 1 zooms in, above 1 zooms out.
    pub fn zoom(&self, factor: f64, anchor_ms: f64) -> Result<(), CoreError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Zoom factor must be a positive number, got {factor}"
            )));
        }
        if !anchor_ms.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Zoom anchor must be a finite number, got {anchor_ms}"
            )));
        }
        let mut state = self.write();
        let range = state.range;
        state.range = AxisRange::new(
            anchor_ms - (anchor_ms - range.start_ms) * factor,
            anchor_ms + (range.end_ms - anchor_ms) * factor,
        );
        Ok(())
    }

    /// Show the full data extent again.
    pub fn reset(&self) {
        let mut state = self.write();
        state.range = state.data_extent;
    }

    fn read(&self) -> RwLockReadGuard<'_, AxisState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AxisState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Serialize)]
struct AxisSnapshot {
    id: Uuid,
    start_ms: f64,
    end_ms: f64,
}

impl Serialize for XAxis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let range = self.range();
        AxisSnapshot {
            id: self.id,
            start_ms: range.start_ms,
            end_ms: range.end_ms,
        }
        .serialize(serializer)
    }
}

/// Vertical high-low line drawn for every record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wick {
    pub x_ms: i64,
    pub high: f64,
    pub low: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CandleKind {
    Gain,
    Loss,
}

/// Open-close rectangle of a gain or loss record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleBody {
    pub x_ms: i64,
    pub width_ms: i64,
    pub open: f64,
    pub close: f64,
    pub kind: CandleKind,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverlayKind {
    /// Connected line through every present value
    Line,
    /// Single two-point segment
    Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayPoint {
    pub x_ms: i64,
    pub y: f64,
}

/// An indicator drawn over the candles, with its legend label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub indicator: Indicator,
    pub label: &'static str,
    pub color: &'static str,
    pub kind: OverlayKind,
    pub points: Vec<OverlayPoint>,
}

/// Presentation hints passed through to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    pub x_axis_type: &'static str,
    pub tools: Vec<&'static str>,
    /// Tick label rotation in radians
    pub label_orientation: f64,
    pub grid_alpha: f64,
    pub sizing_mode: &'static str,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            x_axis_type: "datetime",
            tools: vec!["pan", "wheel_zoom", "box_zoom", "reset", "save"],
            label_orientation: std::f64::consts::FRAC_PI_4,
            grid_alpha: 0.25,
            sizing_mode: "stretch_both",
        }
    }
}

/// Renderable description of one candlestick chart.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub wicks: Vec<Wick>,
    pub bodies: Vec<CandleBody>,
    pub overlays: Vec<Overlay>,
    pub x_axis: XAxis,
    pub style: ChartStyle,
}

impl Chart {
    pub fn bodies_of(&self, kind: CandleKind) -> impl Iterator<Item = &CandleBody> {
        self.bodies.iter().filter(move |b| b.kind == kind)
    }

    pub fn overlay(&self, indicator: Indicator) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.indicator == indicator)
    }

    pub fn shares_x_axis_with(&self, other: &Chart) -> bool {
        self.x_axis.is_shared_with(&other.x_axis)
    }
}
