use serde::{Deserialize, Serialize};

use crate::metrics::features::FEATURE_COLUMNS;
use crate::metrics::summary::{BoxStats, LabelSummary};
use crate::signal::{ConditionedSignal, SampleSeries};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

/// 0xRRGGBB
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
}

impl Series {
    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Series::Line(line) => &line.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// `(x_min, x_max, y_min, y_max)` over all series, `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.series.iter().flat_map(|s| s.points().iter());
        let first = points.next()?;
        let init = (first[0], first[0], first[1], first[1]);
        Some(points.fold(init, |(x0, x1, y0, y1), p| {
            (x0.min(p[0]), x1.max(p[0]), y0.min(p[1]), y1.max(p[1]))
        }))
    }
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

fn line(name: &str, time_s: &[f64], values: &[f64], style: Style, max_points: usize) -> Series {
    let points: Vec<[f64; 2]> = time_s
        .iter()
        .zip(values)
        .map(|(t, v)| [*t, *v])
        .collect();
    Series::Line(LineSeries {
        name: name.into(),
        points: decimate_points(&points, max_points),
        style,
    })
}

const ACCEL: Color = Color(0x1F77B4);
const GYRO: Color = Color(0xFF7F0E);
const RAW: Color = Color(0xA0A0A0);

/// Accel and gyro magnitudes of a raw recording against seconds since the
/// first sample.
pub fn figure_from_raw(title: &str, series: &SampleSeries, max_points: usize) -> Figure {
    let time_s = series.elapsed_s();
    let style = |color| Style { width: 1.4, color };
    let mut fig = Figure::new(Some(title.to_string()));
    fig.x.label = Some("Time (s)".into());
    fig.y.label = Some("Magnitude".into());
    fig.add_series(line("Accel magnitude (g)", &time_s, &series.accel, style(ACCEL), max_points));
    fig.add_series(line("Gyro magnitude (deg/s)", &time_s, &series.gyro, style(GYRO), max_points));
    fig
}

/// Raw against conditioned traces, one panel per channel: accel first, then gyro.
pub fn figure_from_conditioned(
    title: &str,
    raw: &SampleSeries,
    conditioned: &ConditionedSignal,
    max_points: usize,
) -> Vec<Figure> {
    let time_s = raw.elapsed_s();
    let panel = |name: &str, unit: &str, raw: &[f64], filtered: &[f64], color: Color| {
        let mut fig = Figure::new(Some(format!("{}: {} magnitude", title, name)));
        fig.x.label = Some("Time (s)".into());
        fig.y.label = Some(unit.into());
        let raw_style = Style {
            width: 1.0,
            color: RAW,
        };
        let filtered_style = Style { width: 1.6, color };
        fig.add_series(line("Raw", &time_s, raw, raw_style, max_points));
        fig.add_series(line("Conditioned", &time_s, filtered, filtered_style, max_points));
        fig
    };
    vec![
        panel("Accelerometer", "g", &raw.accel, &conditioned.accel, ACCEL),
        panel("Gyroscope", "deg/s", &raw.gyro, &conditioned.gyro, GYRO),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxGroup {
    pub name: String,
    pub stats: BoxStats,
}

/// One feature column, one box per label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxFigure {
    pub feature: String,
    pub title: String,
    pub groups: Vec<BoxGroup>,
}

impl BoxFigure {
    /// `(min, max)` over every whisker, `None` without groups.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let mut groups = self.groups.iter();
        let first = groups.next()?;
        Some(groups.fold((first.stats.min, first.stats.max), |(lo, hi), g| {
            (lo.min(g.stats.min), hi.max(g.stats.max))
        }))
    }
}

/// One box figure per feature column, groups in summary order.
pub fn box_figures(summaries: &[LabelSummary]) -> Vec<BoxFigure> {
    FEATURE_COLUMNS[..8]
        .iter()
        .map(|feature| {
            let groups = summaries
                .iter()
                .filter_map(|summary| {
                    summary
                        .features
                        .iter()
                        .find(|f| f.feature == *feature)
                        .map(|f| BoxGroup {
                            name: summary.label.to_string(),
                            stats: f.stats,
                        })
                })
                .collect();
            BoxFigure {
                feature: (*feature).to_string(),
                title: format!("{} by motion class", feature),
                groups,
            }
        })
        .collect()
}
