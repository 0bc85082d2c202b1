//! Incrementally built 2D paths.

use std::convert::Infallible;
use std::fmt::Write as _;
use std::str::FromStr;

use h3d_core::Result;
use h3d_math::{Aabb2, DVec2};
use serde::{Deserialize, Serialize};

use crate::parser;
use crate::segment::{ArcGeometry, Segment};

/// Samples taken along an arc when bounding it.
const ARC_BOUNDS_SAMPLES: usize = 32;

/// An ordered list of segments plus the pen state used while building.
///
/// `start` is the first point of the current subpath and `end` the current
/// pen position. Paths parsed from malformed data keep everything read up
/// to the error and report [`is_incomplete`](Self::is_incomplete).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurvePath {
    segments: Vec<Segment>,
    start: DVec2,
    end: DVec2,
    incomplete: bool,
    /// Whether the current subpath has a drawing segment to close.
    #[serde(default)]
    drawn: bool,
}

impl CurvePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse SVG path data. Never fails: on malformed input the result holds
    /// the segments parsed so far and is marked incomplete.
    pub fn from_str_lossy(data: &str) -> Self {
        parser::parse(data)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start_point(&self) -> DVec2 {
        self.start
    }

    pub fn end_point(&self) -> DVec2 {
        self.end
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub(crate) fn mark_incomplete(&mut self) {
        self.incomplete = true;
    }

    /// Start a new subpath at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.start = DVec2::new(x, y);
        self.end = self.start;
        self.drawn = false;
        self
    }

    fn push(&mut self, segment: Segment, to: DVec2) -> &mut Self {
        self.segments.push(segment);
        self.end = to;
        self.drawn = true;
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let to = DVec2::new(x, y);
        self.push(Segment::Line { from: self.end, to }, to)
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) -> &mut Self {
        let to = DVec2::new(x, y);
        self.push(
            Segment::Quad {
                from: self.end,
                ctrl: DVec2::new(cx, cy),
                to,
            },
            to,
        )
    }

    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        let to = DVec2::new(x, y);
        self.push(
            Segment::Cubic {
                from: self.end,
                ctrl1: DVec2::new(c1x, c1y),
                ctrl2: DVec2::new(c2x, c2y),
                to,
            },
            to,
        )
    }

    /// Elliptical arc in SVG endpoint form; `x_rotation` in degrees.
    #[allow(clippy::too_many_arguments)]
    pub fn arc_svg_to(
        &mut self,
        rx: f64,
        ry: f64,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> &mut Self {
        let to = DVec2::new(x, y);
        self.push(
            Segment::Arc {
                from: self.end,
                radii: DVec2::new(rx, ry),
                x_rotation,
                large_arc,
                sweep,
                to,
            },
            to,
        )
    }

    /// Close the current subpath, adding a line back to its start when the
    /// pen is elsewhere. No-op when the current subpath has nothing drawn
    /// yet: an empty path, a bare `move_to`, or one that is already closed.
    pub fn close_path(&mut self) -> &mut Self {
        if !self.drawn {
            return self;
        }
        if self.end != self.start {
            self.line_to(self.start.x, self.start.y);
        }
        self.segments.push(Segment::Close);
        self.end = self.start;
        self.drawn = false;
        self
    }

    /// Bounds of the path geometry, `None` without drawing segments.
    /// Bezier segments contribute their control points.
    pub fn bounds(&self) -> Option<Aabb2> {
        let points = self.segments.iter().flat_map(|seg| match seg {
            Segment::Arc { .. } if ArcGeometry::of(seg).is_some() => (0..=ARC_BOUNDS_SAMPLES)
                .filter_map(|i| seg.point(i as f64 / ARC_BOUNDS_SAMPLES as f64))
                .collect(),
            _ => seg.control_points(),
        });
        Aabb2::from_points(points)
    }

    /// SVG path data with absolute commands. A `M` is written wherever a
    /// segment does not continue from the previous one.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        let mut pen: Option<DVec2> = None;
        for seg in &self.segments {
            if let Some(from) = seg.start() {
                if pen != Some(from) {
                    push_cmd(&mut out, 'M', &[from]);
                }
            }
            match *seg {
                Segment::Line { to, .. } => push_cmd(&mut out, 'L', &[to]),
                Segment::Quad { ctrl, to, .. } => push_cmd(&mut out, 'Q', &[ctrl, to]),
                Segment::Cubic { ctrl1, ctrl2, to, .. } => push_cmd(&mut out, 'C', &[ctrl1, ctrl2, to]),
                Segment::Arc {
                    radii,
                    x_rotation,
                    large_arc,
                    sweep,
                    to,
                    ..
                } => {
                    push_cmd(&mut out, 'A', &[radii]);
                    let _ = write!(
                        out,
                        " {} {} {} {},{}",
                        x_rotation,
                        u8::from(large_arc),
                        u8::from(sweep),
                        to.x,
                        to.y
                    );
                }
                Segment::Close => push_cmd(&mut out, 'Z', &[]),
            }
            pen = seg.end();
        }
        out
    }

    /// Sum of segment lengths.
    ///
    /// # Errors
    /// `NotImplemented` if the path contains curved segments.
    pub fn length(&self) -> Result<f64> {
        self.segments.iter().map(Segment::length).sum()
    }

    /// `num_points` points spaced evenly by arc length from the first
    /// segment's start to the last segment's end. Zero points gives an empty
    /// list, one gives the start point.
    ///
    /// # Errors
    /// `NotImplemented` if a curved segment's length is needed.
    pub fn get_points(&self, num_points: usize) -> Result<Vec<DVec2>> {
        let drawn: Vec<&Segment> = self.segments.iter().filter(|s| !s.is_close()).collect();
        let (Some(first), Some(last)) = (drawn.first(), drawn.last()) else {
            return Ok(Vec::new());
        };
        let start = first.start().unwrap_or(self.start);
        match num_points {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![start]),
            _ => {}
        }

        let lengths = drawn.iter().map(|s| s.length()).collect::<Result<Vec<f64>>>()?;
        let total: f64 = lengths.iter().sum();
        let mut points = Vec::with_capacity(num_points);
        let mut seg = 0;
        let mut walked = 0.0;
        for k in 0..num_points {
            let target = total * k as f64 / (num_points - 1) as f64;
            while seg + 1 < drawn.len() && walked + lengths[seg] < target {
                walked += lengths[seg];
                seg += 1;
            }
            let t = if lengths[seg] > 0.0 {
                ((target - walked) / lengths[seg]).clamp(0.0, 1.0)
            } else {
                0.0
            };
            points.push(drawn[seg].point(t).unwrap_or(start));
        }
        // pin the final sample to the exact end
        if let Some(end) = last.end() {
            points[num_points - 1] = end;
        }
        Ok(points)
    }
}

fn push_cmd(out: &mut String, cmd: char, points: &[DVec2]) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push(cmd);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{},{}", p.x, p.y);
    }
}

impl FromStr for CurvePath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_str_lossy(s))
    }
}
