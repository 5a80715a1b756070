//! Line compositor: turn a pruned edge map into line art.
//!
//! Two modes are supported:
//! - **Trace**: every remaining edge is traced and drawn as polylines
//! - **Outline**: a single closed line (convex hull) encompassing every
//!   remaining edge pixel
//!
//! Output is a single-channel canvas with dark lines (0) on white (255).

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EdgeError, Result};
use crate::selection::contour::{split_at_jumps, trace_contours, Point};

/// Background value of the line canvas.
pub const PAPER: u8 = 255;
/// Stroke value of the line canvas.
pub const INK: u8 = 0;

/// How the remaining edges become lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    #[default]
    Trace,
    Outline,
}

impl FromStr for LineMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LineMode::Trace),
            "outline" => Ok(LineMode::Outline),
            other => Err(format!("unknown line mode '{other}' (expected trace or outline)")),
        }
    }
}

impl fmt::Display for LineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineMode::Trace => f.write_str("trace"),
            LineMode::Outline => f.write_str("outline"),
        }
    }
}

/// Line compositor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineParams {
    pub mode: LineMode,
    /// Stroke width in pixels (>= 1)
    pub thickness: u32,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            mode: LineMode::Trace,
            thickness: 1,
        }
    }
}

/// Rendered line art plus the polylines it was drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct LineArt {
    pub image: Array2<u8>,
    pub paths: Vec<Vec<Point>>,
}

/// Compose line art from an edge map.
///
/// # Errors
/// [`EdgeError::NoEdgesRemaining`] when the map has no edge pixels.
pub fn create_line(edges: ArrayView2<u8>, params: &LineParams) -> Result<LineArt> {
    let points: Vec<Point> = edges
        .indexed_iter()
        .filter(|(_, &v)| v != 0)
        .map(|((y, x), _)| Point::new(x, y))
        .collect();
    if points.is_empty() {
        return Err(EdgeError::NoEdgesRemaining);
    }

    let radius = (params.thickness.max(1) - 1) / 2;
    let mut canvas = Array2::<u8>::from_elem(edges.dim(), PAPER);

    let paths = match params.mode {
        LineMode::Trace => {
            let paths: Vec<Vec<Point>> = trace_contours(edges)
                .par_iter()
                .flat_map_iter(|contour| split_at_jumps(contour))
                .collect();
            for path in &paths {
                draw_polyline(&mut canvas, path, radius);
            }
            for p in &points {
                stamp(&mut canvas, *p, radius);
            }
            paths
        }
        LineMode::Outline => {
            let mut hull = convex_hull(&points);
            if hull.len() >= 3 {
                hull.push(hull[0]);
            }
            draw_polyline(&mut canvas, &hull, radius);
            vec![hull]
        }
    };

    debug!(
        mode = %params.mode,
        thickness = params.thickness,
        paths = paths.len(),
        edge_pixels = points.len(),
        "line composed"
    );

    Ok(LineArt { image: canvas, paths })
}

// ============================================================================
// Geometry
// ============================================================================

/// Convex hull via monotone chain, without collinear points.
///
/// Fewer than 3 distinct inputs are returned sorted and deduplicated.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.par_sort_unstable_by_key(|p| (p.x, p.y));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point, a: Point, b: Point) -> i64 {
        let (ox, oy) = (o.x as i64, o.y as i64);
        (a.x as i64 - ox) * (b.y as i64 - oy) - (a.y as i64 - oy) * (b.x as i64 - ox)
    }

    let mut lower: Vec<Point> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

// ============================================================================
// Rasterization
// ============================================================================

fn draw_polyline(canvas: &mut Array2<u8>, path: &[Point], radius: u32) {
    match path {
        [] => {}
        [only] => stamp(canvas, *only, radius),
        _ => {
            for pair in path.windows(2) {
                draw_segment(canvas, pair[0], pair[1], radius);
            }
        }
    }
}

/// Bresenham segment with a disc brush.
fn draw_segment(canvas: &mut Array2<u8>, from: Point, to: Point, radius: u32) {
    let (mut x, mut y) = (from.x as i64, from.y as i64);
    let (x1, y1) = (to.x as i64, to.y as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(canvas, Point::new(x as usize, y as usize), radius);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Paint a filled disc of `radius` centred on `p`, clipped to the canvas.
fn stamp(canvas: &mut Array2<u8>, p: Point, radius: u32) {
    let (height, width) = canvas.dim();
    let r = radius as i64;
    let (cx, cy) = (p.x as i64, p.y as i64);

    for dy in -r..=r {
        let y = cy + dy;
        if y < 0 || y >= height as i64 {
            continue;
        }
        for dx in -r..=r {
            let x = cx + dx;
            if x < 0 || x >= width as i64 || dx * dx + dy * dy > r * r {
                continue;
            }
            canvas[[y as usize, x as usize]] = INK;
        }
    }
}
