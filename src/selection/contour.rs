//! Boundary tracing over edge masks.
//!
//! Walks each component's boundary with Moore-neighbour tracing and returns
//! the boundary pixels in walk order. Canny edges are one pixel wide, so the
//! trace of a stroke runs along the stroke itself.

use ndarray::{Array2, ArrayView2};

/// Integer pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// True when `other` is one of the 8 neighbours (or the same pixel).
    pub fn touches(&self, other: &Point) -> bool {
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

/// Moore neighborhood directions (8-connected, clockwise from right)
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),   // 0: right
    (1, 1),   // 1: down-right
    (0, 1),   // 2: down
    (-1, 1),  // 3: down-left
    (-1, 0),  // 4: left
    (-1, -1), // 5: up-left
    (0, -1),  // 6: up
    (1, -1),  // 7: up-right
];

/// Check if pixel is set (treating out-of-bounds as unset).
#[inline]
fn is_set(mask: &ArrayView2<u8>, x: i32, y: i32) -> bool {
    let (height, width) = mask.dim();
    x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height && mask[[y as usize, x as usize]] > 0
}

/// Set pixel with at least one unset 4-neighbour.
#[inline]
fn is_boundary(mask: &ArrayView2<u8>, x: i32, y: i32) -> bool {
    is_set(mask, x, y)
        && (!is_set(mask, x - 1, y)
            || !is_set(mask, x + 1, y)
            || !is_set(mask, x, y - 1)
            || !is_set(mask, x, y + 1))
}

/// Trace every boundary in the mask.
///
/// Each boundary pixel appears in exactly one trace. Traces start at the
/// first unvisited boundary pixel in raster order.
pub fn trace_contours(mask: ArrayView2<u8>) -> Vec<Vec<Point>> {
    let (height, width) = mask.dim();
    let mut contours = Vec::new();
    if width == 0 || height == 0 {
        return contours;
    }

    let mut visited = Array2::<bool>::from_elem((height, width), false);

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            if !visited[[y as usize, x as usize]] && is_boundary(&mask, x, y) {
                let contour = trace_boundary(&mask, x, y, &mut visited);
                if !contour.is_empty() {
                    contours.push(contour);
                }
            }
        }
    }

    contours
}

/// Trace one boundary using the Moore neighbourhood.
fn trace_boundary(
    mask: &ArrayView2<u8>,
    start_x: i32,
    start_y: i32,
    visited: &mut Array2<bool>,
) -> Vec<Point> {
    let (height, width) = mask.dim();
    let mut contour = Vec::new();

    // Initial backtrack direction: first unset neighbour
    let mut dir = DIRECTIONS
        .iter()
        .position(|&(dx, dy)| !is_set(mask, start_x + dx, start_y + dy))
        .unwrap_or(0);

    let (mut x, mut y) = (start_x, start_y);
    let max_steps = width * height * 2;
    let mut steps = 0;

    loop {
        let seen = &mut visited[[y as usize, x as usize]];
        if !*seen {
            *seen = true;
            contour.push(Point::new(x as usize, y as usize));
        }

        // Resume the clockwise search three steps behind the last move
        let search_start = (dir + 5) % 8;

        let mut found = false;
        for i in 0..8 {
            let check_dir = (search_start + i) % 8;
            let (dx, dy) = DIRECTIONS[check_dir];
            let (nx, ny) = (x + dx, y + dy);

            if !is_set(mask, nx, ny) {
                continue;
            }
            if nx == start_x && ny == start_y && steps > 0 {
                return contour;
            }
            if is_boundary(mask, nx, ny) {
                x = nx;
                y = ny;
                dir = check_dir;
                found = true;
                break;
            }
        }

        if !found {
            // Isolated pixel
            break;
        }

        steps += 1;
        if steps >= max_steps {
            break;
        }
    }

    contour
}

/// Split a trace into runs of touching points.
///
/// Moore tracing doubles back along open strokes; after dropping revisited
/// pixels a trace can jump between branches. Each returned run is safe to
/// draw as a connected polyline.
pub fn split_at_jumps(contour: &[Point]) -> Vec<Vec<Point>> {
    let mut runs: Vec<Vec<Point>> = Vec::new();
    for &p in contour {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|last| last.touches(&p)) => run.push(p),
            _ => runs.push(vec![p]),
        }
    }
    runs
}
