//! Connected-component labelling for edge maps.
//!
//! Groups 8-connected edge pixels using flood fill, and filters out
//! components below a minimum area.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};

use crate::filters::edge::EDGE;

/// One labelled component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Label in the label image (starting at 1; 0 is background)
    pub label: u32,
    /// Number of pixels in the component
    pub area: usize,
}

/// Label image plus per-component statistics.
pub struct Labelling {
    pub labels: Array2<u32>,
    pub components: Vec<Component>,
}

const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Label 8-connected non-zero pixels.
///
/// Labels are assigned in raster-scan order of each component's first pixel.
pub fn label_components(edges: ArrayView2<u8>) -> Labelling {
    let (height, width) = edges.dim();
    let mut labels = Array2::<u32>::zeros((height, width));
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..height {
        for x in 0..width {
            if edges[[y, x]] == 0 || labels[[y, x]] != 0 {
                continue;
            }

            let label = components.len() as u32 + 1;
            let mut area = 0;

            labels[[y, x]] = label;
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                area += 1;

                for &(dx, dy) in &NEIGHBOURS {
                    let nx = cx as isize + dx;
                    let ny = cy as isize + dy;
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    if edges[[ny, nx]] != 0 && labels[[ny, nx]] == 0 {
                        labels[[ny, nx]] = label;
                        queue.push_back((nx, ny));
                    }
                }
            }

            components.push(Component { label, area });
        }
    }

    Labelling { labels, components }
}

/// Keep only components with at least `min_size` pixels.
///
/// Surviving pixels are written as 255 regardless of their input value.
pub fn remove_small_components(edges: ArrayView2<u8>, min_size: usize) -> Array2<u8> {
    let Labelling { labels, components } = label_components(edges);

    let keep: Vec<bool> = std::iter::once(false)
        .chain(components.iter().map(|c| c.area >= min_size))
        .collect();

    labels.mapv(|label| if keep[label as usize] { EDGE } else { 0 })
}
