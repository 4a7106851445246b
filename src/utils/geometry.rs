//! Grid geometry primitives
//!
//! Segment rasterization is the single primitive used both for drawing
//! obstacle walls and for validating candidate tree edges, so its rounding
//! policy fixes the obstacle layouts: sample positions are computed from the
//! segment slope and rounded to the nearest cell.

use itertools::{iproduct, Itertools};

use crate::common::Cell;

/// Rasterize the segment `from -> to` into an ordered cell sequence.
///
/// `samples` evenly spaced points are taken along the segment (the first one
/// is `from` itself), each rounded to the nearest cell, and `to` is always
/// appended as the last element. Consecutive repeats are collapsed.
///
/// With `samples` at least the grid dimension, consecutive cells are
/// 8-connected for any segment inside the grid.
pub fn rasterize_segment(from: Cell, to: Cell, samples: usize) -> Vec<Cell> {
    let n = samples.max(1);
    let dx = (to.i - from.i) as f64;
    let dy = (to.j - from.j) as f64;
    let (x0, y0) = (from.i as f64, from.j as f64);

    (0..n)
        .map(|k| {
            let t = k as f64 / n as f64;
            if to.i == from.i {
                // slope undefined
                Cell::new(from.i, (y0 + t * dy).round() as i32)
            } else {
                let slope = dy / dx;
                let x = x0 + t * dx;
                let y = y0 + slope * (x - x0);
                Cell::new(x.round() as i32, y.round() as i32)
            }
        })
        .chain(std::iter::once(to))
        .dedup()
        .collect()
}

/// Move from `from` towards `toward` by at most `step`.
///
/// When `toward` is within `step` it is returned unchanged, which also
/// covers the coincident case where the distance is zero.
pub fn steer(from: Cell, toward: Cell, step: f64) -> Cell {
    let d = from.distance(&toward);
    if d <= step {
        return toward;
    }
    let t = step / d;
    let i = (1.0 - t) * from.i as f64 + t * toward.i as f64;
    let j = (1.0 - t) * from.j as f64 + t * toward.j as f64;
    Cell::new(i.round() as i32, j.round() as i32)
}

/// The cell itself and its 8 neighbors, bounds not checked
pub fn neighborhood(cell: Cell) -> impl Iterator<Item = Cell> {
    iproduct!(-1..=1, -1..=1).map(move |(di, dj)| cell.offset(di, dj))
}

/// All cells of the square of half-width `width` centred at `center`
pub fn square_block(center: Cell, width: i32) -> impl Iterator<Item = Cell> {
    let w = width.max(0);
    iproduct!(-w..=w, -w..=w).map(move |(di, dj)| center.offset(di, dj))
}
