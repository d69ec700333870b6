//! ASCII line charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! The x axis is the row index of the table; each column is drawn as a line
//! with its own symbol. Missing values break the line.

use crate::domain::Table;

const SYMBOLS: [char; 8] = ['*', '+', 'o', 'x', '#', '%', '@', '&'];

/// Render every column of `table` as a line chart with a legend.
pub fn render_ascii_plot(table: &Table, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let x_max = (table.len().saturating_sub(1)).max(1) as f64;
    let (y_min, y_max) = y_range(table).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (idx, col) in table.columns.iter().enumerate() {
        let symbol = SYMBOLS[idx % SYMBOLS.len()];
        draw_series(&mut grid, &col.values, x_max, y_min, y_max, symbol);
    }

    let mut out = String::new();
    match table.span() {
        Some((first, last)) => out.push_str(&format!(
            "Plot: {first} .. {last} | y=[{y_min:.2}, {y_max:.2}]\n"
        )),
        None => out.push_str("Plot: (no rows)\n"),
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (idx, col) in table.columns.iter().enumerate() {
        out.push_str(&format!("  {} {}\n", SYMBOLS[idx % SYMBOLS.len()], col.name));
    }

    out
}

fn y_range(table: &Table) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in table.columns.iter().flat_map(|c| &c.values).filter(|v| !v.is_nan()) {
        min_y = min_y.min(*v);
        max_y = max_y.max(*v);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && max_y.is_finite() {
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(grid: &mut [Vec<char>], values: &[f64], x_max: f64, y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for (i, &y) in values.iter().enumerate() {
        if y.is_nan() {
            prev = None;
            continue;
        }
        let x = map_x(i as f64, 0.0, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None => grid[yy][x] = ch,
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
