//! ASCII plotting for terminal output.
//!
//! Fixed-size grid with deterministic output (helpful for golden tests).
//! Each series is drawn with its own marker; a missing value breaks the line
//! instead of being drawn as zero.

/// One line on the plot. `x` is any monotonic axis (day offset, year).
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub marker: char,
    pub points: Vec<(f64, Option<f64>)>,
}

impl PlotSeries {
    pub fn new(label: impl Into<String>, marker: char, points: Vec<(f64, Option<f64>)>) -> Self {
        Self {
            label: label.into(),
            marker,
            points,
        }
    }
}

/// Markers assigned to series in order.
pub const MARKERS: [char; 6] = ['o', '*', '+', 'x', '#', '@'];

/// Render all series on one grid under a header and a legend line.
pub fn render_series_plot(title: &str, series: &[PlotSeries], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let present = || {
        series
            .iter()
            .flat_map(|s| s.points.iter())
            .filter_map(|&(x, y)| y.filter(|v| v.is_finite()).map(|y| (x, y)))
    };

    let mut out = String::new();
    let Some((x_min, x_max)) = range(present().map(|(x, _)| x)) else {
        out.push_str(&format!("{title} | no data\n"));
        return out;
    };
    let (y_min, y_max) = range(present().map(|(_, y)| y)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so markers overlay them.
    for s in series {
        let mut prev: Option<(usize, usize)> = None;
        for &(x, y) in &s.points {
            match y.filter(|v| v.is_finite()) {
                Some(y) => {
                    let cell = (map_x(x, x_min, x_max, width), map_y(y, y_min, y_max, height));
                    if let Some((x0, y0)) = prev {
                        draw_line(&mut grid, x0, y0, cell.0, cell.1, '.');
                    }
                    prev = Some(cell);
                }
                None => prev = None,
            }
        }
    }
    for s in series {
        for &(x, y) in &s.points {
            if let Some(y) = y.filter(|v| v.is_finite()) {
                grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = s.marker;
            }
        }
    }

    out.push_str(&format!("{title} | y=[{y_min:.2}, {y_max:.2}]\n"));
    let legend: Vec<String> = series.iter().map(|s| format!("{} {}", s.marker, s.label)).collect();
    out.push_str(&legend.join("  "));
    out.push('\n');
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Min and max of the values; a single distinct value is widened by 0.5 each side.
fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min { Some((min, max)) } else { Some((min - 0.5, max + 0.5)) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top (max).
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham); never overwrites a filled cell.
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
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
            .filter(|c| **c == ' ')
        {
            *cell = ch;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_points_break_the_line() {
        let series = [PlotSeries::new("Cases", 'o', vec![(0.0, Some(0.0)), (1.0, None), (2.0, Some(10.0))])];
        let txt = render_series_plot("Testland", &series, 10, 5);
        let expected = concat!(
            "Testland | y=[-0.50, 10.50]\n",
            "o Cases\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn horizontal_line_joins_present_points() {
        let series = [PlotSeries::new("Flat", '*', vec![(0.0, Some(5.0)), (9.0, Some(5.0))])];
        let txt = render_series_plot("Flat", &series, 10, 5);
        let middle = txt.lines().nth(4).unwrap();
        assert_eq!(middle, "*........*");
    }

    #[test]
    fn all_missing_reports_no_data() {
        let series = [PlotSeries::new("GDP", 'o', vec![(2015.0, None), (2016.0, None)])];
        assert_eq!(render_series_plot("Testland", &series, 20, 8), "Testland | no data\n");
    }
}
