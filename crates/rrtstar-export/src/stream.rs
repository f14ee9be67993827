//! Visualizer stream serializer.
//!
//! The planner's progress is consumed by an external viewer as a
//! line-oriented text stream:
//!
//! - a header (grid width, grid height),
//! - a scene block before every iteration,
//! - after every iteration either the line `0` or a solution block,
//! - a closing scene block once the budget is spent.
//!
//! A scene block is: width, height, the flattened grid on one line
//! (`#` blocked, `_` free), start x, start y, goal x, goal y, the edge
//! count, then one `x y parent_x parent_y` line per non-root node in
//! insertion order.
//!
//! A solution block is: point count, elapsed milliseconds (integer),
//! path cost, then one `x y` line per point from root to goal.
//!
//! Real numbers use [`format_number`]. Every function here returns a
//! `String`; writing it anywhere is the caller's job.

use std::fmt::Write;

use rrtstar_planner::{OccupancyGrid, PlannerEvent, Scene, SolutionReport};

/// Line emitted after an iteration that ended without a solution.
pub const NO_SOLUTION_LINE: &str = "0";

/// Significant digits used by [`format_number`].
const SIGNIFICANT_DIGITS: i32 = 6;
/// Mantissa decimals for [`SIGNIFICANT_DIGITS`].
const PRECISION: usize = 5;

/// Format a real number the way a default-configured C++ `ostream` does
/// (`%g` with 6 significant digits).
///
/// Fixed notation is used when the decimal exponent is in `-4..6`,
/// scientific otherwise. Trailing zeros and a trailing decimal point are
/// dropped.
///
/// # Examples
///
/// ```
/// use rrtstar_export::format_number;
///
/// assert_eq!(format_number(9.0), "9");
/// assert_eq!(format_number(12.727_922_061_357_855), "12.7279");
/// assert_eq!(format_number(0.000_012_34), "1.234e-05");
/// assert_eq!(format_number(1_234_567.0), "1.23457e+06");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the target precision first gives the exponent the
    // notation choice is based on (999999.7 is 1e+06, not 999999.7).
    let scientific = format!("{value:.PRECISION$e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
        #[allow(clippy::cast_sign_loss)]
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    }
}

/// Drop trailing zeros after a decimal point, then the point itself.
fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// The stream header: grid width and height.
#[must_use]
pub fn header(grid: &OccupancyGrid) -> String {
    format!("{}\n{}\n", grid.width(), grid.height())
}

/// One scene block: grid, endpoints and every tree edge.
#[must_use]
pub fn format_scene(scene: &Scene<'_>) -> String {
    let grid = scene.grid;
    let mut out = String::new();

    let _ = writeln!(out, "{}", grid.width());
    let _ = writeln!(out, "{}", grid.height());
    out.extend(grid.cells().iter().map(|cell| cell.as_char()));
    out.push('\n');

    for coordinate in [scene.start.x, scene.start.y, scene.goal.x, scene.goal.y] {
        let _ = writeln!(out, "{}", format_number(coordinate));
    }

    let _ = writeln!(out, "{}", scene.tree.edge_count());
    for (child, parent) in scene.tree.edges() {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            format_number(child.x),
            format_number(child.y),
            format_number(parent.x),
            format_number(parent.y),
        );
    }

    out
}

/// One solution block: point count, elapsed ms, cost and the path.
#[must_use]
pub fn format_solution(report: &SolutionReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", report.point_count());
    let _ = writeln!(out, "{}", report.elapsed.as_millis());
    let _ = writeln!(out, "{}", format_number(report.cost));
    for point in &report.points {
        let _ = writeln!(
            out,
            "{} {}",
            format_number(point.x),
            format_number(point.y)
        );
    }

    out
}

/// Serialize any planner event as its stream block.
///
/// Progress and finished snapshots both become scene blocks.
#[must_use]
pub fn format_event(event: &PlannerEvent<'_>) -> String {
    match event {
        PlannerEvent::Progress(scene) | PlannerEvent::Finished(scene) => format_scene(scene),
        PlannerEvent::Solution(report) => format_solution(report),
        PlannerEvent::NoSolution => format!("{NO_SOLUTION_LINE}\n"),
    }
}
