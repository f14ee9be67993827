//! rrtstar: plan a path with RRT* and stream progress for a visualizer.
//!
//! Reads a scene (width line, height line, then one character per cell,
//! `#` blocked) from stdin, plans from the start to the goal for the given
//! number of milliseconds, and writes the visualizer stream to stdout.
//! Logs and the run summary go to stderr.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin rrtstar -- [OPTIONS] <TIME_MS> <START_X> <START_Y> <GOAL_X> <GOAL_Y> < scene.txt
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rrtstar_planner::{
    OccupancyGrid, Planner, PlannerConfig, PlannerEvent, Point, ProgressSink, RunError, SystemClock,
};

/// RRT* path planning over an occupancy grid read from stdin.
///
/// Writes one scene block per iteration, followed by the current solution
/// (or `0`), and a final scene block when the time budget is spent.
#[derive(Parser)]
#[command(name = "rrtstar", version, allow_negative_numbers = true)]
struct Cli {
    /// Planning time budget in milliseconds.
    time_ms: u64,

    /// Start x coordinate.
    start_x: f64,

    /// Start y coordinate.
    start_y: f64,

    /// Goal x coordinate.
    goal_x: f64,

    /// Goal y coordinate.
    goal_y: f64,

    /// Probability of sampling the goal instead of a random point.
    #[arg(long, default_value_t = PlannerConfig::DEFAULT_GOAL_BIAS)]
    goal_bias: f64,

    /// Neighborhood radius for parent choice and rewiring.
    #[arg(long, default_value_t = PlannerConfig::DEFAULT_SEARCH_RADIUS)]
    search_radius: f64,

    /// Segment subdivisions for the collision test.
    #[arg(long, default_value_t = PlannerConfig::DEFAULT_COLLISION_STEPS, value_parser = clap::value_parser!(u32).range(1..))]
    collision_steps: u32,

    /// Distance within which a sample reaches the goal (0 = exact match).
    #[arg(long, default_value_t = PlannerConfig::DEFAULT_GOAL_TOLERANCE)]
    goal_tolerance: f64,

    /// Seed for the sampler; a random seed is drawn and logged when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Full planner config as a JSON string.
    ///
    /// When provided, the parameter flags above are ignored. The time
    /// budget positional still applies.
    #[arg(long)]
    config_json: Option<String>,

    /// Write an SVG of the final tree and solution to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Omit the per-iteration scene blocks (the final scene is kept).
    #[arg(long)]
    quiet_progress: bool,

    /// Print the run summary as JSON instead of a human-readable report.
    #[arg(long)]
    summary_json: bool,
}

/// Build a [`PlannerConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual parameter flags are ignored. Missing JSON fields take their
/// defaults.
fn config_from_cli(cli: &Cli) -> Result<PlannerConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        PlannerConfig {
            goal_bias: cli.goal_bias,
            search_radius: cli.search_radius,
            collision_steps: cli.collision_steps,
            goal_tolerance: cli.goal_tolerance,
            ..PlannerConfig::default()
        }
    };
    Ok(PlannerConfig {
        time_budget_ms: cli.time_ms,
        ..config
    })
}

/// Writes planner events to `out` in the visualizer stream format.
struct StreamSink<W: Write> {
    out: W,
    quiet_progress: bool,
}

impl<W: Write> StreamSink<W> {
    fn new(mut out: W, grid: &OccupancyGrid, quiet_progress: bool) -> io::Result<Self> {
        out.write_all(rrtstar_export::header(grid).as_bytes())?;
        Ok(Self {
            out,
            quiet_progress,
        })
    }
}

impl<W: Write> ProgressSink for StreamSink<W> {
    type Error = io::Error;

    fn on_event(&mut self, event: &PlannerEvent<'_>) -> io::Result<()> {
        if self.quiet_progress && matches!(event, PlannerEvent::Progress(_)) {
            return Ok(());
        }
        self.out
            .write_all(rrtstar_export::format_event(event).as_bytes())?;
        // Flush once per iteration so the viewer sees each step as it lands.
        if !matches!(event, PlannerEvent::Progress(_)) {
            self.out.flush()?;
        }
        Ok(())
    }
}

fn read_scene() -> Result<OccupancyGrid, String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| format!("Error reading scene from stdin: {e}"))?;
    OccupancyGrid::parse_scene(&text).map_err(|e| format!("Error parsing scene: {e}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let grid = match read_scene() {
        Ok(grid) => grid,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let seed = cli.seed.unwrap_or_else(rand::random);
    log::info!("sampler seed {seed}");

    let start = Point::new(cli.start_x, cli.start_y);
    let goal = Point::new(cli.goal_x, cli.goal_y);
    let mut planner = match Planner::with_rng(
        grid,
        start,
        goal,
        config.clone(),
        StdRng::seed_from_u64(seed),
    ) {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Planner error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stdout = BufWriter::new(io::stdout().lock());
    let mut sink = match StreamSink::new(stdout, planner.grid(), cli.quiet_progress) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("Error writing to stdout: {e}");
            return ExitCode::FAILURE;
        }
    };

    let summary = match planner.run(&SystemClock, &mut sink) {
        Ok(summary) => summary,
        Err(RunError::Planner(e)) => {
            eprintln!("Planner error: {e}");
            return ExitCode::FAILURE;
        }
        Err(RunError::Sink(e)) => {
            eprintln!("Error writing to stdout: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.summary_json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => {
                eprintln!("Error serializing summary: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        eprintln!("{}", summary.report());
    }

    if let Some(ref svg_path) = cli.svg {
        let solution = planner.solution().ok();
        let desc = serde_json::to_string(&config).unwrap_or_default();
        let metadata = rrtstar_export::SvgMetadata {
            title: Some("rrtstar"),
            description: Some(&desc),
        };
        let svg = rrtstar_export::to_svg(
            &planner.scene(),
            solution.as_ref().map(|s| s.points.as_slice()),
            &metadata,
        );
        match std::fs::write(svg_path, &svg) {
            Ok(()) => {
                eprintln!(
                    "SVG written to {} ({} bytes)",
                    svg_path.display(),
                    svg.len(),
                );
            }
            Err(e) => {
                eprintln!("Error writing SVG to {}: {e}", svg_path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rrtstar_planner::Tree;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rrtstar").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn positionals_and_defaults() {
        let cli = parse(&["250", "0", "0.5", "9", "-1.5"]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.time_budget_ms, 250);
        assert_eq!(config.collision_steps, PlannerConfig::DEFAULT_COLLISION_STEPS);
        assert!((cli.goal_y + 1.5).abs() < f64::EPSILON);
        assert!(cli.seed.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "10",
            "0",
            "0",
            "1",
            "1",
            "--search-radius",
            "2.5",
            "--goal-tolerance",
            "0.25",
            "--seed",
            "7",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert!((config.search_radius - 2.5).abs() < f64::EPSILON);
        assert!((config.goal_tolerance - 0.25).abs() < f64::EPSILON);
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn config_json_replaces_flags_but_keeps_time_budget() {
        let cli = parse(&[
            "40",
            "0",
            "0",
            "1",
            "1",
            "--search-radius",
            "9",
            "--config-json",
            r#"{"goal_bias": 0.5, "time_budget_ms": 1}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.time_budget_ms, 40);
        assert!((config.goal_bias - 0.5).abs() < f64::EPSILON);
        assert!((config.search_radius - PlannerConfig::DEFAULT_SEARCH_RADIUS).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_config_json_is_an_error() {
        let cli = parse(&["40", "0", "0", "1", "1", "--config-json", "{"]);
        assert!(config_from_cli(&cli).unwrap_err().contains("--config-json"));
    }

    #[test]
    fn zero_collision_steps_rejected_by_parser() {
        let result = Cli::try_parse_from(["rrtstar", "1", "0", "0", "1", "1", "--collision-steps", "0"]);
        assert!(result.is_err());
    }

    fn scene_parts() -> (OccupancyGrid, Tree) {
        let grid = OccupancyGrid::from_rows(&["__", "_#"]).unwrap();
        let tree = Tree::new(Point::new(0.0, 0.0));
        (grid, tree)
    }

    #[test]
    fn stream_sink_writes_header_and_blocks() {
        let (grid, tree) = scene_parts();
        let scene = rrtstar_planner::Scene {
            grid: &grid,
            start: Point::new(0.0, 0.0),
            goal: Point::new(1.0, 0.0),
            tree: &tree,
        };
        let mut sink = StreamSink::new(Vec::new(), &grid, false).unwrap();
        sink.on_event(&PlannerEvent::Progress(scene)).unwrap();
        sink.on_event(&PlannerEvent::NoSolution).unwrap();

        let text = String::from_utf8(sink.out).unwrap();
        assert_eq!(text, "2\n2\n2\n2\n___#\n0\n0\n1\n0\n0\n0\n");
    }

    #[test]
    fn quiet_progress_skips_only_progress_scenes() {
        let (grid, tree) = scene_parts();
        let scene = rrtstar_planner::Scene {
            grid: &grid,
            start: Point::new(0.0, 0.0),
            goal: Point::new(1.0, 0.0),
            tree: &tree,
        };
        let mut sink = StreamSink::new(Vec::new(), &grid, true).unwrap();
        sink.on_event(&PlannerEvent::Progress(scene)).unwrap();
        sink.on_event(&PlannerEvent::NoSolution).unwrap();
        sink.on_event(&PlannerEvent::Finished(scene)).unwrap();

        let text = String::from_utf8(sink.out).unwrap();
        assert_eq!(text, "2\n2\n0\n2\n2\n___#\n0\n0\n1\n0\n0\n");
    }
}
