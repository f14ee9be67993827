//! rrtstar-export: Pure format serializers (sans-IO)
//!
//! Converts planner scenes and solutions into output formats: the
//! line-oriented visualizer stream and an SVG rendering.

pub mod stream;
pub mod svg;

pub use stream::{
    NO_SOLUTION_LINE, format_event, format_number, format_scene, format_solution, header,
};
pub use svg::{SvgMetadata, build_path_data, to_svg};
