//! SVG export serializer.
//!
//! Renders a planning scene with the [`svg`] crate, which handles
//! document construction, XML escaping, and path data formatting.
//!
//! The `viewBox` is in grid units (one unit per cell) and the document is
//! [`CELL_SIZE_PX`] pixels per cell. Layers, bottom to top:
//!
//! 1. a white background,
//! 2. blocked cells as black squares (`<g id="obstacles">`),
//! 3. tree edges in grey (`<path id="tree">`),
//! 4. the solution path in red (`<path id="solution">`),
//! 5. start (green) and goal (blue) markers.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.
//!
//! This is a pure function with no I/O; it returns a `String`.

use svg::Document;
use svg::node::Text;
use svg::node::Value;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Group, Path, Rectangle, Title};

use rrtstar_planner::{Cell, Point, Scene};

/// Rendered size of one grid cell in pixels.
pub const CELL_SIZE_PX: usize = 20;

const TREE_STROKE: &str = "#999999";
const SOLUTION_STROKE: &str = "#d62728";
const START_FILL: &str = "#2ca02c";
const GOAL_FILL: &str = "#1f77b4";
const TREE_STROKE_WIDTH: f64 = 0.04;
const SOLUTION_STROKE_WIDTH: f64 = 0.12;
const MARKER_RADIUS: f64 = 0.25;

/// Metadata to embed in the SVG document.
///
/// Both fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    ///
    /// Typically the planner parameters, so exported files are
    /// distinguishable.
    pub description: Option<&'a str>,
}

/// Build an SVG path `d` attribute string through `points`.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for fewer than 2 points.
///
/// # Examples
///
/// ```
/// use rrtstar_planner::Point;
/// use rrtstar_export::build_path_data;
///
/// let d = build_path_data(&[Point::new(10.0, 20.0), Point::new(30.0, 40.0)]);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(points: &[Point]) -> String {
    let [first, rest @ ..] = points else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to((first.x, first.y));
    for p in rest {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data))
}

/// Build path data with one `M parent L child` pair per tree edge.
fn build_edge_data<I>(edges: I) -> String
where
    I: IntoIterator<Item = (Point, Point)>,
{
    let mut data = Data::new();
    let mut any = false;
    for (child, parent) in edges {
        data = data.move_to((parent.x, parent.y)).line_to((child.x, child.y));
        any = true;
    }
    if any {
        String::from(Value::from(data))
    } else {
        String::new()
    }
}

/// Serialize a scene and optional solution path into an SVG string.
///
/// `solution` is the root-to-goal point list; a path with fewer than two
/// points draws no line.
#[must_use]
pub fn to_svg(scene: &Scene<'_>, solution: Option<&[Point]>, metadata: &SvgMetadata<'_>) -> String {
    let grid = scene.grid;
    let (width, height) = (grid.width(), grid.height());

    let mut doc = Document::new()
        .set("width", width * CELL_SIZE_PX)
        .set("height", height * CELL_SIZE_PX)
        .set("viewBox", (0, 0, width, height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    doc = doc.add(
        Rectangle::new()
            .set("width", width)
            .set("height", height)
            .set("fill", "white"),
    );

    let mut obstacles = Group::new().set("id", "obstacles").set("fill", "black");
    for row in 0..height {
        for col in 0..width {
            if grid.cell(col, row) == Some(Cell::Blocked) {
                obstacles = obstacles.add(
                    Rectangle::new()
                        .set("x", col)
                        .set("y", row)
                        .set("width", 1)
                        .set("height", 1),
                );
            }
        }
    }
    doc = doc.add(obstacles);

    let edges = build_edge_data(scene.tree.edges());
    if !edges.is_empty() {
        doc = doc.add(
            Path::new()
                .set("id", "tree")
                .set("d", edges)
                .set("fill", "none")
                .set("stroke", TREE_STROKE)
                .set("stroke-width", TREE_STROKE_WIDTH),
        );
    }

    if let Some(points) = solution {
        let d = build_path_data(points);
        if !d.is_empty() {
            doc = doc.add(
                Path::new()
                    .set("id", "solution")
                    .set("d", d)
                    .set("fill", "none")
                    .set("stroke", SOLUTION_STROKE)
                    .set("stroke-width", SOLUTION_STROKE_WIDTH),
            );
        }
    }

    for (id, point, fill) in [
        ("start", scene.start, START_FILL),
        ("goal", scene.goal, GOAL_FILL),
    ] {
        doc = doc.add(
            Circle::new()
                .set("id", id)
                .set("cx", point.x)
                .set("cy", point.y)
                .set("r", MARKER_RADIUS)
                .set("fill", fill),
        );
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rrtstar_planner::{OccupancyGrid, Tree};

    use super::*;

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn grid() -> OccupancyGrid {
        OccupancyGrid::from_rows(&["_#__", "_#__", "____"]).unwrap()
    }

    fn scene<'a>(grid: &'a OccupancyGrid, tree: &'a Tree) -> Scene<'a> {
        Scene {
            grid,
            start: Point::new(0.5, 0.5),
            goal: Point::new(3.5, 0.5),
            tree,
        }
    }

    // --- build_path_data ---

    #[test]
    fn build_path_data_empty() {
        assert_eq!(build_path_data(&[]), "");
    }

    #[test]
    fn build_path_data_single_point() {
        assert_eq!(build_path_data(&[Point::new(5.0, 5.0)]), "");
    }

    #[test]
    fn build_path_data_three_points() {
        let d = build_path_data(&[
            Point::new(10.0, 15.0),
            Point::new(12.5, 18.0),
            Point::new(14.0, 20.5),
        ]);
        assert_eq!(d, "M10,15 L12.5,18 L14,20.5");
    }

    #[test]
    fn edge_data_pairs_parent_and_child() {
        let d = build_edge_data([
            (Point::new(1.0, 2.0), Point::new(0.0, 0.0)),
            (Point::new(3.0, 2.0), Point::new(1.0, 2.0)),
        ]);
        assert_eq!(d, "M0,0 L1,2 M1,2 L3,2");
        assert_eq!(build_edge_data(std::iter::empty()), "");
    }

    // --- document structure ---

    #[test]
    fn svg_has_xml_declaration_and_namespace() {
        let grid = grid();
        let tree = Tree::new(Point::new(0.5, 0.5));
        let svg = to_svg(&scene(&grid, &tree), None, &no_meta());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn viewbox_is_in_grid_units() {
        let grid = grid();
        let tree = Tree::new(Point::new(0.5, 0.5));
        let svg = to_svg(&scene(&grid, &tree), None, &no_meta());
        assert!(svg.contains(r#"viewBox="0 0 4 3""#));
        assert!(svg.contains(r#"width="80""#));
        assert!(svg.contains(r#"height="60""#));
    }

    #[test]
    fn one_square_per_blocked_cell() {
        let grid = grid();
        let tree = Tree::new(Point::new(0.5, 0.5));
        let svg = to_svg(&scene(&grid, &tree), None, &no_meta());
        // Background plus two obstacle cells.
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains(r#"x="1""#));
        assert!(svg.contains(r#"y="1""#));
    }

    #[test]
    fn root_only_tree_draws_no_edges() {
        let grid = grid();
        let tree = Tree::new(Point::new(0.5, 0.5));
        let svg = to_svg(&scene(&grid, &tree), None, &no_meta());
        assert!(!svg.contains(r#"id="tree""#));
        assert!(!svg.contains(r#"id="solution""#));
        assert!(svg.contains(r#"id="start""#));
        assert!(svg.contains(r#"id="goal""#));
    }

    #[test]
    fn tree_and_solution_are_drawn() {
        let grid = grid();
        let mut tree = Tree::new(Point::new(0.5, 0.5));
        let low = tree.insert(Point::new(0.5, 2.5), tree.root()).unwrap();
        let corner = tree.insert(Point::new(3.5, 2.5), low).unwrap();
        let goal = tree.insert(Point::new(3.5, 0.5), corner).unwrap();
        let path = tree.path_to_root(goal).unwrap();

        let svg = to_svg(&scene(&grid, &tree), Some(&path), &no_meta());

        assert!(svg.contains(r#"id="tree""#));
        assert!(svg.contains(r#"d="M0.5,0.5 L0.5,2.5 M0.5,2.5 L3.5,2.5 M3.5,2.5 L3.5,0.5""#));
        assert!(svg.contains(r#"id="solution""#));
        assert!(svg.contains(r#"d="M0.5,0.5 L0.5,2.5 L3.5,2.5 L3.5,0.5""#));
        assert!(svg.contains(SOLUTION_STROKE));
    }

    #[test]
    fn solution_is_drawn_above_tree() {
        let grid = grid();
        let mut tree = Tree::new(Point::new(0.5, 0.5));
        let goal = tree.insert(Point::new(0.5, 2.5), tree.root()).unwrap();
        let path = tree.path_to_root(goal).unwrap();
        let svg = to_svg(&scene(&grid, &tree), Some(&path), &no_meta());
        let tree_pos = svg.find(r#"id="tree""#).unwrap();
        let solution_pos = svg.find(r#"id="solution""#).unwrap();
        assert!(tree_pos < solution_pos);
    }

    #[test]
    fn one_point_solution_draws_no_line() {
        let grid = grid();
        let tree = Tree::new(Point::new(0.5, 0.5));
        let path = [Point::new(0.5, 0.5)];
        let svg = to_svg(&scene(&grid, &tree), Some(&path), &no_meta());
        assert!(!svg.contains(r#"id="solution""#));
    }

    // --- Metadata ---

    #[test]
    fn title_and_desc_emitted_before_content() {
        let grid = grid();
        let tree = Tree::new(Point::new(0.5, 0.5));
        let meta = SvgMetadata {
            title: Some("maze"),
            description: Some("radius=0.5, bias=0.2"),
        };
        let svg = to_svg(&scene(&grid, &tree), None, &meta);
        let title_pos = svg.find("<title>maze</title>").unwrap();
        let desc_pos = svg.find("<desc>radius=0.5, bias=0.2</desc>").unwrap();
        let rect_pos = svg.find("<rect").unwrap();
        assert!(title_pos < desc_pos);
        assert!(desc_pos < rect_pos);
    }

    #[test]
    fn title_and_desc_omitted_when_none() {
        let grid = grid();
        let tree = Tree::new(Point::new(0.5, 0.5));
        let svg = to_svg(&scene(&grid, &tree), None, &no_meta());
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
    }

    #[test]
    fn special_characters_in_metadata_are_escaped() {
        let grid = grid();
        let tree = Tree::new(Point::new(0.5, 0.5));
        let meta = SvgMetadata {
            title: Some("A <B> & C"),
            description: Some("x < y & z > w"),
        };
        let svg = to_svg(&scene(&grid, &tree), None, &meta);
        assert!(svg.contains("<title>A &lt;B&gt; &amp; C</title>"));
        assert!(svg.contains("<desc>x &lt; y &amp; z &gt; w</desc>"));
    }
}
