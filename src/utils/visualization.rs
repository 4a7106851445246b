//! Snapshot rendering of a planning session using gnuplot.
//!
//! The interactive renderer lives outside this crate and is driven through
//! [`CellObserver`](crate::common::CellObserver); this module only produces
//! still images of the field, the tree and the found path.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Cell, CellState, RrtError, RrtResult, Visualizable};
use crate::path_planning::TreeStore;
use crate::utils::OccupancyField;

/// Color palette, one entry per cell state
pub mod colors {
    pub const OBSTACLE: &str = "#000000";
    pub const NODE: &str = "#0000FF";
    pub const CONNECTION: &str = "#8080FF";
    pub const START: &str = "#00AA00";
    pub const END: &str = "#FF00FF";
    pub const PATH: &str = "#FF0000";
}

/// Style for polyline rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::PATH, "Path")
    }
}

/// Style for cell rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 0.5,
            symbol: 'S',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }

    /// Default style for cells in `state`, `None` for free cells
    pub fn for_state(state: CellState) -> Option<Self> {
        let style = match state {
            CellState::Free => return None,
            CellState::Obstacle => PointStyle::new(colors::OBSTACLE, "Obstacles"),
            CellState::NodeConnection => PointStyle::new(colors::CONNECTION, "Connections").with_size(0.3),
            CellState::Node => PointStyle::new(colors::NODE, "Nodes").with_symbol('O'),
            CellState::StartCell => PointStyle::new(colors::START, "Start").with_size(1.5),
            CellState::EndCell => PointStyle::new(colors::END, "End"),
        };
        Some(style)
    }
}

fn split_xy(cells: &[Cell]) -> (Vec<f64>, Vec<f64>) {
    cells.iter().map(|c| (c.i as f64, c.j as f64)).unzip()
}

/// Builder around a gnuplot figure with grid-cell coordinates
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_label: "i [cell]".to_string(),
            y_label: "j [cell]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    /// Visualizer with both axes fixed to an `n x n` grid
    pub fn for_grid(n: usize) -> Self {
        let mut vis = Self::new();
        let max = n as f64 - 0.5;
        vis.set_x_range(-0.5, max).set_y_range(-0.5, max);
        vis
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_label(&mut self, label: &str) -> &mut Self {
        self.x_label = label.to_string();
        self
    }

    pub fn set_y_label(&mut self, label: &str) -> &mut Self {
        self.y_label = label.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Plot a set of cells as points; empty sets are skipped
    pub fn plot_cells(&mut self, cells: &[Cell], style: &PointStyle) -> &mut Self {
        if cells.is_empty() {
            return self;
        }
        let (x, y) = split_xy(cells);
        self.figure.axes2d().points(
            &x,
            &y,
            &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ],
        );
        self
    }

    /// Plot an ordered cell sequence as a polyline
    pub fn plot_path(&mut self, path: &[Cell], style: &PathStyle) -> &mut Self {
        if path.is_empty() {
            return self;
        }
        let (x, y) = split_xy(path);
        self.figure.axes2d().lines(
            &x,
            &y,
            &[
                Caption(&style.caption),
                Color(&style.color),
                LineWidth(style.line_width),
            ],
        );
        self
    }

    /// Plot independent segments as one series
    pub fn plot_segments(&mut self, segments: &[(Cell, Cell)], style: &PathStyle) -> &mut Self {
        if segments.is_empty() {
            return self;
        }
        // NaN breaks the polyline between segments
        let mut x = Vec::with_capacity(segments.len() * 3);
        let mut y = Vec::with_capacity(segments.len() * 3);
        for (a, b) in segments {
            x.extend([a.i as f64, b.i as f64, f64::NAN]);
            y.extend([a.j as f64, b.j as f64, f64::NAN]);
        }
        self.figure.axes2d().lines(
            &x,
            &y,
            &[
                Caption(&style.caption),
                Color(&style.color),
                LineWidth(style.line_width),
            ],
        );
        self
    }

    /// Draw anything that knows how to draw itself
    pub fn plot<V: Visualizable + ?Sized>(&mut self, item: &V) -> &mut Self {
        item.visualize(self);
        self
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> RrtResult<()> {
        self.apply_settings();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| RrtError::VisualizationError(format!("{}: {}", path, e)))
    }

    pub fn save_svg(&mut self, path: &str, width: u32, height: u32) -> RrtResult<()> {
        self.apply_settings();
        self.figure
            .save_to_svg(path, width, height)
            .map_err(|e| RrtError::VisualizationError(format!("{}: {}", path, e)))
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

const DRAW_ORDER: [CellState; 5] = [
    CellState::Obstacle,
    CellState::NodeConnection,
    CellState::Node,
    CellState::EndCell,
    CellState::StartCell,
];

impl Visualizable for OccupancyField {
    fn visualize(&self, vis: &mut Visualizer) {
        for state in DRAW_ORDER {
            if let Some(style) = PointStyle::for_state(state) {
                vis.plot_cells(&self.cells_with(state), &style);
            }
        }
    }
}

impl Visualizable for TreeStore {
    fn visualize(&self, vis: &mut Visualizer) {
        let edges: Vec<(Cell, Cell)> = self.edges().collect();
        vis.plot_segments(&edges, &PathStyle::new(colors::CONNECTION, "Tree").with_line_width(1.0));
        let nodes: Vec<Cell> = self.cells().collect();
        if let Some(style) = PointStyle::for_state(CellState::Node) {
            vis.plot_cells(&nodes, &style);
        }
    }
}
