use crate::bracket::model::{BracketSpec, CellId};
use crate::foundation::core::{Canvas, Point};

/// Overwrite-offset policy for the last (winner) column.
///
/// Past `threshold` overwrites the horizontal run of slots would walk off
/// the right edge of the canvas, so the winner cell instead wraps onto
/// lines below its base center. The constants were tuned visually for the
/// reference diagram; they are configuration, not a derived rule.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct WrapRule {
    pub threshold: usize,
    pub line_height_em: f64,
}

impl Default for WrapRule {
    fn default() -> Self {
        Self {
            threshold: 1,
            line_height_em: 1.25,
        }
    }
}

/// Layout parameters. Defaults reproduce the reference 1080x1920 diagram.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct LayoutOpts {
    pub canvas: Canvas,
    /// Label font size in pixels. `None` derives `height * 75 / 1920`.
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Row-heights reserved above the grid for the final-result call-outs.
    pub reserved_rows_top: f64,
    pub wrap: WrapRule,
}

impl Default for LayoutOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            font_size: None,
            reserved_rows_top: 1.0,
            wrap: WrapRule::default(),
        }
    }
}

/// Immutable pixel geometry for a bracket, computed once at startup.
#[derive(Clone, Debug)]
pub struct BracketLayout {
    canvas: Canvas,
    font_size: f64,
    wrap: WrapRule,
    client_top: f64,
    first_column_rows: usize,
    centers: Vec<Vec<Point>>,
}

impl BracketLayout {
    pub fn new(spec: &BracketSpec, opts: LayoutOpts) -> Self {
        let width = f64::from(opts.canvas.width);
        let height = f64::from(opts.canvas.height);
        let font_size = opts.font_size.unwrap_or(height * 75.0 / 1920.0);

        let first_column_rows = spec.rows_in(0);
        let reserved = opts.reserved_rows_top;
        let client_top = reserved / (reserved + first_column_rows as f64) * height;
        let client_height = height - client_top;

        let column_count = spec.column_count() as f64;
        let centers = spec
            .columns
            .iter()
            .enumerate()
            .map(|(column, labels)| {
                let x = width / column_count * (column as f64 + 0.5);
                let rows = labels.len() as f64;
                (0..labels.len())
                    .map(|row| {
                        let y = client_top + client_height / rows * (row as f64 + 0.5);
                        Point::new(x, y)
                    })
                    .collect()
            })
            .collect();

        Self {
            canvas: opts.canvas,
            font_size,
            wrap: opts.wrap,
            client_top,
            first_column_rows,
            centers,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn column_count(&self) -> usize {
        self.centers.len()
    }

    pub fn rows_in(&self, column: usize) -> usize {
        self.centers[column].len()
    }

    /// Base center of a cell (iteration 0).
    pub fn center(&self, cell: CellId) -> Point {
        self.centers[cell.column][cell.row]
    }

    /// Where the label for a cell's `iteration`-th overwrite is drawn.
    ///
    /// Pure: successive overwrites shift right by one font-size unit; only
    /// the final column wraps downward past the configured threshold.
    pub fn cell_position(&self, cell: CellId, iteration: usize) -> Point {
        let base = self.center(cell);
        let last_column = self.centers.len() - 1;
        if iteration > self.wrap.threshold && cell.column == last_column {
            let over = 1.0;
            let down = iteration as f64 - over;
            Point::new(
                base.x + over * self.font_size,
                base.y + down * self.wrap.line_height_em * self.font_size,
            )
        } else {
            Point::new(base.x + iteration as f64 * self.font_size, base.y)
        }
    }

    /// X of the `position`-th slot in the final-result band above the
    /// grid. Slots divide the width by the first column's row count.
    pub fn final_slot_x(&self, position: usize) -> f64 {
        f64::from(self.canvas.width) / self.first_column_rows as f64 * (position as f64 + 0.5)
    }

    /// Y of the final-result band (centered in the reserved top margin).
    pub fn final_slot_y(&self) -> f64 {
        self.client_top / 2.0
    }

    /// Radius of the blank occlusion disc painted over each cell center.
    pub fn occlusion_radius(&self) -> f64 {
        f64::from(self.canvas.width) / self.centers.len() as f64 / 5.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::model::merge_target;

    fn reference_layout() -> (BracketSpec, BracketLayout) {
        let spec = BracketSpec::new(
            [
                vec!["Z", "A", "Q", "B", "R", "T", "S", "D"],
                vec!["A", "B", "R", "D"],
                vec!["A", "D"],
                vec!["A"],
            ]
            .into_iter()
            .map(|c| c.into_iter().map(String::from).collect())
            .collect(),
        )
        .unwrap();
        let layout = BracketLayout::new(&spec, LayoutOpts::default());
        (spec, layout)
    }

    #[test]
    fn x_evenly_divides_columns() {
        let (_, layout) = reference_layout();
        assert_eq!(layout.center(CellId::new(0, 0)).x, 1080.0 / 4.0 * 0.5);
        assert_eq!(layout.center(CellId::new(3, 0)).x, 1080.0 / 4.0 * 3.5);
    }

    #[test]
    fn y_reserves_top_band() {
        let (_, layout) = reference_layout();
        // 1 reserved row over 8 content rows.
        let client_top = 1.0 / 9.0 * 1920.0;
        let client_height = 1920.0 - client_top;
        let y0 = layout.center(CellId::new(0, 0)).y;
        assert!((y0 - (client_top + client_height / 8.0 * 0.5)).abs() < 1e-9);
        assert!((layout.final_slot_y() - client_top / 2.0).abs() < 1e-9);
    }

    #[test]
    fn iteration_zero_is_base_center() {
        let (_, layout) = reference_layout();
        for column in 0..4 {
            for row in 0..layout.rows_in(column) {
                let cell = CellId::new(column, row);
                assert_eq!(layout.cell_position(cell, 0), layout.center(cell));
            }
        }
    }

    #[test]
    fn iterations_shift_right_by_font_size() {
        let (_, layout) = reference_layout();
        let cell = CellId::new(1, 2);
        let base = layout.center(cell);
        for iteration in 1..4 {
            let p = layout.cell_position(cell, iteration);
            assert_eq!(p.y, base.y);
            assert_eq!(p.x, base.x + iteration as f64 * layout.font_size());
        }
    }

    #[test]
    fn final_column_wraps_past_threshold() {
        let (_, layout) = reference_layout();
        let winner = CellId::new(3, 0);
        let base = layout.center(winner);
        let fs = layout.font_size();

        // Below or at the threshold: same y as the base center.
        assert_eq!(layout.cell_position(winner, 1).y, base.y);

        for iteration in 2..5usize {
            let p = layout.cell_position(winner, iteration);
            assert_eq!(p.x, base.x + fs);
            assert!((p.y - (base.y + (iteration as f64 - 1.0) * 1.25 * fs)).abs() < 1e-9);
        }
    }

    #[test]
    fn wrap_applies_only_to_final_column() {
        let (_, layout) = reference_layout();
        let cell = CellId::new(2, 1);
        let p = layout.cell_position(cell, 3);
        assert_eq!(p.y, layout.center(cell).y);
    }

    #[test]
    fn merge_lines_have_valid_targets() {
        let (spec, layout) = reference_layout();
        for column in 0..spec.column_count() - 1 {
            for row in 0..spec.rows_in(column) {
                let target = merge_target(row);
                assert!(target < layout.rows_in(column + 1));
            }
        }
    }

    #[test]
    fn cell_position_is_deterministic() {
        let (_, layout) = reference_layout();
        let cell = CellId::new(3, 0);
        assert_eq!(
            layout.cell_position(cell, 2),
            layout.cell_position(cell, 2)
        );
    }
}
