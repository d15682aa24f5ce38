use crate::bracket::layout::BracketLayout;
use crate::bracket::model::{BracketSpec, CellId, merge_target};
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::render::surface::Surface;

/// Colors and stroke widths for the bracket diagram. Defaults reproduce
/// the reference look: white background, grey connectors, dark-grey
/// starting letters.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Theme {
    pub background: Rgba8,
    pub bracket_line: Rgba8,
    pub initial_letter: Rgba8,
    pub bracket_line_width: f64,
    pub cross_halo_width: f64,
    pub cross_stroke_width: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba8::WHITE,
            bracket_line: Rgba8::rgb(0xcc, 0xcc, 0xcc),
            initial_letter: Rgba8::rgb(0x66, 0x66, 0x66),
            bracket_line_width: 10.0,
            cross_halo_width: 12.0,
            cross_stroke_width: 6.1,
        }
    }
}

/// Side-effecting drawing operations for one bracket on one surface.
///
/// All index arguments assume a validated bracket; out-of-range indices
/// are programming errors, not handled conditions.
pub struct BracketPainter<'a> {
    spec: &'a BracketSpec,
    layout: &'a BracketLayout,
    theme: Theme,
}

impl<'a> BracketPainter<'a> {
    pub fn new(spec: &'a BracketSpec, layout: &'a BracketLayout, theme: Theme) -> Self {
        Self {
            spec,
            layout,
            theme,
        }
    }

    pub fn layout(&self) -> &BracketLayout {
        self.layout
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Merge lines between every adjacent column pair, then a blank
    /// occlusion disc over each cell center for the letters to land on.
    pub fn draw_bracket(&self, surface: &mut dyn Surface) {
        for column in 0..self.layout.column_count().saturating_sub(1) {
            for row in 0..self.layout.rows_in(column) {
                let from = self.layout.center(CellId::new(column, row));
                let to = self
                    .layout
                    .center(CellId::new(column + 1, merge_target(row)));
                surface.draw_line(from, to, self.theme.bracket_line_width, self.theme.bracket_line);
            }
        }

        let radius = self.layout.occlusion_radius();
        for column in 0..self.layout.column_count() {
            for row in 0..self.layout.rows_in(column) {
                let center = self.layout.center(CellId::new(column, row));
                surface.fill_ellipse(center, radius, radius, self.theme.background);
            }
        }
    }

    pub fn add_letter(&self, surface: &mut dyn Surface, at: Point, text: &str, color: Rgba8) {
        surface.draw_text(at, text, self.layout.font_size(), color);
    }

    /// Diagonal elimination mark with a background halo underneath so it
    /// stays readable where letters and lines overlap.
    pub fn cross_out(&self, surface: &mut dyn Surface, at: Point, color: Rgba8) {
        let offset = self.layout.font_size() * 0.4;
        let a = Point::new(at.x - offset, at.y - offset);
        let b = Point::new(at.x + offset, at.y + offset);
        surface.draw_line(a, b, self.theme.cross_halo_width, self.theme.background);
        surface.draw_line(a, b, self.theme.cross_stroke_width, color);
    }

    /// Labels of one column at their base centers.
    pub fn draw_initial_letters(&self, surface: &mut dyn Surface, column: usize) {
        for (row, text) in self.spec.columns[column].iter().enumerate() {
            let at = self.layout.center(CellId::new(column, row));
            self.add_letter(surface, at, text, self.theme.initial_letter);
        }
    }

    /// Winner call-out in the reserved band above the grid: the letter
    /// plus its placement ordinal ("1st", "2nd", ...) as two text runs of
    /// different sizes centered as a unit.
    pub fn draw_final_result(
        &self,
        surface: &mut dyn Surface,
        text: &str,
        position: usize,
        color: Rgba8,
    ) {
        let font_size = self.layout.font_size();
        let x = self.layout.final_slot_x(position);
        let y = self.layout.final_slot_y();

        // Blank out any previous call-out in this slot.
        surface.fill_rect(
            Rect::new(
                x - font_size * 0.6,
                y - font_size * 0.6,
                x + font_size * 0.6,
                y + font_size * 0.5,
            ),
            self.theme.background,
        );
        surface.draw_text(Point::new(x, y), text, font_size, color);

        let number = (position + 1).to_string();
        let suffix = ordinal_suffix(position);
        let size_number = font_size * 0.667;
        let size_suffix = font_size * 0.42;

        let width_number = estimate_text_width(&number, size_number);
        let width_suffix = estimate_text_width(suffix, size_suffix);
        let ordinal_width = width_number + width_suffix;
        let far_left = x - ordinal_width / 2.0;
        let number_x = far_left + width_number / 2.0;
        let suffix_x = number_x + ordinal_width / 2.0;

        surface.draw_text(
            Point::new(number_x, y + font_size),
            &number,
            size_number,
            color,
        );
        surface.draw_text(
            Point::new(suffix_x, y + font_size * 0.9),
            suffix,
            size_suffix,
            color,
        );
    }
}

/// Ordinal suffix keyed by 0-based position.
pub fn ordinal_suffix(position: usize) -> &'static str {
    match position {
        0 => "st",
        1 => "nd",
        2 => "rd",
        _ => "th",
    }
}

/// Rough center-anchored width; good enough for call-out alignment
/// without a metrics round trip through the backend.
fn estimate_text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.6
}
