use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
use crate::foundation::error::{PlayoffError, PlayoffResult};
use crate::render::surface::{FramePixels, Surface, unpremultiply_rgba8_in_place};

/// Vector drawing surface.
///
/// Drawing calls accumulate SVG elements; `capture` parses the document
/// with `usvg` and rasterizes it with `resvg` (text is resolved against
/// system fonts). `document` exposes the markup directly for callers that
/// want the vector output itself.
pub struct SvgSurface {
    canvas: Canvas,
    font_family: String,
    body: String,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgSurface {
    pub fn new(canvas: Canvas, background: Rgba8) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let mut surface = Self {
            canvas,
            font_family: "sans-serif".to_string(),
            body: String::new(),
            fontdb: Arc::new(db),
        };
        surface.fill_rect(
            Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height)),
            background,
        );
        surface
    }

    /// Override the font family used for all text elements.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// The complete SVG document accumulated so far.
    pub fn document(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
             viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.canvas.width,
            h = self.canvas.height,
            body = self.body,
        )
    }
}

impl Surface for SvgSurface {
    fn draw_line(&mut self, a: Point, b: Point, width: f64, color: Rgba8) {
        let _ = writeln!(
            self.body,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" \
             stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linecap=\"round\"/>",
            a.x,
            a.y,
            b.x,
            b.y,
            color.to_hex(),
            width,
        );
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgba8) {
        let _ = writeln!(
            self.body,
            "<ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\"/>",
            center.x,
            center.y,
            rx,
            ry,
            color.to_hex(),
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        let _ = writeln!(
            self.body,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
            color.to_hex(),
        );
    }

    fn draw_text(&mut self, center: Point, text: &str, size: f64, color: Rgba8) {
        let _ = writeln!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" \
             fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
            center.x,
            center.y,
            self.font_family,
            size,
            color.to_hex(),
            escape_xml(text),
        );
    }

    fn capture(&mut self) -> PlayoffResult<FramePixels> {
        let document = self.document();
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(document.as_bytes(), &opts)
            .context("parse svg document")
            .map_err(PlayoffError::from)?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(self.canvas.width, self.canvas.height)
            .ok_or_else(|| PlayoffError::render("failed to allocate capture pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        let mut data = pixmap.data().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        Ok(FramePixels {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
        })
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_contains_background_and_elements() {
        let canvas = Canvas {
            width: 100,
            height: 200,
        };
        let mut s = SvgSurface::new(canvas, Rgba8::WHITE);
        s.draw_text(Point::new(50.0, 50.0), "A & B", 20.0, Rgba8::BLACK);
        s.draw_line(Point::new(0.0, 0.0), Point::new(100.0, 200.0), 10.0, Rgba8::rgb(0xcc, 0xcc, 0xcc));

        let doc = s.document();
        assert!(doc.starts_with("<svg "));
        assert!(doc.contains("width=\"100\" height=\"200\""));
        assert!(doc.contains("fill=\"#ffffff\""));
        assert!(doc.contains("A &amp; B"));
        assert!(doc.contains("stroke=\"#cccccc\""));
    }

    #[test]
    fn capture_matches_canvas_size() {
        let canvas = Canvas {
            width: 32,
            height: 16,
        };
        let mut s = SvgSurface::new(canvas, Rgba8::WHITE);
        let frame = s.capture().unwrap();
        assert_eq!(frame.width, 32);
        assert_eq!(frame.height, 16);
        assert_eq!(frame.data.len(), 32 * 16 * 4);
        // Background fill must reach every pixel.
        assert!(frame.data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn unpremultiply_inverts_half_alpha() {
        let mut data = vec![64, 32, 0, 128];
        unpremultiply_rgba8_in_place(&mut data);
        assert_eq!(data[3], 128);
        assert_eq!(data[0], 128);
        assert_eq!(data[1], 64);
    }
}
