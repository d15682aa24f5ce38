use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::PlayoffResult;

/// A captured frame as straight-alpha RGBA8 pixels, tightly packed,
/// row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePixels {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// A 2D drawing target the bracket painter and sequencer run against.
///
/// Text is anchored center/middle at the given point. Implementations are
/// raster (`RasterSurface`), vector (`SvgSurface`), and a headless
/// recording double for tests.
pub trait Surface {
    fn draw_line(&mut self, a: Point, b: Point, width: f64, color: Rgba8);

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgba8);

    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    fn draw_text(&mut self, center: Point, text: &str, size: f64, color: Rgba8);

    /// Snapshot the current surface contents.
    fn capture(&mut self) -> PlayoffResult<FramePixels>;
}

/// Convert premultiplied RGBA8 (what both rasterizers produce) into the
/// straight alpha PNG encoding expects.
pub(crate) fn unpremultiply_rgba8_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 || a == 255 {
            continue;
        }
        let a16 = u16::from(a);
        for c in px.iter_mut().take(3) {
            let v = u16::from(*c);
            *c = ((v * 255 + a16 / 2) / a16).min(255) as u8;
        }
    }
}

/// One recorded drawing call, in issue order.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Line {
        a: Point,
        b: Point,
        width: f64,
        color: Rgba8,
    },
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
        color: Rgba8,
    },
    Rect {
        rect: Rect,
        color: Rgba8,
    },
    Text {
        center: Point,
        text: String,
        size: f64,
        color: Rgba8,
    },
}

/// Headless surface for tests and debugging: records every drawing call
/// and returns a 1x1 placeholder on capture.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    captures: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captures(&self) -> usize {
        self.captures
    }

    /// Texts drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn draw_line(&mut self, a: Point, b: Point, width: f64, color: Rgba8) {
        self.ops.push(DrawOp::Line { a, b, width, color });
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgba8) {
        self.ops.push(DrawOp::Ellipse {
            center,
            rx,
            ry,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ops.push(DrawOp::Rect { rect, color });
    }

    fn draw_text(&mut self, center: Point, text: &str, size: f64, color: Rgba8) {
        self.ops.push(DrawOp::Text {
            center,
            text: text.to_string(),
            size,
            color,
        });
    }

    fn capture(&mut self) -> PlayoffResult<FramePixels> {
        self.captures += 1;
        Ok(FramePixels {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_surface_preserves_call_order() {
        let mut s = RecordingSurface::new();
        s.draw_text(Point::new(1.0, 2.0), "A", 75.0, Rgba8::BLACK);
        s.draw_line(Point::ZERO, Point::new(3.0, 4.0), 10.0, Rgba8::WHITE);
        assert_eq!(s.ops.len(), 2);
        assert!(matches!(s.ops[0], DrawOp::Text { .. }));
        assert_eq!(s.texts(), vec!["A"]);
    }

    #[test]
    fn capture_counts_snapshots() {
        let mut s = RecordingSurface::new();
        s.capture().unwrap();
        s.capture().unwrap();
        assert_eq!(s.captures(), 2);
    }
}
