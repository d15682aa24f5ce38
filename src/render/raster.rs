use crate::foundation::core::{Canvas, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{PlayoffError, PlayoffResult};
use crate::render::surface::{FramePixels, Surface, unpremultiply_rgba8_in_place};

/// RGBA8 brush color carried through Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrushRgba8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl TextLayoutEngine {
    fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> PlayoffResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PlayoffError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            PlayoffError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PlayoffError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

enum RasterCmd {
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

/// Raster drawing surface on `vello_cpu`.
///
/// Drawing calls append to a display list; `capture` replays the full list
/// into a render context and reads the pixmap back. Text is shaped with
/// Parley from the font bytes supplied at construction.
pub struct RasterSurface {
    canvas: Canvas,
    background: Rgba8,
    font_bytes: Vec<u8>,
    font: vello_cpu::peniko::FontData,
    text_engine: TextLayoutEngine,
    cmds: Vec<RasterCmd>,
}

impl RasterSurface {
    pub fn new(canvas: Canvas, background: Rgba8, font_bytes: Vec<u8>) -> PlayoffResult<Self> {
        if canvas.width == 0 || canvas.height == 0 || canvas.width > 4096 || canvas.height > 4096 {
            return Err(PlayoffError::validation(
                "raster canvas dimensions must be within 1..=4096",
            ));
        }
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.clone()),
            0,
        );
        Ok(Self {
            canvas,
            background,
            font_bytes,
            font,
            text_engine: TextLayoutEngine::new(),
            cmds: Vec::new(),
        })
    }

    fn replay(&mut self, ctx: &mut vello_cpu::RenderContext) -> PlayoffResult<()> {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(self.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        ));

        // The engine borrows self mutably for layout, so text layouts are
        // resolved in a first pass keyed by command index.
        let font_bytes = self.font_bytes.clone();
        let mut layouts = Vec::new();
        for (i, cmd) in self.cmds.iter().enumerate() {
            if let RasterCmd::Text {
                text, size, color, ..
            } = cmd
            {
                let brush = TextBrushRgba8 {
                    r: color.r,
                    g: color.g,
                    b: color.b,
                    a: color.a,
                };
                let layout =
                    self.text_engine
                        .layout_plain(text, &font_bytes, *size as f32, brush)?;
                layouts.push((i, layout));
            }
        }
        let mut layouts = layouts.into_iter().peekable();

        for (i, cmd) in self.cmds.iter().enumerate() {
            match cmd {
                RasterCmd::Line { a, b, width, color } => {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(color_to_cpu(*color));
                    ctx.fill_path(&line_quad(*a, *b, *width));
                }
                RasterCmd::Ellipse {
                    center,
                    rx,
                    ry,
                    color,
                } => {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(color_to_cpu(*color));
                    let e = kurbo::Ellipse::new((center.x, center.y), (*rx, *ry), 0.0);
                    ctx.fill_path(&bezpath_to_cpu(&kurbo::Shape::to_path(&e, 0.1)));
                }
                RasterCmd::Rect { rect, color } => {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(color_to_cpu(*color));
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        rect.x0, rect.y0, rect.x1, rect.y1,
                    ));
                }
                RasterCmd::Text { center, .. } => {
                    let Some((_, layout)) = layouts.next_if(|(j, _)| *j == i) else {
                        return Err(PlayoffError::render("text layout pass out of sync"));
                    };
                    // Center/middle anchoring from the layout's ink box.
                    let x = center.x - f64::from(layout.width()) / 2.0;
                    let y = center.y - f64::from(layout.height()) / 2.0;
                    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
                    for line in layout.lines() {
                        for item in line.items() {
                            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                                continue;
                            };
                            let brush = run.style().brush;
                            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                                brush.r, brush.g, brush.b, brush.a,
                            ));
                            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                                id: g.id,
                                x: g.x,
                                y: g.y,
                            });
                            ctx.glyph_run(&self.font)
                                .font_size(run.run().font_size())
                                .fill_glyphs(glyphs);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Surface for RasterSurface {
    fn draw_line(&mut self, a: Point, b: Point, width: f64, color: Rgba8) {
        self.cmds.push(RasterCmd::Line { a, b, width, color });
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, color: Rgba8) {
        self.cmds.push(RasterCmd::Ellipse {
            center,
            rx,
            ry,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.cmds.push(RasterCmd::Rect { rect, color });
    }

    fn draw_text(&mut self, center: Point, text: &str, size: f64, color: Rgba8) {
        self.cmds.push(RasterCmd::Text {
            center,
            text: text.to_string(),
            size,
            color,
        });
    }

    fn capture(&mut self) -> PlayoffResult<FramePixels> {
        let width = self.canvas.width as u16;
        let height = self.canvas.height as u16;
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        self.replay(&mut ctx)?;
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        Ok(FramePixels {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
        })
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

// vello_cpu pins its own kurbo, so paths cross the boundary element by
// element.
fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// A thick line segment as a filled quad (this backend only exercises fill
/// paths).
fn line_quad(a: Point, b: Point, width: f64) -> vello_cpu::kurbo::BezPath {
    let dir = b - a;
    let len = dir.hypot();
    let n = if len > 0.0 {
        Vec2::new(-dir.y / len, dir.x / len) * (width / 2.0)
    } else {
        Vec2::new(width / 2.0, 0.0)
    };
    let mut p = vello_cpu::kurbo::BezPath::new();
    p.move_to((a.x + n.x, a.y + n.y));
    p.line_to((b.x + n.x, b.y + n.y));
    p.line_to((b.x - n.x, b.y - n.y));
    p.line_to((a.x - n.x, a.y - n.y));
    p.close_path();
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_quad_is_closed_and_offset() {
        let p = line_quad(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 4.0);
        let elements: Vec<_> = p.elements().to_vec();
        assert_eq!(elements.len(), 5);
    }

    #[test]
    fn degenerate_line_still_produces_geometry() {
        let p = line_quad(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 2.0);
        assert!(!p.elements().is_empty());
    }

    #[test]
    fn rejects_oversized_canvas() {
        let canvas = Canvas {
            width: 9000,
            height: 100,
        };
        assert!(RasterSurface::new(canvas, Rgba8::WHITE, Vec::new()).is_err());
    }
}
