use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use qrcode::{EcLevel, QrCode};

use crate::error::{QRKitError, QRKitResult};
use crate::render::{Artifact, RenderCapability, RenderRequest};

// Basic renderer
//------------------------------------------------------------------------------

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Baseline rendering capability: fixed black-on-white squares. Only the
/// content string, size and margin are honored; every other styling field is
/// ignored. There is no update-in-place, the artifact is regenerated from
/// scratch on every render.
pub struct BasicRenderer;

impl RenderCapability for BasicRenderer {
    fn supports_styling(&self) -> bool {
        false
    }

    fn render(&self, request: &RenderRequest) -> QRKitResult<Artifact> {
        if request.content.is_empty() {
            return Err(QRKitError::EmptyContent);
        }
        let code = QrCode::with_error_correction_level(request.content.as_bytes(), EcLevel::M)?;
        let n = code.width();
        let size = request.style.size;
        let margin = request.style.margin as f32;
        let cell = (size as f32 - 2.0 * margin) / n as f32;
        let edge = |i: usize| (margin + i as f32 * cell).round();

        let mut canvas = RgbaImage::from_pixel(size, size, WHITE);
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" \
             viewBox=\"0 0 {size} {size}\">\
             <rect width=\"{size}\" height=\"{size}\" fill=\"#ffffff\"/>"
        );

        for y in 0..n {
            for x in 0..n {
                if code[(x, y)] != qrcode::Color::Dark {
                    continue;
                }
                let (x0, y0) = (edge(x), edge(y));
                let (w, h) = (edge(x + 1) - x0, edge(y + 1) - y0);
                if w < 1.0 || h < 1.0 {
                    continue;
                }
                draw_filled_rect_mut(
                    &mut canvas,
                    Rect::at(x0 as i32, y0 as i32).of_size(w as u32, h as u32),
                    BLACK,
                );
                svg.push_str(&format!(
                    "<rect x=\"{x0}\" y=\"{y0}\" width=\"{w}\" height=\"{h}\" fill=\"#000000\"/>"
                ));
            }
        }
        svg.push_str("</svg>");

        Ok(Artifact { raster: Some(canvas), svg: Some(svg) })
    }
}
