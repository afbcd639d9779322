use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use qrcode::{EcLevel, QrCode};

use crate::error::{QRKitError, QRKitResult};
use crate::render::{Artifact, RenderCapability, RenderRequest};
use crate::style::{FrameShape, ModuleShape, PipShape, StyleConfig};

// Styled renderer
//------------------------------------------------------------------------------

const EYE_SPAN: usize = 7;
const PIP_SPAN: usize = 3;
const LOGO_SIZE_RATIO: f32 = 0.22;
const LOGO_CLEARANCE: f32 = 4.0;

/// Advanced rendering capability: configurable module and eye shapes, linear
/// gradient fills, background color and an optional embedded logo. Produces
/// both a raster canvas and equivalent SVG markup per render.
pub struct StyledRenderer;

impl RenderCapability for StyledRenderer {
    fn supports_styling(&self) -> bool {
        true
    }

    fn render(&self, request: &RenderRequest) -> QRKitResult<Artifact> {
        if request.content.is_empty() {
            return Err(QRKitError::EmptyContent);
        }
        let code = QrCode::with_error_correction_level(request.content.as_bytes(), EcLevel::M)?;
        let scene = Scene::compose(&code, &request.style)?;
        Ok(Artifact { raster: Some(scene.rasterize()), svg: Some(scene.to_svg()) })
    }
}

// Scene
//------------------------------------------------------------------------------

/// Resolved drawing plan shared by the raster and SVG passes, so both emit
/// the exact same geometry.
struct Scene {
    size: f32,
    grid: Grid,
    style: StyleConfig,
    dark_a: Rgba<u8>,
    dark_b: Rgba<u8>,
    light: Rgba<u8>,
    eye: Rgba<u8>,
    modules: Vec<(usize, usize)>,
    logo: Option<Logo>,
}

struct Grid {
    n: usize,
    margin: f32,
    cell: f32,
}

impl Grid {
    /// Pixel bounds of module (x, y), rounded per edge so adjacent squares
    /// tile without gaps.
    fn bounds(&self, x: usize, y: usize) -> (f32, f32, f32, f32) {
        let x0 = (self.margin + x as f32 * self.cell).round();
        let y0 = (self.margin + y as f32 * self.cell).round();
        let x1 = (self.margin + (x + 1) as f32 * self.cell).round();
        let y1 = (self.margin + (y + 1) as f32 * self.cell).round();
        (x0, y0, x1, y1)
    }

    fn center(&self, x: usize, y: usize) -> (f32, f32) {
        (self.margin + (x as f32 + 0.5) * self.cell, self.margin + (y as f32 + 0.5) * self.cell)
    }
}

struct Logo {
    image: RgbaImage,
    data_url: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Scene {
    fn compose(code: &QrCode, style: &StyleConfig) -> QRKitResult<Self> {
        let n = code.width();
        let size = style.size as f32;
        let margin = style.margin as f32;
        let cell = (size - 2.0 * margin) / n as f32;
        let grid = Grid { n, margin, cell };

        let logo = decode_logo(style)?;
        let keep_clear = logo.as_ref().map(|l| {
            (l.x - LOGO_CLEARANCE, l.y - LOGO_CLEARANCE, l.x + l.width + LOGO_CLEARANCE, l.y + l.height + LOGO_CLEARANCE)
        });

        let mut modules = Vec::new();
        for y in 0..n {
            for x in 0..n {
                if code[(x, y)] != qrcode::Color::Dark || in_eye(x, y, n) {
                    continue;
                }
                // hide modules behind the logo, like the background-dot
                // suppression of the original styled renderer
                if let Some((kx0, ky0, kx1, ky1)) = keep_clear {
                    let (cx, cy) = grid.center(x, y);
                    if cx >= kx0 && cx <= kx1 && cy >= ky0 && cy <= ky1 {
                        continue;
                    }
                }
                modules.push((x, y));
            }
        }

        Ok(Self {
            size,
            grid,
            style: style.clone(),
            dark_a: parse_hex_color(&style.dark_a)?,
            dark_b: parse_hex_color(&style.dark_b)?,
            light: parse_hex_color(&style.light_color)?,
            eye: parse_hex_color(&style.eye_color)?,
            modules,
            logo,
        })
    }

    /// Gradient parameter at a point: projection onto the rotation axis,
    /// normalized over the canvas so the two stops sit at opposite edges.
    fn gradient_t(&self, px: f32, py: f32) -> f32 {
        let theta = self.style.gradient_rotation.to_radians();
        let (sin, cos) = theta.sin_cos();
        let c = self.size / 2.0;
        let half_span = c * (cos.abs() + sin.abs());
        if half_span <= f32::EPSILON {
            return 0.5;
        }
        let v = (px - c) * cos + (py - c) * sin;
        ((v / half_span) + 1.0) / 2.0
    }

    fn module_color(&self, px: f32, py: f32) -> Rgba<u8> {
        if self.style.use_gradient {
            lerp_color(self.dark_a, self.dark_b, self.gradient_t(px, py).clamp(0.0, 1.0))
        } else {
            self.dark_a
        }
    }

    fn eye_origins(&self) -> [(usize, usize); 3] {
        let n = self.grid.n;
        [(0, 0), (n - EYE_SPAN, 0), (0, n - EYE_SPAN)]
    }

    // Raster pass
    //--------------------------------------------------------------------------

    fn rasterize(&self) -> RgbaImage {
        let side = self.size as u32;
        let mut canvas = RgbaImage::from_pixel(side, side, self.light);

        for &(x, y) in &self.modules {
            let (x0, y0, x1, y1) = self.grid.bounds(x, y);
            let (cx, cy) = self.grid.center(x, y);
            let color = self.module_color(cx, cy);
            match self.style.module_shape {
                ModuleShape::Square => fill_rect(&mut canvas, x0, y0, x1, y1, color),
                ModuleShape::Rounded => {
                    fill_rounded_rect(&mut canvas, x0, y0, x1, y1, self.grid.cell * 0.28, color)
                }
                ModuleShape::Dots => {
                    let r = (self.grid.cell * 0.45).max(1.0) as i32;
                    draw_filled_circle_mut(&mut canvas, (cx as i32, cy as i32), r, color);
                }
            }
        }

        for (ex, ey) in self.eye_origins() {
            self.draw_eye_raster(&mut canvas, ex, ey);
        }

        if let Some(logo) = &self.logo {
            image::imageops::overlay(&mut canvas, &logo.image, logo.x as i64, logo.y as i64);
        }
        canvas
    }

    fn draw_eye_raster(&self, canvas: &mut RgbaImage, ex: usize, ey: usize) {
        let cell = self.grid.cell;
        let (x0, y0, ..) = self.grid.bounds(ex, ey);
        let (.., x1, y1) = self.grid.bounds(ex + EYE_SPAN - 1, ey + EYE_SPAN - 1);
        let (ix0, iy0, ..) = self.grid.bounds(ex + 1, ey + 1);
        let (.., ix1, iy1) = self.grid.bounds(ex + EYE_SPAN - 2, ey + EYE_SPAN - 2);

        match self.style.frame_shape {
            FrameShape::Square => {
                fill_rect(canvas, x0, y0, x1, y1, self.eye);
                fill_rect(canvas, ix0, iy0, ix1, iy1, self.light);
            }
            FrameShape::ExtraRounded => {
                fill_rounded_rect(canvas, x0, y0, x1, y1, cell * 2.0, self.eye);
                fill_rounded_rect(canvas, ix0, iy0, ix1, iy1, cell * 1.4, self.light);
            }
            FrameShape::Dots => {
                let r = (cell * 0.45).max(1.0) as i32;
                for (mx, my) in eye_ring(ex, ey) {
                    let (cx, cy) = self.grid.center(mx, my);
                    draw_filled_circle_mut(canvas, (cx as i32, cy as i32), r, self.eye);
                }
            }
        }

        let (px0, py0, ..) = self.grid.bounds(ex + 2, ey + 2);
        let (.., px1, py1) = self.grid.bounds(ex + 2 + PIP_SPAN - 1, ey + 2 + PIP_SPAN - 1);
        match self.style.pip_shape {
            PipShape::Square => fill_rect(canvas, px0, py0, px1, py1, self.eye),
            PipShape::Dot => {
                let cx = (px0 + px1) / 2.0;
                let cy = (py0 + py1) / 2.0;
                let r = ((px1 - px0) / 2.0 * 0.9).max(1.0) as i32;
                draw_filled_circle_mut(canvas, (cx as i32, cy as i32), r, self.eye);
            }
        }
    }

    // SVG pass
    //--------------------------------------------------------------------------

    fn to_svg(&self) -> String {
        let size = self.size;
        let mut svg = String::with_capacity(4096);
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">"
        ));

        let module_fill = if self.style.use_gradient {
            let theta = self.style.gradient_rotation.to_radians();
            let (sin, cos) = theta.sin_cos();
            let c = size / 2.0;
            let half_span = c * (cos.abs() + sin.abs());
            svg.push_str(&format!(
                "<defs><linearGradient id=\"qrkit-gradient\" gradientUnits=\"userSpaceOnUse\" \
                 x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\">\
                 <stop offset=\"0\" stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/>\
                 </linearGradient></defs>",
                c - cos * half_span,
                c - sin * half_span,
                c + cos * half_span,
                c + sin * half_span,
                self.style.dark_a,
                self.style.dark_b,
            ));
            "url(#qrkit-gradient)".to_string()
        } else {
            self.style.dark_a.clone()
        };

        svg.push_str(&format!(
            "<rect width=\"{size}\" height=\"{size}\" fill=\"{}\"/>",
            self.style.light_color
        ));

        for &(x, y) in &self.modules {
            let (x0, y0, x1, y1) = self.grid.bounds(x, y);
            let (w, h) = (x1 - x0, y1 - y0);
            match self.style.module_shape {
                ModuleShape::Square => svg.push_str(&format!(
                    "<rect x=\"{x0}\" y=\"{y0}\" width=\"{w}\" height=\"{h}\" fill=\"{module_fill}\"/>"
                )),
                ModuleShape::Rounded => svg.push_str(&format!(
                    "<rect x=\"{x0}\" y=\"{y0}\" width=\"{w}\" height=\"{h}\" rx=\"{:.2}\" fill=\"{module_fill}\"/>",
                    self.grid.cell * 0.28
                )),
                ModuleShape::Dots => {
                    let (cx, cy) = self.grid.center(x, y);
                    svg.push_str(&format!(
                        "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{:.2}\" fill=\"{module_fill}\"/>",
                        self.grid.cell * 0.45
                    ));
                }
            }
        }

        for (ex, ey) in self.eye_origins() {
            self.push_eye_svg(&mut svg, ex, ey);
        }

        if let Some(logo) = &self.logo {
            svg.push_str(&format!(
                "<image x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" href=\"{}\" preserveAspectRatio=\"xMidYMid meet\"/>",
                logo.x,
                logo.y,
                logo.width,
                logo.height,
                escape_attr(&logo.data_url),
            ));
        }

        svg.push_str("</svg>");
        svg
    }

    fn push_eye_svg(&self, svg: &mut String, ex: usize, ey: usize) {
        let cell = self.grid.cell;
        let eye = &self.style.eye_color;
        let light = &self.style.light_color;
        let (x0, y0, ..) = self.grid.bounds(ex, ey);
        let (.., x1, y1) = self.grid.bounds(ex + EYE_SPAN - 1, ey + EYE_SPAN - 1);
        let (ix0, iy0, ..) = self.grid.bounds(ex + 1, ey + 1);
        let (.., ix1, iy1) = self.grid.bounds(ex + EYE_SPAN - 2, ey + EYE_SPAN - 2);

        match self.style.frame_shape {
            FrameShape::Square => {
                svg.push_str(&format!(
                    "<rect x=\"{x0}\" y=\"{y0}\" width=\"{}\" height=\"{}\" fill=\"{eye}\"/>",
                    x1 - x0,
                    y1 - y0
                ));
                svg.push_str(&format!(
                    "<rect x=\"{ix0}\" y=\"{iy0}\" width=\"{}\" height=\"{}\" fill=\"{light}\"/>",
                    ix1 - ix0,
                    iy1 - iy0
                ));
            }
            FrameShape::ExtraRounded => {
                svg.push_str(&format!(
                    "<rect x=\"{x0}\" y=\"{y0}\" width=\"{}\" height=\"{}\" rx=\"{:.2}\" fill=\"{eye}\"/>",
                    x1 - x0,
                    y1 - y0,
                    cell * 2.0
                ));
                svg.push_str(&format!(
                    "<rect x=\"{ix0}\" y=\"{iy0}\" width=\"{}\" height=\"{}\" rx=\"{:.2}\" fill=\"{light}\"/>",
                    ix1 - ix0,
                    iy1 - iy0,
                    cell * 1.4
                ));
            }
            FrameShape::Dots => {
                for (mx, my) in eye_ring(ex, ey) {
                    let (cx, cy) = self.grid.center(mx, my);
                    svg.push_str(&format!(
                        "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{:.2}\" fill=\"{eye}\"/>",
                        cell * 0.45
                    ));
                }
            }
        }

        let (px0, py0, ..) = self.grid.bounds(ex + 2, ey + 2);
        let (.., px1, py1) = self.grid.bounds(ex + 2 + PIP_SPAN - 1, ey + 2 + PIP_SPAN - 1);
        match self.style.pip_shape {
            PipShape::Square => svg.push_str(&format!(
                "<rect x=\"{px0}\" y=\"{py0}\" width=\"{}\" height=\"{}\" fill=\"{eye}\"/>",
                px1 - px0,
                py1 - py0
            )),
            PipShape::Dot => svg.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{eye}\"/>",
                (px0 + px1) / 2.0,
                (py0 + py1) / 2.0,
                (px1 - px0) / 2.0 * 0.9
            )),
        }
    }
}

// Geometry helpers
//------------------------------------------------------------------------------

fn in_eye(x: usize, y: usize, n: usize) -> bool {
    (x < EYE_SPAN && y < EYE_SPAN)
        || (x >= n - EYE_SPAN && y < EYE_SPAN)
        || (x < EYE_SPAN && y >= n - EYE_SPAN)
}

/// Module coordinates of the dark ring of a 7x7 finder frame.
fn eye_ring(ex: usize, ey: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..EYE_SPAN).flat_map(move |i| (0..EYE_SPAN).map(move |j| (i, j))).filter_map(
        move |(i, j)| {
            if i == 0 || i == EYE_SPAN - 1 || j == 0 || j == EYE_SPAN - 1 {
                Some((ex + i, ey + j))
            } else {
                None
            }
        },
    )
}

fn fill_rect(canvas: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
    let (w, h) = ((x1 - x0) as u32, (y1 - y0) as u32);
    if w == 0 || h == 0 {
        return;
    }
    draw_filled_rect_mut(canvas, Rect::at(x0 as i32, y0 as i32).of_size(w, h), color);
}

fn fill_rounded_rect(
    canvas: &mut RgbaImage,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    radius: f32,
    color: Rgba<u8>,
) {
    let radius = radius.min((x1 - x0) / 2.0).min((y1 - y0) / 2.0);
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    for py in y0 as i32..(y1.ceil() as i32) {
        for px in x0 as i32..(x1.ceil() as i32) {
            if px < 0 || py < 0 || px >= w || py >= h {
                continue;
            }
            let fx = px as f32 + 0.5;
            let fy = py as f32 + 0.5;
            if fx < x0 || fx > x1 || fy < y0 || fy > y1 {
                continue;
            }
            let nearest_x = fx.clamp(x0 + radius, x1 - radius);
            let nearest_y = fy.clamp(y0 + radius, y1 - radius);
            let dx = fx - nearest_x;
            let dy = fy - nearest_y;
            if dx * dx + dy * dy <= radius * radius {
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

fn lerp_color(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgba([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), 255])
}

/// Parse `#rgb` or `#rrggbb` into an opaque RGBA pixel.
pub fn parse_hex_color(hex: &str) -> QRKitResult<Rgba<u8>> {
    let digits = hex.strip_prefix('#').ok_or(QRKitError::InvalidColor)?;
    if !digits.is_ascii() {
        return Err(QRKitError::InvalidColor);
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| QRKitError::InvalidColor);
    match digits.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, ch) in digits.chars().enumerate() {
                let v = channel(&ch.to_string())?;
                rgb[i] = v << 4 | v;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => Ok(Rgba([channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?, 255])),
        _ => Err(QRKitError::InvalidColor),
    }
}

// Logo
//------------------------------------------------------------------------------

fn decode_logo(style: &StyleConfig) -> QRKitResult<Option<Logo>> {
    if style.logo_data_url.is_empty() {
        return Ok(None);
    }
    let encoded = style
        .logo_data_url
        .split_once("base64,")
        .map(|(_, tail)| tail)
        .ok_or(QRKitError::InvalidLogo)?;
    let bytes = BASE64.decode(encoded).map_err(|_| QRKitError::InvalidLogo)?;
    let decoded = image::load_from_memory(&bytes).map_err(|_| QRKitError::InvalidLogo)?;

    let side = (style.size as f32 * LOGO_SIZE_RATIO) as u32;
    let thumb = decoded.thumbnail(side, side).to_rgba8();
    let (w, h) = (thumb.width() as f32, thumb.height() as f32);
    let size = style.size as f32;
    Ok(Some(Logo {
        image: thumb,
        data_url: style.logo_data_url.clone(),
        x: (size - w) / 2.0,
        y: (size - h) / 2.0,
        width: w,
        height: h,
    }))
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('"', "&quot;")
}
