//! Pure SVG serialization of recorded pages.
//!
//! Every function here is a total function from recorded data to markup
//! text: no engine state, no caches, no side effects. The page store relies
//! on that for its idempotence guarantee.

use super::call::{DrawCall, StrokeStyle, TextStyle};
use super::color::Color;
use super::page::Page;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt::Write;

/// Serializes a whole page to a standalone SVG document.
pub fn page_to_svg(page: &Page) -> String {
    let mut out = String::with_capacity(256 + page.calls.len() * 64);
    let _ = write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
         viewBox=\"0 0 {w} {h}\">\n",
        w = page.width,
        h = page.height,
    );

    let clipped = page
        .clip
        .filter(|clip| !clip.covers(page.width, page.height));
    if let Some(clip) = clipped {
        let _ = write!(
            out,
            "<defs><clipPath id=\"c0\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>\
             </clipPath></defs>\n",
            clip.x0,
            clip.y0,
            clip.x1 - clip.x0,
            clip.y1 - clip.y0,
        );
    }

    if !page.fill.is_transparent() {
        let _ = write!(
            out,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"{}/>\n",
            page.fill.to_hex(),
            opacity_attr("fill-opacity", page.fill),
        );
    }

    if clipped.is_some() {
        out.push_str("<g clip-path=\"url(#c0)\">\n");
    }
    for call in &page.calls {
        write_call(&mut out, call);
    }
    if clipped.is_some() {
        out.push_str("</g>\n");
    }

    out.push_str("</svg>\n");
    out
}

/// Serializes one draw call to its SVG element.
pub fn write_call(out: &mut String, call: &DrawCall) {
    match call {
        DrawCall::Line {
            x1,
            y1,
            x2,
            y2,
            style,
        } => write_line(out, *x1, *y1, *x2, *y2, style),
        DrawCall::Rect {
            x0,
            y0,
            x1,
            y1,
            style,
        } => write_rect(out, *x0, *y0, *x1, *y1, style),
        DrawCall::Circle { x, y, r, style } => write_circle(out, *x, *y, *r, style),
        DrawCall::Polygon { points, style } => write_poly(out, "polygon", points, style, true),
        DrawCall::Polyline { points, style } => write_poly(out, "polyline", points, style, false),
        DrawCall::Path {
            points,
            per_poly,
            winding,
            style,
        } => write_path(out, points, per_poly, *winding, style),
        DrawCall::Text {
            x,
            y,
            text,
            style,
            typo,
        } => write_text(out, *x, *y, text, style, typo),
        DrawCall::Raster {
            pixels,
            w,
            h,
            x,
            y,
            width,
            height,
            rot,
            interpolate,
            ..
        } => write_raster(
            out,
            pixels,
            *w,
            *h,
            *x,
            *y,
            *width,
            *height,
            *rot,
            *interpolate,
        ),
    }
}

fn write_line(out: &mut String, x1: f64, y1: f64, x2: f64, y2: f64, style: &StrokeStyle) {
    let _ = write!(
        out,
        "<line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\"{}/>\n",
        stroke_attrs(style),
    );
}

fn write_rect(out: &mut String, x0: f64, y0: f64, x1: f64, y1: f64, style: &StrokeStyle) {
    let (x, w) = (x0.min(x1), (x1 - x0).abs());
    let (y, h) = (y0.min(y1), (y1 - y0).abs());
    let _ = write!(
        out,
        "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\"{}{}/>\n",
        fill_attrs(style),
        stroke_attrs(style),
    );
}

fn write_circle(out: &mut String, x: f64, y: f64, r: f64, style: &StrokeStyle) {
    let _ = write!(
        out,
        "<circle cx=\"{x}\" cy=\"{y}\" r=\"{r}\"{}{}/>\n",
        fill_attrs(style),
        stroke_attrs(style),
    );
}

fn write_poly(
    out: &mut String,
    element: &str,
    points: &[(f64, f64)],
    style: &StrokeStyle,
    closed: bool,
) {
    let _ = write!(out, "<{element} points=\"");
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{x},{y}");
    }
    let fill = if closed {
        fill_attrs(style)
    } else {
        " fill=\"none\"".to_string()
    };
    let _ = write!(out, "\"{}{}/>\n", fill, stroke_attrs(style));
}

fn write_path(
    out: &mut String,
    points: &[(f64, f64)],
    per_poly: &[usize],
    winding: bool,
    style: &StrokeStyle,
) {
    let mut d = String::new();
    let mut offset = 0usize;
    for &len in per_poly {
        for (i, (x, y)) in points.iter().skip(offset).take(len).enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd}{x} {y} ");
        }
        d.push_str("Z ");
        offset += len;
    }
    let rule = if winding { "nonzero" } else { "evenodd" };
    let _ = write!(
        out,
        "<path d=\"{}\" fill-rule=\"{rule}\"{}{}/>\n",
        d.trim_end(),
        fill_attrs(style),
        stroke_attrs(style),
    );
}

fn write_text(out: &mut String, x: f64, y: f64, text: &str, style: &StrokeStyle, typo: &TextStyle) {
    // Anchor adjustment happens here so viewers need no font metrics.
    let anchored_x = x - typo.hadj * typo.str_width;
    let _ = write!(
        out,
        "<text x=\"{anchored_x}\" y=\"{y}\" font-family=\"{}\" font-size=\"{}\"",
        escape_attr(&typo.font.family),
        typo.size,
    );
    if typo.font.bold {
        out.push_str(" font-weight=\"bold\"");
    }
    if typo.font.italic {
        out.push_str(" font-style=\"italic\"");
    }
    let _ = write!(
        out,
        " fill=\"{}\"{}",
        style.stroke.to_hex(),
        opacity_attr("fill-opacity", style.stroke),
    );
    if typo.rot != 0.0 {
        let _ = write!(out, " transform=\"rotate({},{x},{y})\"", -typo.rot);
    }
    let _ = write!(out, ">{}</text>\n", escape_text(text));
}

#[allow(clippy::too_many_arguments)]
fn write_raster(
    out: &mut String,
    pixels: &[u32],
    w: usize,
    h: usize,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rot: f64,
    interpolate: bool,
) {
    let Some(uri) = raster_data_uri(pixels, w, h) else {
        return;
    };
    let _ = write!(
        out,
        "<image x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" \
         preserveAspectRatio=\"none\"",
    );
    if !interpolate {
        out.push_str(" image-rendering=\"pixelated\"");
    }
    if rot != 0.0 {
        let _ = write!(out, " transform=\"rotate({},{x},{y})\"", -rot);
    }
    let _ = write!(out, " href=\"{uri}\"/>\n");
}

/// Encodes packed RGBA pixels as a base64 PNG data URI.
///
/// Returns `None` when the pixel buffer does not match the declared
/// dimensions or PNG encoding fails; the image is then simply omitted.
pub fn raster_data_uri(pixels: &[u32], w: usize, h: usize) -> Option<String> {
    if pixels.len() != w * h {
        return None;
    }
    let mut bytes = Vec::with_capacity(pixels.len() * 4);
    for px in pixels {
        bytes.push((px & 0xff) as u8);
        bytes.push(((px >> 8) & 0xff) as u8);
        bytes.push(((px >> 16) & 0xff) as u8);
        bytes.push(((px >> 24) & 0xff) as u8);
    }
    let img = image::RgbaImage::from_raw(w as u32, h as u32, bytes)?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageOutputFormat::Png,
        )
        .ok()?;
    Some(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

fn stroke_attrs(style: &StrokeStyle) -> String {
    if style.stroke.is_transparent() || style.width <= 0.0 {
        return String::new();
    }
    format!(
        " stroke=\"{}\"{} stroke-width=\"{}\"",
        style.stroke.to_hex(),
        opacity_attr("stroke-opacity", style.stroke),
        style.width,
    )
}

fn fill_attrs(style: &StrokeStyle) -> String {
    if style.fill.is_transparent() {
        " fill=\"none\"".to_string()
    } else {
        format!(
            " fill=\"{}\"{}",
            style.fill.to_hex(),
            opacity_attr("fill-opacity", style.fill),
        )
    }
}

fn opacity_attr(name: &str, color: Color) -> String {
    if color.a < 1.0 {
        format!(" {name}=\"{}\"", color.a)
    } else {
        String::new()
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn escape_attr(text: &str) -> String {
    let mut escaped = escape_text(text);
    if escaped.contains('"') {
        escaped = escaped.replace('"', "&quot;");
    }
    escaped
}
