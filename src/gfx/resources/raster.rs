//! Procedural RGBA rasters: glowing text glyphs and radial gradients.
//!
//! Text is drawn from a small built-in 5x7 bitmap font that covers the binary
//! digits and the letters used by department codes. Characters outside the
//! font leave a blank cell.

use image::{Rgba, RgbaImage};

use crate::error::RasterError;
use crate::gfx::scene::rgb_hex;

const FONT_WIDTH: usize = 5;
const FONT_HEIGHT: usize = 7;

fn font_rows(ch: char) -> Option<[u8; FONT_HEIGHT]> {
    let rows = match ch.to_ascii_uppercase() {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        _ => return None,
    };
    Some(rows)
}

fn font_bit(ch: char, column: usize, row: usize) -> bool {
    font_rows(ch)
        .map(|rows| rows[row] & (1 << (FONT_WIDTH - 1 - column)) != 0)
        .unwrap_or(false)
}

fn ensure_surface(width: u32, height: u32) -> Result<(), RasterError> {
    if width == 0 || height == 0 {
        Err(RasterError::EmptySurface { width, height })
    } else {
        Ok(())
    }
}

/// Coverage mask of `text` centred in a `size`x`size` square, leaving
/// `padding` pixels on every side.
fn text_mask(text: &str, size: u32, padding: u32) -> Vec<f32> {
    let size_px = size as usize;
    let mut mask = vec![0.0_f32; size_px * size_px];

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return mask;
    }
    let columns = chars.len() * (FONT_WIDTH + 1) - 1;
    let inner = size.saturating_sub(padding * 2) as f32;
    let scale = (inner / columns as f32).min(inner / FONT_HEIGHT as f32);
    if scale <= 0.0 {
        return mask;
    }

    let text_w = columns as f32 * scale;
    let text_h = FONT_HEIGHT as f32 * scale;
    let left = (size as f32 - text_w) * 0.5;
    let top = (size as f32 - text_h) * 0.5;

    for y in 0..size_px {
        let fy = (y as f32 + 0.5 - top) / scale;
        if fy < 0.0 || fy >= FONT_HEIGHT as f32 {
            continue;
        }
        for x in 0..size_px {
            let fx = (x as f32 + 0.5 - left) / scale;
            if fx < 0.0 {
                continue;
            }
            let cell = fx as usize / (FONT_WIDTH + 1);
            let column = fx as usize % (FONT_WIDTH + 1);
            if cell >= chars.len() || column >= FONT_WIDTH {
                continue;
            }
            if font_bit(chars[cell], column, fy as usize) {
                mask[y * size_px + x] = 1.0;
            }
        }
    }
    mask
}

/// Separable box blur, used as a cheap glow halo.
fn box_blur(source: &[f32], size: usize, radius: usize) -> Vec<f32> {
    if radius == 0 {
        return source.to_vec();
    }
    let window = (radius * 2 + 1) as f32;
    let mut horizontal = vec![0.0_f32; source.len()];
    for y in 0..size {
        for x in 0..size {
            let from = x.saturating_sub(radius);
            let to = (x + radius).min(size - 1);
            let sum: f32 = source[y * size + from..=y * size + to].iter().sum();
            horizontal[y * size + x] = sum / window;
        }
    }
    let mut out = vec![0.0_f32; source.len()];
    for x in 0..size {
        for y in 0..size {
            let from = y.saturating_sub(radius);
            let to = (y + radius).min(size - 1);
            let sum: f32 = (from..=to).map(|yy| horizontal[yy * size + x]).sum();
            out[y * size + x] = sum / window;
        }
    }
    out
}

/// Renders `text` in `color` with a soft glow of radius `glow` pixels.
///
/// # Arguments
/// * `text` - Characters to draw; unsupported characters stay blank
/// * `color` - `0xRRGGBB` fill and glow color
/// * `size` - Edge length of the square raster
/// * `glow` - Glow radius in pixels, `0` disables it
pub fn text_glyph(text: &str, color: u32, size: u32, glow: u32) -> Result<RgbaImage, RasterError> {
    ensure_surface(size, size)?;

    let padding = size / 10 + glow * 3 / 2;
    let mask = text_mask(text, size, padding);
    let halo = box_blur(&mask, size as usize, glow as usize);
    let [r, g, b] = rgb_hex(color);

    let mut image = RgbaImage::new(size, size);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let index = (y * size + x) as usize;
        let alpha = mask[index].max((halo[index] * 1.6).min(1.0) * 0.7);
        *pixel = Rgba([
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8,
            (alpha * 255.0).round() as u8,
        ]);
    }
    Ok(image)
}

/// White radial gradient whose alpha follows `stops` (`(offset, alpha)` pairs,
/// offsets ascending in `0..=1`) from the centre to the edge.
///
/// Pixels beyond the radius are transparent.
pub fn radial_gradient(size: u32, stops: &[(f32, f32)]) -> Result<RgbaImage, RasterError> {
    ensure_surface(size, size)?;

    let radius = size as f32 * 0.5;
    let mut image = RgbaImage::new(size, size);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        let offset = (dx * dx + dy * dy).sqrt() / radius;
        let alpha = if offset > 1.0 {
            0.0
        } else {
            gradient_alpha(stops, offset)
        };
        *pixel = Rgba([255, 255, 255, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8]);
    }
    Ok(image)
}

fn gradient_alpha(stops: &[(f32, f32)], offset: f32) -> f32 {
    let Some(&(first_offset, first_alpha)) = stops.first() else {
        return 0.0;
    };
    if offset <= first_offset {
        return first_alpha;
    }
    for pair in stops.windows(2) {
        let (a_offset, a_alpha) = pair[0];
        let (b_offset, b_alpha) = pair[1];
        if offset <= b_offset {
            let span = (b_offset - a_offset).max(f32::EPSILON);
            return a_alpha + (b_alpha - a_alpha) * (offset - a_offset) / span;
        }
    }
    stops.last().map(|&(_, alpha)| alpha).unwrap_or(0.0)
}

/// Greedy word wrap to lines of at most `max` characters. A single word
/// longer than `max` gets a line of its own.
pub fn wrap_blurb(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_surfaces_are_rejected() {
        assert_eq!(
            text_glyph("1", 0xff00ff, 0, 4).unwrap_err(),
            RasterError::EmptySurface { width: 0, height: 0 }
        );
        assert!(radial_gradient(0, &[(0.0, 1.0)]).is_err());
    }

    #[test]
    fn digit_glyph_is_centred_and_colored() {
        let image = text_glyph("1", 0x00ffff, 64, 0).unwrap();
        let centre = image.get_pixel(32, 32);
        assert_eq!(centre.0, [0, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(63, 63).0[3], 0);
    }

    #[test]
    fn glow_spreads_alpha_outside_strokes() {
        let sharp = text_glyph("0", 0xffffff, 64, 0).unwrap();
        let glowing = text_glyph("0", 0xffffff, 64, 4).unwrap();
        let coverage = |img: &RgbaImage| img.pixels().filter(|p| p.0[3] > 0).count();
        assert!(coverage(&glowing) > coverage(&sharp));
    }

    #[test]
    fn unknown_characters_stay_blank() {
        let image = text_glyph("??", 0xffffff, 32, 0).unwrap();
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn gradient_follows_stops_and_clips_to_circle() {
        let stops = [(0.0, 1.0), (0.3, 0.9), (0.7, 0.2), (1.0, 0.0)];
        let image = radial_gradient(64, &stops).unwrap();
        assert!(image.get_pixel(32, 32).0[3] > 240);
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert!(image.get_pixel(32, 32).0[3] > image.get_pixel(32, 50).0[3]);
    }

    #[test]
    fn blurbs_wrap_on_word_boundaries() {
        assert_eq!(
            wrap_blurb("Prototype archives, classified schematics.", 44),
            vec!["Prototype archives, classified schematics."]
        );
        let lines = wrap_blurb("Threat intel, incident logs, counter-ops.", 20);
        assert_eq!(lines, vec!["Threat intel,", "incident logs,", "counter-ops."]);
        assert!(wrap_blurb("", 44).is_empty());
    }
}
