//
// Copyright 2022-Present (c) Raja Lehtihet & Wael El Oraiby
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
// this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
// may be used to endorse or promote products derived from this software without
// specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
// ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE
// LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR
// CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF
// SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
// INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN
// CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
// ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
// POSSIBILITY OF SUCH DAMAGE.
//
//! Software render target used by the image module.
//!
//! A [`Surface`] is a handle onto shared RGBA storage plus a bounds rectangle. Cloning a surface
//! or taking a [`Surface::sub_image`] aliases the same pixels, so drawing into a sub-image writes
//! straight into its parent.

use std::{cell::RefCell, rc::Rc};

use crate::{Color, Color4b, GeoM, ImageSource, Recti, decode::load_image_bytes, rect};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
/// Per-pixel compositing rule used by [`Surface::draw_image`].
pub enum Blend {
    /// Standard "over" alpha compositing.
    #[default]
    SourceOver,
    /// Replaces destination pixels covered by the source.
    Copy,
    /// Keeps the source only where the destination has alpha: `out.a = src.a * dst.a`.
    SourceIn,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
/// Sampling filter used when a transform maps destination pixels into the source.
pub enum Filter {
    /// Nearest-neighbour sampling (keeps pixel art crisp).
    #[default]
    Nearest,
    /// Bilinear sampling clamped to the source bounds.
    Linear,
}

#[derive(Copy, Clone, Debug, Default)]
/// Options applied to a single [`Surface::draw_image`] call.
pub struct DrawImageOptions {
    /// Transform from source space into destination space.
    pub geom: GeoM,
    /// Compositing rule.
    pub blend: Blend,
    /// Sampling filter.
    pub filter: Filter,
}

struct Pixels {
    width: i32,
    height: i32,
    data: Vec<Color4b>,
}

impl Pixels {
    fn index(&self, x: i32, y: i32) -> usize { y as usize * self.width as usize + x as usize }
}

#[derive(Clone)]
/// Shared handle to an RGBA pixel buffer or a rectangular view into one.
pub struct Surface {
    pixels: Rc<RefCell<Pixels>>,
    // absolute rectangle inside `pixels`
    bounds: Recti,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("x", &self.bounds.x)
            .field("y", &self.bounds.y)
            .field("width", &self.bounds.width)
            .field("height", &self.bounds.height)
            .finish()
    }
}

fn intersect(a: Recti, b: Recti) -> Recti {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = (a.x + a.width).min(b.x + b.width);
    let y1 = (a.y + a.height).min(b.y + b.height);
    if x1 <= x0 || y1 <= y0 {
        return rect(x0, y0, 0, 0);
    }
    rect(x0, y0, x1 - x0, y1 - y0)
}

impl Surface {
    /// Allocates a fully transparent surface. Negative sizes are clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self::from_parts(width, height, vec![Color4b::default(); width as usize * height as usize])
    }

    /// Wraps an existing pixel buffer laid out row by row.
    ///
    /// Returns `None` when `pixels.len()` does not match `width * height`.
    pub fn from_pixels(width: i32, height: i32, pixels: Vec<Color4b>) -> Option<Self> {
        if width < 0 || height < 0 || pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self::from_parts(width, height, pixels))
    }

    /// Decodes `source` into a new surface.
    pub fn from_source(source: ImageSource<'_>) -> std::io::Result<Self> {
        let (width, height, pixels) = load_image_bytes(source)?;
        Ok(Self::from_parts(width as i32, height as i32, pixels))
    }

    fn from_parts(width: i32, height: i32, data: Vec<Color4b>) -> Self {
        Self {
            pixels: Rc::new(RefCell::new(Pixels { width, height, data })),
            bounds: rect(0, 0, width, height),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 { self.bounds.width }

    /// Height in pixels.
    pub fn height(&self) -> i32 { self.bounds.height }

    /// Local bounds, always anchored at the origin.
    pub fn bounds(&self) -> Recti { rect(0, 0, self.bounds.width, self.bounds.height) }

    /// Returns `true` if both handles view the same storage through the same rectangle.
    pub fn ptr_eq(&self, other: &Surface) -> bool {
        Rc::ptr_eq(&self.pixels, &other.pixels)
            && (self.bounds.x, self.bounds.y, self.bounds.width, self.bounds.height)
                == (other.bounds.x, other.bounds.y, other.bounds.width, other.bounds.height)
    }

    /// Returns a view of `r` (in local coordinates) that shares pixels with `self`.
    /// The rectangle is clipped to the surface bounds.
    pub fn sub_image(&self, r: Recti) -> Surface {
        let abs = rect(self.bounds.x + r.x, self.bounds.y + r.y, r.width, r.height);
        Surface {
            pixels: self.pixels.clone(),
            bounds: intersect(abs, self.bounds),
        }
    }

    /// Reads a pixel. Coordinates outside the surface read as transparent.
    pub fn pixel(&self, x: i32, y: i32) -> Color {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return Color::default();
        }
        let p = self.pixels.borrow();
        p.data[p.index(self.bounds.x + x, self.bounds.y + y)].into()
    }

    /// Writes a pixel. Coordinates outside the surface are ignored.
    pub fn set_pixel(&self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return;
        }
        let mut p = self.pixels.borrow_mut();
        let i = p.index(self.bounds.x + x, self.bounds.y + y);
        p.data[i] = color.into();
    }

    /// Replaces every pixel with `color`.
    pub fn fill(&self, color: Color) {
        let c: Color4b = color.into();
        let mut p = self.pixels.borrow_mut();
        for y in self.bounds.y..self.bounds.y + self.bounds.height {
            let row = p.index(self.bounds.x, y);
            for px in &mut p.data[row..row + self.bounds.width as usize] {
                *px = c;
            }
        }
    }

    /// Resets every pixel to fully transparent.
    pub fn clear(&self) { self.fill(Color::default()) }

    fn snapshot(&self) -> Vec<Color> {
        let p = self.pixels.borrow();
        let mut out = Vec::with_capacity(self.bounds.width as usize * self.bounds.height as usize);
        for y in self.bounds.y..self.bounds.y + self.bounds.height {
            let row = p.index(self.bounds.x, y);
            out.extend(p.data[row..row + self.bounds.width as usize].iter().map(|c| Color::from(*c)));
        }
        out
    }

    /// Draws `src` onto this surface using `opts`.
    ///
    /// Every destination pixel whose centre maps inside `src` through the inverse transform is
    /// sampled and blended. Singular transforms draw nothing.
    pub fn draw_image(&self, src: &Surface, opts: &DrawImageOptions) {
        let (sw, sh) = (src.width(), src.height());
        if sw <= 0 || sh <= 0 || self.width() <= 0 || self.height() <= 0 {
            return;
        }
        let inv = match opts.geom.invert() {
            Some(inv) => inv,
            None => return,
        };

        // destination-space bounding box of the transformed source rectangle
        let corners = [
            opts.geom.apply(0.0, 0.0),
            opts.geom.apply(sw as f32, 0.0),
            opts.geom.apply(0.0, sh as f32),
            opts.geom.apply(sw as f32, sh as f32),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min).floor() as i32;
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min).floor() as i32;
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max).ceil() as i32;
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max).ceil() as i32;
        let area = intersect(rect(min_x, min_y, max_x - min_x, max_y - min_y), self.bounds());
        if area.width <= 0 || area.height <= 0 {
            return;
        }

        let source = src.snapshot();
        let sample = |sx: f32, sy: f32| -> Option<Color> {
            if sx < 0.0 || sy < 0.0 || sx >= sw as f32 || sy >= sh as f32 {
                return None;
            }
            Some(match opts.filter {
                Filter::Nearest => source[sy as usize * sw as usize + sx as usize],
                Filter::Linear => bilinear(&source, sw, sh, sx, sy),
            })
        };

        let mut p = self.pixels.borrow_mut();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                let (sx, sy) = inv.apply(x as f32 + 0.5, y as f32 + 0.5);
                let s = match sample(sx, sy) {
                    Some(s) => s,
                    None => continue,
                };
                let i = p.index(self.bounds.x + x, self.bounds.y + y);
                let d = Color::from(p.data[i]);
                p.data[i] = blend(opts.blend, s, d).into();
            }
        }
    }
}

fn bilinear(source: &[Color], sw: i32, sh: i32, sx: f32, sy: f32) -> Color {
    let fx = (sx - 0.5).max(0.0);
    let fy = (sy - 0.5).max(0.0);
    let x0 = (fx as i32).min(sw - 1);
    let y0 = (fy as i32).min(sh - 1);
    let x1 = (x0 + 1).min(sw - 1);
    let y1 = (y0 + 1).min(sh - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;
    let at = |x: i32, y: i32| source[y as usize * sw as usize + x as usize];
    let (c00, c10, c01, c11) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));
    let mix = |a: u8, b: u8, c: u8, d: u8| -> u8 {
        let top = a as f32 + (b as f32 - a as f32) * tx;
        let bottom = c as f32 + (d as f32 - c as f32) * tx;
        (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8
    };
    Color {
        r: mix(c00.r, c10.r, c01.r, c11.r),
        g: mix(c00.g, c10.g, c01.g, c11.g),
        b: mix(c00.b, c10.b, c01.b, c11.b),
        a: mix(c00.a, c10.a, c01.a, c11.a),
    }
}

fn blend(mode: Blend, s: Color, d: Color) -> Color {
    match mode {
        Blend::Copy => s,
        Blend::SourceIn => {
            let a = (s.a as u32 * d.a as u32 + 127) / 255;
            if a == 0 { Color::default() } else { Color { a: a as u8, ..s } }
        }
        Blend::SourceOver => {
            if s.a == 255 || d.a == 0 {
                return s;
            }
            if s.a == 0 {
                return d;
            }
            let sa = s.a as f32 / 255.0;
            let da = d.a as f32 / 255.0;
            let oa = sa + da * (1.0 - sa);
            let ch = |sc: u8, dc: u8| -> u8 { ((sc as f32 * sa + dc as f32 * da * (1.0 - sa)) / oa).round().clamp(0.0, 255.0) as u8 };
            Color {
                r: ch(s.r, d.r),
                g: ch(s.g, d.g),
                b: ch(s.b, d.b),
                a: (oa * 255.0).round() as u8,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    #[test]
    fn sub_image_shares_pixels() {
        let parent = Surface::new(4, 4);
        let child = parent.sub_image(rect(1, 1, 2, 2));
        child.fill(RED);
        assert_eq!(parent.pixel(0, 0), Color::default());
        assert_eq!(parent.pixel(1, 1), RED);
        assert_eq!(parent.pixel(2, 2), RED);
        assert_eq!(parent.pixel(3, 3), Color::default());
    }

    #[test]
    fn from_pixels_rejects_huge_sizes_without_overflow() {
        assert!(Surface::from_pixels(65536, 65536, Vec::new()).is_none());
        assert!(Surface::from_pixels(-1, 4, Vec::new()).is_none());
    }

    #[test]
    fn sub_image_is_clipped_to_bounds() {
        let parent = Surface::new(4, 4);
        let child = parent.sub_image(rect(2, 3, 10, 10));
        assert_eq!((child.width(), child.height()), (2, 1));
    }

    #[test]
    fn identity_draw_copies_pixels() {
        let src = Surface::new(2, 1);
        src.set_pixel(0, 0, RED);
        src.set_pixel(1, 0, BLUE);
        let dst = Surface::new(3, 1);
        dst.draw_image(&src, &DrawImageOptions::default());
        assert_eq!(dst.pixel(0, 0), RED);
        assert_eq!(dst.pixel(1, 0), BLUE);
        assert_eq!(dst.pixel(2, 0), Color::default());
    }

    #[test]
    fn nearest_scale_repeats_pixels() {
        let src = Surface::new(2, 1);
        src.set_pixel(0, 0, RED);
        src.set_pixel(1, 0, BLUE);
        let dst = Surface::new(4, 2);
        let mut opts = DrawImageOptions::default();
        opts.geom.scale(2.0, 2.0);
        dst.draw_image(&src, &opts);
        for y in 0..2 {
            assert_eq!(dst.pixel(0, y), RED);
            assert_eq!(dst.pixel(1, y), RED);
            assert_eq!(dst.pixel(2, y), BLUE);
            assert_eq!(dst.pixel(3, y), BLUE);
        }
    }

    #[test]
    fn translated_draw_clips_at_edges() {
        let src = Surface::new(2, 2);
        src.fill(RED);
        let dst = Surface::new(3, 3);
        let mut opts = DrawImageOptions::default();
        opts.geom.translate(2.0, 2.0);
        dst.draw_image(&src, &opts);
        assert_eq!(dst.pixel(2, 2), RED);
        assert_eq!(dst.pixel(1, 1), Color::default());
    }

    #[test]
    fn source_in_uses_destination_alpha() {
        let dst = Surface::new(2, 1);
        dst.set_pixel(0, 0, color(0, 0, 0, 255));
        let src = Surface::new(2, 1);
        src.fill(BLUE);
        dst.draw_image(&src, &DrawImageOptions { blend: Blend::SourceIn, ..Default::default() });
        assert_eq!(dst.pixel(0, 0), BLUE);
        assert_eq!(dst.pixel(1, 0), Color::default());
    }

    #[test]
    fn source_over_keeps_destination_under_transparent_source() {
        let dst = Surface::new(1, 1);
        dst.fill(RED);
        let src = Surface::new(1, 1);
        dst.draw_image(&src, &DrawImageOptions::default());
        assert_eq!(dst.pixel(0, 0), RED);
    }

    #[test]
    fn copy_replaces_destination() {
        let dst = Surface::new(1, 1);
        dst.fill(RED);
        let src = Surface::new(1, 1);
        dst.draw_image(&src, &DrawImageOptions { blend: Blend::Copy, ..Default::default() });
        assert_eq!(dst.pixel(0, 0), Color::default());
    }

    #[test]
    fn draw_onto_own_sub_image() {
        let s = Surface::new(2, 1);
        s.set_pixel(0, 0, RED);
        let right = s.sub_image(rect(1, 0, 1, 1));
        right.draw_image(&s.sub_image(rect(0, 0, 1, 1)), &DrawImageOptions::default());
        assert_eq!(s.pixel(1, 0), RED);
    }

    #[test]
    fn singular_transform_draws_nothing() {
        let src = Surface::new(1, 1);
        src.fill(RED);
        let dst = Surface::new(1, 1);
        let mut opts = DrawImageOptions::default();
        opts.geom.scale(0.0, 1.0);
        dst.draw_image(&src, &opts);
        assert_eq!(dst.pixel(0, 0), Color::default());
    }
}
