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
//! Affine transforms applied to images when they are drawn onto a [`crate::Surface`].

#[derive(Copy, Clone, Debug, PartialEq)]
/// 2x3 affine matrix in row-major order:
///
/// ```text
/// | a  b  tx |
/// | c  d  ty |
/// ```
///
/// Operations post-multiply, so each call applies after everything already recorded.
pub struct GeoM {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    tx: f32,
    ty: f32,
}

impl Default for GeoM {
    fn default() -> Self { Self::identity() }
}

impl GeoM {
    /// Returns the identity transform.
    pub const fn identity() -> Self { Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 } }

    /// Appends a scale by `sx`, `sy`.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.concat(&GeoM { a: sx, b: 0.0, c: 0.0, d: sy, tx: 0.0, ty: 0.0 });
    }

    /// Appends a translation by `tx`, `ty`.
    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.tx += tx;
        self.ty += ty;
    }

    /// Appends `other`, so that `other` applies after `self`.
    pub fn concat(&mut self, other: &GeoM) {
        let s = *self;
        self.a = other.a * s.a + other.b * s.c;
        self.b = other.a * s.b + other.b * s.d;
        self.c = other.c * s.a + other.d * s.c;
        self.d = other.c * s.b + other.d * s.d;
        self.tx = other.a * s.tx + other.b * s.ty + other.tx;
        self.ty = other.c * s.tx + other.d * s.ty + other.ty;
    }

    /// Maps a point through the transform.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) { (self.a * x + self.b * y + self.tx, self.c * x + self.d * y + self.ty) }

    /// Returns the inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<GeoM> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let a = self.d * inv;
        let b = -self.b * inv;
        let c = -self.c * inv;
        let d = self.a * inv;
        Some(GeoM {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + b * self.ty),
            ty: -(c * self.tx + d * self.ty),
        })
    }

    /// Horizontal scale component.
    pub fn scale_x(&self) -> f32 { self.a }

    /// Vertical scale component.
    pub fn scale_y(&self) -> f32 { self.d }

    /// Returns `true` when the transform leaves every point untouched.
    pub fn is_identity(&self) -> bool { *self == Self::identity() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_then_translate() {
        let mut g = GeoM::identity();
        g.scale(2.0, 3.0);
        g.translate(10.0, 20.0);
        assert_eq!(g.apply(1.0, 1.0), (12.0, 23.0));
    }

    #[test]
    fn translate_then_scale_scales_offset() {
        let mut g = GeoM::identity();
        g.translate(10.0, 20.0);
        g.scale(2.0, 2.0);
        assert_eq!(g.apply(0.0, 0.0), (20.0, 40.0));
    }

    #[test]
    fn invert_round_trips() {
        let mut g = GeoM::identity();
        g.scale(4.0, 0.5);
        g.translate(-3.0, 7.0);
        let inv = g.invert().unwrap();
        let (x, y) = g.apply(5.0, 6.0);
        let (bx, by) = inv.apply(x, y);
        assert!((bx - 5.0).abs() < 1e-4 && (by - 6.0).abs() < 1e-4);
    }

    #[test]
    fn inverse_concat_is_identity() {
        let mut g = GeoM::identity();
        g.scale(2.0, 4.0);
        g.translate(3.0, -1.0);
        assert!(!g.is_identity());
        g.concat(&g.invert().unwrap());
        assert!(g.is_identity());
    }

    #[test]
    fn singular_has_no_inverse() {
        let mut g = GeoM::identity();
        g.scale(0.0, 1.0);
        assert!(g.invert().is_none());
    }
}
