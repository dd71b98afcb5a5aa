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
#![deny(missing_docs)]
//! `tileui` provides the two leaf systems a retained-mode game UI leans on every frame:
//!
//! * nine-slice image rendering with memoized tile splitting, plus the buffered and masked
//!   render targets widgets draw into ([`NineSlice`], [`BufferedImage`], [`MaskedRenderBuffer`]);
//! * z-ordered input layers that decide which on-screen region owns a pointer or wheel event
//!   ([`Layer`], [`InputLayers`], [`setup_input_layers_with_deferred`]).
//!
//! Everything renders into the software [`Surface`], and [`Context`] shows the per-frame order
//! the two systems expect: rebuild the layer stack, run the widget pass, close out input.

mod context;
mod decode;
mod geom;
mod image;
mod input;
mod surface;

pub use context::Context;
pub use decode::load_image_bytes;
pub use geom::GeoM;
pub use image::*;
pub use input::*;
pub use rs_math3d::*;
pub use surface::*;

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(C)]
/// Simple RGBA color stored with 8-bit, non-premultiplied components.
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    /// Returns `true` when the alpha channel is zero.
    pub fn is_transparent(&self) -> bool { self.a == 0 }
}

impl From<Color4b> for Color {
    fn from(c: Color4b) -> Self { Color { r: c.x, g: c.y, b: c.z, a: c.w } }
}

impl From<Color> for Color4b {
    fn from(c: Color) -> Self { color4b(c.r, c.g, c.b, c.a) }
}

/// Describes image bytes that can be decoded into a [`Surface`].
#[derive(Copy, Clone)]
pub enum ImageSource<'a> {
    /// Raw RGBA pixels laid out as width × height × 4 bytes.
    Raw {
        /// Width in pixels.
        width: i32,
        /// Height in pixels.
        height: i32,
        /// Pixel buffer in RGBA8888 format.
        pixels: &'a [u8],
    },
    #[cfg(feature = "png_source")]
    /// PNG-compressed byte slice (requires the `png_source` feature).
    /// Grayscale, RGB and indexed images are expanded to RGBA.
    Png {
        /// Compressed PNG payload.
        bytes: &'a [u8],
    },
}

/// Convenience constructor for [`Vec2i`].
pub fn vec2(x: i32, y: i32) -> Vec2i { Vec2i { x, y } }

/// Convenience constructor for [`Recti`].
pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Recti { Recti { x, y, width: w, height: h } }

/// Convenience constructor for [`Color`].
pub fn color(r: u8, g: u8, b: u8, a: u8) -> Color { Color { r, g, b, a } }
