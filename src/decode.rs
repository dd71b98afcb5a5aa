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
//! Turns [`ImageSource`] payloads into straight-alpha RGBA pixels.

#[cfg(feature = "png_source")]
use png::{BitDepth, ColorType, Decoder, Transformations};
#[cfg(feature = "png_source")]
use std::io::Cursor;
use std::io::{Error, ErrorKind};

use crate::{Color4b, ImageSource, color4b};

/// Decodes image data into 32-bit pixels according to `source`.
/// Grayscale, RGB and indexed PNG inputs are expanded to opaque RGBA (alpha = 255).
pub fn load_image_bytes(source: ImageSource<'_>) -> std::io::Result<(usize, usize, Vec<Color4b>)> {
    match source {
        ImageSource::Raw { width, height, pixels } => {
            if width <= 0 || height <= 0 {
                return Err(Error::new(ErrorKind::InvalidInput, "Image dimensions must be positive"));
            }
            let expected = width as usize * height as usize * 4;
            if pixels.len() != expected {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("Expected {} RGBA bytes, found {}", expected, pixels.len()),
                ));
            }
            let colors = pixels.chunks_exact(4).map(|c| color4b(c[0], c[1], c[2], c[3])).collect();
            Ok((width as usize, height as usize, colors))
        }
        #[cfg(feature = "png_source")]
        ImageSource::Png { bytes } => decode_png(bytes),
    }
}

#[cfg(feature = "png_source")]
fn decode_png(bytes: &[u8]) -> std::io::Result<(usize, usize, Vec<Color4b>)> {
    let mut decoder = Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("PNG decode error: {}", e)))?;
    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| Error::new(ErrorKind::InvalidData, "PNG decoder did not report output size"))?;
    let mut data = vec![0; buf_size];
    let info = reader.next_frame(&mut data)?;

    if info.bit_depth != BitDepth::Eight {
        return Err(Error::new(ErrorKind::InvalidData, format!("Unsupported PNG bit depth: {:?}", info.bit_depth)));
    }

    let channels = match info.color_type {
        ColorType::Grayscale | ColorType::Indexed => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
    };
    if info.color_type == ColorType::Indexed {
        // normalize_to_color8 expands palettes, so this only shows up for malformed files
        return Err(Error::new(ErrorKind::InvalidData, "Indexed PNG was not expanded"));
    }

    let width = info.width as usize;
    let height = info.height as usize;
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        let line = &data[y * info.line_size..(y + 1) * info.line_size];
        for x in 0..width {
            let p = &line[x * channels..(x + 1) * channels];
            pixels.push(match info.color_type {
                ColorType::Grayscale => color4b(p[0], p[0], p[0], 0xFF),
                ColorType::GrayscaleAlpha => color4b(p[0], p[0], p[0], p[1]),
                ColorType::Rgb => color4b(p[0], p[1], p[2], 0xFF),
                _ => color4b(p[0], p[1], p[2], p[3]),
            });
        }
    }

    Ok((width, height, pixels))
}
