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
use tracing::trace;

use crate::{Blend, DrawImageOptions, Surface};

#[derive(Default, Debug)]
/// A surface that is reused as long as its size does not change.
///
/// Set `width`/`height` to the size you need and call [`BufferedImage::image`]; the backing
/// surface is only reallocated when its actual size differs from the requested one. A reused
/// surface keeps its old contents, so clear it before drawing if stale pixels would show.
pub struct BufferedImage {
    /// Requested width in pixels.
    pub width: i32,
    /// Requested height in pixels.
    pub height: i32,
    image: Option<Surface>,
}

impl BufferedImage {
    /// Creates an empty buffer that will allocate `width` x `height` on first access.
    pub fn new(width: i32, height: i32) -> Self { Self { width, height, image: None } }

    /// Returns the backing surface, reallocating it when its size does not match the request.
    ///
    /// Negative requests are treated as zero.
    pub fn image(&mut self) -> Surface {
        let (width, height) = (self.width.max(0), self.height.max(0));
        match &self.image {
            Some(image) if image.width() == width && image.height() == height => image.clone(),
            _ => {
                trace!(width, height, "allocating buffered image");
                let image = Surface::new(width, height);
                self.image = Some(image.clone());
                image
            }
        }
    }
}

#[derive(Default, Debug)]
/// Draws content through a mask drawn on the fly.
///
/// Both internal buffers follow the size of the target surface and are cleared on every call,
/// so nothing carries over between draws except the allocations.
pub struct MaskedRenderBuffer {
    render_buf: BufferedImage,
    masked_buf: BufferedImage,
}

impl MaskedRenderBuffer {
    /// Creates a buffer pair with no allocations yet.
    pub fn new() -> Self { Self::default() }

    /// Renders `draw_fn` into a scratch buffer, keeps only the pixels covered by what
    /// `mask_draw_fn` draws, and composites the result onto `screen`.
    pub fn draw(&mut self, screen: &Surface, draw_fn: impl FnOnce(&Surface), mask_draw_fn: impl FnOnce(&Surface)) {
        let (width, height) = (screen.width(), screen.height());
        self.render_buf.width = width;
        self.render_buf.height = height;
        self.masked_buf.width = width;
        self.masked_buf.height = height;

        let render_buf = self.render_buf.image();
        render_buf.clear();
        let masked_buf = self.masked_buf.image();
        masked_buf.clear();

        draw_fn(&render_buf);
        mask_draw_fn(&masked_buf);

        masked_buf.draw_image(&render_buf, &DrawImageOptions { blend: Blend::SourceIn, ..Default::default() });
        screen.draw_image(&masked_buf, &DrawImageOptions::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, color, rect};

    const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };

    #[test]
    fn image_is_reused_until_resized() {
        let mut buf = BufferedImage::new(100, 100);
        let first = buf.image();
        let second = buf.image();
        assert!(first.ptr_eq(&second));

        buf.width = 150;
        buf.height = 70;
        let third = buf.image();
        assert!(!third.ptr_eq(&first));
        assert_eq!((third.width(), third.height()), (150, 70));
        assert!(third.ptr_eq(&buf.image()));
    }

    #[test]
    fn reused_image_keeps_contents() {
        let mut buf = BufferedImage::new(2, 2);
        buf.image().fill(RED);
        assert_eq!(buf.image().pixel(1, 1), RED);
    }

    #[test]
    fn negative_request_is_reused() {
        let mut buf = BufferedImage::new(-5, 3);
        let first = buf.image();
        assert_eq!((first.width(), first.height()), (0, 3));
        assert!(first.ptr_eq(&buf.image()));
    }

    #[test]
    fn single_axis_change_reallocates() {
        let mut buf = BufferedImage::new(10, 10);
        let first = buf.image();
        buf.height = 11;
        assert!(!buf.image().ptr_eq(&first));
    }

    #[test]
    fn masked_draw_calls_each_callback_once() {
        let mut masked = MaskedRenderBuffer::new();
        for size in [0, 1, 32] {
            let screen = Surface::new(size, size);
            let mut draws = 0;
            let mut masks = 0;
            masked.draw(&screen, |_| draws += 1, |_| masks += 1);
            assert_eq!((draws, masks), (1, 1));
        }
    }

    #[test]
    fn masked_draw_clips_content_to_mask() {
        let mut masked = MaskedRenderBuffer::new();
        let screen = Surface::new(4, 4);
        masked.draw(
            &screen,
            |content| content.fill(RED),
            |mask| mask.sub_image(rect(1, 1, 2, 2)).fill(color(0, 0, 0, 255)),
        );
        assert_eq!(screen.pixel(0, 0), Color::default());
        assert_eq!(screen.pixel(1, 1), RED);
        assert_eq!(screen.pixel(2, 2), RED);
        assert_eq!(screen.pixel(3, 3), Color::default());
    }

    #[test]
    fn masked_draw_starts_from_clear_buffers() {
        let mut masked = MaskedRenderBuffer::new();
        let screen = Surface::new(2, 1);
        masked.draw(&screen, |content| content.fill(RED), |mask| mask.fill(color(0, 0, 0, 255)));

        let next = Surface::new(2, 1);
        masked.draw(&next, |content| content.fill(RED), |mask| mask.set_pixel(0, 0, color(0, 0, 0, 255)));
        assert_eq!(next.pixel(0, 0), RED);
        assert_eq!(next.pixel(1, 0), Color::default());
    }
}
