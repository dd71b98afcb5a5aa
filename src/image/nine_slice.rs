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
//! Nine-slice images: a source surface cut into a 3x3 grid whose corners keep their size
//! while the center row and column stretch to fill the requested area.

use std::{
    cell::{OnceCell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use tracing::{debug, trace};

use crate::{Color, Dimensioni, DrawImageOptions, Filter, Recti, Surface, rect};

/// Callback invoked with each tile's draw options after the built-in transform is applied.
pub type DrawImageOptionsFn<'a> = &'a mut dyn FnMut(&mut DrawImageOptions);

type Tiles = [Option<Surface>; 9];

/// A source image split into a 3x3 grid of tiles.
///
/// `widths` are the left, center and right column widths; `heights` the top, center and bottom
/// row heights. Only the center column and row are scaled when drawing at a size other than the
/// source size. Tiles are cut from the source on the first draw, after which the source handle
/// is released.
pub struct NineSlice {
    image: RefCell<Option<Surface>>,
    widths: [i32; 3],
    heights: [i32; 3],
    transparent: bool,
    tiles: OnceCell<Tiles>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// One side of a color nine-slice's border.
pub struct NineSliceBorder {
    /// Border color.
    pub color: Color,
    /// Border thickness in pixels.
    pub width: i32,
}

type BorderKey = (Color, [Option<NineSliceBorder>; 4]);

thread_local! {
    static COLOR_NINE_SLICES: RefCell<HashMap<Color, Rc<NineSlice>>> = RefCell::new(HashMap::new());
    static COLOR_IMAGES: RefCell<HashMap<Color, Surface>> = RefCell::new(HashMap::new());
    static BORDERED_NINE_SLICES: RefCell<HashMap<BorderKey, Rc<NineSlice>>> = RefCell::new(HashMap::new());
}

/// Returns the shared 1x1 surface filled with `color`.
///
/// Surfaces are cached per color for the lifetime of the thread and never evicted.
pub fn image_color(color: Color) -> Surface {
    if let Some(image) = COLOR_IMAGES.with_borrow(|images| images.get(&color).cloned()) {
        return image;
    }
    let image = Surface::new(1, 1);
    image.fill(color);
    COLOR_IMAGES.with_borrow_mut(|images| images.insert(color, image.clone()));
    image
}

impl NineSlice {
    /// Creates a nine-slice over `image`.
    ///
    /// The column widths and row heights are expected to add up to the image size. Mismatches are
    /// not checked: tiles are clipped to the image and scale factors still use the given sizes.
    pub fn new(image: Surface, widths: [i32; 3], heights: [i32; 3]) -> Self {
        Self {
            image: RefCell::new(Some(image)),
            widths,
            heights,
            transparent: false,
            tiles: OnceCell::new(),
        }
    }

    /// Creates a nine-slice with `[border, center, border]` on both axes.
    pub fn simple(image: Surface, border: i32, center: i32) -> Self {
        Self::new(image, [border, center, border], [border, center, border])
    }

    fn transparent() -> Self {
        Self {
            image: RefCell::new(None),
            widths: [0; 3],
            heights: [0; 3],
            transparent: true,
            tiles: OnceCell::new(),
        }
    }

    /// Returns the shared nine-slice that fills its area with `color`.
    ///
    /// A color with zero alpha (such as [`Color::TRANSPARENT`]) gives a transparent nine-slice
    /// that never draws. Repeated calls with the same color return the same instance.
    pub fn color(color: Color) -> Rc<NineSlice> {
        if let Some(n) = COLOR_NINE_SLICES.with_borrow(|cache| cache.get(&color).cloned()) {
            return n;
        }

        debug!(?color, "caching color nine-slice");
        let n = if color.is_transparent() {
            Rc::new(Self::transparent())
        } else {
            Rc::new(Self::new(image_color(color), [0, 1, 0], [0, 1, 0]))
        };
        COLOR_NINE_SLICES.with_borrow_mut(|cache| cache.insert(color, n.clone()));
        n
    }

    /// Returns the shared nine-slice filled with `fill` and framed by `width` pixels of `border` on every side.
    pub fn bordered_color(fill: Color, border: Color, width: i32) -> Rc<NineSlice> {
        let side = Some(NineSliceBorder { color: border, width });
        Self::advanced_color(fill, side, side, side, side)
    }

    /// Returns the shared nine-slice filled with `fill` with an optional border per side.
    ///
    /// The backing image is `(left + 1 + right) x (top + 1 + bottom)` pixels with a single `fill`
    /// pixel in the middle. Left and right borders cover the corners.
    pub fn advanced_color(
        fill: Color,
        top: Option<NineSliceBorder>,
        left: Option<NineSliceBorder>,
        right: Option<NineSliceBorder>,
        bottom: Option<NineSliceBorder>,
    ) -> Rc<NineSlice> {
        let sides = [top, left, right, bottom].map(|side| side.filter(|b| b.width > 0));
        if sides.iter().all(|side| side.map_or(true, |b| b.color.is_transparent())) {
            return Self::color(fill);
        }

        let key = (fill, sides);
        if let Some(n) = BORDERED_NINE_SLICES.with_borrow(|cache| cache.get(&key).cloned()) {
            return n;
        }

        let [top, left, right, bottom] = sides;
        let thickness = |side: Option<NineSliceBorder>| side.map_or(0, |b| b.width);
        let (t, l, r, b) = (thickness(top), thickness(left), thickness(right), thickness(bottom));
        let (w, h) = (l + 1 + r, t + 1 + b);

        let image = Surface::new(w, h);
        image.fill(fill);
        let paint = |side: Option<NineSliceBorder>, area: Recti| {
            if let Some(side) = side {
                image.sub_image(area).fill(side.color);
            }
        };
        paint(top, rect(0, 0, w, t));
        paint(bottom, rect(0, t + 1, w, b));
        paint(left, rect(0, 0, l, h));
        paint(right, rect(l + 1, 0, r, h));

        debug!(?fill, ?sides, "caching bordered color nine-slice");
        let n = Rc::new(Self::new(image, [l, 1, r], [t, 1, b]));
        BORDERED_NINE_SLICES.with_borrow_mut(|cache| cache.insert(key, n.clone()));
        n
    }

    /// Returns the smallest size the nine-slice can be drawn at without the center collapsing.
    pub fn min_size(&self) -> Dimensioni {
        if self.transparent {
            return Dimensioni::new(0, 0);
        }
        Dimensioni::new(self.widths[0] + self.widths[2], self.heights[0] + self.heights[2])
    }

    /// Draws the nine-slice onto `screen` stretched to `width` x `height`, starting at the origin.
    ///
    /// `opts_fn` sees every tile's options after the tile's own scale and placement, which is
    /// where callers add their own translation. Tiles that end up with no area are skipped, so
    /// drawing below [`NineSlice::min_size`] silently drops the center row or column.
    pub fn draw(&self, screen: &Surface, width: i32, height: i32, mut opts_fn: Option<DrawImageOptionsFn<'_>>) {
        if self.transparent {
            return;
        }

        let tiles = self.tiles();
        let mut ty = 0;
        for (r, &sh) in self.heights.iter().enumerate() {
            let th = if r == 1 { height - self.heights[0] - self.heights[2] } else { sh };
            let mut tx = 0;
            for (c, &sw) in self.widths.iter().enumerate() {
                let tw = if c == 1 { width - self.widths[0] - self.widths[2] } else { sw };
                if let Some(tile) = &tiles[r * 3 + c] {
                    draw_tile(screen, tile, sw, sh, rect(tx, ty, tw, th), opts_fn.as_deref_mut());
                }
                tx += tw;
            }
            ty += th;
        }
    }

    fn tiles(&self) -> &Tiles {
        self.tiles.get_or_init(|| {
            let image = self.image.borrow_mut().take();
            match image {
                Some(image) => self.split(image),
                None => Default::default(),
            }
        })
    }

    // consumes the source: once split, only the tiles keep the pixels alive
    fn split(&self, image: Surface) -> Tiles {
        let mut tiles: Tiles = Default::default();
        let [left, center_w, right] = self.widths;
        let [top, center_h, bottom] = self.heights;
        if left == 0 && right == 0 && top == 0 && bottom == 0 && center_w == image.width() && center_h == image.height() {
            trace!(width = center_w, height = center_h, "nine-slice is center only");
            tiles[4] = Some(image);
            return tiles;
        }

        let mut sy = 0;
        for (r, &sh) in self.heights.iter().enumerate() {
            let mut sx = 0;
            for (c, &sw) in self.widths.iter().enumerate() {
                if sw > 0 && sh > 0 {
                    tiles[r * 3 + c] = Some(image.sub_image(rect(sx, sy, sw, sh)));
                }
                sx += sw;
            }
            sy += sh;
        }
        trace!(widths = ?self.widths, heights = ?self.heights, "split nine-slice tiles");
        tiles
    }
}

fn draw_tile<'f>(screen: &Surface, tile: &Surface, sw: i32, sh: i32, target: Recti, opts_fn: Option<&mut (dyn FnMut(&mut DrawImageOptions) + 'f)>) {
    let (tw, th) = (target.width, target.height);
    if sw <= 0 || sh <= 0 || tw <= 0 || th <= 0 {
        return;
    }

    let mut opts = DrawImageOptions { filter: Filter::Nearest, ..Default::default() };
    if tw != sw || th != sh {
        opts.geom.scale(tw as f32 / sw as f32, th as f32 / sh as f32);
    }
    opts.geom.translate(target.x as f32, target.y as f32);
    if let Some(f) = opts_fn {
        f(&mut opts);
    }
    screen.draw_image(tile, &opts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    // 3x3 image where every pixel has its own color
    fn grid_image() -> Surface {
        let image = Surface::new(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                image.set_pixel(x, y, grid_color(x, y));
            }
        }
        image
    }

    fn grid_color(x: i32, y: i32) -> Color { color((x * 100) as u8, (y * 100) as u8, 50, 255) }

    fn count_pixels(surface: &Surface) -> usize {
        let mut n = 0;
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                if surface.pixel(x, y) != Color::default() {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn min_size_sums_borders() {
        let n = NineSlice::new(Surface::new(9, 15), [2, 3, 4], [5, 6, 4]);
        let size = n.min_size();
        assert_eq!((size.width, size.height), (6, 9));
    }

    #[test]
    fn simple_is_symmetric() {
        let n = NineSlice::simple(Surface::new(7, 7), 3, 1);
        assert_eq!((n.widths, n.heights), ([3, 1, 3], [3, 1, 3]));
    }

    #[test]
    fn transparent_color_never_draws() {
        let screen = Surface::new(16, 16);
        for n in [NineSlice::color(Color::TRANSPARENT), NineSlice::color(color(255, 255, 255, 0))] {
            for (w, h) in [(0, 0), (1, 1), (16, 16), (40, 3)] {
                n.draw(&screen, w, h, None);
            }
            let size = n.min_size();
            assert_eq!((size.width, size.height), (0, 0));
        }
        assert_eq!(count_pixels(&screen), 0);
    }

    #[test]
    fn color_instances_are_shared() {
        assert!(Rc::ptr_eq(&NineSlice::color(RED), &NineSlice::color(RED)));
        assert!(!Rc::ptr_eq(&NineSlice::color(RED), &NineSlice::color(BLUE)));
        assert!(image_color(RED).ptr_eq(&image_color(RED)));
    }

    #[test]
    fn color_fills_target() {
        let screen = Surface::new(6, 4);
        NineSlice::color(RED).draw(&screen, 5, 3, None);
        assert_eq!(screen.pixel(0, 0), RED);
        assert_eq!(screen.pixel(4, 2), RED);
        assert_eq!(screen.pixel(5, 3), Color::default());
        assert_eq!(count_pixels(&screen), 15);
    }

    #[test]
    fn native_size_draw_does_not_scale() {
        let n = NineSlice::new(grid_image(), [1, 1, 1], [1, 1, 1]);
        let screen = Surface::new(3, 3);
        let mut scaled = 0;
        let mut drawn = 0;
        let mut check = |opts: &mut DrawImageOptions| {
            drawn += 1;
            if opts.geom.scale_x() != 1.0 || opts.geom.scale_y() != 1.0 {
                scaled += 1;
            }
        };
        n.draw(&screen, 3, 3, Some(&mut check));
        assert_eq!((drawn, scaled), (9, 0));
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(screen.pixel(x, y), grid_color(x, y));
            }
        }
    }

    #[test]
    fn stretches_center_only() {
        let n = NineSlice::new(grid_image(), [1, 1, 1], [1, 1, 1]);
        let screen = Surface::new(5, 4);
        n.draw(&screen, 5, 4, None);

        // corners stay put
        assert_eq!(screen.pixel(0, 0), grid_color(0, 0));
        assert_eq!(screen.pixel(4, 0), grid_color(2, 0));
        assert_eq!(screen.pixel(0, 3), grid_color(0, 2));
        assert_eq!(screen.pixel(4, 3), grid_color(2, 2));
        // edges stretch along one axis, center along both
        for x in 1..4 {
            assert_eq!(screen.pixel(x, 0), grid_color(1, 0));
            assert_eq!(screen.pixel(x, 3), grid_color(1, 2));
            for y in 1..3 {
                assert_eq!(screen.pixel(x, y), grid_color(1, 1));
            }
        }
        for y in 1..3 {
            assert_eq!(screen.pixel(0, y), grid_color(0, 1));
            assert_eq!(screen.pixel(4, y), grid_color(2, 1));
        }
    }

    #[test]
    fn opts_fn_composes_translation() {
        let n = NineSlice::new(grid_image(), [1, 1, 1], [1, 1, 1]);
        let screen = Surface::new(20, 20);
        let mut offset = |opts: &mut DrawImageOptions| opts.geom.translate(10.0, 5.0);
        n.draw(&screen, 4, 4, Some(&mut offset));
        assert_eq!(screen.pixel(10, 5), grid_color(0, 0));
        assert_eq!(screen.pixel(13, 8), grid_color(2, 2));
        assert_eq!(screen.pixel(9, 5), Color::default());
        assert_eq!(count_pixels(&screen), 16);
    }

    #[test]
    fn below_min_size_skips_stretched_tiles() {
        let n = NineSlice::new(grid_image(), [1, 1, 1], [1, 1, 1]);
        let screen = Surface::new(8, 8);
        let mut drawn = 0;
        let mut count = |_: &mut DrawImageOptions| drawn += 1;
        n.draw(&screen, 1, 1, Some(&mut count));
        assert_eq!(drawn, 4);
    }

    #[test]
    fn opts_fn_sees_every_tile_in_order() {
        let n = NineSlice::new(grid_image(), [1, 1, 1], [1, 1, 1]);
        let screen = Surface::new(10, 10);
        let mut origins = Vec::new();
        let mut record = |opts: &mut DrawImageOptions| origins.push(opts.geom.apply(0.0, 0.0));
        n.draw(&screen, 5, 4, Some(&mut record));
        let expected = [
            (0.0, 0.0), (1.0, 0.0), (4.0, 0.0),
            (0.0, 1.0), (1.0, 1.0), (4.0, 1.0),
            (0.0, 3.0), (1.0, 3.0), (4.0, 3.0),
        ];
        assert_eq!(origins, expected);
    }

    #[test]
    fn tiles_are_split_once_and_source_released() {
        let image = grid_image();
        let n = NineSlice::new(image.clone(), [1, 1, 1], [1, 1, 1]);
        assert!(n.image.borrow().is_some());
        n.draw(&Surface::new(3, 3), 3, 3, None);
        assert!(n.image.borrow().is_none());

        let first = n.tiles.get().unwrap()[0].clone().unwrap();
        n.draw(&Surface::new(9, 9), 9, 9, None);
        assert!(n.tiles.get().unwrap()[0].as_ref().unwrap().ptr_eq(&first));
    }

    #[test]
    fn center_only_uses_whole_image() {
        let image = Surface::new(4, 2);
        let n = NineSlice::new(image.clone(), [0, 4, 0], [0, 2, 0]);
        let tiles = n.tiles();
        assert!(tiles[4].as_ref().unwrap().ptr_eq(&image));
        assert_eq!(tiles.iter().filter(|t| t.is_some()).count(), 1);
    }

    #[test]
    fn zero_sized_columns_have_no_tiles() {
        let image = Surface::new(2, 3);
        image.fill(RED);
        let n = NineSlice::new(image, [0, 2, 0], [1, 1, 1]);
        assert_eq!(n.tiles().iter().filter(|t| t.is_some()).count(), 3);

        let screen = Surface::new(4, 3);
        n.draw(&screen, 4, 3, None);
        assert_eq!(count_pixels(&screen), 12);
    }

    #[test]
    fn bordered_color_frames_fill() {
        let n = NineSlice::bordered_color(RED, BLUE, 1);
        let size = n.min_size();
        assert_eq!((size.width, size.height), (2, 2));

        let screen = Surface::new(4, 4);
        n.draw(&screen, 4, 4, None);
        assert_eq!(screen.pixel(0, 0), BLUE);
        assert_eq!(screen.pixel(3, 3), BLUE);
        assert_eq!(screen.pixel(0, 2), BLUE);
        assert_eq!(screen.pixel(2, 0), BLUE);
        assert_eq!(screen.pixel(1, 1), RED);
        assert_eq!(screen.pixel(2, 2), RED);

        assert!(Rc::ptr_eq(&n, &NineSlice::bordered_color(RED, BLUE, 1)));
        assert!(!Rc::ptr_eq(&n, &NineSlice::bordered_color(RED, BLUE, 2)));
    }

    #[test]
    fn advanced_color_single_side() {
        let top = Some(NineSliceBorder { color: BLUE, width: 2 });
        let n = NineSlice::advanced_color(RED, top, None, None, None);
        let size = n.min_size();
        assert_eq!((size.width, size.height), (0, 2));

        let screen = Surface::new(3, 5);
        n.draw(&screen, 3, 5, None);
        assert_eq!(screen.pixel(1, 1), BLUE);
        assert_eq!(screen.pixel(1, 2), RED);
        assert_eq!(screen.pixel(2, 4), RED);
    }

    #[test]
    fn advanced_color_without_visible_border_is_plain_color() {
        let hidden = Some(NineSliceBorder { color: BLUE, width: 0 });
        let n = NineSlice::advanced_color(RED, hidden, None, hidden, None);
        assert!(Rc::ptr_eq(&n, &NineSlice::color(RED)));
    }
}
