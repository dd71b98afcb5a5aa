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
//! Pointer state collected by the host each frame, and queries that respect input layers.

mod layer;

pub use layer::*;

use bitflags::bitflags;

use crate::{Vec2i, vec2};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    /// Mouse button state as reported by the host.
    pub struct MouseButton : u32 {
        /// Middle mouse button.
        const MIDDLE = 4;
        /// Right mouse button.
        const RIGHT = 2;
        /// Left mouse button.
        const LEFT = 1;
        /// No buttons pressed.
        const NONE = 0;
    }
}

#[derive(Clone, Debug)]
/// Aggregates raw pointer input collected during the current frame.
pub struct Input {
    mouse_pos: Vec2i,
    last_mouse_pos: Vec2i,
    mouse_delta: Vec2i,
    scroll_delta: Vec2i,
    mouse_down: MouseButton,
    mouse_pressed: MouseButton,
    mouse_released: MouseButton,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            mouse_pos: Vec2i::default(),
            last_mouse_pos: Vec2i::default(),
            mouse_delta: Vec2i::default(),
            scroll_delta: Vec2i::default(),
            mouse_down: MouseButton::NONE,
            mouse_pressed: MouseButton::NONE,
            mouse_released: MouseButton::NONE,
        }
    }
}

impl Input {
    /// Updates the current mouse pointer position.
    pub fn mouse_move(&mut self, x: i32, y: i32) { self.mouse_pos = vec2(x, y); }

    /// Records that `btn` went down at `(x, y)`.
    pub fn mouse_down(&mut self, x: i32, y: i32, btn: MouseButton) {
        self.mouse_move(x, y);
        self.mouse_down |= btn;
        self.mouse_pressed |= btn;
    }

    /// Records that `btn` was released at `(x, y)`.
    pub fn mouse_up(&mut self, x: i32, y: i32, btn: MouseButton) {
        self.mouse_move(x, y);
        self.mouse_released |= btn & self.mouse_down;
        self.mouse_down &= !btn;
    }

    /// Accumulates scroll wheel movement.
    pub fn scroll(&mut self, x: i32, y: i32) {
        self.scroll_delta.x += x;
        self.scroll_delta.y += y;
    }

    /// Current pointer position.
    pub fn cursor_position(&self) -> Vec2i { self.mouse_pos }

    /// Pointer movement since the previous frame.
    pub fn mouse_delta(&self) -> Vec2i { self.mouse_delta }

    /// Returns `true` while any of `btn` is held.
    pub fn mouse_button_pressed(&self, btn: MouseButton) -> bool { self.mouse_down.intersects(btn) }

    /// Returns `true` if any of `btn` went down this frame.
    pub fn mouse_button_just_pressed(&self, btn: MouseButton) -> bool { self.mouse_pressed.intersects(btn) }

    /// Returns `true` if any of `btn` was released this frame.
    pub fn mouse_button_just_released(&self, btn: MouseButton) -> bool { self.mouse_released.intersects(btn) }

    /// Wheel movement accumulated this frame.
    pub fn wheel(&self) -> Vec2i { self.scroll_delta }

    fn layer_active(&self, layer: &LayerHandle, event_type: LayerEventType) -> bool {
        layer.active_for(self.mouse_pos.x, self.mouse_pos.y, event_type)
    }

    /// Like [`Input::mouse_button_pressed`], but only if `layer` owns mouse buttons under the cursor.
    pub fn mouse_button_pressed_layer(&self, btn: MouseButton, layer: &LayerHandle) -> bool {
        self.layer_active(layer, LayerEventType::MOUSE_BUTTON) && self.mouse_button_pressed(btn)
    }

    /// Like [`Input::mouse_button_just_pressed`], but only if `layer` owns mouse buttons under the cursor.
    pub fn mouse_button_just_pressed_layer(&self, btn: MouseButton, layer: &LayerHandle) -> bool {
        self.layer_active(layer, LayerEventType::MOUSE_BUTTON) && self.mouse_button_just_pressed(btn)
    }

    /// Like [`Input::mouse_button_just_released`], but only if `layer` owns mouse buttons under the cursor.
    pub fn mouse_button_just_released_layer(&self, btn: MouseButton, layer: &LayerHandle) -> bool {
        self.layer_active(layer, LayerEventType::MOUSE_BUTTON) && self.mouse_button_just_released(btn)
    }

    /// Wheel movement this frame if `layer` owns the wheel under the cursor, zero otherwise.
    pub fn wheel_layer(&self, layer: &LayerHandle) -> Vec2i {
        if !self.layer_active(layer, LayerEventType::WHEEL) {
            return Vec2i::default();
        }
        self.scroll_delta
    }

    pub(crate) fn prelude(&mut self) {
        self.mouse_delta.x = self.mouse_pos.x - self.last_mouse_pos.x;
        self.mouse_delta.y = self.mouse_pos.y - self.last_mouse_pos.y;
    }

    pub(crate) fn epilogue(&mut self) {
        self.mouse_pressed = MouseButton::NONE;
        self.mouse_released = MouseButton::NONE;
        self.scroll_delta = vec2(0, 0);
        self.last_mouse_pos = self.mouse_pos;
    }
}
