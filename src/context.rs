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

use crate::{Input, Layerer, setup_input_layers_with_deferred};

#[derive(Default, Debug)]
/// Drives the per-frame order the input layers depend on.
///
/// Each [`Context::frame`] rebuilds the layer stack from the root before running the widget
/// pass, so every layer query in that pass sees a settled stack.
pub struct Context {
    frame: usize,
    /// Input state fed by the host between frames.
    pub input: Input,
}

impl Context {
    /// Creates a context with no frames run yet.
    pub fn new() -> Self { Self::default() }

    /// Number of frames driven so far.
    pub fn frame_count(&self) -> usize { self.frame }

    #[inline(never)]
    fn frame_begin(&mut self, root: &dyn Layerer) {
        self.input.prelude();
        setup_input_layers_with_deferred(&[root]);
        self.frame += 1;
        trace!(frame = self.frame, "frame begin");
    }

    #[inline(never)]
    fn frame_end(&mut self) { self.input.epilogue(); }

    /// Runs a single frame: rebuilds the input layers from `root`, calls `f` for the
    /// update/draw pass, then clears the per-frame input state.
    pub fn frame<F: FnOnce(&mut Self)>(&mut self, root: &dyn Layerer, f: F) {
        self.frame_begin(root);

        // execute the frame function
        f(self);

        self.frame_end();
    }
}
