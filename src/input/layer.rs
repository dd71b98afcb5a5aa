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
//! Input layers decide which on-screen region owns an input event.
//!
//! Every frame the layer stack is thrown away and rebuilt in z-order through a breadth-first
//! queue of deferred setup callbacks. Widgets then ask whether their own layer is active for a
//! point and event type: the stack is walked from the top, and the first layer that contains the
//! point, accepts the event and blocks what is below it wins.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::Rc,
};

use bitflags::bitflags;
use tracing::{error, trace};

use crate::Recti;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    /// Categories of input a layer accepts.
    pub struct LayerEventType : u16 {
        /// Mouse wheel movement.
        const WHEEL = 2;
        /// Mouse button presses and releases.
        const MOUSE_BUTTON = 1;
        /// Wildcard used in queries. Layers must not declare it, use [`LayerEventType::ALL`].
        const ANY = 0;
        /// Every event type.
        const ALL = Self::MOUSE_BUTTON.bits() | Self::WHEEL.bits();
    }
}

/// Area of the screen covered by a layer.
pub enum LayerRegion {
    /// The whole screen.
    FullScreen,
    /// The rectangle returned by the function, evaluated on every query.
    Rect(Box<dyn Fn() -> Recti>),
}

impl LayerRegion {
    fn contains(&self, x: i32, y: i32) -> bool {
        match self {
            Self::FullScreen => true,
            Self::Rect(rect_fn) => {
                let r = rect_fn();
                x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
            }
        }
    }
}

impl fmt::Debug for LayerRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullScreen => f.write_str("FullScreen"),
            Self::Rect(_) => f.write_str("Rect(..)"),
        }
    }
}

#[derive(Debug)]
/// A region-bound claim on input events.
pub struct Layer {
    /// Label used in diagnostics only.
    pub debug_label: String,
    /// Event types this layer accepts.
    pub event_types: LayerEventType,
    /// Whether this layer hides events inside its region from the layers below it.
    pub block_lower: bool,
    /// Area covered by the layer.
    pub region: LayerRegion,
    invalid: Cell<bool>,
}

#[derive(Clone, Debug)]
/// Shared handle to a [`Layer`]. Identity (not value) is what the stack compares.
pub struct LayerHandle(Rc<Layer>);

impl Layer {
    fn handle(debug_label: &str, event_types: LayerEventType, block_lower: bool, region: LayerRegion) -> LayerHandle {
        LayerHandle(Rc::new(Layer {
            debug_label: debug_label.to_string(),
            event_types,
            block_lower,
            region,
            invalid: Cell::new(false),
        }))
    }

    /// Creates a layer covering the whole screen.
    pub fn full_screen(debug_label: &str, event_types: LayerEventType, block_lower: bool) -> LayerHandle {
        Self::handle(debug_label, event_types, block_lower, LayerRegion::FullScreen)
    }

    /// Creates a layer covering whatever `rect_fn` returns at query time.
    pub fn with_rect(debug_label: &str, event_types: LayerEventType, block_lower: bool, rect_fn: impl Fn() -> Recti + 'static) -> LayerHandle {
        Self::handle(debug_label, event_types, block_lower, LayerRegion::Rect(Box::new(rect_fn)))
    }

    fn accepts(&self, x: i32, y: i32, event_type: LayerEventType) -> bool {
        self.region.contains(x, y) && (event_type == LayerEventType::ANY || self.event_types.contains(event_type))
    }
}

impl std::ops::Deref for LayerHandle {
    type Target = Layer;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl LayerHandle {
    /// Returns `true` once the layer has been retired by a stack rebuild.
    pub fn is_invalid(&self) -> bool { self.0.invalid.get() }

    /// Returns `true` if both handles refer to the same layer.
    pub fn ptr_eq(&self, other: &LayerHandle) -> bool { Rc::ptr_eq(&self.0, &other.0) }

    /// Asks the thread's layer stack whether this layer owns `event_type` at `(x, y)`.
    ///
    /// Always `false` for retired layers. During a setup pass the answer comes from the layers
    /// registered so far.
    pub fn active_for(&self, x: i32, y: i32, event_type: LayerEventType) -> bool {
        INPUT_LAYERS.with_borrow(|layers| layers.active_for(self, x, y, event_type))
    }
}

/// Something that registers input layers, typically the root of a widget tree.
pub trait Layerer {
    /// Registers this object's layers and defers the setup of anything stacked above them.
    fn setup_input_layer<'a>(&'a self, setup: &mut LayerSetup<'_, 'a>);
}

type DeferredSetupFn<'a> = Box<dyn FnOnce(&mut LayerSetup<'_, 'a>) + 'a>;

// The thread stack is only borrowed per call, so callbacks may use the global functions too.
enum SetupTarget<'s> {
    Owned(&'s mut InputLayers),
    Thread,
}

/// Handed to [`Layerer`]s and deferred callbacks while the stack is being rebuilt.
pub struct LayerSetup<'s, 'a> {
    target: SetupTarget<'s>,
    queue: VecDeque<DeferredSetupFn<'a>>,
}

impl<'s, 'a> LayerSetup<'s, 'a> {
    fn run(target: SetupTarget<'s>, roots: &[&'a dyn Layerer]) {
        let mut setup = LayerSetup { target, queue: VecDeque::new() };
        for &root in roots {
            setup.defer(move |setup| root.setup_input_layer(setup));
        }
        while let Some(f) = setup.queue.pop_front() {
            f(&mut setup);
        }
    }

    /// Pushes `layer` on top of the stack being built.
    pub fn add_layer(&mut self, layer: &LayerHandle) {
        match &mut self.target {
            SetupTarget::Owned(layers) => layers.add_layer(layer),
            SetupTarget::Thread => add_layer(layer),
        }
    }

    /// Queues `f` to run after every callback queued before it.
    pub fn defer(&mut self, f: impl FnOnce(&mut LayerSetup<'_, 'a>) + 'a) { self.queue.push_back(Box::new(f)) }

    /// Queries the stack as registered so far.
    pub fn active_for(&self, layer: &LayerHandle, x: i32, y: i32, event_type: LayerEventType) -> bool {
        match &self.target {
            SetupTarget::Owned(layers) => layers.active_for(layer, x, y, event_type),
            SetupTarget::Thread => layer.active_for(x, y, event_type),
        }
    }
}

/// An ordered stack of input layers, bottom first.
pub struct InputLayers {
    layers: Vec<LayerHandle>,
    default_layer: LayerHandle,
}

impl Default for InputLayers {
    fn default() -> Self { Self::new() }
}

impl InputLayers {
    /// Creates an empty stack with its own default layer.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            default_layer: Layer::full_screen("default", LayerEventType::ALL, true),
        }
    }

    /// The fallback layer, active wherever no registered layer blocks it.
    pub fn default_layer(&self) -> LayerHandle { self.default_layer.clone() }

    /// Layers in registration order, bottom first.
    pub fn layers(&self) -> &[LayerHandle] { &self.layers }

    /// Number of registered layers.
    pub fn len(&self) -> usize { self.layers.len() }

    /// Returns `true` if no layer is registered.
    pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    /// Pushes `layer` on top of the stack.
    ///
    /// # Panics
    ///
    /// If the layer declares [`LayerEventType::ANY`], has been retired, or is the default layer.
    pub fn add_layer(&mut self, layer: &LayerHandle) {
        if layer.is_invalid() {
            error!(label = %layer.debug_label, "retired input layer added");
            panic!("invalid input layer added: {}", layer.debug_label);
        }
        if layer.event_types == LayerEventType::ANY {
            error!(label = %layer.debug_label, "input layer declares ANY event types");
            panic!("cannot add input layer {} with event types ANY (use ALL)", layer.debug_label);
        }
        if layer.ptr_eq(&self.default_layer) {
            error!("default input layer added to the stack");
            panic!("the default input layer is implicit and cannot be added");
        }
        trace!(label = %layer.debug_label, depth = self.layers.len(), "input layer added");
        self.layers.push(layer.clone());
    }

    /// Retires every layer and empties the stack.
    pub fn clear(&mut self) {
        for layer in self.layers.drain(..) {
            layer.invalid.set(true);
        }
    }

    /// Rebuilds the stack: retires the current layers, then runs the setup of every root and
    /// everything they defer, breadth-first.
    pub fn setup_with_deferred<'a>(&mut self, roots: &[&'a dyn Layerer]) {
        self.clear();
        LayerSetup::run(SetupTarget::Owned(self), roots);
        trace!(layers = self.layers.len(), "input layers set up");
    }

    /// Returns `true` if `layer` owns `event_type` at `(x, y)`.
    ///
    /// The stack is walked from the top. Layers that do not contain the point or do not accept
    /// the event are skipped; the first other layer that blocks decides `false`. Reaching
    /// `layer` itself decides `true`. If the walk falls off the bottom, only the default layer
    /// is active.
    pub fn active_for(&self, layer: &LayerHandle, x: i32, y: i32, event_type: LayerEventType) -> bool {
        if layer.is_invalid() {
            return false;
        }

        for l in self.layers.iter().rev() {
            if !l.accepts(x, y, event_type) {
                continue;
            }
            if !l.ptr_eq(layer) {
                if l.block_lower {
                    return false;
                }
                continue;
            }
            return true;
        }

        layer.ptr_eq(&self.default_layer)
    }
}

thread_local! {
    static INPUT_LAYERS: RefCell<InputLayers> = RefCell::new(InputLayers::new());
}

/// Pushes `layer` on top of the thread's layer stack.
///
/// # Panics
///
/// Under the same conditions as [`InputLayers::add_layer`].
pub fn add_layer(layer: &LayerHandle) { INPUT_LAYERS.with_borrow_mut(|layers| layers.add_layer(layer)) }

/// Rebuilds the thread's layer stack from `roots`. See [`InputLayers::setup_with_deferred`].
///
/// Callbacks may call [`add_layer`] and [`LayerHandle::active_for`] directly; both see the
/// layers registered so far.
pub fn setup_input_layers_with_deferred(roots: &[&dyn Layerer]) {
    INPUT_LAYERS.with_borrow_mut(|layers| layers.clear());
    LayerSetup::run(SetupTarget::Thread, roots);
    trace!(layers = INPUT_LAYERS.with_borrow(|layers| layers.len()), "input layers set up");
}

/// The thread's fallback layer.
pub fn default_layer() -> LayerHandle { INPUT_LAYERS.with_borrow(|layers| layers.default_layer()) }
