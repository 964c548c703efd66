//! Time-axis overlay for rendered boot charts.
//!
//! Built for `wasm32` with `wasm-bindgen --target no-modules`; the chart's
//! loader script instantiates the module and `dom::start` attaches itself.

pub mod overlay;

#[cfg(target_arch = "wasm32")]
mod dom;

pub use overlay::{IndicatorFrame, OverlayController, PagePoint, ScrollOffset, ViewState};
