//! Time-axis overlay reactions, independent of the DOM.
//!
//! `OverlayController` owns the only mutable view state (last pointer and
//! last scroll offset) and turns each pointer-move or scroll event into the
//! `IndicatorFrame` the document binding applies to the guide and label.

use shared::{ChartScale, format_elapsed};

/// Label placement relative to the pointer, in pixels.
const LABEL_OFFSET_X: f64 = 6.0;
const LABEL_OFFSET_Y: f64 = -6.0;

/// Position in document (page) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub top: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    pub last_pointer: PagePoint,
    pub last_scroll: ScrollOffset,
}

/// Where to draw the guide and label, and what the label says.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub line_x: f64,
    pub line_top: f64,
    pub label_x: f64,
    pub label_y: f64,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct OverlayController {
    scale: ChartScale,
    state: ViewState,
}

impl OverlayController {
    pub fn new(scale: ChartScale, initial_scroll: ScrollOffset) -> Self {
        Self {
            scale,
            state: ViewState {
                last_pointer: PagePoint::default(),
                last_scroll: initial_scroll,
            },
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> IndicatorFrame {
        self.state.last_pointer = PagePoint { x, y };
        self.render_indicator(x, y)
    }

    /// The pointer keeps its viewport position while the page moves under it,
    /// so its document position shifts by the scroll delta.
    pub fn on_scroll(&mut self, current: ScrollOffset) -> IndicatorFrame {
        let last = self.state.last_scroll;
        let pointer = PagePoint {
            x: self.state.last_pointer.x + (current.left - last.left),
            y: self.state.last_pointer.y + (current.top - last.top),
        };

        self.state = ViewState {
            last_pointer: pointer,
            last_scroll: current,
        };
        self.render_indicator(pointer.x, pointer.y)
    }

    pub fn render_indicator(&self, x: f64, y: f64) -> IndicatorFrame {
        IndicatorFrame {
            line_x: x,
            line_top: self.scale.header_height,
            label_x: x + LABEL_OFFSET_X,
            label_y: y + LABEL_OFFSET_Y,
            label: format_elapsed(self.scale.elapsed_at(x)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> ChartScale {
        ChartScale {
            us_per_pixel: 10_000.0,
            left_offset: 40.0,
            header_height: 75.0,
        }
    }

    fn scroll(top: f64, left: f64) -> ScrollOffset {
        ScrollOffset { top, left }
    }

    #[test]
    fn pointer_move_labels_elapsed_time() {
        let mut overlay = OverlayController::new(scale(), ScrollOffset::default());
        let frame = overlay.on_pointer_move(190.0, 300.0);

        assert_eq!(frame.line_x, 190.0);
        assert_eq!(frame.line_top, 75.0);
        assert_eq!(frame.label, "1.5s");
        assert_eq!((frame.label_x, frame.label_y), (196.0, 294.0));
        assert_eq!(overlay.state().last_pointer, PagePoint { x: 190.0, y: 300.0 });
    }

    #[test]
    fn left_of_origin_is_negative() {
        let mut overlay = OverlayController::new(scale(), ScrollOffset::default());
        assert_eq!(overlay.on_pointer_move(30.0, 0.0).label, "-100ms");
    }

    #[test]
    fn vertical_scrolling_keeps_the_label() {
        let mut overlay = OverlayController::new(scale(), ScrollOffset::default());
        let before = overlay.on_pointer_move(140.0, 200.0);

        let mut after = before.clone();
        for top in [50.0, 120.0, 80.0, 400.0] {
            after = overlay.on_scroll(scroll(top, 0.0));
        }

        assert_eq!(after.label, before.label);
        assert_eq!(after.line_x, before.line_x);
        assert_eq!(overlay.state().last_pointer.y, 600.0);
    }

    #[test]
    fn horizontal_scroll_round_trip_restores_the_label() {
        let mut overlay = OverlayController::new(scale(), scroll(0.0, 100.0));
        let before = overlay.on_pointer_move(140.0, 200.0);

        let moved = overlay.on_scroll(scroll(0.0, 160.0));
        assert_eq!(moved.line_x, 200.0);
        assert_ne!(moved.label, before.label);

        overlay.on_scroll(scroll(30.0, 130.0));
        let back = overlay.on_scroll(scroll(0.0, 100.0));
        assert_eq!(back, before);
    }

    #[test]
    fn scroll_delta_is_relative_to_the_initial_offset() {
        let mut overlay = OverlayController::new(scale(), scroll(500.0, 0.0));
        overlay.on_pointer_move(100.0, 700.0);
        let frame = overlay.on_scroll(scroll(520.0, 0.0));
        assert_eq!(frame.label_y, 720.0 + LABEL_OFFSET_Y);
        assert_eq!(overlay.state().last_scroll, scroll(520.0, 0.0));
    }
}
