//! Document binding for the overlay: reads the chart scale from the root
//! element and wires `mousemove` / `scroll` to the indicator elements.

use crate::overlay::{IndicatorFrame, OverlayController, ScrollOffset};
use shared::ChartScale;
use shared::scale::{CURSOR_LABEL_ID, CURSOR_LINE_ID};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MouseEvent, Window, console};

struct IndicatorElements {
    line: Element,
    label: Element,
}

impl IndicatorElements {
    fn find(document: &Document) -> Result<Self, JsValue> {
        let by_id = |id: &str| {
            document
                .get_element_by_id(id)
                .ok_or_else(|| JsValue::from_str(&format!("element #{id} not found")))
        };
        Ok(Self {
            line: by_id(CURSOR_LINE_ID)?,
            label: by_id(CURSOR_LABEL_ID)?,
        })
    }

    fn apply(&self, frame: &IndicatorFrame) -> Result<(), JsValue> {
        let line_x = frame.line_x.to_string();
        self.line.set_attribute("x1", &line_x)?;
        self.line.set_attribute("x2", &line_x)?;
        self.line.set_attribute("y1", &frame.line_top.to_string())?;
        self.label.set_attribute("x", &frame.label_x.to_string())?;
        self.label.set_attribute("y", &frame.label_y.to_string())?;
        self.label.set_text_content(Some(&frame.label));
        Ok(())
    }
}

fn scroll_offset(window: &Window) -> ScrollOffset {
    ScrollOffset {
        top: window.scroll_y().unwrap_or(0.0),
        left: window.scroll_x().unwrap_or(0.0),
    }
}

fn apply_or_warn(elements: &IndicatorElements, frame: &IndicatorFrame) {
    if let Err(err) = elements.apply(frame) {
        console::warn_1(&err);
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let root = document
        .document_element()
        .ok_or_else(|| JsValue::from_str("document has no root element"))?;

    let scale = ChartScale::from_attributes(|name| root.get_attribute(name))
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let elements = Rc::new(IndicatorElements::find(&document)?);
    let controller = Rc::new(RefCell::new(OverlayController::new(
        scale,
        scroll_offset(&window),
    )));

    let mousemove_closure = Closure::wrap(Box::new({
        let controller = controller.clone();
        let elements = elements.clone();
        move |event: MouseEvent| {
            let frame = controller
                .borrow_mut()
                .on_pointer_move(f64::from(event.page_x()), f64::from(event.page_y()));
            apply_or_warn(&elements, &frame);
        }
    }) as Box<dyn FnMut(MouseEvent)>);

    document.add_event_listener_with_callback(
        "mousemove",
        mousemove_closure.as_ref().unchecked_ref(),
    )?;

    let scroll_closure = Closure::wrap(Box::new({
        let window = window.clone();
        move |_event: web_sys::Event| {
            let frame = controller.borrow_mut().on_scroll(scroll_offset(&window));
            apply_or_warn(&elements, &frame);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);

    document.add_event_listener_with_callback("scroll", scroll_closure.as_ref().unchecked_ref())?;

    // Listeners live as long as the document.
    mousemove_closure.forget();
    scroll_closure.forget();

    console::log_1(&JsValue::from_str("[bootline] time-axis overlay attached"));
    Ok(())
}
