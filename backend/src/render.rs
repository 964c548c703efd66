use anyhow::{Context, Result};
use shared::scale::{CURSOR_LABEL_ID, CURSOR_LINE_ID};
use shared::{Actor, ChartScale, OverlaySection, RenderSection, Span, Timeline, format_elapsed};
use std::path::Path;
use svg::Document;
use svg::Node;
use svg::node::element::path::Data;
use svg::node::element::{self as Svg, Element};
use svg::node::{Comment, Text as TextNode};

use crate::chart;

const APPROX_FONT_HEIGHT: f64 = 15.0;

/// Grid lines drawn at most, sublines included.
const MAX_GRID_LINES: i128 = 2_000;

const CSS: &str = "
        rect.span      { opacity: 0.7; }
        g.actor:hover rect { opacity: 1.0; }
        path           { stroke: rgb(64,64,64); stroke-width: 1; }
        path.subline   { stroke: rgb(224,224,224); stroke-width: 0.7; }
        text           { font-family: Verdana, Helvetica; font-size: 14px; }
        text.left      { font-family: Verdana, Helvetica; font-size: 14px; text-anchor: start; }
        text.right     { font-family: Verdana, Helvetica; font-size: 14px; text-anchor: end; }
        text.label     { font-size: 10px; }
        line.cursor    { stroke: rgb(0,0,0); stroke-width: 1; stroke-dasharray: 3,2; pointer-events: none; }
        text.cursor    { font-size: 11px; pointer-events: none; }";

/// Draws a `Timeline` as a static SVG chart with the overlay hooks embedded.
pub struct Renderer {
    opts: RenderSection,
    overlay: OverlaySection,
}

impl Renderer {
    pub fn new(opts: RenderSection, overlay: OverlaySection) -> Self {
        Self { opts, overlay }
    }

    fn us_per_pixel(&self) -> f64 {
        f64::from(self.opts.us_per_pixel.max(1))
    }

    fn us_to_pixel(&self, us: i64) -> f64 {
        us as f64 / self.us_per_pixel()
    }

    fn heading_height(&self) -> f64 {
        let heading_start = self.opts.top_margin + APPROX_FONT_HEIGHT;
        let lines = self.opts.heading.lines().count() as f64;
        // Leave a couple of blank "lines" under the heading text
        heading_start + lines * APPROX_FONT_HEIGHT + 2.0 * APPROX_FONT_HEIGHT
    }

    /// Coordinates the overlay needs to map document x back to time.
    pub fn scale(&self, timeline: &Timeline) -> ChartScale {
        let first_event_time = timeline.earliest_start();
        ChartScale {
            us_per_pixel: self.us_per_pixel(),
            left_offset: self.opts.side_margin - self.us_to_pixel(first_event_time),
            header_height: self.heading_height(),
        }
    }

    fn render_heading(&self, mut output: Document) -> Document {
        let mut current_y = self.opts.top_margin + APPROX_FONT_HEIGHT;
        for line in self.opts.heading.lines() {
            let text = Svg::Text::new(line)
                .set("class", "heading")
                .set("x", self.opts.side_margin)
                .set("y", current_y);
            current_y += APPROX_FONT_HEIGHT;
            output = output.add(text);
        }
        output
    }

    fn render_lines(&self, mut g: Svg::Group, first_event_time: i64, last_event_time: i64, box_height: f64) -> Svg::Group {
        // Offsets may sit anywhere in the i64 range, so grid math is done wide
        let us_per_line = i128::from(self.opts.us_per_line.max(1));
        let first = i128::from(first_event_time);
        let last = i128::from(last_event_time);
        let first_bar = first.div_euclid(us_per_line) * us_per_line;
        let last_bar = (last + us_per_line - 1).div_euclid(us_per_line) * us_per_line;

        let substep = (us_per_line / i128::from(self.opts.sublines.max(1))).max(1);
        let (step, label_every) = if (last_bar - first_bar) / substep > MAX_GRID_LINES {
            // Too long a range: drop sublines and label every n-th line only
            let every = us_per_line * ((last_bar - first_bar) / us_per_line / MAX_GRID_LINES + 1);
            (every, every)
        } else {
            (substep, us_per_line)
        };

        let mut x = first.div_euclid(label_every) * label_every;
        while x <= last_bar {
            let scaled_x = x as f64 / self.us_per_pixel();

            let data = Data::new()
                .move_to((scaled_x, 0))
                .line_by((0, box_height))
                .close();

            let mut path = Svg::Path::new().set("d", data);

            if x % label_every == 0 {
                let text = Svg::Text::new(format_elapsed(x as f64))
                    .set("class", "label")
                    .set("x", scaled_x)
                    .set("y", -5);
                g = g.add(text);
            } else {
                path = path.set("class", "subline");
            }

            g = g.add(path);
            x += step;
        }

        g
    }

    fn render_actor(&self, output: Svg::Group, y: f64, right_edge_pixel: f64, actor: &Actor) -> Svg::Group {
        let mut g = Svg::Group::new().set("class", "actor");
        if let Some(tooltip) = &actor.tooltip {
            g = g.add(title(tooltip));
        }

        for event in &actor.events {
            let x = self.us_to_pixel(event.start);
            let width = match event.span {
                Span::Bounded(duration) => self.us_to_pixel(duration.as_offset()),
                Span::Endless => (right_edge_pixel - x).max(0.0),
            };

            let mut state = Svg::Rectangle::new()
                .set("class", "span")
                .set("fill", event.color.css())
                .set("width", width)
                .set("height", self.opts.pixels_per_actor - 2.0 * self.opts.actor_margin)
                .set("x", x)
                .set("y", y + self.opts.actor_margin);
            if let Some(tooltip) = &event.tooltip {
                state = state.add(title(tooltip));
            }

            g = g.add(state);
        }

        // Label the lane at the start of its first event
        if let Some(first) = actor.events.first() {
            let start = self.us_to_pixel(first.start);
            let (class, padding) = if start < right_edge_pixel / 2.0 {
                ("left", self.opts.actor_name_padding)
            } else {
                ("right", -self.opts.actor_name_padding)
            };

            let text = Svg::Text::new(actor.name.clone())
                .set("class", class)
                .set("x", start + padding)
                // Assume the font is about 80% of the line height
                .set("y", y + self.opts.pixels_per_actor * 0.8);

            g = g.add(text);
        }

        output.add(g)
    }

    fn render_cursor(&self, mut document: Document, scale: &ChartScale, box_height: f64) -> Document {
        let line = Svg::Line::new()
            .set("id", CURSOR_LINE_ID)
            .set("class", "cursor")
            .set("x1", -10)
            .set("x2", -10)
            .set("y1", scale.header_height)
            .set("y2", scale.header_height + box_height);
        let label = Svg::Text::new("")
            .set("id", CURSOR_LABEL_ID)
            .set("class", "cursor")
            .set("x", -10)
            .set("y", -10);
        document = document.add(line).add(label);

        if let Some((loader, wasm)) = self.overlay.hrefs() {
            let mut glue = Element::new("script");
            glue.assign("href", loader);
            let mut boot = Element::new("script");
            boot.append(TextNode::new(format!("wasm_bindgen({wasm:?});")));
            document = document.add(glue).add(boot);
        }
        document
    }

    pub fn render(&self, timeline: &Timeline) -> Result<Document> {
        let first_event_time = timeline.earliest_start();
        let last_event_time = timeline.right_edge();

        let actors: Vec<&Actor> = timeline.actors().filter(|a| !a.events.is_empty()).collect();

        let scale = self.scale(timeline);
        let box_width = self.us_to_pixel(last_event_time) - self.us_to_pixel(first_event_time);
        let box_height = actors.len() as f64 * self.opts.pixels_per_actor;

        let mut document = Document::new()
            .set("width", box_width + 2.0 * self.opts.side_margin)
            .set("height", box_height + scale.header_height + self.opts.top_margin);
        for (name, value) in scale.attributes() {
            document = document.set(name, value);
        }

        let state = chart::encode_state(&self.opts, &self.overlay, timeline)?;
        document = document.add(Comment::new(state));

        document = document.add(Svg::Definitions::new().add(Svg::Style::new(CSS)));
        document = self.render_heading(document);

        let mut g = Svg::Group::new().set(
            "transform",
            format!("translate({}, {})", scale.left_offset, scale.header_height),
        );
        g = self.render_lines(g, first_event_time, last_event_time, box_height);

        let right_edge_pixel = self.us_to_pixel(last_event_time);
        let mut y = 0.0;
        for actor in actors {
            g = self.render_actor(g, y, right_edge_pixel, actor);
            y += self.opts.pixels_per_actor;
        }

        document = document.add(g);
        Ok(self.render_cursor(document, &scale, box_height))
    }

    pub fn save(&self, path: impl AsRef<Path>, timeline: &Timeline) -> Result<()> {
        let path = path.as_ref();
        let document = self.render(timeline)?;
        svg::save(path, &document).with_context(|| format!("Failed to save svg: {}", path.display()))
    }
}

fn title(text: &str) -> Element {
    let mut title = Element::new("title");
    title.append(TextNode::new(text));
    title
}
