//! Charts as editable documents: the rendered SVG carries its own state.
//!
//! The render options and the timeline are stored as JSON in a comment at the
//! top of the document, so a chart can be reopened, extended and redrawn
//! without the data it was first built from.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use shared::{OverlaySection, RenderSection, Timeline};
use std::fs;
use std::path::Path;

use crate::render::Renderer;

#[derive(Serialize)]
struct ChartStateRef<'a> {
    render: &'a RenderSection,
    overlay: &'a OverlaySection,
    timeline: &'a Timeline,
}

/// Everything needed to redraw a chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartState {
    pub render: RenderSection,
    #[serde(default)]
    pub overlay: OverlaySection,
    pub timeline: Timeline,
}

impl ChartState {
    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.render.clone(), self.overlay.clone())
    }
}

/// JSON text safe to place inside an XML comment.
pub fn encode_state(render: &RenderSection, overlay: &OverlaySection, timeline: &Timeline) -> Result<String> {
    let json = serde_json::to_string(&ChartStateRef {
        render,
        overlay,
        timeline,
    })?;
    // "--" may not appear in a comment; it can only occur inside JSON strings
    Ok(json.replace("--", "-\\u002d"))
}

/// Recover the chart state embedded in a rendered document.
pub fn load_document(content: &str) -> Result<ChartState> {
    let parser = svg::read(content).context("Failed to parse svg")?;

    for item in parser {
        if let svg::parser::Event::Comment(comment) = item {
            let body = comment.strip_prefix("<!--").unwrap_or(comment);
            let body = body.strip_suffix("-->").unwrap_or(body).trim();
            if body.starts_with('{') {
                return serde_json::from_str(body).context("Failed to parse chart state");
            }
        }
    }

    bail!("Failed to find chart state")
}

pub fn open(path: impl AsRef<Path>) -> Result<ChartState> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read chart: {}", path.display()))?;
    load_document(&content).with_context(|| format!("Failed to load chart: {}", path.display()))
}

pub fn save(path: impl AsRef<Path>, state: &ChartState) -> Result<()> {
    state.renderer().save(path, &state.timeline)
}
