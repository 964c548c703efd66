//! Boot timeline charts: collect unit timestamps, extract the timeline and
//! render it as an SVG that carries its own state and time-axis overlay hooks.

pub mod chart;
pub mod collect;
pub mod config;
pub mod render;
