pub mod config;
pub mod extract;
pub mod scale;
pub mod time;
pub mod time_format;
pub mod timeline;
pub mod timestamps;

// ===== RE-EXPORTS =====

pub use config::{AppSection, BootlineConfig, CollectSection, ConfigError, OverlaySection, RenderSection};
pub use extract::{Palette, UnitPhases, boot_stage_events, build_timeline};
pub use scale::{ChartScale, ScaleError};
pub use time::{DurationUs, TimeUs};
pub use time_format::format_elapsed;
pub use timeline::{Actor, ColorParseError, Event, Rgb, Span, Timeline, TimelineError};
pub use timestamps::{BootMilestones, RawBootRecord, RawUnitTimestamps, UnitTimestamps};
