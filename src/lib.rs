pub mod background;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod dom;
pub mod metrics;
pub mod overlay;
pub mod palette;
pub mod parser;
pub mod pipeline;
pub mod prune;

pub use color::Color;
pub use config::{OverlayConfig, Unit};
pub use metrics::CanvasMetrics;
pub use overlay::Edited;
pub use parser::ParseError;
pub use pipeline::{annotate, AnnotateRequest, Annotation, TRANSPARENT};
pub use prune::PruneOutcome;

#[cfg(feature = "cli")]
pub use cli::run;
