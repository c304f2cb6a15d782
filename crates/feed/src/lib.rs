// ABOUTME: Core feed resolution library for castpull.
// ABOUTME: Turns RSS/Atom documents into ordered, filename-safe download plans.

pub mod date_ext;
pub mod error;
pub mod filename;
pub mod models;
pub mod resolver;
pub mod time_parse;

pub use error::FeedError;
pub use filename::{audio_extension, derive_filename, sanitize_component};
pub use models::{DownloadPlan, EnclosureCandidate, Resolution};
pub use resolver::resolve_plans;
pub use time_parse::parse_flexible_time;
