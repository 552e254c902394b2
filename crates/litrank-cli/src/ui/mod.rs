//! # CLI UI Module
//!
//! Styling and formatting layer for litrank output.
//!
//! Human output uses prefixed messages (`[ok]`, `[err]`, ...) and borderless
//! tables; every query command also has a `--json` form for scripts.
//! Colors follow `--color` and `NO_COLOR`.
//!
//! ## Module Structure
//!
//! - `color`: color mode detection and terminal width
//! - `style`: message types, prefixes and styling functions
//! - `format`: value and text formatters
//! - `table`: table rendering with comfy-table
//! - `progress`: progress bar for imports

pub mod color;
pub mod format;
pub mod progress;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use progress::{Progress, ProgressMode};
pub use style::{MessageType, Style};
