//! The built-in strategies, in the order the standard chain runs them.

mod demo;
mod embedded;
mod endpoint;
mod table;
mod text;

pub use demo::{DEMO_ROWS, DemoFallback};
pub use embedded::{EmbeddedState, STATE_MARKERS};
pub use endpoint::EndpointProbe;
pub use table::{MAX_TABLE_ROWS, TableScan};
pub use text::{SENTIMENT_LABELS, STOPLIST, TextHit, TextPatternScan, is_value_token, scan_text};
