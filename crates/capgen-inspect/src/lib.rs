//! The run-time side of a capture.
//!
//! Generated interceptors embed the captured expression as module text built
//! by [`CaptureSnippet`]. Consumers re-parse that text, pull the expression
//! back out, and either inspect the syntax tree directly or lower it into the
//! closed [`CapturedExpr`] grammar. [`OuterCaptures`] reports identifiers the
//! expression reads from its surroundings, which cannot survive the trip.

mod error;
mod free_vars;
mod lower;
mod reparse;

pub use error::InspectError;
pub use free_vars::OuterCaptures;
pub use lower::lower_capture;
pub use lower::CapturedExpr;
pub use lower::Literal;
pub use lower::Lowering;
pub use reparse::escape_triple_quoted;
pub use reparse::locate_binding;
pub use reparse::CaptureSnippet;
