//! Flat list items for structured text editors.
//!
//! Lists are stored as sibling blocks carrying an `indent` level instead of
//! nested list containers. The editor keeps the indents on a staircase,
//! recomputes ordered counters after every change, normalizes the indents
//! of pasted fragments and folds the flat items back into nested HTML lists
//! on export.

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod html;
pub mod keymap;
pub mod paste;
pub mod postprocess;
pub mod render;
pub mod schema;
pub mod selection;
pub mod theme;
pub mod transaction;

pub use config::EditorConfig;
pub use document::{Block, BlockPath, Document, InlineStyle, ListItem, ListKind, ListVariant, Span};
pub use editor::{Editor, ListAttrs, Motion};
pub use error::{ListError, StepError};
pub use html::{document_to_html, fold_lists, parse_html, ExportTarget};
pub use keymap::{Command, KeyBinding, Keymap};
pub use paste::{PasteContext, Slice};
pub use schema::Schema;
pub use selection::{Position, Selection};
pub use transaction::{Step, Transaction};
