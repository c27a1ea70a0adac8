use log::{debug, warn};

use crate::config::EditorConfig;
use crate::document::{Block, Document, InlineStyle};
use crate::error::StepError;
use crate::html::{ClipboardSerializer, FoldingSerializer};
use crate::postprocess::{self, PostprocessOptions};
use crate::selection::Selection;
use crate::transaction::Transaction;

mod clipboard;
mod commands;
pub(crate) mod content;
mod cursor;
mod history;
mod input_rules;
mod inspect;
mod keys;

pub use commands::ListAttrs;
pub use content::{next_word_boundary, previous_word_boundary};
pub use cursor::Motion;
pub use input_rules::{match_input_rule, InputRule};

use cursor::normalize_selection;
use history::{History, Snapshot};

/// Editing state around a flat document: selection, pending inline style,
/// undo history and the clipboard serializer used for copy.
pub struct Editor {
    document: Document,
    selection: Selection,
    stored_style: Option<InlineStyle>,
    config: EditorConfig,
    history: History,
    clipboard_serializer: Box<dyn ClipboardSerializer>,
}

impl Editor {
    pub fn new(document: Document, config: EditorConfig) -> Self {
        let mut document = document;
        if document.first_textblock().is_none() {
            document.blocks.push(Block::empty_paragraph());
        }
        let options = PostprocessOptions {
            repair_staircase: config.repair_staircase,
        };
        if let Err(err) = postprocess::run(&mut document, options) {
            warn!("initial postprocess pass failed: {err}");
        }
        let selection = normalize_selection(&document, Selection::default());
        let history = History::new(config.history_limit);
        Self {
            document,
            selection,
            stored_style: None,
            config,
            history,
            clipboard_serializer: Box::new(FoldingSerializer),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = normalize_selection(&self.document, selection);
        self.stored_style = None;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn stored_style(&self) -> Option<InlineStyle> {
        self.stored_style
    }

    /// Style applied to the next inserted text.
    pub fn set_stored_style(&mut self, style: Option<InlineStyle>) {
        self.stored_style = style;
    }

    /// Installs the serializer used by [`Editor::copy_html`].
    pub fn set_clipboard_serializer(&mut self, serializer: Box<dyn ClipboardSerializer>) {
        self.clipboard_serializer = serializer;
    }

    /// Starts a transaction against the current state.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.document.clone(), self.selection.clone())
    }

    /// Commits `tx`: runs the postprocess pass on its result, appends the
    /// fixups to the same transaction and records one history entry.
    pub fn dispatch(&mut self, mut tx: Transaction) -> Result<(), StepError> {
        let style = if tx.stored_style_is_set() {
            tx.stored_style()
        } else if tx.doc_changed() || tx.selection() != &self.selection {
            None
        } else {
            self.stored_style
        };

        if tx.doc_changed() {
            let options = PostprocessOptions {
                repair_staircase: self.config.repair_staircase,
            };
            if let Some(plan) = postprocess::plan(tx.doc(), options) {
                postprocess::apply(&plan, &mut tx)?;
            }
        }

        let changed = tx.doc_changed();
        let record = changed && tx.add_to_history();
        let (document, selection) = tx.into_parts();
        if record {
            let previous = Snapshot {
                document: std::mem::replace(&mut self.document, document),
                selection: self.selection.clone(),
            };
            self.history.record(previous);
        } else if changed {
            self.document = document;
        }
        self.selection = normalize_selection(&self.document, selection);
        // Fixup steps must not clear the pending style.
        self.stored_style = style;
        Ok(())
    }

    /// Dispatches `tx`, logging instead of returning a failure.
    fn commit(&mut self, tx: Transaction) -> bool {
        match self.dispatch(tx) {
            Ok(()) => true,
            Err(err) => {
                debug!("transaction rejected: {err}");
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let current = Snapshot {
            document: self.document.clone(),
            selection: self.selection.clone(),
        };
        let Some(snapshot) = self.history.undo(current) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let current = Snapshot {
            document: self.document.clone(),
            selection: self.selection.clone(),
        };
        let Some(snapshot) = self.history.redo(current) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.selection = normalize_selection(&self.document, snapshot.selection);
        self.stored_style = None;
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod tests;
