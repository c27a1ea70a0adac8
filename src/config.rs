use crate::keymap::Keymap;
use crate::schema::Schema;

const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Editor-wide settings.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub schema: Schema,
    /// Clamp staircase violations during the postprocess pass.
    pub repair_staircase: bool,
    /// Maximum number of undo snapshots kept.
    pub history_limit: usize,
    pub keymap: Keymap,
}

impl EditorConfig {
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_repair_staircase(mut self, enabled: bool) -> Self {
        self.repair_staircase = enabled;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            schema: Schema::default(),
            repair_staircase: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            keymap: Keymap::default(),
        }
    }
}
