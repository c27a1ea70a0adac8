use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::document::ListKind;
use crate::editor::Motion;

/// Everything a key press can ask the editor or its host to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleList(ListKind),
    Indent,
    Dedent,
    ToggleChecked,
    Enter,
    Backspace,
    Delete,
    Move { motion: Motion, extend: bool },
    SelectAll,
    Insert(char),
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    Save,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    pub const fn alt(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), KeyModifiers::ALT)
    }

    /// Characters carry their own case and terminals report back-tab with
    /// or without shift, so shift is only significant for the other keys.
    fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.code != code {
            return false;
        }
        match code {
            KeyCode::Char(_) | KeyCode::BackTab => {
                self.modifiers.difference(KeyModifiers::SHIFT)
                    == modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => self.modifiers == modifiers,
        }
    }
}

/// Key bindings, resolved first to last.
#[derive(Clone, Debug, PartialEq)]
pub struct Keymap {
    bindings: Vec<(KeyBinding, Command)>,
}

impl Keymap {
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Binds `binding` to `command`, replacing an earlier binding of the key.
    pub fn bind(mut self, binding: KeyBinding, command: Command) -> Self {
        self.bindings.retain(|(existing, _)| *existing != binding);
        self.bindings.push((binding, command));
        self
    }

    pub fn unbind(mut self, binding: KeyBinding) -> Self {
        self.bindings.retain(|(existing, _)| *existing != binding);
        self
    }

    pub fn bindings(&self) -> &[(KeyBinding, Command)] {
        &self.bindings
    }

    /// Command for `event`. Unbound printable characters typed without
    /// control or alt insert themselves.
    pub fn resolve(&self, event: &KeyEvent) -> Option<Command> {
        let bound = self
            .bindings
            .iter()
            .find(|(binding, _)| binding.matches(event.code, event.modifiers))
            .map(|(_, command)| *command);
        if bound.is_some() {
            return bound;
        }
        match event.code {
            KeyCode::Char(ch)
                if !event.modifiers.contains(KeyModifiers::CONTROL)
                    && !event.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Command::Insert(ch))
            }
            _ => None,
        }
    }

    /// First binding of `command`, for help texts.
    pub fn binding_for(&self, command: Command) -> Option<KeyBinding> {
        self.bindings
            .iter()
            .find(|(_, bound)| *bound == command)
            .map(|(binding, _)| *binding)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        let shift = KeyModifiers::SHIFT;
        let ctrl = KeyModifiers::CONTROL;
        let mut keymap = Self::empty()
            .bind(KeyBinding::alt('7'), Command::ToggleList(ListKind::Ordered))
            .bind(KeyBinding::alt('8'), Command::ToggleList(ListKind::Unordered))
            .bind(KeyBinding::alt('9'), Command::ToggleList(ListKind::Task))
            .bind(KeyBinding::plain(KeyCode::Tab), Command::Indent)
            .bind(KeyBinding::plain(KeyCode::BackTab), Command::Dedent)
            .bind(KeyBinding::ctrl('t'), Command::ToggleChecked)
            .bind(KeyBinding::plain(KeyCode::Enter), Command::Enter)
            .bind(KeyBinding::plain(KeyCode::Backspace), Command::Backspace)
            .bind(KeyBinding::plain(KeyCode::Delete), Command::Delete)
            .bind(KeyBinding::ctrl('a'), Command::SelectAll)
            .bind(KeyBinding::ctrl('z'), Command::Undo)
            .bind(KeyBinding::ctrl('y'), Command::Redo)
            .bind(KeyBinding::ctrl('c'), Command::Copy)
            .bind(KeyBinding::ctrl('x'), Command::Cut)
            .bind(KeyBinding::ctrl('v'), Command::Paste)
            .bind(KeyBinding::ctrl('s'), Command::Save)
            .bind(KeyBinding::ctrl('q'), Command::Quit);

        let motions = [
            (KeyCode::Left, KeyModifiers::NONE, Motion::Left),
            (KeyCode::Right, KeyModifiers::NONE, Motion::Right),
            (KeyCode::Left, ctrl, Motion::WordLeft),
            (KeyCode::Right, ctrl, Motion::WordRight),
            (KeyCode::Up, KeyModifiers::NONE, Motion::Up),
            (KeyCode::Down, KeyModifiers::NONE, Motion::Down),
            (KeyCode::Home, KeyModifiers::NONE, Motion::LineStart),
            (KeyCode::End, KeyModifiers::NONE, Motion::LineEnd),
            (KeyCode::Home, ctrl, Motion::DocumentStart),
            (KeyCode::End, ctrl, Motion::DocumentEnd),
        ];
        for (code, modifiers, motion) in motions {
            keymap = keymap
                .bind(
                    KeyBinding::new(code, modifiers),
                    Command::Move {
                        motion,
                        extend: false,
                    },
                )
                .bind(
                    KeyBinding::new(code, modifiers | shift),
                    Command::Move {
                        motion,
                        extend: true,
                    },
                );
        }
        keymap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn default_bindings_cover_list_commands() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.resolve(&key(KeyCode::Tab, KeyModifiers::NONE)),
            Some(Command::Indent)
        );
        assert_eq!(
            keymap.resolve(&key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Command::Dedent)
        );
        assert_eq!(
            keymap.resolve(&key(KeyCode::Char('9'), KeyModifiers::ALT)),
            Some(Command::ToggleList(ListKind::Task))
        );
    }

    #[test]
    fn shift_extends_motions() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.resolve(&key(KeyCode::Left, KeyModifiers::SHIFT | KeyModifiers::CONTROL)),
            Some(Command::Move {
                motion: Motion::WordLeft,
                extend: true
            })
        );
    }

    #[test]
    fn unbound_characters_are_inserted() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.resolve(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(Command::Insert('A'))
        );
        assert_eq!(keymap.resolve(&key(KeyCode::Char('k'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn rebinding_replaces_previous_command() {
        let keymap = Keymap::default()
            .bind(KeyBinding::ctrl('t'), Command::Quit)
            .unbind(KeyBinding::plain(KeyCode::Tab));
        assert_eq!(
            keymap.resolve(&key(KeyCode::Char('t'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(keymap.resolve(&key(KeyCode::Tab, KeyModifiers::NONE)), None);
        assert_eq!(keymap.binding_for(Command::ToggleChecked), None);
    }
}
