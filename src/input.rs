//! Event processing - turns platform input into editor state changes
//!
//! winit events are first reduced to [`InputEvent`], which carries only what
//! the editor reacts to. [`EventProcessor::apply`] then mutates the session.

use crate::layout;
use crate::session::EditorSession;
use std::path::PathBuf;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Keys the editor distinguishes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    Backspace,
    Char(char),
    Other,
}

/// A key press together with the modifier state at the time it happened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInput {
    pub key: EditorKey,
    pub shift: bool,
    /// Ctrl, or Cmd on macOS
    pub command: bool,
}

impl KeyInput {
    pub fn plain(key: EditorKey) -> Self {
        Self {
            key,
            shift: false,
            command: false,
        }
    }

    pub fn shifted(key: EditorKey) -> Self {
        Self {
            key,
            shift: true,
            command: false,
        }
    }

    pub fn command(key: EditorKey) -> Self {
        Self {
            key,
            shift: false,
            command: true,
        }
    }
}

/// Editor-level input event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Quit,
    /// Pointer press at a logical position
    PointerPress { x: f32, y: f32 },
    Key(KeyInput),
}

/// What applying an event did
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Quit,
    Switched(usize),
    Edited,
    Saved(PathBuf),
    Opened(usize),
    /// The operation was attempted and refused (full buffer, no slots, failed save)
    Rejected,
    Ignored,
}

/// Printable ASCII, space through tilde
pub fn is_printable(ch: char) -> bool {
    (' '..='~').contains(&ch)
}

/// Reduce a winit key event to a [`KeyInput`]. Releases yield `None`.
pub fn key_input(event: &KeyEvent, modifiers: ModifiersState) -> Option<KeyInput> {
    if event.state != ElementState::Pressed {
        return None;
    }

    let key = match &event.logical_key {
        Key::Named(NamedKey::Backspace) => EditorKey::Backspace,
        Key::Named(NamedKey::Space) => EditorKey::Char(' '),
        Key::Character(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => EditorKey::Char(ch),
                _ => EditorKey::Other,
            }
        }
        _ => EditorKey::Other,
    };

    Some(KeyInput {
        key,
        shift: modifiers.shift_key(),
        command: modifiers.control_key() || modifiers.super_key(),
    })
}

/// Left-button press at the last known pointer position. Other buttons and
/// releases yield `None`.
pub fn pointer_press(
    state: ElementState,
    button: MouseButton,
    cursor: (f32, f32),
) -> Option<InputEvent> {
    match (state, button) {
        (ElementState::Pressed, MouseButton::Left) => Some(InputEvent::PointerPress {
            x: cursor.0,
            y: cursor.1,
        }),
        _ => None,
    }
}

/// Applies input events to an [`EditorSession`]
#[derive(Clone, Debug)]
pub struct EventProcessor {
    new_file_prefix: String,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl EventProcessor {
    pub fn new(new_file_prefix: impl Into<String>) -> Self {
        Self {
            new_file_prefix: new_file_prefix.into(),
        }
    }

    pub fn apply(&self, session: &mut EditorSession, event: InputEvent) -> Outcome {
        match event {
            InputEvent::Quit => Outcome::Quit,
            InputEvent::PointerPress { x, y } => match layout::tab_at(x, y, session.len()) {
                Some(index) => {
                    session.switch_to(index);
                    Outcome::Switched(index)
                }
                None => Outcome::Ignored,
            },
            InputEvent::Key(input) if input.command => self.apply_shortcut(session, input.key),
            InputEvent::Key(input) => apply_edit(session, input),
        }
    }

    fn apply_shortcut(&self, session: &mut EditorSession, key: EditorKey) -> Outcome {
        let EditorKey::Char(ch) = key else {
            return Outcome::Ignored;
        };

        match ch.to_ascii_lowercase() {
            's' => match session.save_current_file() {
                Ok(path) => Outcome::Saved(path),
                Err(_) => Outcome::Rejected,
            },
            'n' => {
                let name = format!("{}-{}.txt", self.new_file_prefix, session.len() + 1);
                match session.open_new_file(&name) {
                    Ok(index) => Outcome::Opened(index),
                    Err(_) => Outcome::Rejected,
                }
            }
            _ => Outcome::Ignored,
        }
    }
}

fn apply_edit(session: &mut EditorSession, input: KeyInput) -> Outcome {
    if matches!(input.key, EditorKey::Other) {
        return Outcome::Ignored;
    }

    let Some(file) = session.current_file_mut() else {
        tracing::warn!(key = ?input.key, "key press with no active file");
        return Outcome::Ignored;
    };

    match input.key {
        EditorKey::Backspace => {
            if file.backspace() {
                Outcome::Edited
            } else {
                Outcome::Ignored
            }
        }
        EditorKey::Char(ch) if is_printable(ch) => {
            let ch = if input.shift {
                ch.to_ascii_uppercase()
            } else {
                ch.to_ascii_lowercase()
            };
            if file.insert_char(ch) {
                Outcome::Edited
            } else {
                tracing::debug!(name = file.name(), "buffer full, dropping key");
                Outcome::Rejected
            }
        }
        _ => Outcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(names: &[&str]) -> EditorSession {
        let mut session = EditorSession::default();
        for name in names {
            session.open_new_file(name).unwrap();
        }
        session
    }

    #[test]
    fn test_printable_range() {
        assert!(is_printable(' '));
        assert!(is_printable('~'));
        assert!(is_printable('a'));
        assert!(!is_printable('\u{7f}'));
        assert!(!is_printable('\t'));
        assert!(!is_printable('é'));
    }

    #[test]
    fn test_shift_controls_case() {
        let processor = EventProcessor::default();
        let mut session = session_with(&["main.c"]);
        processor.apply(&mut session, InputEvent::Key(KeyInput::plain(EditorKey::Char('A'))));
        processor.apply(&mut session, InputEvent::Key(KeyInput::shifted(EditorKey::Char('b'))));
        processor.apply(&mut session, InputEvent::Key(KeyInput::shifted(EditorKey::Char('1'))));
        assert_eq!(session.current_file().unwrap().text(), "aB1");
    }

    #[test]
    fn test_non_printable_ignored() {
        let processor = EventProcessor::default();
        let mut session = session_with(&["main.c"]);
        let outcome =
            processor.apply(&mut session, InputEvent::Key(KeyInput::plain(EditorKey::Char('\t'))));
        assert_eq!(outcome, Outcome::Ignored);
        let outcome = processor.apply(&mut session, InputEvent::Key(KeyInput::plain(EditorKey::Other)));
        assert_eq!(outcome, Outcome::Ignored);
        assert!(!session.current_file().unwrap().is_modified());
    }

    #[test]
    fn test_keys_without_active_file() {
        let processor = EventProcessor::default();
        let mut session = EditorSession::default();
        let outcome =
            processor.apply(&mut session, InputEvent::Key(KeyInput::plain(EditorKey::Char('a'))));
        assert_eq!(outcome, Outcome::Ignored);
        let outcome =
            processor.apply(&mut session, InputEvent::Key(KeyInput::plain(EditorKey::Backspace)));
        assert_eq!(outcome, Outcome::Ignored);
    }

    #[test]
    fn test_command_keys_do_not_insert() {
        let processor = EventProcessor::default();
        let mut session = session_with(&["main.c"]);
        let outcome =
            processor.apply(&mut session, InputEvent::Key(KeyInput::command(EditorKey::Char('q'))));
        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(session.current_file().unwrap().text(), "");
    }

    #[test]
    fn test_new_file_shortcut() {
        let processor = EventProcessor::new("scratch");
        let mut session = session_with(&["main.c"]);
        let outcome =
            processor.apply(&mut session, InputEvent::Key(KeyInput::command(EditorKey::Char('n'))));
        assert_eq!(outcome, Outcome::Opened(1));
        assert_eq!(session.current_file().unwrap().name(), "scratch-2.txt");
    }

    #[test]
    fn test_pointer_press_switches() {
        let processor = EventProcessor::default();
        let mut session = session_with(&["a.c", "b.c", "c.c"]);
        let outcome = processor.apply(&mut session, InputEvent::PointerPress { x: 20.0, y: 95.0 });
        assert_eq!(outcome, Outcome::Switched(0));
        assert_eq!(session.current_index(), Some(0));

        let outcome = processor.apply(&mut session, InputEvent::PointerPress { x: 400.0, y: 300.0 });
        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(session.current_index(), Some(0));
    }

    #[test]
    fn test_only_left_press_is_pointer_press() {
        let cursor = (20.0, 95.0);
        assert_eq!(
            pointer_press(ElementState::Pressed, MouseButton::Left, cursor),
            Some(InputEvent::PointerPress { x: 20.0, y: 95.0 })
        );
        assert_eq!(pointer_press(ElementState::Released, MouseButton::Left, cursor), None);
        assert_eq!(pointer_press(ElementState::Pressed, MouseButton::Right, cursor), None);
        assert_eq!(pointer_press(ElementState::Pressed, MouseButton::Middle, cursor), None);
    }

    #[test]
    fn test_quit() {
        let processor = EventProcessor::default();
        let mut session = session_with(&["main.c"]);
        assert_eq!(processor.apply(&mut session, InputEvent::Quit), Outcome::Quit);
    }
}
