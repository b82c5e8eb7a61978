//! Frame composition - decouples what is drawn from GPU execution
//!
//! [`compose`] walks the session and emits draw commands in paint order; the
//! GPU renderer executes them. Nothing is cached between frames.

use crate::layout::{self, Rect};
use crate::session::EditorSession;
use crate::theme::Theme;

/// High-level drawing operations
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole frame
    Clear(u32),
    /// One line of text with its top-left corner at (x, y)
    Text {
        text: String,
        x: f32,
        y: f32,
        color: u32,
    },
    /// Unfilled rectangle, 1px border
    Outline { rect: Rect, color: u32 },
}

/// Build the draw list for one frame
pub fn compose(session: &EditorSession, banner: &str, theme: &Theme) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(session.len() + 4);

    commands.push(DrawCommand::Clear(theme.background));

    let (x, y) = layout::BANNER_POS;
    commands.push(DrawCommand::Text {
        text: banner.to_string(),
        x,
        y,
        color: theme.text,
    });

    for (i, file) in session.files().iter().enumerate() {
        let (x, y) = layout::tab_label_pos(i);
        let color = if session.current_index() == Some(i) {
            theme.accent
        } else {
            theme.text
        };
        commands.push(DrawCommand::Text {
            text: file.name().to_string(),
            x,
            y,
            color,
        });
    }

    commands.push(DrawCommand::Outline {
        rect: layout::EDITOR_PANE,
        color: theme.pane_outline,
    });

    match session.current_file() {
        Some(file) if !file.text().is_empty() => {
            let (x, y) = layout::text_origin();
            commands.push(DrawCommand::Text {
                text: file.text().to_string(),
                x,
                y,
                color: theme.text,
            });
        }
        Some(_) => tracing::trace!("text buffer is empty, skipping rendering"),
        None => tracing::trace!("no active file, skipping rendering"),
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(commands: &[DrawCommand]) -> Vec<(&str, f32, f32, u32)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, x, y, color } => Some((text.as_str(), *x, *y, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_paint_order() {
        let mut session = EditorSession::default();
        session.open_new_file("main.c").unwrap();
        session.current_file_mut().unwrap().insert_char('x');

        let commands = compose(&session, "Hello", &Theme::default());
        assert!(matches!(commands[0], DrawCommand::Clear(_)));
        assert!(matches!(commands[1], DrawCommand::Text { ref text, .. } if text == "Hello"));
        assert!(matches!(commands[2], DrawCommand::Text { ref text, .. } if text == "main.c"));
        assert!(matches!(commands[3], DrawCommand::Outline { .. }));
        assert!(matches!(commands[4], DrawCommand::Text { ref text, .. } if text == "x"));
        assert_eq!(commands.len(), 5);
    }

    #[test]
    fn test_active_tab_uses_accent() {
        let theme = Theme::default();
        let mut session = EditorSession::default();
        session.open_new_file("a.c").unwrap();
        session.open_new_file("b.c").unwrap();

        let commands = compose(&session, "", &theme);
        let labels = texts(&commands);
        assert_eq!(labels[1], ("a.c", 10.0, 80.0, theme.text));
        assert_eq!(labels[2], ("b.c", 160.0, 80.0, theme.accent));
    }

    #[test]
    fn test_empty_buffer_skipped() {
        let mut session = EditorSession::default();
        session.open_new_file("main.c").unwrap();
        let commands = compose(&session, "Hello", &Theme::default());
        assert!(matches!(commands.last(), Some(DrawCommand::Outline { .. })));
    }

    #[test]
    fn test_text_inside_pane() {
        let mut session = EditorSession::default();
        session.open_new_file("main.c").unwrap();
        session.current_file_mut().unwrap().insert_char('q');
        let commands = compose(&session, "", &Theme::default());
        let last = texts(&commands).pop().unwrap();
        assert_eq!((last.1, last.2), (15.0, 155.0));
    }
}
