#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod app;
pub mod config;
pub mod error;
pub mod font;
pub mod gpu;
pub mod input;
pub mod layout;
pub mod render;
pub mod session;
pub mod theme;

// Re-export core types
pub use app::EditorApp;
pub use config::AppConfig;
pub use error::{InitError, RenderError, SessionError};
pub use input::{EditorKey, EventProcessor, InputEvent, KeyInput, Outcome};
pub use layout::Rect;
pub use render::DrawCommand;
pub use session::{EditorSession, SourceFile, TextBuffer};
