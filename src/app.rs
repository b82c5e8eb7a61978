//! winit application - owns the window, GPU and font, and runs the frame loop
//!
//! The loop polls: every iteration drains pending events into the session,
//! then composes and presents a frame.

use crate::config::AppConfig;
use crate::error::InitError;
use crate::font::TextRasterizer;
use crate::gpu::GpuRenderer;
use crate::input::{self, EventProcessor, InputEvent, Outcome};
use crate::render;
use crate::session::EditorSession;
use crate::theme::Theme;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::ModifiersState,
    window::{Window, WindowId},
};

pub struct EditorApp {
    config: AppConfig,

    // Platform resources, created on resume
    window: Option<Arc<Window>>,
    renderer: Option<GpuRenderer>,
    rasterizer: Option<TextRasterizer>,

    session: EditorSession,
    processor: EventProcessor,
    theme: Theme,

    modifiers: ModifiersState,
    /// Last pointer position in logical pixels
    cursor: (f32, f32),
    quit: bool,
    init_error: Option<InitError>,
}

impl EditorApp {
    /// Build the app with its startup file already open
    pub fn new(config: AppConfig) -> Result<Self, InitError> {
        let mut session =
            EditorSession::new(config.limits.max_files, config.limits.buffer_capacity);
        session
            .open_new_file(&config.editor.initial_file)
            .map_err(|e| InitError::Config(format!("editor.initial_file: {e}")))?;

        Ok(Self {
            processor: EventProcessor::new(config.editor.new_file_prefix.clone()),
            config,
            window: None,
            renderer: None,
            rasterizer: None,
            session,
            theme: Theme::default(),
            modifiers: ModifiersState::default(),
            cursor: (0.0, 0.0),
            quit: false,
            init_error: None,
        })
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Run until the window is closed or startup fails
    pub fn run(mut self) -> Result<(), InitError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        match self.init_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), InitError> {
        let window_config = &self.config.window;
        tracing::info!(title = %window_config.title, "creating window");
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(&window_config.title)
                    .with_inner_size(LogicalSize::new(window_config.width, window_config.height))
                    .with_resizable(false),
            )?,
        );

        tracing::info!("initializing GPU renderer");
        let renderer = pollster::block_on(GpuRenderer::new(window.clone()))?;

        let scale_factor = window.scale_factor() as f32;
        let font_path = &self.config.editor.font_path;
        tracing::info!(path = %font_path.display(), scale_factor, "loading font");
        let rasterizer =
            TextRasterizer::load(font_path, self.config.editor.font_size * scale_factor)?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.rasterizer = Some(rasterizer);
        self.update_title();
        Ok(())
    }

    fn dispatch(&mut self, event: InputEvent) {
        match self.processor.apply(&mut self.session, event) {
            Outcome::Quit => self.quit = true,
            Outcome::Switched(_) | Outcome::Edited | Outcome::Saved(_) | Outcome::Opened(_) => {
                self.update_title()
            }
            Outcome::Rejected | Outcome::Ignored => {}
        }
    }

    /// "Tiny IDE - main.c*" while the active file has unsaved edits
    fn update_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let title = match self.session.current_file() {
            Some(file) => format!(
                "{} - {}{}",
                self.config.window.title,
                file.name(),
                if file.is_modified() { "*" } else { "" }
            ),
            None => self.config.window.title.clone(),
        };
        if window.title() != title {
            window.set_title(&title);
        }
    }

    fn render_frame(&mut self) {
        let (Some(window), Some(renderer), Some(rasterizer)) =
            (&self.window, &mut self.renderer, &mut self.rasterizer)
        else {
            return;
        };

        let size = window.inner_size();
        let scale_factor = window.scale_factor() as f32;
        let logical_viewport = (
            size.width as f32 / scale_factor,
            size.height as f32 / scale_factor,
        );

        let commands = render::compose(&self.session, &self.config.window.banner, &self.theme);
        if let Err(err) = renderer.render(&commands, rasterizer, logical_viewport) {
            tracing::warn!(%err, "frame dropped");
        }
    }
}

impl ApplicationHandler for EditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            tracing::error!(%err, "initialization failed");
            self.init_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.dispatch(InputEvent::Quit),

            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(window) = &self.window {
                    let logical = position.to_logical::<f32>(window.scale_factor());
                    self.cursor = (logical.x, logical.y);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(press) = input::pointer_press(state, button, self.cursor) {
                    self.dispatch(press);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = input::key_input(&event, self.modifiers) {
                    self.dispatch(InputEvent::Key(key));
                }
            }

            WindowEvent::Resized(physical_size) => {
                if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
                    renderer.resize(physical_size, window.scale_factor() as f32);
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size_px = self.config.editor.font_size * scale_factor as f32;
                match TextRasterizer::load(&self.config.editor.font_path, size_px) {
                    Ok(rasterizer) => self.rasterizer = Some(rasterizer),
                    Err(err) => tracing::warn!(%err, "keeping font at previous scale"),
                }
            }

            WindowEvent::RedrawRequested => self.render_frame(),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.quit {
            tracing::info!("goodbye");
            event_loop.exit();
        } else if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_opens_initial_file() {
        let app = EditorApp::new(AppConfig::default()).unwrap();
        let session = app.session();
        assert_eq!(session.len(), 1);
        assert_eq!(session.current_file().unwrap().name(), "main.c");
    }

    #[test]
    fn test_dispatch_quit_sets_flag() {
        let mut app = EditorApp::new(AppConfig::default()).unwrap();
        app.dispatch(InputEvent::Quit);
        assert!(app.quit);
    }

    #[test]
    fn test_bad_initial_file_is_init_error() {
        let mut config = AppConfig::default();
        config.editor.initial_file = "x".repeat(300);
        assert!(matches!(EditorApp::new(config), Err(InitError::Config(_))));
    }
}
