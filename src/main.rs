//! Wavescroll - a scrolling bar-graph audio visualizer
//!
//! Analyzes a WAV track into a fixed-length envelope of peak amplitudes,
//! plays the track, and scrolls the bars the playback position has reached
//! across the window.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use wavescroll::analysis::{AudioTrack, Envelope};
use wavescroll::cli::Args;
use wavescroll::params::RenderConfig;
use wavescroll::playback::PlaybackSystem;
use wavescroll::rendering::RenderSystem;
use wavescroll::timeline::{envelope_index, ScrollBuffer};

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Playback (holds the output stream and the playback reference)
    playback: Option<PlaybackSystem>,

    // Session data, immutable after analysis
    track: AudioTrack,
    envelope: Envelope,
    duration_s: f32,

    // Per-tick state
    scroll: ScrollBuffer,

    // Configuration
    render_config: RenderConfig,
}

impl App {
    fn new(track: AudioTrack, envelope: Envelope, render_config: RenderConfig) -> Self {
        let duration_s = track.duration_s();
        let scroll = ScrollBuffer::new(render_config.scroll_capacity());

        Self {
            window: None,
            render_system: None,
            playback: None,
            track,
            envelope,
            duration_s,
            scroll,
            render_config,
        }
    }

    /// Drive a single frame: read the clock, advance the scroll buffer,
    /// hand the visible bars to rendering.
    fn frame(&mut self) {
        let Some(ref render_system) = self.render_system else {
            return;
        };
        let Some(ref playback) = self.playback else {
            return;
        };

        let index = envelope_index(playback.elapsed_s(), self.duration_s, self.envelope.len());
        self.scroll.on_tick(index, &self.envelope);

        let bars: Vec<f32> = self.scroll.values().collect();
        if let Err(e) = render_system.render(&bars) {
            error!("render error: {e:?}");
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Wavescroll")
            .with_inner_size(PhysicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        // Backend init failures are fatal: surface them and stop before the
        // tick loop ever runs.
        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.render_config.clone(),
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                error!("{e}");
                event_loop.exit();
                return;
            }
        };

        let playback = match PlaybackSystem::start(&self.track) {
            Ok(playback) => playback,
            Err(e) => {
                error!("{e}");
                event_loop.exit();
                return;
            }
        };

        info!(
            "playing {} ({:.1}s)",
            self.track.path().display(),
            self.duration_s
        );

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.playback = Some(playback);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => {}
        }
    }
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();

    let analysis_config = args.analysis_config();
    analysis_config.validate()?;

    let render_config = args.render_config();
    render_config.validate()?;

    // Decode once; analyzer and playback share the same track.
    let track = AudioTrack::load(&args.file)?;
    let envelope = Envelope::from_track(&track, &analysis_config)?;

    info!(
        channels = track.channels,
        sample_rate = track.sample_rate,
        duration_s = track.duration_s(),
        bars = envelope.len(),
        capacity = render_config.scroll_capacity(),
        "track analyzed"
    );

    let mut app = App::new(track, envelope, render_config);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.run_app(&mut app).context("event loop failed")?;

    Ok(())
}
