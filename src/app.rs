use std::error::Error;
use std::num::NonZeroU32;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::raw_window_handle::HasWindowHandle;
use winit::window::{CursorGrabMode, Window, WindowAttributes};

use glutin::config::{Config, ConfigTemplateBuilder, GetGlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};

use glutin_winit::{DisplayBuilder, GlWindow};

use crate::renderer::Renderer;
use crate::scene::Scene;
use crate::settings::Settings;

/// Trackpads report pixels; scale them to roughly one wheel notch.
const PIXELS_PER_LINE: f64 = 20.0;

pub fn run_app(
    event_loop: winit::event_loop::EventLoop<()>,
    settings: Settings,
) -> Result<(), Box<dyn Error>> {
    let template = ConfigTemplateBuilder::new().with_depth_size(24);

    let display_builder =
        DisplayBuilder::new().with_window_attributes(Some(window_attributes(&settings)));

    let mut app = App::new(template, display_builder, settings);
    event_loop.run_app(&mut app)?;

    app.exit_state
}

struct App {
    template: ConfigTemplateBuilder,
    renderer: Option<Renderer>,
    // NOTE: `AppState` carries the `Window`, thus it should be dropped after everything else.
    state: Option<AppState>,
    gl_context: Option<PossiblyCurrentContext>,
    gl_display: GlDisplayCreationState,
    exit_state: Result<(), Box<dyn Error>>,
    scene: Scene,
    settings: Settings,
}

impl App {
    fn new(
        template: ConfigTemplateBuilder,
        display_builder: DisplayBuilder,
        settings: Settings,
    ) -> Self {
        Self {
            template,
            gl_display: GlDisplayCreationState::Builder(display_builder),
            exit_state: Ok(()),
            gl_context: None,
            state: None,
            renderer: None,
            scene: Scene::init(&settings),
            settings,
        }
    }

    fn request_redraw(&self) {
        if let Some(AppState { window, .. }) = self.state.as_ref() {
            window.request_redraw();
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Box<dyn Error>) {
        tracing::error!("{err}");
        self.exit_state = Err(err);
        event_loop.exit();
    }

    fn handle_key(
        &mut self,
        event_loop: &ActiveEventLoop,
        code: KeyCode,
        state: ElementState,
        repeat: bool,
    ) {
        let pressed = state == ElementState::Pressed;
        if self.scene.input.set_key(code, pressed) {
            return;
        }
        if !pressed || repeat {
            return;
        }
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::KeyB => {
                let blinn = self.scene.input.toggle_blinn();
                tracing::info!("Blinn-Phong {}", if blinn { "on" } else { "off" });
            }
            KeyCode::KeyV => {
                let variant = self.scene.cycle_variant();
                tracing::info!("Lighting variant {variant:?}");
            }
            _ => (),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let (window, gl_config) = match &self.gl_display {
            // We just created the event loop, so initialize the display, pick the config, and
            // create the context.
            GlDisplayCreationState::Builder(display_builder) => {
                let (window, gl_config) = match display_builder.clone().build(
                    event_loop,
                    self.template.clone(),
                    gl_config_picker,
                ) {
                    Ok((Some(window), gl_config)) => (window, gl_config),
                    Ok((None, _)) => {
                        return self.fail(event_loop, "Failed to create window".into());
                    }
                    Err(err) => return self.fail(event_loop, err),
                };

                tracing::info!(
                    "Picked a config with {} samples and {}-bit depth",
                    gl_config.num_samples(),
                    gl_config.depth_size()
                );

                // Mark the display as initialized to not recreate it on resume, since the
                // display is valid until we explicitly destroy it.
                self.gl_display = GlDisplayCreationState::Init;

                match create_gl_context(&window, &gl_config) {
                    Ok(context) => self.gl_context = Some(context.treat_as_possibly_current()),
                    Err(err) => return self.fail(event_loop, err.into()),
                }

                (window, gl_config)
            }
            GlDisplayCreationState::Init => {
                tracing::info!("Recreating window in `resumed`");
                let Some(gl_context) = self.gl_context.as_ref() else {
                    return self.fail(event_loop, "No GL context to resume".into());
                };
                // Pick the config which we already use for the context.
                let gl_config = gl_context.config();
                match glutin_winit::finalize_window(
                    event_loop,
                    window_attributes(&self.settings),
                    &gl_config,
                ) {
                    Ok(window) => (window, gl_config),
                    Err(err) => return self.fail(event_loop, err.into()),
                }
            }
        };

        let attrs = match window.build_surface_attributes(Default::default()) {
            Ok(attrs) => attrs,
            Err(err) => return self.fail(event_loop, err.into()),
        };
        let gl_surface = match unsafe {
            gl_config
                .display()
                .create_window_surface(&gl_config, &attrs)
        } {
            Ok(surface) => surface,
            Err(err) => return self.fail(event_loop, err.into()),
        };

        // The context needs to be current for the Renderer to set up shaders and
        // buffers. It also performs function loading, which needs a current context on
        // WGL.
        let Some(gl_context) = self.gl_context.as_ref() else {
            return self.fail(event_loop, "No GL context".into());
        };
        if let Err(err) = gl_context.make_current(&gl_surface) {
            return self.fail(event_loop, err.into());
        }

        let (settings, objects) = (&self.settings, &self.scene.objects);
        self.renderer
            .get_or_insert_with(|| Renderer::new(&gl_config.display(), settings, objects));

        // Try setting vsync.
        if let Err(res) = gl_surface
            .set_swap_interval(gl_context, SwapInterval::Wait(NonZeroU32::MIN))
        {
            tracing::warn!("Error setting vsync: {res:?}");
        }

        capture_cursor(&window);
        self.scene.input.set_captured(true);

        self.state = Some(AppState { gl_surface, window });
        self.request_redraw();
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        // This event is only raised on Android, where the backing NativeWindow for a GL
        // Surface can appear and disappear at any moment.
        tracing::info!("Android window removed");

        // Destroy the GL Surface and un-current the GL Context before ndk-glue releases
        // the window back to the system.
        self.state = None;

        if let Some(context) = self.gl_context.take() {
            match context.make_not_current() {
                Ok(context) => self.gl_context = Some(context.treat_as_possibly_current()),
                Err(err) => tracing::error!("Failed to release GL context: {err}"),
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) if size.width != 0 && size.height != 0 => {
                // Some platforms like EGL require resizing GL surface to update the size
                // Notable platforms here are Wayland and macOS, other don't require it
                // and the function is no-op, but it's wise to resize it for portability
                // reasons.
                if let (Some(AppState { gl_surface, .. }), Some(gl_context), Some(renderer)) = (
                    self.state.as_ref(),
                    self.gl_context.as_ref(),
                    self.renderer.as_ref(),
                ) {
                    if let (Some(width), Some(height)) =
                        (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                    {
                        gl_surface.resize(gl_context, width, height);
                    }
                    self.scene
                        .camera
                        .set_aspect(size.width as f32, size.height as f32);
                    renderer.resize(size.width as i32, size.height as i32);
                    tracing::debug!("Resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code, state, repeat),
            WindowEvent::Focused(false) => {
                self.scene.input.release_all();
                self.scene.input.set_captured(false);
            }
            WindowEvent::Focused(true) => {
                if let Some(AppState { window, .. }) = self.state.as_ref() {
                    capture_cursor(window);
                    self.scene.input.set_captured(true);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y_offset = match delta {
                    MouseScrollDelta::LineDelta(_, dy) => dy,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        (y / PIXELS_PER_LINE) as f32
                    }
                };
                self.scene.camera.process_mouse_scroll(y_offset);
            }
            WindowEvent::RedrawRequested => {
                if let (Some(AppState { gl_surface, window }), Some(gl_context), Some(renderer)) = (
                    self.state.as_ref(),
                    self.gl_context.as_ref(),
                    self.renderer.as_ref(),
                ) {
                    let delta_time = self.scene.clock.tick();
                    self.scene.update(delta_time);
                    renderer.draw(&self.scene);
                    if let Err(err) = gl_surface.swap_buffers(gl_context) {
                        tracing::error!("Failed to swap buffers: {err}");
                    }
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        // Raw motion keeps coming when the cursor is locked or pinned to an edge.
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.scene.look(dx, dy);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // GL resources must go while the context is still alive.
        self.renderer = None;

        // NOTE: The handling below is only needed due to nvidia on Wayland to not crash
        // on exit due to nvidia driver touching the Wayland display from on
        // `exit` hook.
        let _gl_display = self.gl_context.take().map(|context| context.display());

        // Clear the window.
        self.state = None;
        #[cfg(egl_backend)]
        #[allow(irrefutable_let_patterns)]
        if let Some(glutin::display::Display::Egl(display)) = _gl_display {
            unsafe {
                display.terminate();
            }
        }
    }
}

fn create_gl_context(
    window: &Window,
    gl_config: &Config,
) -> Result<NotCurrentContext, glutin::error::Error> {
    let raw_window_handle = window.window_handle().ok().map(|wh| wh.as_raw());

    // The shaders target GLSL 330 core.
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(raw_window_handle);

    // Let the driver pick the newest core context it has.
    let fallback_context_attributes = ContextAttributesBuilder::new()
        .with_profile(GlProfile::Core)
        .build(raw_window_handle);

    let gl_display = gl_config.display();

    unsafe {
        gl_display
            .create_context(gl_config, &context_attributes)
            .or_else(|_| gl_display.create_context(gl_config, &fallback_context_attributes))
    }
}

fn window_attributes(settings: &Settings) -> WindowAttributes {
    Window::default_attributes()
        .with_title(settings.title)
        .with_inner_size(LogicalSize::new(settings.width, settings.height))
}

fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        tracing::warn!("Cursor stays free: {err}");
    }
    window.set_cursor_visible(false);
}

enum GlDisplayCreationState {
    /// The display was not build yet.
    Builder(DisplayBuilder),
    /// The display was already created for the application.
    Init,
}

struct AppState {
    gl_surface: Surface<WindowSurface>,
    // NOTE: Window should be dropped after all resources created using its
    // raw-window-handle.
    window: Window,
}

// Prefer a config with a depth buffer, then the one with the most samples.
pub fn gl_config_picker(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|accum, config| {
            let depth_check = config.depth_size() > 0 && accum.depth_size() == 0;

            if depth_check || config.num_samples() > accum.num_samples() {
                config
            } else {
                accum
            }
        })
        .expect("display offered no GL configs")
}
