use winit::event_loop::EventLoop;

mod app;
mod camera;
mod error;
mod input;
mod light;
mod model;
mod renderer;
mod scene;
mod settings;
mod shader;
mod skybox;
mod texture;
mod transform;
mod uniforms;

pub fn main() {
    tracing_subscriber::fmt::init();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            tracing::error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = app::run_app(event_loop, settings::Settings::default()) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}
