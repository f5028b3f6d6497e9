mod components;
mod config;
mod error;
mod host;
mod model;
mod profile;
mod settlement;
mod state;
mod util;

fn main() {
    yew::Renderer::<components::App>::new().render();
}
