pub mod app;
pub mod game_card;
pub mod game_over_overlay;
pub mod header;
pub mod mining_card;
pub mod time_display;

pub use app::App;
