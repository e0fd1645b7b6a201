pub mod app;
pub mod layout;
pub mod renderer;
pub mod terminal;

pub use app::App;
pub use terminal::{run_ui, Services};
