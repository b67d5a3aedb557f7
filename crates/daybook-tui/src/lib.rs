pub mod app;
pub mod controller;
pub mod event;
pub mod input;
pub mod preload;
pub mod sync;
pub mod theme;
pub mod viewport;
pub mod widgets;

pub use app::App;
pub use controller::{ControllerOptions, ScrollContainer, ViewController, ViewEvent};
pub use theme::Theme;
pub use viewport::Viewport;
