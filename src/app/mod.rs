pub mod views;

pub use views::console_view::{ConsoleView, OutputFormat};
