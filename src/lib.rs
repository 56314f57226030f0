pub mod attributes;
pub mod grammar;
pub mod history;
pub mod language;
pub mod logging;
pub mod output;
pub mod preferences;
pub mod reconcile;
pub mod scanner;
pub mod segment;
pub mod summary;

pub use reconcile::{render, render_history, render_with, StreamView};
pub use scanner::ScanOptions;
pub use segment::{Element, FileActionKind};
