pub mod progress;

pub use progress::{PROGRESS_VERSION, ProgressFile, ProgressStore};
