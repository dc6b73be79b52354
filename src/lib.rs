pub mod api;
pub mod config;
pub mod detector;
pub mod error;
pub mod grammar;

pub use api::{router, AppState};
pub use config::Config;
pub use detector::{Detector, NoopDetector, OllamaDetector};
pub use error::ApiError;
pub use grammar::{
    find_substring_position, is_valid_correction, Correction, GrammarFixer, Location,
};
