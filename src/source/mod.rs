//! Suite state readers.

pub mod playwright;

pub use playwright::PlaywrightDataSource;
