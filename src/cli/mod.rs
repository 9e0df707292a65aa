pub mod host;
pub mod output;
pub mod prompt;
pub mod resolutions;
