pub mod calendar;
pub mod color;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod fetch;
pub mod normalizer;
pub mod output;
pub mod render;
