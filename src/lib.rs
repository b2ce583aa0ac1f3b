pub mod app;
pub mod cli;
pub mod config;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod output;
pub mod page;
pub mod render;
pub mod report;
pub mod runner;
pub mod source;
pub mod utils;

#[cfg(test)]
mod tests;
