mod config;
mod generator;
#[cfg(test)]
mod tests;

pub use config::*;
pub use generator::*;
