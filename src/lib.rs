pub mod actions;
pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;

#[cfg(test)]
mod testing;
