//! Terminal browser for a coloring-page gallery and the user's own
//! generations, built on a race-safe incremental feed loader.
//!
//! [`feed`] holds the loader and has no terminal dependencies; everything
//! else is the app around it.

pub mod api;
pub mod app;
pub mod cli;
pub mod event;
pub mod feed;
pub mod help;
pub mod keys;
pub mod logging;
pub mod settings;
pub mod theme;
pub mod tui;
pub mod views;

#[cfg(test)]
mod test_utils;
