//! Historical world borders, one year at a time, rendered in the terminal.

pub mod app;
pub mod borders;
pub mod braille;
pub mod colour;
pub mod config;
pub mod data;
pub mod logging;
pub mod map;
pub mod playback;
pub mod slider;
pub mod ui;
pub mod years;
