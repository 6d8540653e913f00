//! Logs which window has focus and for how long, resolving browser windows to the domain of the
//! active tab through a small local relay, and charts the result in the terminal.

pub mod classify;
pub mod cli;
pub mod relay;
pub mod storage;
pub mod tracker;
pub mod utils;
pub mod visualize;
pub mod window_api;
