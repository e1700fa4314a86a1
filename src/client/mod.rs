//! Terminal client for a timed quiz session.

mod client;
mod state;
mod ui;

pub use client::run;
