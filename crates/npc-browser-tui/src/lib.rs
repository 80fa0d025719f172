// Terminal host for the NPC browser.

pub mod adapters;
pub mod app;
pub mod protocol;
pub mod tui;
