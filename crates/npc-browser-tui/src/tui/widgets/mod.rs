// TUI widget modules for each screen zone.

pub mod chat_log;
pub mod help_bar;
pub mod notification;
pub mod npc_dialog;
pub mod status_bar;
