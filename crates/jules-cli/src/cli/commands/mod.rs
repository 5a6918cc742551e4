//! Command handlers. Each returns the `data` payload of the output envelope.

mod activities;
mod completions;
mod result;
mod sessions;
mod show_config;
mod sources;
mod wait;

pub use activities::{run_get_activity, run_list_activities};
pub use completions::run_completions;
pub use result::run_session_result;
pub use sessions::{
    run_approve_plan, run_create_session, run_get_session, run_list_sessions, run_send_message,
};
pub use show_config::run_show_config;
pub use sources::{run_get_source, run_list_sources};
pub use wait::run_wait_for_state;
