pub mod commands;
pub mod debounce;
pub mod events;
pub mod manager;
pub mod row_tasks;
pub mod state;

pub use commands::Command;
pub use debounce::Debouncer;
pub use events::Message;
pub use manager::{SearchSession, SnapshotCallback};
pub use row_tasks::{RowPosition, RowTaskContext, RowTaskRegistry, RowTicket, asset_task};
pub use state::{SearchStatus, SessionState};
