//! Application state.

mod state;

pub use state::{Banner, ClientState, MessageKind, SlotQuery, Toast, View};
