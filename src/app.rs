//! Player core - state, messages and update handlers
//!
//! The player follows a message/update loop: front ends and finished async
//! work send `Message`s, `Player::update` mutates state and returns a `Task`
//! with follow-up work, and everything the UI should show is pushed out as
//! `PlayerEvent`s.

mod event;
mod message;
mod runtime;
mod state;
mod task;
mod update;


pub use event::{EventReceiver, EventSender, PlayerEvent, event_channel};
pub use message::{Direction, LoadedPlaylist, Message, PlaylistSource, StartupRequest};
pub use runtime::{CommandSender, Runtime};
pub use state::{Player, PlayerConfig, RestorePoint};
pub use task::Task;
pub use update::preload_manager::SlotState;
pub use update::queue_navigator::{AdjacentIndices, PlaybackSelection, QueueNavigator};
