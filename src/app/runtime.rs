//! Event loop that owns the player
//!
//! Commands from the front end, finished tasks and timers are turned into
//! messages and applied one at a time, so each `update` runs to completion
//! before the next message is looked at.

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::{Message, Player};

/// Handle for sending commands into a running player
pub type CommandSender = mpsc::UnboundedSender<Message>;

/// Single-owner loop around a `Player`
pub struct Runtime {
    player: Player,
    commands: mpsc::UnboundedReceiver<Message>,
}

impl Runtime {
    pub fn new(player: Player) -> (Self, CommandSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                player,
                commands: rx,
            },
            tx,
        )
    }

    /// Run until `Message::Quit` (or every command sender is dropped) and
    /// hand the player back
    pub async fn run(mut self, initial: Message) -> Player {
        let mut in_flight = FuturesUnordered::new();

        let mut poll = time::interval(self.player.position_poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let save_every = self.player.save_interval();
        let mut save = time::interval_at(Instant::now() + save_every, save_every);
        save.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut message = initial;
        loop {
            let quit = matches!(message, Message::Quit);
            let task = self.player.update(message);
            if quit {
                tracing::info!("Player loop stopped ({} tasks dropped)", in_flight.len());
                return self.player;
            }
            in_flight.extend(task.into_futures());

            message = tokio::select! {
                command = self.commands.recv() => command.unwrap_or(Message::Quit),
                Some(done) = in_flight.next(), if !in_flight.is_empty() => done,
                _ = poll.tick() => Message::PollMedia,
                _ = save.tick() => Message::SaveState,
            };
        }
    }
}
