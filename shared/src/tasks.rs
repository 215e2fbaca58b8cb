//! Completion queue for asynchronous tile-set queries.
//!
//! Queries are fire-and-forget: the world resolves a [`TileSetReply`] whenever
//! its data is ready, which pushes a [`Completion`] onto an unbounded channel.
//! The renderer drains that channel from its own step/frame callbacks, so
//! every raster write still happens on the single driving thread. Closing the
//! receiver on dispose turns late replies into no-ops.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::tile::{PlayerId, TileRef};
use crate::world::TileSetKind;

/// What the renderer does with the tiles once a query resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Push every tile into the staleness queue.
    Enqueue,
    /// Paint every tile right away in border-only mode, bypassing the queue.
    PaintBorderNow,
}

#[derive(Debug)]
pub struct Completion {
    pub player: PlayerId,
    pub kind: TileSetKind,
    pub followup: Followup,
    pub result: Result<Vec<TileRef>, String>,
}

/// Handle given to the world for a single query.
#[derive(Debug)]
pub struct TileSetReply {
    player: PlayerId,
    kind: TileSetKind,
    followup: Followup,
    tx: UnboundedSender<Completion>,
}

impl TileSetReply {
    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn kind(&self) -> TileSetKind {
        self.kind
    }

    /// Deliver the tile set. Returns `false` if the renderer is gone.
    pub fn resolve(self, tiles: Vec<TileRef>) -> bool {
        self.send(Ok(tiles))
    }

    pub fn fail(self, reason: impl Into<String>) -> bool {
        self.send(Err(reason.into()))
    }

    fn send(self, result: Result<Vec<TileRef>, String>) -> bool {
        self.tx
            .unbounded_send(Completion {
                player: self.player,
                kind: self.kind,
                followup: self.followup,
                result,
            })
            .is_ok()
    }
}

pub struct CompletionQueue {
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl Default for CompletionQueue {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded();
        Self { tx, rx }
    }
}

impl CompletionQueue {
    pub fn reply(&self, player: PlayerId, kind: TileSetKind, followup: Followup) -> TileSetReply {
        TileSetReply {
            player,
            kind,
            followup,
            tx: self.tx.clone(),
        }
    }

    /// Take every completion delivered so far without waiting.
    pub fn drain_ready(&mut self) -> Vec<Completion> {
        let mut ready = Vec::new();
        while let Ok(Some(completion)) = self.rx.try_next() {
            ready.push(completion);
        }
        ready
    }

    /// Stop accepting completions. Outstanding replies fail to send.
    pub fn close(&mut self) {
        self.rx.close();
        while let Ok(Some(_)) = self.rx.try_next() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_replies_are_drained_in_order() {
        let mut queue = CompletionQueue::default();
        let a = queue.reply(PlayerId(1), TileSetKind::Owned, Followup::Enqueue);
        let b = queue.reply(PlayerId(2), TileSetKind::Border, Followup::PaintBorderNow);

        assert!(b.resolve(vec![TileRef(3)]));
        assert!(a.fail("player left"));

        let ready = queue.drain_ready();
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0].player, PlayerId(2));
        assert_eq!(ready[0].result, Ok(vec![TileRef(3)]));
        assert!(ready[1].result.is_err());
        assert!(queue.drain_ready().is_empty());
    }

    #[test]
    fn replies_after_close_are_rejected() {
        let mut queue = CompletionQueue::default();
        let late = queue.reply(PlayerId(1), TileSetKind::Owned, Followup::Enqueue);
        queue.close();

        assert!(!late.resolve(vec![TileRef(0)]));
        assert!(queue.drain_ready().is_empty());
    }
}
