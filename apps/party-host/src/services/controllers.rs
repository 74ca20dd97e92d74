//! Phone controller slots.
//!
//! Four player slots, 1-based. A connection holds at most one slot and a
//! slot is held by at most one connection. All mutations happen under one
//! lock, so a slot assignment is atomic with respect to concurrent joins.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{ControlScheme, PLAYERS};
use crate::errors::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("All slots full")]
    SlotsFull,
    #[error("Send JOIN before CONTROL")]
    NotJoined,
}

impl ControllerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ControllerError::SlotsFull => ErrorCode::SlotFull,
            ControllerError::NotJoined => ErrorCode::NotJoined,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControllerConnection {
    pub connection_id: Uuid,
    pub assigned_player: Option<u8>,
    pub last_seen: Instant,
}

/// A button edge after remapping through the active game's scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedControl {
    pub player: u8,
    pub button: String,
    pub pressed: bool,
}

/// Where remapped controls go. Implemented by the dispatcher, which knows
/// the active run and its execution mode.
pub trait ControlTarget {
    /// Scheme of the running game; `None` when nothing accepts input.
    fn active_scheme(&self) -> Option<ControlScheme>;

    fn forward(&self, control: RemappedControl);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    Forwarded(RemappedControl),
    /// The active game does not use this button.
    Unmapped,
    /// No run is accepting input.
    Idle,
}

#[derive(Debug, Default)]
struct Slots {
    owners: [Option<Uuid>; PLAYERS],
    connections: HashMap<Uuid, ControllerConnection>,
}

impl Slots {
    fn is_free(&self, player: u8) -> bool {
        self.owners[usize::from(player - 1)].is_none()
    }

    fn first_free(&self) -> Option<u8> {
        (1..=PLAYERS as u8).find(|p| self.is_free(*p))
    }
}

#[derive(Debug, Default)]
pub struct ControllerRegistry {
    inner: Mutex<Slots>,
}

fn valid_slot(player: u8) -> bool {
    (1..=PLAYERS as u8).contains(&player)
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, conn_id: Uuid) {
        self.inner
            .lock()
            .connections
            .entry(conn_id)
            .or_insert_with(|| ControllerConnection {
                connection_id: conn_id,
                assigned_player: None,
                last_seen: Instant::now(),
            });
    }

    /// Assigns a slot: the requested one if free, otherwise the lowest free
    /// one. A connection that already holds a slot keeps it unless it asks
    /// for a different free slot.
    pub fn join(&self, conn_id: Uuid, requested: Option<u8>) -> Result<u8, ControllerError> {
        let mut slots = self.inner.lock();
        let current = slots
            .connections
            .get(&conn_id)
            .and_then(|c| c.assigned_player);
        let requested = requested.filter(|p| valid_slot(*p));

        let player = match (current, requested) {
            (Some(held), None) => held,
            (Some(held), Some(want)) if want == held => held,
            (Some(held), Some(want)) if slots.is_free(want) => {
                slots.owners[usize::from(held - 1)] = None;
                want
            }
            (Some(held), Some(_)) => held,
            (None, Some(want)) if slots.is_free(want) => want,
            (None, _) => slots.first_free().ok_or(ControllerError::SlotsFull)?,
        };

        slots.owners[usize::from(player - 1)] = Some(conn_id);
        let conn = slots
            .connections
            .entry(conn_id)
            .or_insert_with(|| ControllerConnection {
                connection_id: conn_id,
                assigned_player: None,
                last_seen: Instant::now(),
            });
        conn.assigned_player = Some(player);
        conn.last_seen = Instant::now();

        info!(conn_id = %conn_id, player, "controller joined");
        Ok(player)
    }

    /// Forgets the connection and frees its slot, returning that slot.
    pub fn disconnect(&self, conn_id: Uuid) -> Option<u8> {
        let mut slots = self.inner.lock();
        let player = slots.connections.remove(&conn_id)?.assigned_player?;
        let idx = usize::from(player - 1);
        if slots.owners[idx] == Some(conn_id) {
            slots.owners[idx] = None;
        }
        info!(conn_id = %conn_id, player, "controller released slot");
        Some(player)
    }

    pub fn player_of(&self, conn_id: Uuid) -> Option<u8> {
        self.inner
            .lock()
            .connections
            .get(&conn_id)
            .and_then(|c| c.assigned_player)
    }

    pub fn touch(&self, conn_id: Uuid) {
        if let Some(conn) = self.inner.lock().connections.get_mut(&conn_id) {
            conn.last_seen = Instant::now();
        }
    }

    /// Occupied slots, ascending.
    pub fn taken_players(&self) -> Vec<u8> {
        let slots = self.inner.lock();
        (1..=PLAYERS as u8)
            .filter(|p| !slots.is_free(*p))
            .collect()
    }

    pub fn connection(&self, conn_id: Uuid) -> Option<ControllerConnection> {
        self.inner.lock().connections.get(&conn_id).cloned()
    }

    /// Remaps a button edge through the active game's scheme and hands it to
    /// `target`. Controls from a connection without a slot are rejected.
    pub fn control(
        &self,
        conn_id: Uuid,
        button: &str,
        pressed: bool,
        target: &dyn ControlTarget,
    ) -> Result<ControlOutcome, ControllerError> {
        self.touch(conn_id);
        let player = self.player_of(conn_id).ok_or(ControllerError::NotJoined)?;

        let Some(scheme) = target.active_scheme() else {
            return Ok(ControlOutcome::Idle);
        };
        let Some(mapped) = scheme.remap(button) else {
            debug!(player, button, "dropping unmapped button");
            return Ok(ControlOutcome::Unmapped);
        };

        let control = RemappedControl {
            player,
            button: mapped.to_string(),
            pressed,
        };
        target.forward(control.clone());
        Ok(ControlOutcome::Forwarded(control))
    }
}
