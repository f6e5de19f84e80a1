use serde::{Deserialize, Serialize};

/// Opaque identity of the host's world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(pub u64);

/// Opaque identity of the host's player object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

/// Classification of a detected respawn. A new server always implies a new
/// dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Respawn {
    pub is_new_server: bool,
    pub is_new_dimension: bool,
}

/// Infers respawns from changes in the host's world/player identities.
///
/// The host recreates its world and player objects whenever the player
/// respawns, changes dimension or joins a server, so a changed pair means a
/// respawn happened since the last tick.
#[derive(Debug, Clone, Default)]
pub struct RespawnTracker {
    last_world: Option<WorldId>,
    last_player: Option<PlayerId>,
    last_dimension: Option<i32>,
}

impl RespawnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this tick's identities. Returns the respawn they imply, if any.
    pub fn observe(&mut self, world: WorldId, player: PlayerId, dimension: i32) -> Option<Respawn> {
        if self.last_world == Some(world) && self.last_player == Some(player) {
            return None;
        }
        let is_new_server = self.last_dimension.is_none();
        let is_new_dimension = is_new_server || self.last_dimension != Some(dimension);
        self.last_world = Some(world);
        self.last_player = Some(player);
        self.last_dimension = Some(dimension);
        Some(Respawn {
            is_new_server,
            is_new_dimension,
        })
    }

    /// Forget everything; the next observation reports a new server.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn last_dimension(&self) -> Option<i32> {
        self.last_dimension
    }
}
