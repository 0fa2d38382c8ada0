use world_model::{BlockPos, EntityId, EntityKind, Position, WorldView};

/// Host-side delivery of player-facing alerts.
///
/// Delivery is fire-and-forget: a player disconnecting mid-iteration is
/// the host's problem, the controller never observes delivery failures.
pub trait AlertSink {
    fn message(&mut self, player: EntityId, text: &str);

    /// Audible cue accompanying the message, positioned at the denial.
    fn audible_cue(&mut self, player: EntityId, at: Position);
}

/// No-op sink for embeddings without player messaging.
impl AlertSink for () {
    fn message(&mut self, _player: EntityId, _text: &str) {}
    fn audible_cue(&mut self, _player: EntityId, _at: Position) {}
}

pub fn denial_message(kind: &EntityKind) -> String {
    format!(
        "A nearby {} farm is getting out of hand. Spawning was denied.",
        kind.human()
    )
}

/// Notify every player whose x and z both lie within `warn_radius` of
/// the denial block, and log one operator line naming the violated tier.
pub fn emit_denial<W: WorldView, S: AlertSink>(
    world: &W,
    sink: &mut S,
    kind: &EntityKind,
    at: BlockPos,
    warn_radius: f64,
    violated_radius: f64,
    violated_limit: u32,
) {
    tracing::info!(
        kind = %kind,
        world = %world.id(),
        at = %at,
        radius = violated_radius,
        limit = violated_limit,
        "breeding spawn denied"
    );
    let text = denial_message(kind);
    for player in world.players() {
        let block = player.pos.block();
        if (block.x - at.x).abs() as f64 <= warn_radius
            && (block.z - at.z).abs() as f64 <= warn_radius
        {
            sink.message(player.id, &text);
            sink.audible_cue(player.id, at.center());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_model::{GameMode, PlayerSnapshot, SimWorld};

    #[derive(Default)]
    struct Recorder {
        messages: Vec<(EntityId, String)>,
        cues: Vec<EntityId>,
    }

    impl AlertSink for Recorder {
        fn message(&mut self, player: EntityId, text: &str) {
            self.messages.push((player, text.to_string()));
        }

        fn audible_cue(&mut self, player: EntityId, _at: Position) {
            self.cues.push(player);
        }
    }

    fn player(id: u64, x: f64, z: f64) -> PlayerSnapshot {
        PlayerSnapshot {
            id: EntityId(id),
            name: format!("p{}", id),
            pos: Position::new(x, 64.0, z),
            game_mode: GameMode::Survival,
            affects_spawning: true,
        }
    }

    #[test]
    fn message_wording() {
        assert_eq!(
            denial_message(&EntityKind::new("snow_golem")),
            "A nearby snow golem farm is getting out of hand. Spawning was denied."
        );
    }

    #[test]
    fn only_players_in_range_are_notified() {
        let mut world = SimWorld::new("overworld");
        world.insert_player(player(1, 10.0, 10.0));
        world.insert_player(player(2, 63.0, -63.0));
        world.insert_player(player(3, 100.0, 0.0));

        let mut sink = Recorder::default();
        emit_denial(
            &world,
            &mut sink,
            &EntityKind::new("sheep"),
            BlockPos::new(0, 64, 0),
            64.0,
            8.0,
            5,
        );
        let notified: Vec<u64> = sink.messages.iter().map(|(id, _)| id.0).collect();
        assert_eq!(notified, vec![1, 2]);
        assert_eq!(sink.cues.len(), 2);
        assert!(sink.messages[0].1.contains("sheep farm"));
    }
}
