//! Headless session driver.
//!
//! Stands in for the host engine: a flat floor at `y = 0`, a scripted
//! player, and a minimal planner stub for each enemy. Frames are converted
//! to fixed gameplay ticks by [`FixedStep`].

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use duskblade_common::{EntityId, Vec3};
use duskblade_gameplay::{
    Attacker, Damageable, GameSession, PlayerInput, PlayerStateKind, SensorMode,
};

use crate::config::EngineConfig;
use crate::data_loader::{CharacterDataFile, DataLoadError, DataLoader};
use crate::timing::FixedStep;

/// Horizontal reach of the player's sword.
const PLAYER_REACH: f32 = 1.5;
/// Horizontal reach of enemy claws.
const ENEMY_REACH: f32 = 1.0;
/// Seconds between enemy swings.
const ENEMY_SWING_COOLDOWN: f32 = 1.2;
/// Stamina an enemy swing costs.
const ENEMY_SWING_STAMINA: f32 = 2.0;
/// Seconds between scripted hops.
const HOP_INTERVAL: f32 = 3.0;

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Fixed ticks simulated
    pub ticks: u64,
    /// Session events drained
    pub events: usize,
    /// Effect requests drained
    pub effects: usize,
    /// Player health at the end
    pub player_health: i32,
    /// Player state at the end
    pub player_state: PlayerStateKind,
    /// Enemies dead at the end
    pub enemies_killed: usize,
}

/// Per-enemy planner stub.
#[derive(Debug)]
struct EnemyBrain {
    id: EntityId,
    sensed: bool,
    cooldown: f32,
}

/// Scripted player: walk to the nearest enemy, hop now and then, attack in reach.
#[derive(Debug, Default)]
struct PlayerScript {
    since_hop: f32,
    last_swing: u32,
}

/// Load character data, falling back to built-in defaults when the file is absent.
fn load_character_data(path: &Path) -> Result<CharacterDataFile> {
    match DataLoader::new(path).load() {
        Ok(data) => Ok(data),
        Err(DataLoadError::NotFound(path)) => {
            warn!("Character data {} not found, using defaults", path.display());
            Ok(CharacterDataFile::default())
        },
        Err(e) => Err(e.into()),
    }
}

/// Run a session for the configured duration.
pub fn run(config: &EngineConfig) -> Result<RunSummary> {
    let data = load_character_data(&config.data_path)?;
    let mut session = GameSession::new(data.player.clone(), Vec3::ZERO, config.bus_capacity)?;

    let mut brains = Vec::with_capacity(data.enemies.len());
    for (i, (name, enemy)) in data.enemies.iter().enumerate() {
        let x = 6.0 + 4.0 * i as f32;
        let seed = config.seed.map(|s| s.wrapping_add(i as u64));
        let id = session.spawn_enemy(enemy.clone(), Vec3::new(x, 0.0, 0.0), seed)?;
        info!("Spawned {name} as {id} at x = {x}");
        brains.push(EnemyBrain {
            id,
            sensed: false,
            cooldown: 0.0,
        });
    }

    let mut step = FixedStep::new(config.tick_rate);
    let frame_dt = 1.0 / config.frame_rate.max(1) as f32;
    let frames = (config.duration_secs * config.frame_rate as f32).round() as u64;
    let mut script = PlayerScript::default();
    let (mut events, mut effects) = (0, 0);

    for _ in 0..frames {
        for _ in 0..step.accumulate(frame_dt) {
            tick_once(&mut session, &mut script, &mut brains, step.fixed_dt());
        }
        events += session.drain_events().len();
        effects += session.drain_effects().len();
    }

    debug!(alpha = step.alpha(), "Leftover frame time");

    let summary = RunSummary {
        ticks: step.total_ticks(),
        events,
        effects,
        player_health: session.player().health(),
        player_state: session.player().state(),
        enemies_killed: session.enemies().filter(|e| e.is_dead()).count(),
    };
    events += session.shutdown().len();

    info!(
        ticks = summary.ticks,
        events,
        effects = summary.effects,
        player_health = summary.player_health,
        player_state = summary.player_state.name(),
        enemies_killed = summary.enemies_killed,
        "Run finished"
    );
    Ok(summary)
}

/// One fixed tick of host work around the session.
fn tick_once(
    session: &mut GameSession,
    script: &mut PlayerScript,
    brains: &mut [EnemyBrain],
    dt: f32,
) {
    let grounded = session.player().position().y <= 0.0;
    let input = script.next_input(session, grounded, dt);
    session.tick(&input, grounded, dt);

    // Flat floor
    let position = session.player().position();
    if position.y < 0.0 {
        session
            .player_mut()
            .set_position(Vec3::new(position.x, 0.0, position.z));
    }

    script.resolve_swing(session);
    for brain in brains.iter_mut() {
        brain.think(session, dt);
    }
}

/// Horizontal position of the closest living enemy.
fn nearest_enemy(session: &GameSession, from: f32) -> Option<(EntityId, f32)> {
    session
        .enemies()
        .filter(|e| !e.is_dead())
        .map(|e| (e.entity_id(), e.position().x))
        .min_by(|a, b| (a.1 - from).abs().total_cmp(&(b.1 - from).abs()))
}

impl PlayerScript {
    fn next_input(&mut self, session: &GameSession, grounded: bool, dt: f32) -> PlayerInput {
        let player_x = session.player().position().x;
        let Some((_, enemy_x)) = nearest_enemy(session, player_x) else {
            return PlayerInput::new();
        };

        let offset = enemy_x - player_x;
        if offset.abs() <= PLAYER_REACH {
            return PlayerInput::new().with_attack();
        }

        let mut input = PlayerInput::moving(offset.signum());
        self.since_hop += dt;
        if grounded && self.since_hop >= HOP_INTERVAL {
            self.since_hop = 0.0;
            input = input.with_jump();
        }
        input
    }

    /// Land a hit once per combo step.
    fn resolve_swing(&mut self, session: &mut GameSession) {
        let player = session.player();
        let swing = player.animation().plays;
        if !player.state().is_attack() || swing == self.last_swing {
            return;
        }
        self.last_swing = swing;

        let player_x = player.position().x;
        if let Some((enemy, enemy_x)) = nearest_enemy(session, player_x) {
            if (enemy_x - player_x).abs() <= PLAYER_REACH {
                let contact = Vec3::new((enemy_x + player_x) * 0.5, 1.0, 0.0);
                session.resolve_player_hit(enemy, contact);
            }
        }
    }
}

impl EnemyBrain {
    fn think(&mut self, session: &mut GameSession, dt: f32) {
        let player_x = session.player().position().x;
        let player_dead = session.player().is_dead();
        let Some(enemy) = session.enemy_mut(self.id) else {
            return;
        };
        if enemy.is_dead() {
            return;
        }

        // Sensor overlap
        let offset = player_x - enemy.position().x;
        let inside = !player_dead && offset.abs() <= enemy.alert_radius();
        if inside != self.sensed {
            self.sensed = inside;
            session.sense_player(self.id, inside);
        }

        let Some(enemy) = session.enemy_mut(self.id) else {
            return;
        };
        if !enemy.is_alert() {
            if enemy.sensor_mode() != SensorMode::Rest {
                enemy.apply_sensor_mode(SensorMode::Rest);
            }
            return;
        }
        if enemy.sensor_mode() != SensorMode::Aggro {
            enemy.apply_sensor_mode(SensorMode::Aggro);
        }

        // Neutral enemies only fight back
        let provoked = enemy.is_hostile() || enemy.health() < enemy.max_health();
        if !provoked {
            return;
        }

        if offset.abs() > ENEMY_REACH {
            let speed = enemy.data().aggro_speed;
            let position = enemy.position() + Vec3::X * offset.signum() * speed * dt;
            enemy.set_position(position);
            return;
        }

        self.cooldown -= dt;
        if self.cooldown > 0.0 || enemy.stamina() < ENEMY_SWING_STAMINA {
            return;
        }
        self.cooldown = ENEMY_SWING_COOLDOWN;
        enemy.set_current_damage(1);
        enemy.stamina_used(ENEMY_SWING_STAMINA);
        let contact = enemy.position() + Vec3::new(offset * 0.5, 1.0, 0.0);
        if session.resolve_enemy_hit(self.id, contact) {
            debug!(enemy = %self.id, "enemy swing landed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir, seconds: f32) -> EngineConfig {
        EngineConfig {
            duration_secs: seconds,
            data_path: dir.path().join("missing.toml"),
            seed: Some(42),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_run_with_default_data() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let summary = run(&config(&dir, 10.0)).unwrap();

        assert_eq!(summary.ticks, 600);
        assert!(summary.events >= 2);
        assert!((0..=10).contains(&summary.player_health));
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let first = run(&config(&dir, 8.0)).unwrap();
        let second = run(&config(&dir, 8.0)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_data_is_fatal() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("characters.toml");
        std::fs::write(
            &path,
            "[schema_version]\nmajor = 1\nminor = 1\npatch = 0\n[player]\nmax_health = -3\n",
        )
        .expect("Failed to write");

        let config = EngineConfig {
            data_path: path,
            ..config(&dir, 1.0)
        };
        assert!(run(&config).is_err());
    }
}
