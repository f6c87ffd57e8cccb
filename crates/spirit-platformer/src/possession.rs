//! Transfer of control between the player and one enemy host.
//!
//! The enemy's `possessed` flag and the player's back-reference are only ever
//! changed here, together, so at most one enemy is possessed and it is the
//! one the player names.

use serde::{Deserialize, Serialize};

use spirit_core::geometry::distance;

use crate::config::{EnemyConfig, PossessionConfig};
use crate::enemy::Enemy;
use crate::player::Player;
use crate::tile::TileGrid;

/// Stable index of an enemy in its level. Enemies are never removed, so a
/// handle stays valid for the level's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub usize);

/// Why a possession command did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    PlayerDead,
    AlreadyPossessing,
    NotPossessing,
    NoneInRange,
    UnknownTarget,
    TargetDead,
    TargetPossessed,
    OutOfRange,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::PlayerDead => "player is dead",
            Self::AlreadyPossessing => "already possessing a host",
            Self::NotPossessing => "not possessing a host",
            Self::NoneInRange => "no possessable enemy in range",
            Self::UnknownTarget => "no such enemy",
            Self::TargetDead => "target is dead",
            Self::TargetPossessed => "target is already possessed",
            Self::OutOfRange => "target is out of range",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PossessionOutcome {
    Possessed(EnemyId),
    Released(EnemyId),
    Ignored(IgnoreReason),
}

fn ignored(reason: IgnoreReason) -> PossessionOutcome {
    tracing::trace!(%reason, "possession command ignored");
    PossessionOutcome::Ignored(reason)
}

/// Distance from the player's anchor to an enemy's anchor.
fn reach(player: &Player, enemy: &Enemy) -> f32 {
    distance(player.body.x, player.body.y, enemy.x(), enemy.y())
}

/// Closest live, unpossessed enemy within `radius` of a free-roaming player.
/// Ties go to the lower index.
pub fn nearest_possessable(player: &Player, enemies: &[Enemy], radius: f32) -> Option<EnemyId> {
    if !player.is_alive() || player.is_possessing() {
        return None;
    }
    enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_active())
        .map(|(index, enemy)| (index, reach(player, enemy)))
        .filter(|&(_, dist)| dist <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| EnemyId(index))
}

/// Refresh the highlight hint: only the nearest possessable enemy is marked.
pub fn mark_nearest(player: &Player, enemies: &mut [Enemy], radius: f32) -> Option<EnemyId> {
    let nearest = nearest_possessable(player, enemies, radius);
    for (index, enemy) in enemies.iter_mut().enumerate() {
        enemy.set_nearest(nearest == Some(EnemyId(index)));
    }
    nearest
}

/// Possess the nearest eligible enemy.
pub fn possess(player: &mut Player, enemies: &mut [Enemy], radius: f32) -> PossessionOutcome {
    if !player.is_alive() {
        return ignored(IgnoreReason::PlayerDead);
    }
    if player.is_possessing() {
        return ignored(IgnoreReason::AlreadyPossessing);
    }
    match nearest_possessable(player, enemies, radius) {
        Some(id) => transfer(player, enemies, id),
        None => ignored(IgnoreReason::NoneInRange),
    }
}

/// Possess a specific enemy.
pub fn possess_target(
    player: &mut Player,
    enemies: &mut [Enemy],
    target: EnemyId,
    radius: f32,
) -> PossessionOutcome {
    if !player.is_alive() {
        return ignored(IgnoreReason::PlayerDead);
    }
    if player.is_possessing() {
        return ignored(IgnoreReason::AlreadyPossessing);
    }
    let Some(enemy) = enemies.get(target.0) else {
        return ignored(IgnoreReason::UnknownTarget);
    };
    if enemy.is_dead() {
        return ignored(IgnoreReason::TargetDead);
    }
    if enemy.is_possessed() {
        return ignored(IgnoreReason::TargetPossessed);
    }
    if reach(player, enemy) > radius {
        return ignored(IgnoreReason::OutOfRange);
    }
    transfer(player, enemies, target)
}

fn transfer(player: &mut Player, enemies: &mut [Enemy], id: EnemyId) -> PossessionOutcome {
    let Some(enemy) = enemies.get_mut(id.0) else {
        return ignored(IgnoreReason::UnknownTarget);
    };
    enemy.set_possessed();
    player.enter_host(id, enemy.x(), enemy.y(), enemy.local_bounds());
    tracing::debug!(enemy = id.0, monster = ?enemy.monster(), "possessed");
    PossessionOutcome::Possessed(id)
}

/// Leave the current host, applying the release policy to it.
pub fn release(
    player: &mut Player,
    enemies: &mut [Enemy],
    grid: &TileGrid,
    possession: &PossessionConfig,
    enemy_cfg: &EnemyConfig,
) -> PossessionOutcome {
    let Some(id) = player.leave_host() else {
        return ignored(IgnoreReason::NotPossessing);
    };
    if let Some(enemy) = enemies.get_mut(id.0) {
        enemy.release(grid, enemy_cfg, possession.release_kills_host);
    }
    tracing::debug!(
        enemy = id.0,
        host_killed = possession.release_kills_host,
        "released host"
    );
    PossessionOutcome::Released(id)
}

/// Copy the player's body onto its host.
pub fn sync_host(player: &Player, enemies: &mut [Enemy]) {
    if let Some(id) = player.possessed_enemy()
        && let Some(enemy) = enemies.get_mut(id.0)
    {
        enemy.follow(
            player.body.x,
            player.body.y,
            player.movement(),
            player.is_on_ground(),
        );
    }
}

/// At most one enemy is possessed, and it is present exactly when the player
/// names it.
pub fn invariant_holds(player: &Player, enemies: &[Enemy]) -> bool {
    let mut possessed = enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_possessed())
        .map(|(index, _)| EnemyId(index));
    let first = possessed.next();
    if possessed.next().is_some() {
        return false;
    }
    first == player.possessed_enemy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlatformerConfig;
    use crate::enemy::MonsterType;
    use crate::test_helpers::grid_from_rows;

    fn setup() -> (TileGrid, PlatformerConfig, Player, Vec<Enemy>) {
        let grid = grid_from_rows(
            &["..............", "..............", "..............", "##############"],
            32.0,
            32.0,
        );
        let cfg = PlatformerConfig::default();
        let player = Player::new(100.0, 96.0, &cfg.physics);
        let enemies = vec![
            Enemy::new(MonsterType::Sushi, 160.0, 96.0, &cfg.enemy),
            Enemy::new(MonsterType::Lantern, 140.0, 96.0, &cfg.enemy),
            Enemy::new(MonsterType::Sandals, 400.0, 96.0, &cfg.enemy),
        ];
        (grid, cfg, player, enemies)
    }

    #[test]
    fn nearest_picks_closest_in_range() {
        let (_, cfg, player, enemies) = setup();
        assert_eq!(
            nearest_possessable(&player, &enemies, cfg.possession.radius),
            Some(EnemyId(1))
        );
        assert_eq!(nearest_possessable(&player, &enemies, 10.0), None);
    }

    #[test]
    fn mark_nearest_highlights_one() {
        let (_, cfg, player, mut enemies) = setup();
        mark_nearest(&player, &mut enemies, cfg.possession.radius);
        let marked: Vec<bool> = enemies.iter().map(Enemy::is_nearest).collect();
        assert_eq!(marked, vec![false, true, false]);

        let far = Player::new(1000.0, 96.0, &cfg.physics);
        mark_nearest(&far, &mut enemies, cfg.possession.radius);
        assert!(enemies.iter().all(|e| !e.is_nearest()));
    }

    #[test]
    fn possess_takes_nearest_and_links_both_sides() {
        let (_, cfg, mut player, mut enemies) = setup();
        let outcome = possess(&mut player, &mut enemies, cfg.possession.radius);
        assert_eq!(outcome, PossessionOutcome::Possessed(EnemyId(1)));
        assert!(enemies[1].is_possessed());
        assert_eq!(player.possessed_enemy(), Some(EnemyId(1)));
        assert_eq!((player.body.x, player.body.y), (140.0, 96.0));
        assert!(invariant_holds(&player, &enemies));
    }

    #[test]
    fn possess_while_possessing_is_noop() {
        let (_, cfg, mut player, mut enemies) = setup();
        possess(&mut player, &mut enemies, cfg.possession.radius);
        let player_before = player.clone();
        let enemies_before = enemies.clone();

        let again = possess(&mut player, &mut enemies, cfg.possession.radius);
        assert_eq!(again, PossessionOutcome::Ignored(IgnoreReason::AlreadyPossessing));
        let same = possess_target(&mut player, &mut enemies, EnemyId(1), cfg.possession.radius);
        assert_eq!(same, PossessionOutcome::Ignored(IgnoreReason::AlreadyPossessing));
        assert_eq!(player, player_before);
        assert_eq!(enemies, enemies_before);
    }

    #[test]
    fn possess_target_rejections() {
        let (grid, cfg, mut player, mut enemies) = setup();
        let radius = cfg.possession.radius;
        assert_eq!(
            possess_target(&mut player, &mut enemies, EnemyId(9), radius),
            PossessionOutcome::Ignored(IgnoreReason::UnknownTarget)
        );
        assert_eq!(
            possess_target(&mut player, &mut enemies, EnemyId(2), radius),
            PossessionOutcome::Ignored(IgnoreReason::OutOfRange)
        );

        // Possess and release enemy 0 so it dies.
        assert_eq!(
            possess_target(&mut player, &mut enemies, EnemyId(0), radius),
            PossessionOutcome::Possessed(EnemyId(0))
        );
        release(&mut player, &mut enemies, &grid, &cfg.possession, &cfg.enemy);
        assert!(enemies[0].is_dead());
        assert_eq!(
            possess_target(&mut player, &mut enemies, EnemyId(0), radius),
            PossessionOutcome::Ignored(IgnoreReason::TargetDead)
        );

        player.on_killed();
        assert_eq!(
            possess(&mut player, &mut enemies, radius),
            PossessionOutcome::Ignored(IgnoreReason::PlayerDead)
        );
        assert!(invariant_holds(&player, &enemies));
    }

    #[test]
    fn release_restores_free_roam_position() {
        let (grid, cfg, mut player, mut enemies) = setup();
        possess(&mut player, &mut enemies, cfg.possession.radius);
        player.body.x = 300.0;
        sync_host(&player, &mut enemies);
        assert_eq!(enemies[1].x(), 300.0);

        let outcome = release(&mut player, &mut enemies, &grid, &cfg.possession, &cfg.enemy);
        assert_eq!(outcome, PossessionOutcome::Released(EnemyId(1)));
        assert_eq!((player.body.x, player.body.y), (100.0, 96.0));
        assert!(!enemies[1].is_possessed());
        assert!(enemies[1].is_dead());
        assert_eq!(enemies[1].x(), 300.0, "vacated body stays where it was left");
        assert!(invariant_holds(&player, &enemies));
    }

    #[test]
    fn release_without_host_is_ignored() {
        let (grid, cfg, mut player, mut enemies) = setup();
        assert_eq!(
            release(&mut player, &mut enemies, &grid, &cfg.possession, &cfg.enemy),
            PossessionOutcome::Ignored(IgnoreReason::NotPossessing)
        );
    }

    #[test]
    fn release_can_spare_host() {
        let (grid, mut cfg, mut player, mut enemies) = setup();
        cfg.possession.release_kills_host = false;
        possess(&mut player, &mut enemies, cfg.possession.radius);
        release(&mut player, &mut enemies, &grid, &cfg.possession, &cfg.enemy);
        assert!(!enemies[1].is_dead());
        assert!(enemies[1].is_active());
        // Spared hosts can be possessed again.
        assert_eq!(
            possess(&mut player, &mut enemies, cfg.possession.radius),
            PossessionOutcome::Possessed(EnemyId(1))
        );
    }

    #[test]
    fn no_highlight_while_possessing() {
        let (_, cfg, mut player, mut enemies) = setup();
        possess(&mut player, &mut enemies, cfg.possession.radius);
        assert_eq!(mark_nearest(&player, &mut enemies, cfg.possession.radius), None);
        assert!(enemies.iter().all(|e| !e.glow()));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Command {
            Possess,
            PossessTarget(usize),
            Release,
            Move(f32),
        }

        fn command() -> impl Strategy<Value = Command> {
            prop_oneof![
                Just(Command::Possess),
                (0usize..5).prop_map(Command::PossessTarget),
                Just(Command::Release),
                (-200.0f32..200.0).prop_map(Command::Move),
            ]
        }

        proptest! {
            #[test]
            fn invariant_survives_any_command_sequence(
                kills in any::<bool>(),
                commands in prop::collection::vec(command(), 1..60),
            ) {
                let (grid, mut cfg, mut player, mut enemies) = setup();
                cfg.possession.release_kills_host = kills;
                let radius = cfg.possession.radius;
                for command in commands {
                    match command {
                        Command::Possess => {
                            possess(&mut player, &mut enemies, radius);
                        },
                        Command::PossessTarget(index) => {
                            possess_target(&mut player, &mut enemies, EnemyId(index), radius);
                        },
                        Command::Release => {
                            release(&mut player, &mut enemies, &grid, &cfg.possession, &cfg.enemy);
                        },
                        Command::Move(dx) => {
                            player.body.x = (player.body.x + dx).clamp(20.0, 420.0);
                            sync_host(&player, &mut enemies);
                        },
                    }
                    prop_assert!(invariant_holds(&player, &enemies));
                    let possessed = enemies.iter().filter(|e| e.is_possessed()).count();
                    prop_assert!(possessed <= 1);
                    prop_assert_eq!(possessed == 1, player.is_possessing());
                }
            }
        }
    }
}
