/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Frame counter and time limit
///   2. Barrel eligibility reset
///   3. Player movement (input, ladders, gravity)
///   4. Jump-over-barrel scoring
///   5. Hammer smashes barrels
///   6. Player support and failsafe
///   7. Pickups
///   8. Shooting
///   9. Monkeys (walk, throw, contact)
///  10. Bullets (advance, then hit monkeys or the boss)
///  11. Bananas (contact, then advance)
///  12. Boss contact
///  13. Barrels (fall, land, contact)
///
/// Eligibility flags are reset before scoring reads them; the player is
/// fully moved before anything is checked against it; bananas thrown this
/// tick exist before projectile checks run. Any phase that ends the level
/// stops the tick.

use crate::domain::barrel::Barrel;
use crate::domain::contact::{self, Contact, ContactOutcome, EntityKind, Hit};
use crate::domain::entity::{FrameInput, PickupKind};
use crate::domain::monkey::Monkey;
use crate::domain::player::Player;
use crate::domain::terrain::TerrainView;
use super::event::{DeathCause, GameEvent};
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.frame += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    if world.frame >= world.tuning.gameplay.max_frames {
        lose(world, DeathCause::TimeUp, &mut events);
        return events;
    }

    for barrel in &mut world.barrels {
        barrel.reset_frame_flags();
    }

    resolve_player_motion(world, &input, &mut events);
    resolve_jump_scoring(world, &mut events);
    resolve_hammer_smash(world, &mut events);
    resolve_support(world);
    resolve_pickups(world, &mut events);
    resolve_shooting(world, input.fire, &mut events);
    if resolve_monkeys(world, &mut events) { return events; }
    if resolve_bullets(world, &mut events) { return events; }
    if resolve_bananas(world, &mut events) { return events; }
    if resolve_boss_contact(world, &mut events) { return events; }
    resolve_barrels(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player_motion(world: &mut WorldState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    let terrain = TerrainView { platforms: &world.platforms, ladders: &world.ladders };
    let fx = world.player.update(input, terrain, &world.tuning.field, &world.tuning.player);
    if fx.jumped { events.push(GameEvent::Jumped); }
    if fx.grabbed_ladder { events.push(GameEvent::LadderGrabbed); }
}

fn resolve_jump_scoring(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let credited = world.player.award_jump_points(
        &mut world.barrels,
        &world.ladders,
        &world.tuning.jump_scoring,
    );
    if let Some(id) = credited {
        events.push(GameEvent::BarrelJumped { id });
    }
}

fn resolve_hammer_smash(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.player.has_hammer() { return; }
    for barrel in world.barrels.iter_mut().filter(|b| !b.is_destroyed()) {
        let hit = contact::check(&world.player.body, Contact::Player, &barrel.body, EntityKind::Barrel, true);
        if matches!(hit, Some(Hit { outcome: ContactOutcome::SmashBarrel, .. })) {
            smash(barrel, &mut world.player, events);
        }
    }
}

fn smash(barrel: &mut Barrel, player: &mut Player, events: &mut Vec<GameEvent>) {
    barrel.destroy();
    player.credit_smash();
    log::debug!("barrel {} smashed (total smashed {})", barrel.id, player.score.barrels_destroyed);
    events.push(GameEvent::BarrelSmashed { id: barrel.id });
}

fn resolve_support(world: &mut WorldState) {
    world.player.settle(&world.platforms, &world.tuning.field, &world.tuning.player);
}

fn resolve_pickups(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for pickup in &mut world.pickups {
        if !pickup.try_collect(&world.player.body) { continue; }
        match pickup.kind {
            PickupKind::Hammer => world.player.collect_hammer(),
            PickupKind::Blaster => world.player.collect_blaster(world.tuning.gameplay.blaster_ammo),
        }
        log::debug!("{:?} collected at ({:.1}, {:.1})", pickup.kind, pickup.body.x, pickup.body.y);
        events.push(GameEvent::PickupCollected { kind: pickup.kind });
    }
}

fn resolve_shooting(world: &mut WorldState, fire: bool, events: &mut Vec<GameEvent>) {
    if !fire { return; }
    if let Some(bullet) = world.player.try_shoot(&world.tuning.bullet) {
        world.bullets.push(bullet);
        events.push(GameEvent::ShotFired);
    }
}

// ══════════════════════════════════════════════════════════════
// Monkeys and projectiles
// ══════════════════════════════════════════════════════════════

fn monkey_kind(monkey: &Monkey) -> EntityKind {
    if monkey.is_thrower() { EntityKind::Thrower } else { EntityKind::Monkey }
}

fn resolve_monkeys(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let has_hammer = world.player.has_hammer();
    let mut death = None;

    for monkey in world.monkeys.iter_mut().filter(|m| !m.is_destroyed()) {
        if monkey.update(&world.platforms, &world.tuning.field, &world.tuning.monkey) {
            world.bananas.push(monkey.throw(&world.tuning.banana));
            events.push(GameEvent::BananaThrown { monkey: monkey.id });
        }

        let kind = monkey_kind(monkey);
        match contact::check(&world.player.body, Contact::Player, &monkey.body, kind, has_hammer) {
            Some(Hit { outcome: ContactOutcome::DestroyMonkey, .. }) => {
                monkey.destroy();
                world.player.add_bonus(world.tuning.scoring.monkey);
                log::debug!("{} {} smashed", kind.label(), monkey.id);
                events.push(GameEvent::MonkeyDestroyed { id: monkey.id });
            }
            Some(Hit { outcome: ContactOutcome::PlayerDies, side }) => {
                death = Some(DeathCause::Contact { kind, side });
                break;
            }
            _ => {}
        }
    }

    match death {
        Some(cause) => {
            lose(world, cause, events);
            true
        }
        None => false,
    }
}

fn resolve_bullets(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let WorldState { bullets, monkeys, boss, player, tuning, .. } = world;

    bullets.retain_mut(|b| !b.advance(&tuning.field));

    let mut boss_down = false;
    bullets.retain(|bullet| {
        if boss_down { return true; }

        let target = monkeys.iter_mut()
            .filter(|m| !m.is_destroyed())
            .find(|m| {
                let hit = contact::check(&bullet.body, Contact::Bullet, &m.body, monkey_kind(m), false);
                matches!(hit, Some(Hit { outcome: ContactOutcome::DestroyMonkey, .. }))
            });
        if let Some(monkey) = target {
            monkey.destroy();
            player.add_bonus(tuning.scoring.monkey);
            log::debug!("{} {} shot", monkey_kind(monkey).label(), monkey.id);
            events.push(GameEvent::MonkeyDestroyed { id: monkey.id });
            return false;
        }

        if let Some(boss) = boss.as_mut() {
            let hit = contact::check(&bullet.body, Contact::Bullet, &boss.body, EntityKind::Boss, false);
            if matches!(hit, Some(Hit { outcome: ContactOutcome::BossDamaged, .. })) {
                boss.reduce_health();
                log::debug!("boss hit, health {}", boss.health);
                events.push(GameEvent::BossHit { health: boss.health });
                boss_down = boss.is_dead();
                return false;
            }
        }
        true
    });

    if boss_down {
        win(world, events);
    }
    boss_down
}

fn resolve_bananas(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let has_hammer = world.player.has_hammer();
    let player = &world.player.body;
    let hit = world.bananas.iter()
        .find_map(|b| contact::check(player, Contact::Player, &b.body, EntityKind::Banana, has_hammer));

    if let Some(hit) = hit {
        lose(world, DeathCause::Contact { kind: EntityKind::Banana, side: hit.side }, events);
        return true;
    }

    let field = &world.tuning.field;
    world.bananas.retain_mut(|b| !b.advance(field));
    false
}

fn resolve_boss_contact(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let has_hammer = world.player.has_hammer();
    let hit = world.boss.as_ref()
        .and_then(|boss| contact::check(&world.player.body, Contact::Player, &boss.body, EntityKind::Boss, has_hammer));

    match hit {
        Some(Hit { outcome: ContactOutcome::BossDefeated, .. }) => {
            win(world, events);
            true
        }
        Some(Hit { outcome: ContactOutcome::PlayerDies, side }) => {
            lose(world, DeathCause::Contact { kind: EntityKind::Boss, side }, events);
            true
        }
        _ => false,
    }
}

// ══════════════════════════════════════════════════════════════
// Barrels
// ══════════════════════════════════════════════════════════════

fn resolve_barrels(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let has_hammer = world.player.has_hammer();
    let mut death = None;

    for barrel in world.barrels.iter_mut().filter(|b| !b.is_destroyed()) {
        barrel.update(&world.tuning.barrel);
        barrel.try_snap_to_platform(&world.platforms);

        if death.is_some() { continue; }
        match contact::check(&world.player.body, Contact::Player, &barrel.body, EntityKind::Barrel, has_hammer) {
            Some(Hit { outcome: ContactOutcome::SmashBarrel, .. }) => smash(barrel, &mut world.player, events),
            Some(Hit { outcome: ContactOutcome::PlayerDies, side }) => {
                death = Some(DeathCause::Contact { kind: EntityKind::Barrel, side });
            }
            _ => {}
        }
    }

    if let Some(cause) = death {
        lose(world, cause, events);
    }
}

// ══════════════════════════════════════════════════════════════
// Level outcome
// ══════════════════════════════════════════════════════════════

fn lose(world: &mut WorldState, cause: DeathCause, events: &mut Vec<GameEvent>) {
    log::info!(
        "level {} lost at frame {}: {cause:?} (player at {:.1}, {:.1})",
        world.current_level, world.frame, world.player.body.x, world.player.body.y,
    );
    world.phase = Phase::GameOver;
    world.final_score = 0;
    events.push(GameEvent::PlayerKilled { cause });
}

fn win(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let time_bonus = world.time_bonus();
    world.player.add_bonus(time_bonus);
    let score = world.score();
    world.final_score = score;
    world.phase = if world.current_level < world.total_levels {
        Phase::LevelCleared
    } else {
        Phase::Victory
    };
    log::info!(
        "level {} cleared at frame {} with score {score} (time bonus {time_bonus})",
        world.current_level, world.frame,
    );
    events.push(GameEvent::LevelCleared { level: world.current_level, time_bonus, score });
}
