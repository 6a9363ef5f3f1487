/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels_file` from config (a TOML level table)
///   2. Built-in embedded table (`default_levels.toml`)
///
/// ## Level table format:
///   ```toml
///   [level1]
///   name = "Girders"
///   player = "100,728"
///   boss = "550,210"
///   boss_health = 3                  # optional, else [gameplay] boss_health
///   hammer = "600,433"
///   platforms = "50,758; 150,758"      # or ["50,758", "150,758"]
///   ladders = "880,700"
///   barrels = "500,700; 500,600"
///   blasters = "250,735.5"
///   monkeys = ["500,630;right;100,100"]
///   throwers = ["400,430;left;100,100"]
///   ```
///
/// Every coordinate is an entity center. Sizes come from `[sizes]` in
/// config. Malformed entries are skipped with a warning; only a missing
/// player or an empty platform list rejects the level.

use crate::config::GameConfig;
use crate::domain::barrel::Barrel;
use crate::domain::entity::{Boss, Facing, Pickup, PickupKind};
use crate::domain::geometry::Body;
use crate::domain::monkey::{Monkey, MonkeyKind};
use crate::domain::player::Player;
use crate::domain::terrain::{self, Ladder, Platform};
use crate::error::LevelError;
use crate::sim::props::Props;
use crate::sim::world::{Phase, WorldState};

const DEFAULT_LEVELS: &str = include_str!("default_levels.toml");

/// How long the level name stays on screen.
const INTRO_MESSAGE_TICKS: u32 = 120;

type Point = (f64, f64);

#[derive(Clone, Debug, PartialEq)]
pub struct MonkeySpawn {
    pub thrower: bool,
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
    pub route: Vec<f64>,
}

/// One level as read from the table, before any entity exists.
#[derive(Clone, Debug)]
pub struct LevelDef {
    /// 1-based.
    pub number: usize,
    pub name: String,
    pub player: Point,
    pub boss: Option<Point>,
    /// Per-level override of the configured boss health.
    pub boss_health: Option<u32>,
    pub hammers: Vec<Point>,
    pub blasters: Vec<Point>,
    pub platforms: Vec<Point>,
    pub ladders: Vec<Point>,
    pub barrels: Vec<Point>,
    pub monkeys: Vec<MonkeySpawn>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// The level table to play: the configured file, else the built-in one.
pub fn level_source(config: &GameConfig) -> Result<Props, LevelError> {
    if let Some(path) = &config.levels_file {
        match Props::load(path) {
            Ok(props) => {
                log::info!("levels loaded from {}", path.display());
                return Ok(props);
            }
            Err(e) => log::warn!("{e}; falling back to built-in levels"),
        }
    }
    builtin_levels()
}

pub fn builtin_levels() -> Result<Props, LevelError> {
    Props::parse(DEFAULT_LEVELS)
}

/// Number of consecutive `levelN` tables, counting from 1.
pub fn level_count(props: &Props) -> usize {
    (1..).take_while(|n| props.has(&format!("level{n}"))).count()
}

/// Load level `number` and credit `carried` points from earlier levels.
pub fn start_level(world: &mut WorldState, props: &Props, number: usize, carried: i64) -> Result<(), LevelError> {
    let def = LevelDef::parse(props, number)?;
    world.total_levels = level_count(props);
    load_level(world, &def);
    world.player.add_bonus(carried);
    log::info!("level {number} \"{}\" started with {carried} carried points", def.name);
    Ok(())
}

/// Replace the world's entities with those of `def`. Score starts at zero.
pub fn load_level(world: &mut WorldState, def: &LevelDef) {
    world.clear_entities();
    let sizes = world.tuning.sizes.clone();

    let [w, h] = sizes.platform;
    world.platforms = def.platforms.iter().map(|&(x, y)| Platform::new(x, y, w, h)).collect();

    let [w, h] = sizes.ladder;
    world.ladders = def.ladders.iter().map(|&(x, y)| Ladder::new(x, y, w, h)).collect();
    terrain::link_ladders(&mut world.ladders, &world.platforms, &world.tuning.ladders);

    let [w, h] = sizes.barrel;
    world.barrels = def.barrels.iter()
        .enumerate()
        .map(|(id, &(x, y))| Barrel::new(id, x, y, w, h))
        .collect();

    let [w, h] = sizes.monkey;
    world.monkeys = def.monkeys.iter()
        .enumerate()
        .map(|(id, spawn)| {
            let kind = if spawn.thrower {
                MonkeyKind::Thrower { fire_cooldown: 0 }
            } else {
                MonkeyKind::Patrol
            };
            Monkey::new(id, kind, Body::new(spawn.x, spawn.y, w, h), spawn.facing, spawn.route.clone())
        })
        .collect();

    world.boss = def.boss.map(|(x, y)| {
        let [w, h] = sizes.boss;
        let health = def.boss_health.unwrap_or(world.tuning.gameplay.boss_health);
        let mut boss = Boss::new(x, y, w, h, health);
        terrain::snap_to_platform_below(&mut boss.body, &world.platforms);
        boss
    });

    let [w, h] = sizes.hammer;
    world.pickups.extend(def.hammers.iter()
        .map(|&(x, y)| Pickup::new(PickupKind::Hammer, Body::new(x, y, w, h))));
    let [w, h] = sizes.blaster;
    world.pickups.extend(def.blasters.iter()
        .map(|&(x, y)| Pickup::new(PickupKind::Blaster, Body::new(x, y, w, h))));

    let [w, h] = sizes.player;
    world.player = Player::new(def.player.0, def.player.1, w, h);

    world.current_level = def.number;
    world.level_name = def.name.clone();
    world.frame = 0;
    world.final_score = 0;
    world.phase = Phase::Playing;
    world.set_message(def.name.clone(), INTRO_MESSAGE_TICKS);
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

impl LevelDef {
    pub fn parse(props: &Props, number: usize) -> Result<Self, LevelError> {
        let section = format!("level{number}");
        if !props.has(&section) {
            return Err(LevelError::UnknownLevel(number));
        }
        let key = |name: &str| format!("{section}.{name}");

        let name = if props.has(&key("name")) {
            props.get_str(&key("name"))
        } else {
            format!("Level {number}")
        };

        let player = props.has(&key("player"))
            .then(|| parse_point(&props.get_str(&key("player"))))
            .flatten()
            .ok_or_else(|| LevelError::MissingKey { level: number, key: "player".into() })?;

        let boss = if props.has(&key("boss")) {
            let raw = props.get_str(&key("boss"));
            let point = parse_point(&raw);
            if point.is_none() {
                log::warn!("{section}: ignoring malformed boss position {raw:?}");
            }
            point
        } else {
            None
        };

        let boss_health = if props.has(&key("boss_health")) {
            let raw = props.get_f64(&key("boss_health"));
            if raw >= 1.0 && raw.is_finite() {
                Some(raw as u32)
            } else {
                log::warn!("{section}: boss_health must be at least 1; using the configured default");
                None
            }
        } else {
            None
        };

        let platforms = points(props, &key("platforms"));
        if platforms.is_empty() {
            return Err(LevelError::NoPlatforms(number));
        }

        let mut monkeys = spawns(props, &key("monkeys"), false);
        monkeys.extend(spawns(props, &key("throwers"), true));

        Ok(LevelDef {
            number,
            name,
            player,
            boss,
            boss_health,
            hammers: optional_points(props, &key("hammer")),
            blasters: optional_points(props, &key("blasters")),
            platforms,
            ladders: optional_points(props, &key("ladders")),
            barrels: optional_points(props, &key("barrels")),
            monkeys,
        })
    }
}

/// `"x,y"` with optional whitespace around each number. Both must be finite.
pub fn parse_point(raw: &str) -> Option<Point> {
    let (x, y) = raw.split_once(',')?;
    let point: Point = (x.trim().parse().ok()?, y.trim().parse().ok()?);
    (point.0.is_finite() && point.1.is_finite()).then_some(point)
}

/// `"x,y;direction;leg,leg,..."`. Non-positive or infinite legs are dropped; a record
/// left without any leg is rejected.
pub fn parse_monkey(raw: &str, thrower: bool) -> Option<MonkeySpawn> {
    let parts: Vec<&str> = raw.split(';').collect();
    let [pos, dir, route] = parts.as_slice() else { return None };
    let (x, y) = parse_point(pos)?;
    let facing = Facing::parse(dir)?;
    let route: Vec<f64> = route.split(',')
        .filter_map(|leg| leg.trim().parse::<f64>().ok())
        .filter(|&leg| leg > 0.0 && leg.is_finite())
        .collect();
    if route.is_empty() {
        return None;
    }
    Some(MonkeySpawn { thrower, x, y, facing, route })
}

fn points(props: &Props, key: &str) -> Vec<Point> {
    props.get_list(key)
        .iter()
        .filter_map(|entry| {
            let point = parse_point(entry);
            if point.is_none() {
                log::warn!("{key}: skipping malformed point {entry:?}");
            }
            point
        })
        .collect()
}

/// Like [`points`], but an absent key is simply an empty list.
fn optional_points(props: &Props, key: &str) -> Vec<Point> {
    if props.has(key) { points(props, key) } else { vec![] }
}

fn spawns(props: &Props, key: &str, thrower: bool) -> Vec<MonkeySpawn> {
    if !props.has(key) {
        return vec![];
    }
    props.get_records(key)
        .iter()
        .filter_map(|record| {
            let spawn = parse_monkey(record, thrower);
            if spawn.is_none() {
                log::warn!("{key}: skipping malformed monkey {record:?}");
            }
            spawn
        })
        .collect()
}
