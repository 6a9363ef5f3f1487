/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Every physics constant and scoring threshold lives here so a level
/// designer can retune the feel without a rebuild. Missing sections or
/// keys fall back to the defaults below.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::geometry::Field;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub gamepad: GamepadConfig,
    /// Resolved path of the level table; `None` means use the embedded levels.
    pub levels_file: Option<PathBuf>,
    pub log_filter: String,
    pub log_file: PathBuf,
}

/// Everything the simulation reads each tick.
#[derive(Clone, Debug)]
pub struct Tuning {
    pub field: Field,
    pub player: PlayerTuning,
    pub barrel: BarrelTuning,
    pub monkey: MonkeyTuning,
    pub bullet: ProjectileTuning,
    pub banana: ProjectileTuning,
    pub jump_scoring: JumpScoreTuning,
    pub scoring: ScoringConfig,
    pub sizes: SizeConfig,
    pub ladders: LadderLinkTuning,
    pub gameplay: GameplayConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub gravity: f64,
    pub max_fall_speed: f64,
    /// Negative: screen y grows downward.
    pub jump_velocity: f64,
    pub move_speed: f64,
    pub climb_speed: f64,
    pub ladder_detect_tolerance: f64,
    pub ladder_contact_margin: f64,
    pub jump_recent_ticks: u32,
    pub climb_cooldown_ticks: u32,
    /// Support buffer as a fraction of the player's height.
    pub platform_buffer_ratio: f64,
    pub fall_recovery_margin: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BarrelTuning {
    pub gravity: f64,
    pub max_fall_speed: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MonkeyTuning {
    pub speed: f64,
    pub fire_interval: u32,
}

#[derive(Clone, Debug)]
pub struct ProjectileTuning {
    pub speed: f64,
    pub max_range: f64,
    pub width: f64,
    pub height: f64,
}

/// Thresholds of the jump-over-barrel heuristic. Empirically tuned;
/// behaviour exactly at a boundary is implementation-defined.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct JumpScoreTuning {
    pub layer_band: f64,
    pub horizontal_band: f64,
    pub ladder_exclusion: f64,
    pub ladder_vertical_slack: f64,
    pub min_horizontal_travel: f64,
    pub top_grace: f64,
    pub crossing_band: f64,
    pub descent_slack: f64,
    pub min_vertical_motion: f64,
    pub same_platform_band: f64,
    pub still_speed: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub barrel_smash: i64,
    pub barrel_jump: i64,
    pub monkey: i64,
    pub time_bonus_per_second: i64,
}

/// Footprints as `[width, height]`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub player: [f64; 2],
    pub barrel: [f64; 2],
    pub monkey: [f64; 2],
    pub boss: [f64; 2],
    pub platform: [f64; 2],
    pub ladder: [f64; 2],
    pub hammer: [f64; 2],
    pub blaster: [f64; 2],
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LadderLinkTuning {
    pub search_radius: f64,
    pub gap_factor: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    pub tick_rate_ms: u64,
    pub max_frames: u32,
    pub frames_per_second: u32,
    pub blaster_ammo: u32,
    pub boss_health: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub fire: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    field: Field,
    #[serde(default)]
    player: PlayerTuning,
    #[serde(default)]
    barrel: BarrelTuning,
    #[serde(default)]
    monkey: MonkeyTuning,
    #[serde(default)]
    projectiles: TomlProjectiles,
    #[serde(default)]
    jump_scoring: JumpScoreTuning,
    #[serde(default)]
    scoring: ScoringConfig,
    #[serde(default)]
    sizes: SizeConfig,
    #[serde(default)]
    ladders: LadderLinkTuning,
    #[serde(default)]
    gameplay: GameplayConfig,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug, Default)]
struct TomlProjectiles {
    #[serde(default)]
    bullet: TomlProjectile,
    #[serde(default)]
    banana: TomlProjectile,
}

/// One `[projectiles.*]` table. Unset keys keep that projectile's own
/// defaults.
#[derive(Deserialize, Debug, Default)]
struct TomlProjectile {
    speed: Option<f64>,
    max_range: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}

impl TomlProjectile {
    fn over(self, base: ProjectileTuning) -> ProjectileTuning {
        ProjectileTuning {
            speed: self.speed.unwrap_or(base.speed),
            max_range: self.max_range.unwrap_or(base.max_range),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
        }
    }
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_fire")]
    fire: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_file")]
    levels_file: String,
    #[serde(default = "default_log_filter")]
    log_filter: String,
    /// Empty: `barrelhop.log` in the system temp directory.
    #[serde(default)]
    log_file: String,
}

// ── Defaults ──

fn default_bullet() -> ProjectileTuning {
    ProjectileTuning { speed: 3.8, max_range: 300.0, width: 12.0, height: 6.0 }
}
fn default_banana() -> ProjectileTuning {
    ProjectileTuning { speed: 1.8, max_range: 300.0, width: 20.0, height: 16.0 }
}

fn default_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_fire() -> Vec<String> { vec!["X".into(), "Y".into(), "R1".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_levels_file() -> String { "levels.toml".into() }
fn default_log_filter() -> String { "warn".into() }

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            field: Field::default(),
            player: PlayerTuning::default(),
            barrel: BarrelTuning::default(),
            monkey: MonkeyTuning::default(),
            bullet: default_bullet(),
            banana: default_banana(),
            jump_scoring: JumpScoreTuning::default(),
            scoring: ScoringConfig::default(),
            sizes: SizeConfig::default(),
            ladders: LadderLinkTuning::default(),
            gameplay: GameplayConfig::default(),
        }
    }
}

impl Default for PlayerTuning {
    fn default() -> Self {
        PlayerTuning {
            gravity: 0.2,
            max_fall_speed: 10.0,
            jump_velocity: -5.0,
            move_speed: 3.5,
            climb_speed: 2.0,
            ladder_detect_tolerance: 15.0,
            ladder_contact_margin: 2.0,
            jump_recent_ticks: 40,
            climb_cooldown_ticks: 10,
            platform_buffer_ratio: 0.1,
            fall_recovery_margin: 200.0,
        }
    }
}

impl Default for BarrelTuning {
    fn default() -> Self {
        BarrelTuning { gravity: 0.4, max_fall_speed: 5.0 }
    }
}

impl Default for MonkeyTuning {
    fn default() -> Self {
        MonkeyTuning { speed: 0.5, fire_interval: 300 }
    }
}

impl Default for JumpScoreTuning {
    fn default() -> Self {
        JumpScoreTuning {
            layer_band: 70.0,
            horizontal_band: 25.0,
            ladder_exclusion: 20.0,
            ladder_vertical_slack: 10.0,
            min_horizontal_travel: 1.5,
            top_grace: 8.0,
            crossing_band: 20.0,
            descent_slack: 2.0,
            min_vertical_motion: 0.5,
            same_platform_band: 40.0,
            still_speed: 0.1,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig { barrel_smash: 100, barrel_jump: 30, monkey: 100, time_bonus_per_second: 3 }
    }
}

impl Default for SizeConfig {
    fn default() -> Self {
        SizeConfig {
            player: [30.0, 40.0],
            barrel: [30.0, 30.0],
            monkey: [36.0, 36.0],
            boss: [80.0, 70.0],
            platform: [100.0, 20.0],
            ladder: [30.0, 100.0],
            hammer: [30.0, 30.0],
            blaster: [30.0, 25.0],
        }
    }
}

impl Default for LadderLinkTuning {
    fn default() -> Self {
        LadderLinkTuning { search_radius: 100.0, gap_factor: 1.5 }
    }
}

impl Default for GameplayConfig {
    fn default() -> Self {
        GameplayConfig {
            tick_rate_ms: 16,
            max_frames: 10_000,
            frames_per_second: 60,
            blaster_ammo: 5,
            boss_health: 5,
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            fire: default_fire(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_file: default_levels_file(),
            log_filter: default_log_filter(),
            log_file: String::new(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_name = PathBuf::from(&cfg.general.levels_file);
        let levels_file = if levels_name.is_absolute() {
            Some(levels_name).filter(|p| p.is_file())
        } else {
            search_dirs.iter().map(|d| d.join(&levels_name)).find(|p| p.is_file())
        };

        GameConfig {
            tuning: Tuning {
                field: cfg.field,
                player: cfg.player,
                barrel: cfg.barrel,
                monkey: cfg.monkey,
                bullet: cfg.projectiles.bullet.over(default_bullet()),
                banana: cfg.projectiles.banana.over(default_banana()),
                jump_scoring: cfg.jump_scoring,
                scoring: cfg.scoring,
                sizes: cfg.sizes,
                ladders: cfg.ladders,
                gameplay: cfg.gameplay,
            },
            gamepad: GamepadConfig {
                jump: cfg.gamepad.jump,
                fire: cfg.gamepad.fire,
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
            },
            levels_file,
            log_filter: cfg.general.log_filter,
            log_file: if cfg.general.log_file.is_empty() {
                std::env::temp_dir().join("barrelhop.log")
            } else {
                PathBuf::from(cfg.general.log_file)
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + data dirs (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // ~/.local/share/barrelhop
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/barrelhop");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
///
/// Runs before the logger exists, so problems go straight to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    eprintln!("Warning: config.toml parse error: {e}");
                    eprintln!("Using default settings.");
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                eprintln!("Warning: could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        let game = GameConfig::from_toml(cfg, &[]);
        assert_eq!(game.tuning.player.jump_velocity, -5.0);
        assert_eq!(game.tuning.bullet.speed, 3.8);
        assert_eq!(game.tuning.banana.speed, 1.8);
        assert_eq!(game.tuning.monkey.fire_interval, 300);
        assert_eq!(game.tuning.field.width, 1024.0);
        assert_eq!(game.gamepad.confirm, vec!["Start".to_string()]);
        assert!(game.levels_file.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let text = r#"
            [player]
            gravity = 0.3

            [projectiles.banana]
            speed = 2.5

            [jump_scoring]
            horizontal_band = 30.0
        "#;
        let cfg: TomlConfig = toml::from_str(text).unwrap();
        let game = GameConfig::from_toml(cfg, &[]);
        assert_eq!(game.tuning.player.gravity, 0.3);
        assert_eq!(game.tuning.player.move_speed, 3.5);
        assert_eq!(game.tuning.banana.speed, 2.5);
        // unset banana keys keep the banana's own footprint
        assert_eq!(game.tuning.banana.max_range, 300.0);
        assert_eq!((game.tuning.banana.width, game.tuning.banana.height), (20.0, 16.0));
        assert_eq!(game.tuning.bullet.speed, 3.8);
        assert_eq!(game.tuning.jump_scoring.horizontal_band, 30.0);
        assert_eq!(game.tuning.jump_scoring.layer_band, 70.0);
    }

    #[test]
    fn partial_bullet_table_keeps_bullet_footprint() {
        let cfg: TomlConfig = toml::from_str("[projectiles.bullet]\nmax_range = 150.0").unwrap();
        let game = GameConfig::from_toml(cfg, &[]);
        assert_eq!(game.tuning.bullet.max_range, 150.0);
        assert_eq!(game.tuning.bullet.speed, 3.8);
        assert_eq!((game.tuning.bullet.width, game.tuning.bullet.height), (12.0, 6.0));
        assert_eq!((game.tuning.banana.width, game.tuning.banana.height), (20.0, 16.0));
    }

    #[test]
    fn malformed_value_is_a_parse_error() {
        assert!(toml::from_str::<TomlConfig>("[player]\ngravity = \"heavy\"").is_err());
    }
}
