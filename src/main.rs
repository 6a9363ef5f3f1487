/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::level::{level_count, level_source, start_level};
use sim::props::Props;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_CONFIRM, KEYS_QUIT};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];

fn main() {
    let config = GameConfig::load();
    logging::init(&config.log_filter, Some(&config.log_file));

    let levels = match level_source(&config) {
        Ok(props) => props,
        Err(e) => {
            eprintln!("Could not load levels: {e}");
            return;
        }
    };

    let mut world = WorldState::new(config.tuning.clone());
    world.total_levels = level_count(&levels);
    log::info!("{} levels available", world.total_levels);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config, &levels);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        log::error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Barrelhop!");
    println!("Final Score: {}", world.final_score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    levels: &Props,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let tick_rate = Duration::from_millis(config.tuning.gameplay.tick_rate_ms.max(1));
    let mut last_tick = Instant::now();

    // Jump and fire are edges; hold them until the next tick consumes them.
    let mut pending = FrameInput::default();
    let mut paused = false;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &gp, levels, &mut paused) {
            break;
        }

        if world.phase == Phase::Playing && !paused {
            let fresh = kb.controls();
            let pad = gp.controls();
            pending.jump |= fresh.jump || pad.jump;
            pending.fire |= fresh.fire || pad.fire;
        }

        if last_tick.elapsed() >= tick_rate {
            if world.phase == Phase::Playing && !paused {
                let (held, pad) = (kb.controls(), gp.controls());
                let input = FrameInput {
                    left: held.left || pad.left,
                    right: held.right || pad.right,
                    up: held.up || pad.up,
                    down: held.down || pad.down,
                    jump: std::mem::take(&mut pending.jump),
                    fire: std::mem::take(&mut pending.fire),
                };
                let events = step::step(world, input);
                if let Some(sfx) = sound {
                    sfx.play_events(&events);
                }
            } else if world.message_timer > 0 {
                world.message_timer -= 1;
                if world.message_timer == 0 { world.message.clear(); }
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Phase transitions driven by menu keys. Returns true to quit.
fn handle_meta(
    world: &mut WorldState,
    kb: &InputState,
    gp: &GamepadState,
    levels: &Props,
    paused: &mut bool,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let cancel = kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed();

    match world.phase {
        Phase::Title => {
            if cancel {
                return true;
            }
            let pick = kb.digit_pressed().filter(|&n| n >= 1).or(confirm.then_some(1));
            if let Some(n) = pick {
                if n > world.total_levels {
                    world.set_message(format!("There is no level {n}"), 90);
                } else {
                    begin(world, levels, n, 0);
                }
            }
        }
        Phase::Playing => {
            if cancel {
                *paused = false;
                log::info!("level {} abandoned", world.current_level);
                return_to_title(world);
            } else if kb.any_pressed(KEYS_PAUSE) {
                *paused = !*paused;
                if *paused {
                    world.set_message("PAUSED  [F1] resume", 0);
                } else {
                    world.message.clear();
                }
            }
        }
        Phase::LevelCleared => {
            if cancel {
                return true;
            }
            if confirm {
                let next = world.current_level + 1;
                let carried = world.final_score;
                begin(world, levels, next, carried);
            }
        }
        Phase::GameOver | Phase::Victory => {
            if cancel {
                return true;
            }
            if confirm {
                return_to_title(world);
            }
        }
    }
    false
}

fn begin(world: &mut WorldState, levels: &Props, number: usize, carried: i64) {
    if let Err(e) = start_level(world, levels, number, carried) {
        log::error!("could not start level {number}: {e}");
        return_to_title(world);
        world.set_message(e.to_string(), 180);
    }
}

/// Back to the title screen, keeping tuning and the level count.
fn return_to_title(world: &mut WorldState) {
    let total = world.total_levels;
    *world = WorldState::new(world.tuning.clone());
    world.total_levels = total;
}
