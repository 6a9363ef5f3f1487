/// Keyboard state tracker.
///
/// Held keys drive movement and climbing; jump and fire are
/// edge-triggered so holding Space does not bunny-hop.
///
/// Terminals rarely report key releases, so a key counts as released once
/// no Press/Repeat event has arrived for `HOLD_TIMEOUT`. When the terminal
/// does report releases (keyboard enhancement), those are honoured.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;

/// Long enough to bridge the initial key-repeat delay of most terminals.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Bindings ──

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' ')];
pub const KEYS_FIRE: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F'), KeyCode::Char('x'), KeyCode::Char('X')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

pub struct InputState {
    /// Last Press/Repeat time per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    raw_events: Vec<KeyEvent>,
    /// Only set once keyboard enhancement is confirmed.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking. Call once per
    /// loop iteration.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            self.raw_events.push(key);

            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.last_active.remove(&key.code);
                }
                // unreliable without enhancement; the timeout handles it
                KeyEventKind::Release => {}
                _ => {
                    if !self.is_held(key.code) {
                        self.fresh_presses.push(key.code);
                    }
                    self.last_active.insert(key.code, Instant::now());
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code).map_or(false, |t| t.elapsed() < HOLD_TIMEOUT)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Movement is level-triggered (a fresh press counts as held), jump and
    /// fire are edge-triggered.
    pub fn controls(&self) -> FrameInput {
        let active = |keys: &[KeyCode]| self.any_held(keys) || self.any_pressed(keys);
        FrameInput {
            left: active(KEYS_LEFT),
            right: active(KEYS_RIGHT),
            up: active(KEYS_UP),
            down: active(KEYS_DOWN),
            jump: self.any_pressed(KEYS_JUMP),
            fire: self.any_pressed(KEYS_FIRE),
        }
    }

    /// Digit key pressed this drain, if any (level pick on the title screen).
    pub fn digit_pressed(&self) -> Option<usize> {
        self.fresh_presses.iter().find_map(|code| match code {
            KeyCode::Char(c) => c.to_digit(10).map(|d| d as usize),
            _ => None,
        })
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}
