/// Gamepad input via gilrs (feature `gamepad`).
///
/// D-pad and left stick move and climb. Face buttons are mapped to jump,
/// fire, confirm and cancel from the `[gamepad]` config section; defaults:
///   A / B          →  Jump
///   X / Y / R1     →  Fire
///   Start          →  Confirm
///   Select         →  Quit
///
/// Without the feature the state stays idle and every query is false.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::FrameInput;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BUTTON_COUNT: usize = 10;

impl Btn {
    fn from_name(name: &str) -> Option<Btn> {
        match name.trim().to_ascii_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Four directions from one source (d-pad or stick).
#[derive(Clone, Copy, Debug, Default)]
struct Cross {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

impl Cross {
    fn each(&mut self) -> [&mut BtnState; 4] {
        [&mut self.up, &mut self.down, &mut self.left, &mut self.right]
    }
}

struct ActionMap {
    jump: Vec<Btn>,
    fire: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump: vec![Btn::A, Btn::B],
            fire: vec![Btn::X, Btn::Y, Btn::R1],
            confirm: vec![Btn::Start],
            cancel: vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    buttons: [BtnState; BUTTON_COUNT],
    dpad: Cross,
    stick: Cross,
    stick_x: f32,
    stick_y: f32,
    actions: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::info!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); BUTTON_COUNT],
            dpad: Cross::default(),
            stick: Cross::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            actions: ActionMap::default(),
            connected,
        }
    }

    /// Apply the configured mapping. An action whose list names no known
    /// button keeps its default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn apply(slot: &mut Vec<Btn>, names: &[String], action: &str) {
            let parsed: Vec<Btn> = names.iter().filter_map(|n| Btn::from_name(n)).collect();
            if parsed.is_empty() {
                log::warn!("gamepad: no known buttons for `{action}` in {names:?}; keeping defaults");
            } else {
                *slot = parsed;
            }
        }
        apply(&mut self.actions.jump, &cfg.jump, "jump");
        apply(&mut self.actions.fire, &cfg.fire, "fire");
        apply(&mut self.actions.confirm, &cfg.confirm, "confirm");
        apply(&mut self.actions.cancel, &cfg.cancel, "cancel");
    }

    pub fn update(&mut self) {
        for b in self.buttons.iter_mut() { b.just_pressed = false; }
        for b in self.dpad.each().into_iter().chain(self.stick.each()) { b.just_pressed = false; }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.set_button(btn, true),
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, value, _) => self.stick_x = value,
                EventType::AxisChanged(Axis::LeftStickY, value, _) => self.stick_y = value,
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.stick.left.set(self.stick_x < -STICK_DEADZONE);
        self.stick.right.set(self.stick_x > STICK_DEADZONE);
        self.stick.up.set(self.stick_y > STICK_DEADZONE);
        self.stick.down.set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        self.connected = true;
        match btn {
            Button::DPadUp => self.dpad.up.set(held),
            Button::DPadDown => self.dpad.down.set(held),
            Button::DPadLeft => self.dpad.left.set(held),
            Button::DPadRight => self.dpad.right.set(held),
            other => {
                if let Some(b) = Btn::from_gilrs(other) {
                    self.buttons[b as usize].set(held);
                }
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BUTTON_COUNT];
        self.dpad = Cross::default();
        self.stick = Cross::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }

    // ── Queries ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn controls(&self) -> FrameInput {
        FrameInput {
            left: self.dpad.left.held || self.stick.left.held,
            right: self.dpad.right.held || self.stick.right.held,
            up: self.dpad.up.held || self.stick.up.held,
            down: self.dpad.down.held || self.stick.down.held,
            jump: self.any_just_pressed(&self.actions.jump),
            fire: self.any_just_pressed(&self.actions.fire),
        }
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.confirm)
    }

    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.actions.cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name(" rb "), Some(Btn::R1));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Z"), None);
    }

    #[test]
    fn config_overrides_only_known_buttons() {
        let mut pad = GamepadState::new();
        let cfg = GamepadConfig {
            jump: vec!["Y".into()],
            fire: vec!["nonsense".into()],
            confirm: vec!["A".into(), "Start".into()],
            cancel: vec![],
        };
        pad.load_button_config(&cfg);
        assert_eq!(pad.actions.jump, vec![Btn::Y]);
        assert_eq!(pad.actions.fire, vec![Btn::X, Btn::Y, Btn::R1]);
        assert_eq!(pad.actions.confirm, vec![Btn::A, Btn::Start]);
        assert_eq!(pad.actions.cancel, vec![Btn::Select]);
    }

    #[test]
    fn edge_only_on_transition() {
        let mut b = BtnState::default();
        b.set(true);
        assert!(b.just_pressed);
        b.just_pressed = false;
        b.set(true);
        assert!(!b.just_pressed);
        b.set(false);
        assert!(!b.held);
    }
}
