//! Per-player input snapshots.
//!
//! Raw pad samples come from an [`InputSource`](crate::services::InputSource);
//! [`InputState::refresh`] turns them into edge-triggered [`InputSnapshot`]s
//! once per tick.

use bitflags::bitflags;

/// Number of player slots polled every tick
pub const MAX_PLAYERS: usize = 4;

/// Analog stick deflection that counts as a d-pad press
pub const STICK_THRESHOLD: i16 = 12_000;

/// Trigger travel that counts as a shoulder press
pub const TRIGGER_THRESHOLD: u8 = 100;

bitflags! {
    /// Digital button bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Buttons: u32 {
        const NONE  = 0;
        const A     = 1 << 0;
        const B     = 1 << 1;
        const X     = 1 << 2;
        const Y     = 1 << 3;
        const UP    = 1 << 4;
        const DOWN  = 1 << 5;
        const LEFT  = 1 << 6;
        const RIGHT = 1 << 7;
        const LB    = 1 << 8;
        const RB    = 1 << 9;
        const LT    = 1 << 10;
        const RT    = 1 << 11;
        const START = 1 << 12;
        const BACK  = 1 << 13;
        const HOME  = 1 << 14;

        const DIRECTIONS = Self::UP.bits() | Self::DOWN.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::NONE
    }
}

impl Buttons {
    /// Parse a button name as typed on the headless console
    pub fn from_console_name(name: &str) -> Option<Buttons> {
        let button = match name.to_ascii_lowercase().as_str() {
            "a" | "enter" | "ok" => Buttons::A,
            "b" | "back" | "cancel" => Buttons::B,
            "x" => Buttons::X,
            "y" => Buttons::Y,
            "up" | "u" => Buttons::UP,
            "down" | "d" => Buttons::DOWN,
            "left" | "l" => Buttons::LEFT,
            "right" | "r" => Buttons::RIGHT,
            "lb" => Buttons::LB,
            "rb" => Buttons::RB,
            "lt" => Buttons::LT,
            "rt" => Buttons::RT,
            "start" => Buttons::START,
            "select" => Buttons::BACK,
            "home" | "h" => Buttons::HOME,
            _ => return None,
        };
        Some(button)
    }
}

/// Pointer (IR / mouse) position in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    pub x: i32,
    pub y: i32,
}

/// One raw controller sample as reported by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawPad {
    pub connected: bool,
    pub buttons: Buttons,
    pub stick_x: i16,
    pub stick_y: i16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub pointer: Option<Pointer>,
}

impl RawPad {
    /// Digital state with analog inputs folded in
    pub fn normalized_buttons(&self) -> Buttons {
        if !self.connected {
            return Buttons::NONE;
        }
        let mut held = self.buttons;
        if self.stick_x > STICK_THRESHOLD {
            held |= Buttons::RIGHT;
        } else if self.stick_x < -STICK_THRESHOLD {
            held |= Buttons::LEFT;
        }
        if self.stick_y > STICK_THRESHOLD {
            held |= Buttons::UP;
        } else if self.stick_y < -STICK_THRESHOLD {
            held |= Buttons::DOWN;
        }
        if self.left_trigger > TRIGGER_THRESHOLD {
            held |= Buttons::LT;
        }
        if self.right_trigger > TRIGGER_THRESHOLD {
            held |= Buttons::RT;
        }
        held
    }
}

/// Normalized per-player input for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub player: usize,
    /// Buttons that went down this tick
    pub pressed: Buttons,
    /// Buttons currently down
    pub held: Buttons,
    pub pointer: Option<Pointer>,
}

impl InputSnapshot {
    /// A snapshot pressing `buttons` for one tick, as player 0
    pub fn press(buttons: Buttons) -> Self {
        Self {
            player: 0,
            pressed: buttons,
            held: buttons,
            pointer: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pressed.is_empty()
    }
}

/// Edge detection across ticks for every player slot
#[derive(Debug)]
pub struct InputState {
    previous: [Buttons; MAX_PLAYERS],
    current: [InputSnapshot; MAX_PLAYERS],
}

impl InputState {
    pub fn new() -> Self {
        Self {
            previous: [Buttons::NONE; MAX_PLAYERS],
            current: std::array::from_fn(|player| InputSnapshot {
                player,
                ..InputSnapshot::default()
            }),
        }
    }

    /// Fold this tick's raw samples into snapshots. Missing slots read as
    /// disconnected.
    pub fn refresh(&mut self, raw: &[RawPad]) {
        for player in 0..MAX_PLAYERS {
            let pad = raw.get(player).copied().unwrap_or_default();
            let held = pad.normalized_buttons();
            let pressed = held - self.previous[player];
            self.previous[player] = held;
            self.current[player] = InputSnapshot {
                player,
                pressed,
                held,
                pointer: pad.pointer,
            };
        }
    }

    /// Snapshots in propagation order: the highest player slot first
    pub fn propagation_order(&self) -> impl Iterator<Item = &InputSnapshot> {
        self.current.iter().rev()
    }

    pub fn player(&self, player: usize) -> Option<&InputSnapshot> {
        self.current.get(player)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(buttons: Buttons) -> RawPad {
        RawPad {
            connected: true,
            buttons,
            ..RawPad::default()
        }
    }

    #[test]
    fn test_stick_maps_to_dpad() {
        let raw = RawPad {
            connected: true,
            stick_x: 12_001,
            stick_y: -20_000,
            ..RawPad::default()
        };
        let held = raw.normalized_buttons();
        assert!(held.contains(Buttons::RIGHT));
        assert!(held.contains(Buttons::DOWN));
        assert!(!held.intersects(Buttons::LEFT | Buttons::UP));
    }

    #[test]
    fn test_stick_at_threshold_is_ignored() {
        let raw = RawPad {
            connected: true,
            stick_x: STICK_THRESHOLD,
            ..RawPad::default()
        };
        assert!(raw.normalized_buttons().is_empty());
    }

    #[test]
    fn test_triggers_need_travel() {
        let raw = RawPad {
            connected: true,
            left_trigger: 100,
            right_trigger: 101,
            ..RawPad::default()
        };
        let held = raw.normalized_buttons();
        assert!(!held.contains(Buttons::LT));
        assert!(held.contains(Buttons::RT));
    }

    #[test]
    fn test_disconnected_pad_reads_nothing() {
        let raw = RawPad {
            connected: false,
            buttons: Buttons::A,
            ..RawPad::default()
        };
        assert!(raw.normalized_buttons().is_empty());
    }

    #[test]
    fn test_pressed_is_edge_triggered() {
        let mut state = InputState::new();

        state.refresh(&[pad(Buttons::A)]);
        assert_eq!(state.player(0).unwrap().pressed, Buttons::A);

        state.refresh(&[pad(Buttons::A)]);
        assert!(state.player(0).unwrap().pressed.is_empty());
        assert_eq!(state.player(0).unwrap().held, Buttons::A);

        state.refresh(&[pad(Buttons::NONE)]);
        state.refresh(&[pad(Buttons::A)]);
        assert_eq!(state.player(0).unwrap().pressed, Buttons::A);
    }

    #[test]
    fn test_propagation_order_is_reverse() {
        let state = InputState::new();
        let order: Vec<usize> = state.propagation_order().map(|s| s.player).collect();
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_release_does_not_count_as_press() {
        let mut state = InputState::new();
        state.refresh(&[pad(Buttons::A | Buttons::LEFT)]);
        state.refresh(&[pad(Buttons::LEFT)]);
        assert!(state.player(0).unwrap().pressed.is_empty());
        assert_eq!(state.player(0).unwrap().held, Buttons::LEFT);
        assert!(Buttons::DIRECTIONS.contains(Buttons::LEFT | Buttons::UP));
    }

    #[test]
    fn test_button_names() {
        assert_eq!(Buttons::from_console_name("HOME"), Some(Buttons::HOME));
        assert_eq!(Buttons::from_console_name("left"), Some(Buttons::LEFT));
        assert_eq!(Buttons::from_console_name("nope"), None);
    }
}
