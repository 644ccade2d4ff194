//! Keyboard mapping from winit physical keys to game intents.

use std::collections::HashSet;

use winit::keyboard::KeyCode;

use crate::movement::MovementKeys;

/// Discrete keys the menu / pause / completion flow reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Enter,
    Space,
    Escape,
}

pub fn menu_key(code: KeyCode) -> Option<MenuKey> {
    match code {
        KeyCode::ArrowUp => Some(MenuKey::Up),
        KeyCode::ArrowDown => Some(MenuKey::Down),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(MenuKey::Enter),
        KeyCode::Space => Some(MenuKey::Space),
        KeyCode::Escape => Some(MenuKey::Escape),
        _ => None,
    }
}

/// Movement intents from the set of held keys.
pub fn movement_keys(keys_down: &HashSet<KeyCode>) -> MovementKeys {
    let held = |codes: &[KeyCode]| codes.iter().any(|c| keys_down.contains(c));
    MovementKeys {
        forward: held(&[KeyCode::KeyW, KeyCode::ArrowUp]),
        backward: held(&[KeyCode::KeyS, KeyCode::ArrowDown]),
        strafe_left: held(&[KeyCode::KeyA]),
        strafe_right: held(&[KeyCode::KeyD]),
        turn_left: held(&[KeyCode::ArrowLeft, KeyCode::KeyQ]),
        turn_right: held(&[KeyCode::ArrowRight, KeyCode::KeyE]),
    }
}
