use iat_core::{Input, Phase};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Engine(Input),
    Quit,
}

/// Maps a key by physical position, so E and I work under any layout
/// (a Russian layout produces У and Ш on the same keys).
pub fn map_key(key: PhysicalKey) -> Option<KeyAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::Space => Some(KeyAction::Engine(Input::Proceed)),
        KeyCode::KeyE => Some(KeyAction::Engine(Input::RespondLeft)),
        KeyCode::KeyI => Some(KeyAction::Engine(Input::RespondRight)),
        KeyCode::Escape => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Click or tap at horizontal position `x` of a window `width` wide. On the
/// instruction screen anywhere proceeds; during a block the half decides.
pub fn map_pointer(x: f64, width: f64, phase: Phase) -> Option<Input> {
    match phase {
        Phase::Instruction => Some(Input::Proceed),
        Phase::Running if width > 0.0 => Some(if x < width / 2.0 {
            Input::RespondLeft
        } else {
            Input::RespondRight
        }),
        _ => None,
    }
}
