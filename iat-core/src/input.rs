use crate::Side;

/// Abstract input signals. Hosts map physical keys or taps onto these.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Proceed,
    RespondLeft,
    RespondRight,
}

impl Input {
    /// Side pressed, if this is a categorical response.
    pub fn side(&self) -> Option<Side> {
        match self {
            Input::Proceed => None,
            Input::RespondLeft => Some(Side::Left),
            Input::RespondRight => Some(Side::Right),
        }
    }
}
