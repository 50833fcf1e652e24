/// Sequencer phases. `Saving` and `Finished` are both terminal for trial
/// input; `Saving` lasts while the result sink has not answered yet.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Instruction,
    Running,
    Saving,
    Finished,
}

impl Phase {
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Instruction | Self::Running)
    }

    pub fn is_instruction(&self) -> bool {
        matches!(self, Self::Instruction)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// True once the last block has been completed, whether or not the
    /// results have been saved yet.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Saving | Self::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_instruction_screen() {
        assert_eq!(Phase::default(), Phase::Instruction);
    }

    #[test]
    fn terminal_phases_reject_input() {
        assert!(Phase::Instruction.allows_input());
        assert!(Phase::Running.allows_input());
        assert!(!Phase::Saving.allows_input());
        assert!(!Phase::Finished.allows_input());
        assert!(Phase::Saving.is_finished());
    }
}
