use super::{PromptOutput, PromptType};

/// Lets a prompt through only when it differs from the one announced before it.
///
/// Prompts are compared by type and text, so a driving style prompt whose duration is
/// counting down is not repeated every tick.
#[derive(Debug, Default)]
pub struct PromptAnnouncer {
    last_announced: Option<(PromptType, String)>,
}

impl PromptAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `prompt` should be announced.
    pub fn announce(&mut self, prompt: &PromptOutput) -> bool {
        let identity = prompt.identity();
        if self
            .last_announced
            .as_ref()
            .is_some_and(|(prompt_type, text)| (*prompt_type, text.as_str()) == identity)
        {
            return false;
        }
        self.last_announced = Some((prompt.prompt_type, prompt.text.clone()));
        true
    }

    pub fn reset(&mut self) {
        self.last_announced = None;
    }
}
