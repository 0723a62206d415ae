use std::cell::Cell;
use std::rc::Rc;

use installer_logging::{installer_info, installer_warn};
use thiserror::Error;

use crate::{EventStreamClient, InstallId, Prompt, PromptAnswer, PromptKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("prompt was already answered or superseded by a newer one")]
    Stale,
    #[error("{kind:?} prompt cannot be answered with {answer:?}")]
    KindMismatch {
        kind: PromptKind,
        answer: PromptAnswer,
    },
}

/// Holds the generation of the single outstanding prompt, if any.
#[derive(Debug, Default)]
pub(crate) struct PromptSlot {
    next_generation: Cell<u64>,
    outstanding: Cell<Option<u64>>,
}

impl PromptSlot {
    pub(crate) fn claim(&self) -> u64 {
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);
        if self.outstanding.replace(Some(generation)).is_some() {
            installer_warn!("New prompt supersedes an unanswered one");
        }
        generation
    }

    pub(crate) fn clear(&self) {
        self.outstanding.set(None);
    }

    fn release(&self, generation: u64) -> bool {
        if self.outstanding.get() == Some(generation) {
            self.outstanding.set(None);
            true
        } else {
            false
        }
    }
}

/// A prompt waiting for the user's answer, correlated to its install id.
pub struct PendingPrompt {
    prompt: Prompt,
    install_id: InstallId,
    generation: u64,
    slot: Rc<PromptSlot>,
    stream: Rc<dyn EventStreamClient>,
}

impl PendingPrompt {
    pub(crate) fn new(
        prompt: Prompt,
        install_id: InstallId,
        slot: Rc<PromptSlot>,
        stream: Rc<dyn EventStreamClient>,
    ) -> Self {
        let generation = slot.claim();
        Self {
            prompt,
            install_id,
            generation,
            slot,
            stream,
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.prompt.kind
    }

    pub fn message(&self) -> &str {
        &self.prompt.message
    }

    pub fn install_id(&self) -> &InstallId {
        &self.install_id
    }

    pub fn is_outstanding(&self) -> bool {
        self.slot.outstanding.get() == Some(self.generation)
    }

    /// Sends `answer` for this prompt. Each prompt can be answered once.
    pub fn answer(&self, answer: PromptAnswer) -> Result<(), PromptError> {
        if !answer.matches(self.prompt.kind) {
            return Err(PromptError::KindMismatch {
                kind: self.prompt.kind,
                answer,
            });
        }
        if !self.slot.release(self.generation) {
            installer_warn!("Discarding answer to stale prompt: {}", self.prompt.message);
            return Err(PromptError::Stale);
        }
        installer_info!("Answering prompt for install {}", self.install_id);
        self.stream.send_prompt_response(&self.install_id, answer);
        Ok(())
    }

    pub fn answer_yes_no(&self, yes: bool) -> Result<(), PromptError> {
        self.answer(PromptAnswer::Yes(yes))
    }

    /// `None` cancels the prompt.
    pub fn answer_text(&self, input: Option<String>) -> Result<(), PromptError> {
        self.answer(PromptAnswer::Input(input))
    }
}

impl std::fmt::Debug for PendingPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingPrompt")
            .field("prompt", &self.prompt)
            .field("install_id", &self.install_id)
            .field("generation", &self.generation)
            .finish()
    }
}
