use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, TryRecvError};
use std::thread;

use installer_core::{PendingPrompt, PromptKind, PromptResponder};
use installer_logging::installer_warn;

/// Shows installer prompts on the terminal. Answers are read on a
/// background thread so an unanswered prompt never stalls the event loop.
pub struct TerminalPrompter {
    pending: RefCell<Option<PendingPrompt>>,
    lines: mpsc::Receiver<String>,
    stdin_closed: Cell<bool>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            pending: RefCell::new(None),
            lines: rx,
            stdin_closed: Cell::new(false),
        }
    }

    /// Answers the pending prompt with whatever the user typed since the
    /// last poll. A closed stdin cancels the prompt.
    pub fn poll(&self) {
        loop {
            let line = match self.lines.try_recv() {
                Ok(line) => Some(line),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.stdin_closed.set(true);
                    None
                }
            };
            let pending = self.pending.borrow_mut().take();
            if let Some(prompt) = pending {
                answer(&prompt, line.clone());
            }
            if line.is_none() {
                return;
            }
        }
    }
}

impl PromptResponder for TerminalPrompter {
    fn prompt_requested(&self, prompt: PendingPrompt) {
        match prompt.kind() {
            PromptKind::YesNo => print!("{} [y/N] ", prompt.message()),
            PromptKind::Text => print!("{} ", prompt.message()),
        }
        let _ = io::stdout().flush();
        if self.stdin_closed.get() {
            answer(&prompt, None);
            return;
        }
        *self.pending.borrow_mut() = Some(prompt);
    }
}

fn answer(prompt: &PendingPrompt, line: Option<String>) {
    let result = match prompt.kind() {
        PromptKind::YesNo => prompt.answer_yes_no(line.as_deref().is_some_and(is_yes)),
        PromptKind::Text => prompt.answer_text(line),
    };
    if let Err(err) = result {
        installer_warn!("Prompt answer not sent: {}", err);
    }
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
