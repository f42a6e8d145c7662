// ─── User Interaction Seam ───
// The wizard shell renders the dialogs; the pipeline only asks questions and
// posts notices through this trait.

use async_trait::async_trait;

/// Questions and notices the pipeline raises mid-run. Implemented by the
/// wizard shell; a negative answer to `confirm` halts the phase that asked.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Yes/no continuation question. `false` halts the current phase.
    async fn confirm(&self, message: &str) -> bool;

    /// One-way notice (warnings, user-facing failure text).
    async fn notify(&self, message: &str);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Prompt fake that replays scripted answers and records what was asked.
    pub struct ScriptedPrompt {
        answers: Mutex<VecDeque<bool>>,
        pub confirms: Mutex<Vec<String>>,
        pub notices: Mutex<Vec<String>>,
    }

    impl ScriptedPrompt {
        pub fn new(answers: &[bool]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                confirms: Mutex::new(Vec::new()),
                notices: Mutex::new(Vec::new()),
            }
        }

        pub fn confirm_count(&self) -> usize {
            self.confirms.lock().unwrap().len()
        }

        pub fn notice_count(&self) -> usize {
            self.notices.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserPrompt for ScriptedPrompt {
        async fn confirm(&self, message: &str) -> bool {
            self.confirms.lock().unwrap().push(message.to_string());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .expect("test asked an unscripted question")
        }

        async fn notify(&self, message: &str) {
            self.notices.lock().unwrap().push(message.to_string());
        }
    }
}
