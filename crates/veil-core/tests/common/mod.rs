#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use veil_core::{
    CipherEngine, Interceptor, PasswordPrompt, PasswordRequest, PromptPurpose, Result, Storage,
    VeilOptions,
};

/// KDF work factor for tests; the wire format does not depend on it.
pub const TEST_ITERATIONS: u32 = 1_000;

pub fn engine() -> CipherEngine {
    CipherEngine::with_iterations(TEST_ITERATIONS)
}

/// Answers prompts in order from a fixed list; `None` cancels.
///
/// Once the list runs out every prompt is cancelled.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<Vec<Option<String>>>,
    asked: Mutex<Vec<PasswordRequest>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[Option<&str>]) -> Arc<Self> {
        let mut answers: Vec<Option<String>> = answers
            .iter()
            .map(|answer| answer.map(str::to_string))
            .collect();
        answers.reverse();
        Arc::new(Self {
            answers: Mutex::new(answers),
            asked: Mutex::default(),
        })
    }

    /// Always answer with `password`.
    pub fn always(password: &str, times: usize) -> Arc<Self> {
        Self::new(&vec![Some(password); times])
    }

    pub fn push(&self, answer: Option<&str>) {
        self.answers
            .lock()
            .unwrap()
            .insert(0, answer.map(str::to_string));
    }

    pub fn asked(&self) -> Vec<PasswordRequest> {
        self.asked.lock().unwrap().clone()
    }

    pub fn purposes(&self) -> Vec<PromptPurpose> {
        self.asked().iter().map(|request| request.purpose).collect()
    }
}

impl PasswordPrompt for ScriptedPrompt {
    fn prompt_password(&self, request: &PasswordRequest) -> Result<Option<SecretString>> {
        self.asked.lock().unwrap().push(request.clone());
        let answer = self.answers.lock().unwrap().pop().flatten();
        Ok(answer.map(SecretString::from))
    }
}

pub fn interceptor<S: Storage>(
    storage: S,
    prompt: Arc<ScriptedPrompt>,
) -> Interceptor<S, Arc<ScriptedPrompt>> {
    Interceptor::with_engine(storage, prompt, VeilOptions::default(), engine())
        .expect("default options should be valid")
}
