//! Opening the vault behind the interception layer.

use veil_core::{BatchReport, FsStorage, Interceptor, UnlockReport};

use super::prompt::TerminalPrompt;

/// The layer as the CLI uses it: a directory vault with terminal prompts.
pub type Vault = Interceptor<FsStorage, TerminalPrompt>;

/// Outcome of one unlock / work / lock cycle.
pub struct SessionRun<T> {
    pub unlocked: UnlockReport,
    pub value: T,
    pub locked: BatchReport,
}

/// Unlock, run `work`, then lock again whether or not `work` succeeded.
///
/// Each CLI process is its own session, so anything decrypted by the unlock
/// is re-encrypted before the process exits.
pub fn run_session<T>(
    vault: &Vault,
    work: impl FnOnce(&Vault) -> veil_core::Result<T>,
) -> anyhow::Result<SessionRun<T>> {
    let unlocked = vault.unlock()?;
    let outcome = work(vault);
    let locked = vault.shutdown()?.unwrap_or_default();
    Ok(SessionRun {
        unlocked,
        value: outcome?,
        locked,
    })
}
