//! Whole-vault commands: unlock, lock, change-password, recover.

use crate::app::{run_session, AppContext};

use super::report::{combine, ensure_clean, print_batch};

/// Verify the password and leave private notes decrypted on disk.
pub fn handle_unlock(ctx: &AppContext) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let unlocked = vault.unlock()?;

    let ui = ctx.ui(false);
    let title = if unlocked.first_time {
        "Password set"
    } else {
        "Unlocked"
    };
    print_batch(
        &ui,
        ctx.quiet(),
        title,
        &[
            ("Decrypted", unlocked.batch.processed_count().to_string()),
            ("Attempts", unlocked.attempts.to_string()),
        ],
        &unlocked.batch,
    );
    if !ctx.quiet() {
        eprintln!("Private notes stay readable on disk until `veil lock`.");
    }
    ensure_clean(&unlocked.batch)
}

/// Encrypt every private note.
pub fn handle_lock(ctx: &AppContext) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let run = run_session(&vault, |_| Ok(()))?;

    let report = combine(&[&run.unlocked.batch, &run.locked]);
    print_batch(
        &ctx.ui(false),
        ctx.quiet(),
        "Locked",
        &[("Encrypted", run.locked.processed_count().to_string())],
        &report,
    );
    ensure_clean(&report)
}

pub fn handle_change_password(ctx: &AppContext) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let run = run_session(&vault, |v| v.change_password())?;

    let report = combine(&[&run.value, &run.locked]);
    print_batch(
        &ctx.ui(false),
        ctx.quiet(),
        "Password changed",
        &[(
            "Re-encrypted",
            (run.value.processed_count() + run.locked.processed_count()).to_string(),
        )],
        &report,
    );
    ensure_clean(&report)
}

/// Bring notes stranded under an older password onto the current one.
///
/// Notes that fail to decrypt during the unlock are exactly the ones this
/// command exists to fix, so only the recover and lock passes count.
pub fn handle_recover(ctx: &AppContext) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let run = run_session(&vault, |v| v.recover())?;

    let report = combine(&[&run.value, &run.locked]);
    print_batch(
        &ctx.ui(false),
        ctx.quiet(),
        "Recovered",
        &[("Recovered", run.value.processed_count().to_string())],
        &report,
    );
    ensure_clean(&report)
}
