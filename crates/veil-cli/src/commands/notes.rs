use std::io::Read;

use veil_core::{is_encrypted, Storage};

use crate::app::{run_session, AppContext};
use crate::cli::{CatArgs, WriteArgs};
use crate::ui::{receipt, Badge};

use super::report::{ensure_clean, print_batch};

pub fn handle_cat(ctx: &AppContext, args: &CatArgs) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let run = run_session(&vault, |v| v.read(&args.path))?;

    print!("{}", run.value);
    if !run.locked.is_clean() {
        print_batch(&ctx.ui(false), true, "Locked", &[], &run.locked);
    }
    ensure_clean(&run.locked)
}

pub fn handle_write(ctx: &AppContext, args: &WriteArgs) -> anyhow::Result<()> {
    let body = match &args.body {
        Some(body) => body.clone(),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let vault = ctx.open_vault()?;
    let run = run_session(&vault, |v| v.write(&args.path, &body))?;
    let stored = vault.storage().read(&args.path)?;

    let ui = ctx.ui(false);
    if !ctx.quiet() {
        let form = if is_encrypted(&stored) {
            "encrypted"
        } else {
            "plaintext"
        };
        println!(
            "{}",
            receipt(
                &ui,
                Badge::Ok,
                "Note written",
                &[("Path", args.path.clone()), ("Stored", form.to_string())],
            )
        );
    }
    if !run.locked.is_clean() {
        print_batch(&ui, true, "Locked", &[], &run.locked);
    }
    ensure_clean(&run.locked)
}
