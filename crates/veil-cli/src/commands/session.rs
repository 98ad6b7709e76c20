//! Long-lived session: unlock once, serve commands from stdin, lock on exit.

use std::io::{BufRead, Write};

use veil_core::BatchReport;

use crate::app::{AppContext, Vault};
use crate::ui::{badge, kv, print_error, Badge, UiContext};

use super::report::{combine, ensure_clean, print_batch};

const HELP: &str = "\
cat PATH     print a note
write PATH   write a note; end the body with a line containing only `.`
status       show the session state
passwd       change the vault password
recover      recover notes left under an older password
help         show this help
lock         lock the vault and exit (also: quit, exit)";

#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Cat(String),
    Write(String),
    Status,
    Passwd,
    Recover,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> SessionCommand {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match (word, rest.is_empty()) {
        ("", _) => SessionCommand::Empty,
        ("cat", false) => SessionCommand::Cat(rest.to_string()),
        ("write", false) => SessionCommand::Write(rest.to_string()),
        ("status", true) => SessionCommand::Status,
        ("passwd", true) => SessionCommand::Passwd,
        ("recover", true) => SessionCommand::Recover,
        ("help", true) => SessionCommand::Help,
        ("lock" | "quit" | "exit", true) => SessionCommand::Quit,
        _ => SessionCommand::Unknown(line.to_string()),
    }
}

/// Read a note body up to a line holding only `.`, or end of input.
fn read_body(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> anyhow::Result<String> {
    let mut body = String::new();
    for line in lines {
        let line = line?;
        if line == "." {
            break;
        }
        body.push_str(&line);
        body.push('\n');
    }
    Ok(body)
}

fn print_status(ui: &UiContext, vault: &Vault) {
    let status = vault.status();
    println!("{}", kv(ui, "State", &format!("{:?}", status.state)));
    println!("{}", kv(ui, "Tracked", &status.tracked.to_string()));
    if status.rotation_pending {
        println!(
            "{}",
            badge(ui, Badge::Warn, "Some notes are still under the previous password")
        );
    }
}

/// Run one session command. `Ok(false)` ends the session.
fn run_command(
    ctx: &AppContext,
    ui: &UiContext,
    vault: &Vault,
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    failures: &mut BatchReport,
    line: &str,
) -> anyhow::Result<bool> {
    match parse_command(line) {
        SessionCommand::Empty => Ok(true),
        SessionCommand::Quit => Ok(false),
        SessionCommand::Help => {
            println!("{}", HELP);
            Ok(true)
        }
        SessionCommand::Status => {
            print_status(ui, vault);
            Ok(true)
        }
        SessionCommand::Cat(path) => {
            let content = vault.read(&path)?;
            print!("{}", content);
            Ok(true)
        }
        SessionCommand::Write(path) => {
            let body = read_body(lines)?;
            vault.write(&path, &body)?;
            println!("{}", badge(ui, Badge::Ok, &format!("Wrote {}", path)));
            Ok(true)
        }
        SessionCommand::Passwd => {
            let report = vault.change_password()?;
            print_batch(
                ui,
                ctx.quiet(),
                "Password changed",
                &[("Re-encrypted", report.processed_count().to_string())],
                &report,
            );
            *failures = combine(&[failures, &report]);
            Ok(true)
        }
        SessionCommand::Recover => {
            let report = vault.recover()?;
            print_batch(
                ui,
                ctx.quiet(),
                "Recovered",
                &[("Recovered", report.processed_count().to_string())],
                &report,
            );
            *failures = combine(&[failures, &report]);
            Ok(true)
        }
        SessionCommand::Unknown(text) => {
            let message = format!("Unknown command: {}", text);
            print_error(ui, &message, Some("Type `help` for commands."));
            Ok(true)
        }
    }
}

pub fn handle_session(ctx: &AppContext) -> anyhow::Result<()> {
    let vault = ctx.open_vault()?;
    let ui = ctx.ui(false);
    let unlocked = vault.unlock()?;
    if !ctx.quiet() {
        print_batch(
            &ui,
            false,
            "Unlocked",
            &[("Decrypted", unlocked.batch.processed_count().to_string())],
            &unlocked.batch,
        );
        eprintln!("Type `help` for commands.");
    }

    let mut failures = BatchReport::default();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if !ctx.quiet() {
            eprint!("veil> ");
            std::io::stderr().flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;
        let result = run_command(ctx, &ui, &vault, &mut lines, &mut failures, &line);
        match result {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => print_error(&ui, &err.to_string(), None),
        }
    }

    let locked = vault.shutdown()?.unwrap_or_default();
    print_batch(
        &ui,
        ctx.quiet(),
        "Locked",
        &[("Encrypted", locked.processed_count().to_string())],
        &locked,
    );
    ensure_clean(&combine(&[&failures, &locked]))
}
