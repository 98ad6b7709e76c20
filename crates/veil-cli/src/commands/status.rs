//! Password-free view of the vault: what is encrypted, what is exposed.

use serde::Serialize;

use veil_core::crypto::{is_encrypted, EncryptedBlob};
use veil_core::{Storage, VeilOptions};

use crate::app::AppContext;
use crate::cli::StatusArgs;
use crate::ui::{badge, divider, header, hint, kv, Badge};

#[derive(Debug, Default, Serialize)]
pub struct VaultStatus {
    pub vault: String,
    pub marker: String,
    pub notes: usize,
    pub encrypted: usize,
    /// Notes carrying the marker but stored as plaintext.
    pub exposed: Vec<String>,
    /// Notes with the blob header that do not parse.
    pub malformed: Vec<String>,
}

/// Classify every note in `storage` without decrypting anything.
pub fn scan<S: Storage>(storage: &S, options: &VeilOptions) -> veil_core::Result<VaultStatus> {
    let mut status = VaultStatus {
        marker: options.marker.clone(),
        ..VaultStatus::default()
    };
    for path in storage.list_text_files()? {
        if !options.is_content_path(&path) {
            continue;
        }
        let content = match storage.read(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "Could not read note");
                continue;
            }
        };
        status.notes += 1;
        if is_encrypted(&content) {
            match EncryptedBlob::parse(&content) {
                Ok(_) => status.encrypted += 1,
                Err(_) => status.malformed.push(path),
            }
        } else if options.has_marker(&content) {
            status.exposed.push(path);
        }
    }
    Ok(status)
}

pub fn handle_status(ctx: &AppContext, args: &StatusArgs) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let options = ctx.options()?;
    let mut status = scan(&storage, &options)?;
    status.vault = storage.root().display().to_string();

    let ui = ctx.ui(args.json);
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }
    if ctx.quiet() {
        return Ok(());
    }

    println!("{}", header(&ui, "status", Some(&status.vault)));
    println!("{}", kv(&ui, "Marker", &status.marker));
    println!("{}", kv(&ui, "Notes", &status.notes.to_string()));
    println!("{}", kv(&ui, "Encrypted", &status.encrypted.to_string()));
    println!("{}", kv(&ui, "Exposed", &status.exposed.len().to_string()));

    if !status.malformed.is_empty() {
        println!("{}", divider(&ui));
        for path in &status.malformed {
            let message = format!("{} is not a valid encrypted note", path);
            println!("{}", badge(&ui, Badge::Err, &message));
        }
    }
    if !status.exposed.is_empty() {
        println!("{}", divider(&ui));
        for path in &status.exposed {
            let message = format!("{} is private but stored as plaintext", path);
            println!("{}", badge(&ui, Badge::Warn, &message));
        }
        println!("{}", hint(&ui, "Run `veil lock` to encrypt them."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::{CipherEngine, MemoryStorage};

    #[test]
    fn test_scan_classifies_notes() {
        let blob = CipherEngine::with_iterations(1_000)
            .encrypt("#private a", "password-123")
            .unwrap();
        let storage = MemoryStorage::with_files([
            ("a.md", blob.as_str()),
            ("b.md", "#private b"),
            ("c.md", "public"),
            ("d.md", "%%VEIL-ENCRYPTED-V1%%junk"),
            ("e.png", "#private image"),
        ]);

        let status = scan(&storage, &VeilOptions::default()).unwrap();

        assert_eq!(status.notes, 4);
        assert_eq!(status.encrypted, 1);
        assert_eq!(status.exposed, vec!["b.md"]);
        assert_eq!(status.malformed, vec!["d.md"]);
    }
}
