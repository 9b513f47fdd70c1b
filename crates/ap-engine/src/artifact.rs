//! Locating, extracting, and caching the bundled engine binary.
//!
//! The engine executable for the current platform is baked into the build.
//! On startup it is written out to a per-user cache directory under a name
//! derived from its content hash. Concurrent processes converge on a
//! single file through a write-to-temp-then-atomic-rename protocol: the
//! first successful rename wins and every loser adopts the winner's file.
//! No file locks are involved anywhere.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

use ap_core::{Error, Result};

/// Directory name under the user cache dir.
const CACHE_SUBDIR: &str = "audiopress";
/// Prefix shared by installed engine files and their staging files.
const ENGINE_PREFIX: &str = "engine-";
/// Marker distinguishing a live staging file from an installed engine.
const TMP_MARKER: &str = ".tmp.";

// One embedded binary per supported (OS, arch) pair. Release packaging
// drops the platform engine builds into crates/ap-engine/embed/ before
// compiling; platforms without an entry fail at startup.
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
const EMBEDDED_ENGINE: Option<&[u8]> = Some(include_bytes!("../embed/engine-linux-x86_64"));
#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
const EMBEDDED_ENGINE: Option<&[u8]> = Some(include_bytes!("../embed/engine-linux-aarch64"));
#[cfg(all(target_os = "macos", target_arch = "x86_64"))]
const EMBEDDED_ENGINE: Option<&[u8]> = Some(include_bytes!("../embed/engine-macos-x86_64"));
#[cfg(all(target_os = "macos", target_arch = "aarch64"))]
const EMBEDDED_ENGINE: Option<&[u8]> = Some(include_bytes!("../embed/engine-macos-aarch64"));
#[cfg(not(any(
    all(target_os = "linux", target_arch = "x86_64"),
    all(target_os = "linux", target_arch = "aarch64"),
    all(target_os = "macos", target_arch = "x86_64"),
    all(target_os = "macos", target_arch = "aarch64"),
)))]
const EMBEDDED_ENGINE: Option<&[u8]> = None;

/// A resolved, installed engine executable.
///
/// Identity is the content hash, not the path; the path merely encodes it.
/// The file is never mutated after installation.
#[derive(Debug, Clone)]
pub struct EngineArtifact {
    /// Short hex content hash of the binary.
    pub hash: String,
    /// Path of the installed executable.
    pub path: PathBuf,
}

/// Resolve the engine for the current platform, installing it into the
/// default cache directory.
///
/// Fails when no binary is bundled for this (OS, arch) pair; the process
/// cannot serve without an engine, so callers treat this as fatal.
pub fn resolve() -> Result<EngineArtifact> {
    let bytes = EMBEDDED_ENGINE.ok_or(Error::UnsupportedPlatform {
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
    })?;
    install(bytes, &default_cache_dir())
}

/// Per-user cache directory, with a shared temp-dir fallback.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_SUBDIR)
}

/// Short content hash: hex of the first 8 bytes of SHA-256.
fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..8])
}

/// Install `bytes` as an executable under `dir`, reusing an existing
/// install with the same content hash.
///
/// Safe to call from any number of processes concurrently: each stages to
/// a pid-unique temp file and the rename into place is atomic, so a
/// half-written executable is never observable at the final path.
pub fn install(bytes: &[u8], dir: &Path) -> Result<EngineArtifact> {
    std::fs::create_dir_all(dir)?;

    let hash = content_hash(bytes);
    let path = dir.join(format!("{ENGINE_PREFIX}{hash}"));

    // The file name encodes the content hash, so an existing executable
    // needs no content re-verification.
    if is_installed(&path) {
        tracing::debug!("using cached engine at {}", path.display());
        let dir = dir.to_path_buf();
        let current = hash.clone();
        std::thread::spawn(move || cleanup_stale(&dir, &current));
        return Ok(EngineArtifact { hash, path });
    }

    // Staging names carry the pid plus a per-process sequence so no two
    // installs, across processes or within one, clobber each other's
    // partial writes.
    static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);
    let tmp = dir.join(format!(
        "{ENGINE_PREFIX}{hash}{TMP_MARKER}{}.{}",
        std::process::id(),
        STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    write_executable(&tmp, bytes)?;

    if let Err(rename_err) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        // Another process may have completed the same rename first; its
        // file is byte-identical, so adopt it.
        if is_installed(&path) {
            return Ok(EngineArtifact { hash, path });
        }
        return Err(Error::Io { source: rename_err });
    }

    cleanup_stale(dir, &hash);
    tracing::info!("installed engine at {}", path.display());
    Ok(EngineArtifact { hash, path })
}

fn is_installed(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => is_executable(&meta),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.is_file() && meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(meta: &std::fs::Metadata) -> bool {
    meta.is_file()
}

#[cfg(unix)]
fn write_executable(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o755)
        .open(path)?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_executable(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}

/// Remove superseded engine installs from `dir`.
///
/// Best-effort: failures are ignored, and staging files from live
/// processes (names containing [`TMP_MARKER`]) are always skipped so an
/// in-flight extraction is never deleted out from under its owner.
fn cleanup_stale(dir: &Path, current_hash: &str) {
    let current = format!("{ENGINE_PREFIX}{current_hash}");
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(ENGINE_PREFIX) && name != current && !name.contains(TMP_MARKER) {
            if std::fs::remove_file(entry.path()).is_ok() {
                tracing::debug!("removed stale engine {name}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_writes_hash_named_executable() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = install(b"engine-v1", dir.path()).unwrap();

        assert_eq!(artifact.hash.len(), 16);
        assert_eq!(
            artifact.path.file_name().unwrap().to_str().unwrap(),
            format!("engine-{}", artifact.hash)
        );
        assert!(is_installed(&artifact.path));
        assert_eq!(std::fs::read(&artifact.path).unwrap(), b"engine-v1");
    }

    #[test]
    fn install_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        install(b"engine-v1", dir.path()).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().contains(TMP_MARKER))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn reinstall_is_a_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let first = install(b"engine-v1", dir.path()).unwrap();

        // Mark the installed file so a rewrite would be detectable.
        let modified_before = std::fs::metadata(&first.path).unwrap().modified().unwrap();

        let second = install(b"engine-v1", dir.path()).unwrap();
        assert_eq!(second.path, first.path);
        assert_eq!(second.hash, first.hash);

        let modified_after = std::fs::metadata(&first.path).unwrap().modified().unwrap();
        assert_eq!(modified_before, modified_after);
    }

    #[test]
    fn new_content_replaces_old_install() {
        let dir = tempfile::tempdir().unwrap();
        let old = install(b"engine-v1", dir.path()).unwrap();
        let new = install(b"engine-v2", dir.path()).unwrap();

        assert_ne!(old.hash, new.hash);
        assert!(is_installed(&new.path));
        // The fresh-install path cleans up synchronously.
        assert!(!old.path.exists());
    }

    #[test]
    fn cleanup_spares_live_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("engine-deadbeefdeadbeef");
        let staging = dir.path().join("engine-cafecafecafecafe.tmp.4242");
        std::fs::write(&stale, b"old").unwrap();
        std::fs::write(&staging, b"partial").unwrap();

        install(b"engine-v1", dir.path()).unwrap();

        assert!(!stale.exists());
        assert!(staging.exists());
    }

    #[test]
    fn cleanup_ignores_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("notes.txt");
        std::fs::write(&other, b"keep me").unwrap();

        install(b"engine-v1", dir.path()).unwrap();
        assert!(other.exists());
    }

    #[test]
    fn concurrent_installs_converge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dir = path.clone();
                std::thread::spawn(move || install(b"engine-v1", &dir).unwrap())
            })
            .collect();

        let artifacts: Vec<EngineArtifact> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let first = &artifacts[0];
        for artifact in &artifacts {
            assert_eq!(artifact.path, first.path);
            assert_eq!(artifact.hash, first.hash);
        }

        let installed: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name.starts_with(ENGINE_PREFIX) && !name.contains(TMP_MARKER)
            })
            .collect();
        assert_eq!(installed.len(), 1);
        assert_eq!(std::fs::read(&first.path).unwrap(), b"engine-v1");
    }
}
