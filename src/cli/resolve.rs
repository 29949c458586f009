//! Resolve command.
//!
//! Reads a document, resolves its secret references, and writes the result
//! to stdout or a file.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::cli::output;
use crate::core::cache::HandleCache;
use crate::core::config::Config;
use crate::core::resolver::Resolver;
use crate::error::Result;

/// Resolve `file` (or stdin) and write the result to `dest` (or stdout).
pub fn execute(file: Option<&Path>, dest: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let config = Config::load(config)?;
    if !config.is_enabled() {
        warn!("no secret_backend_command configured, passing document through");
    }

    let input = super::read_input(file)?;
    let resolver = Resolver::from_config(&config, Arc::new(HandleCache::new()));
    let resolved = resolver.resolve(&input)?;

    match dest {
        Some(path) => {
            write_private(path, &resolved)?;
            output::success(&format!(
                "resolved {} secret(s) into {}",
                resolver.cache().len(),
                path.display()
            ));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&resolved)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Write plaintext output readable only by the current user.
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;

    // `mode` only applies on creation; tighten a pre-existing file too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
