//! `catfetch check` – validate the configuration and describe the run.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use catfetch_core::config::{self, JobConfig};
use catfetch_core::job::LOG_RETENTION_DAYS;

pub fn run_check(config_path: &Path) -> Result<()> {
    let props = config::load_from_path(config_path)?;
    let cfg = JobConfig::from_properties(&props)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
    print!("{}", describe(config_path, &cfg));
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

/// Human-readable plan of a run. Passwords never appear.
fn describe(config_path: &Path, cfg: &JobConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "config:    {}", config_path.display());
    let _ = writeln!(out, "log dir:   {}", cfg.log_dir.display());

    let _ = writeln!(out, "refresh:   {}", on_off(cfg.stages.store));
    if let Some(catalog) = &cfg.catalog {
        let _ = writeln!(out, "  catalog:   {} ({})", catalog.alias, catalog.redacted_url());
        let _ = writeln!(out, "  procedure: {}", catalog.procedure);
        let _ = writeln!(out, "  mode:      {}", catalog.mode.as_str());
    }
    if let Some(transfer) = &cfg.transfer {
        let _ = writeln!(out, "  client:    {}", transfer.client.display());
        let _ = writeln!(out, "  remote:    {}@{}", transfer.username, transfer.host);
        match transfer.timeout {
            Some(limit) => {
                let _ = writeln!(out, "  timeout:   {}s", limit.as_secs());
            }
            None => {
                let _ = writeln!(out, "  timeout:   none");
            }
        }
    }

    let _ = writeln!(out, "archive:   {}", on_off(cfg.stages.move_files));
    if let Some(archive) = &cfg.archive {
        let _ = writeln!(
            out,
            "  {} -> {}",
            archive.source.display(),
            archive.destination.display()
        );
    }

    let _ = writeln!(out, "retention: {}", on_off(cfg.stages.delete_logs));
    if cfg.stages.delete_logs {
        let _ = writeln!(out, "  files older than {LOG_RETENTION_DAYS} days");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use catfetch_core::config::parse_properties;

    #[test]
    fn describe_lists_stages_without_secrets() {
        let props = parse_properties(
            "ftp.logdir=/var/log/catfetch\nstore.mk=Y\ndb.url=postgres://db.internal/transfer\n\
             db.username=loader\ndb.password=dbsecret\nstore.procedure=refresh_tasks\n\
             ftp.host=files.internal\nftp.username=alice\nftp.password=ftpsecret\ndel.log.mk=Y\n",
        );
        let cfg = JobConfig::from_properties(&props).unwrap();

        let text = describe(Path::new("/etc/catfetch.properties"), &cfg);

        assert!(text.contains("refresh:   enabled"));
        assert!(text.contains("archive:   disabled"));
        assert!(text.contains("retention: enabled"));
        assert!(text.contains("mode:      single-file"));
        assert!(text.contains("alice@files.internal"));
        assert!(!text.contains("dbsecret"));
        assert!(!text.contains("ftpsecret"));
    }
}
