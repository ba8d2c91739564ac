//! modeswitch - switch a workstation between AI-tool operating modes
//!
//! Thin front end over `modeswitch-core`: builds a switch request from the
//! command line, runs the pipeline, and prints the result. State lives in
//! `~/.modeswitch/registry.json`; the generated artifacts land in
//! `~/.claude/settings.json` and `~/.codex/config.toml`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use modeswitch_core::fs::{ArtifactFs, HomeArtifactFs};
use modeswitch_core::model::{ToolKind, ToolMode};
use modeswitch_core::render::{render_for_mode, RenderInputs};
use modeswitch_core::store::{ConfigStore, FileStore};
use modeswitch_core::switch::resolver::{self, UnresolvedTemplatePolicy};
use modeswitch_core::switch::rollback;
use modeswitch_core::template::engine;
use modeswitch_core::{paths, SwitchOrchestrator, SwitchRequest};

/// modeswitch - AI tool mode switcher
#[derive(Parser)]
#[command(name = "modeswitch")]
#[command(about = "Switch between Claude Code and Codex configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current mode and transition state
    Status,

    /// Switch to a mode, regenerating the active tools' config files
    ///
    /// Takes a backup of each current artifact first (unless --no-backup),
    /// and rolls back automatically if applying or verification fails.
    Switch {
        /// Target mode: claude_only, codex_only, or both
        mode: ToolMode,
        /// Claude provider id (required for claude_only and both)
        #[arg(long)]
        claude_provider: Option<i64>,
        /// Codex provider id (required for codex_only and both)
        #[arg(long)]
        codex_provider: Option<i64>,
        /// Explicit template ids; defaults to all templates matching the mode
        #[arg(long = "template")]
        templates: Vec<i64>,
        /// Skip the pre-switch backup
        #[arg(long)]
        no_backup: bool,
        /// Extra substitution variables, KEY=VALUE (repeatable)
        #[arg(long = "var")]
        vars: Vec<String>,
    },

    /// Restore artifacts from their latest pre-switch backups
    Rollback {
        /// Mode whose artifacts should be restored
        mode: ToolMode,
    },

    /// List configured providers
    Providers,

    /// List capability templates
    Templates {
        /// Filter by tool: claude or codex
        #[arg(long)]
        tool: Option<String>,
    },

    /// Render the artifacts for a mode without writing anything
    Preview {
        /// Target mode: claude_only, codex_only, or both
        mode: ToolMode,
        #[arg(long)]
        claude_provider: Option<i64>,
        #[arg(long)]
        codex_provider: Option<i64>,
    },
}

fn parse_vars(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("--var expects KEY=VALUE, got '{pair}'");
        };
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store: Arc<FileStore> = Arc::new(
        FileStore::open(paths::registry_path())
            .await
            .context("failed to open the modeswitch registry")?,
    );
    let fs = Arc::new(HomeArtifactFs);

    match cli.command {
        Commands::Status => {
            let status = store.mode_status().await?;
            match status.current_mode {
                Some(mode) => println!("current mode: {mode}"),
                None => println!("current mode: none (no switch recorded)"),
            }
            if status.is_transitioning {
                println!("a switch is in progress");
            }
        }

        Commands::Switch {
            mode,
            claude_provider,
            codex_provider,
            templates,
            no_backup,
            vars,
        } => {
            let mut request = SwitchRequest::new(mode);
            request.claude_provider_id = claude_provider;
            request.codex_provider_id = codex_provider;
            request.template_ids = if templates.is_empty() {
                None
            } else {
                Some(templates)
            };
            request.create_backup = !no_backup;
            request.variables = parse_vars(&vars)?;

            let orchestrator = SwitchOrchestrator::new(store, fs);
            let result = orchestrator.switch(request).await;
            println!("{}", result.message);
            if let Some(backup_id) = &result.backup_id {
                println!("backup: {backup_id}");
            }
            println!("steps: {}", result.steps_completed.join(" -> "));
            if !result.success {
                std::process::exit(1);
            }
        }

        Commands::Rollback { mode } => {
            let restored = rollback::rollback(&*store, &*fs, mode).await?;
            if restored.is_empty() {
                println!("nothing restored: no backups recorded for mode {mode}");
            } else {
                for kind in restored {
                    println!("restored {} from its latest backup", kind);
                }
            }
        }

        Commands::Providers => {
            let claude = store.list_claude_providers().await?;
            let codex = store.list_codex_providers().await?;
            println!("claude providers:");
            for p in &claude {
                println!("  [{}] {} ({})", p.id, p.name, p.base_url);
            }
            println!("codex providers:");
            for p in &codex {
                println!("  [{}] {} ({})", p.id, p.name, p.base_url);
            }
            if claude.is_empty() && codex.is_empty() {
                println!("  none configured; edit {}", paths::registry_path().display());
            }
        }

        Commands::Templates { tool } => {
            let tool = match tool.as_deref() {
                Some("claude") => Some(ToolKind::Claude),
                Some("codex") => Some(ToolKind::Codex),
                Some(other) => bail!("unknown tool '{other}' (expected claude or codex)"),
                None => None,
            };
            for template in store.list_templates(tool).await? {
                println!(
                    "  [{}] {} ({}, {})",
                    template.id,
                    template.name,
                    template.tool,
                    template.platform.as_str()
                );
            }
        }

        Commands::Preview {
            mode,
            claude_provider,
            codex_provider,
        } => {
            let mut request = SwitchRequest::new(mode);
            request.claude_provider_id = claude_provider;
            request.codex_provider_id = codex_provider;
            let inputs: RenderInputs =
                resolver::resolve(&*store, &request, UnresolvedTemplatePolicy::default()).await?;
            let artifacts =
                render_for_mode(mode, &inputs, &HashMap::new(), chrono::Utc::now())?;
            for artifact in artifacts {
                println!("--- {} ({}) ---", artifact.kind, fs.path(artifact.kind).display());
                println!("{}", artifact.content);
                let unresolved = engine::extract_variables(&artifact.content);
                if !unresolved.is_empty() {
                    println!("unresolved variables: {}", unresolved.join(", "));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vars() {
        let vars = parse_vars(&["A=1".to_string(), "B=x=y".to_string()]).unwrap();
        assert_eq!(vars["A"], "1");
        assert_eq!(vars["B"], "x=y");
        assert!(parse_vars(&["broken".to_string()]).is_err());
    }
}
