//! `aiassit` command line: inspect and edit the shortcut table.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use services::shortcuts::{ShortcutRegistry, ShortcutStore};
use shared::{Action, KeyChord};

#[derive(Parser, Debug)]
#[command(name = "aiassit", version, about = "Manage AIAssit keyboard shortcuts")]
pub struct Cli {
    /// Shortcuts file to use instead of the per-user one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show every action with its binding
    List,
    /// Show one action's binding
    Get { action: String },
    /// Bind an action to a chord such as "Ctrl+Shift+K"
    Set { action: String, chord: String },
    /// Remove an action's binding
    Clear { action: String },
    /// Restore all default bindings
    Reset,
    /// Print the shortcuts file location
    Path,
    /// List chords bound to more than one action
    Conflicts,
}

fn parse_action(name: &str) -> Result<Action> {
    match Action::from_name_ignore_case(name) {
        Some(action) => Ok(action),
        None => {
            let known: Vec<&str> = Action::ALL.iter().map(Action::as_str).collect();
            bail!("unknown action '{}' (expected one of: {})", name, known.join(", "))
        }
    }
}

fn write_row(out: &mut dyn Write, registry: &ShortcutRegistry, action: Action) -> Result<()> {
    let chord = registry.binding(action);
    let marker = if chord == registry.default_binding(action) { ' ' } else { '*' };
    writeln!(
        out,
        "{:<22} {:<16}{} {}",
        action.as_str(),
        chord.display_label(),
        marker,
        registry.description(action)
    )?;
    Ok(())
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let store = match cli.config {
        Some(path) => ShortcutStore::new(path),
        None => ShortcutStore::at_default_location(),
    };
    let mut registry = ShortcutRegistry::open(store);

    let mutated = match cli.command {
        Command::List => {
            for action in Action::ALL {
                write_row(out, &registry, action)?;
            }
            false
        }
        Command::Get { action } => {
            write_row(out, &registry, parse_action(&action)?)?;
            false
        }
        Command::Set { action, chord } => {
            let action = parse_action(&action)?;
            let chord: KeyChord = chord
                .parse()
                .with_context(|| format!("invalid chord '{}'", chord))?;
            if chord.is_empty() {
                bail!("empty chord; use `clear {}` to remove a binding", action);
            }
            registry.set_binding(action, chord);
            write_row(out, &registry, action)?;
            true
        }
        Command::Clear { action } => {
            let action = parse_action(&action)?;
            registry.set_binding(action, KeyChord::empty());
            write_row(out, &registry, action)?;
            true
        }
        Command::Reset => {
            registry.reset_to_defaults();
            writeln!(out, "restored default shortcuts")?;
            true
        }
        Command::Path => {
            writeln!(out, "{}", registry.config_path().display())?;
            false
        }
        Command::Conflicts => {
            let conflicts = registry.find_conflicts();
            if conflicts.is_empty() {
                writeln!(out, "no conflicts")?;
            }
            for (chord, actions) in conflicts {
                let names: Vec<&str> = actions.iter().map(Action::as_str).collect();
                writeln!(out, "{}: {}", chord.display_label(), names.join(", "))?;
            }
            false
        }
    };

    // Read-only commands leave the file alone.
    if mutated {
        let path = registry.config_path();
        if !registry.shutdown() {
            bail!("could not save shortcuts to {}", path.display());
        }
    }
    Ok(())
}
