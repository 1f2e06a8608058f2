use std::collections::BTreeSet;

use anyhow::{Context, anyhow};
use todo_shared::{
    EditOutcome, ItemId, KeyValueStore, SubmitOutcome, TaskStore, TodoController, TodoOptions,
};
use tracing::{debug, info, instrument};

use crate::cli::Invocation;
use crate::config::{self, Config};
use crate::render::Renderer;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add",
        "list",
        "info",
        "delete",
        "duplicate",
        "edit",
        "export",
        "reset",
        "help",
        "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(store, cfg, renderer, inv))]
pub fn dispatch<S: KeyValueStore>(
    store: S,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let options = config::todo_options(cfg)?;
    let command = inv.command.as_str();

    debug!(
        command,
        positions = ?inv.positions,
        args = ?inv.command_args,
        "dispatching command"
    );

    match command {
        "help" => return cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        "reset" => return cmd_reset(store, &options),
        _ => {}
    }

    let mut controller = TodoController::init(store, options)?;

    match command {
        "add" => cmd_add(&mut controller, &inv.command_args),
        "list" => cmd_list(&controller, renderer),
        "info" => cmd_info(&controller, renderer, &inv.positions),
        "delete" => cmd_delete(&mut controller, &inv.positions),
        "duplicate" => cmd_duplicate(&mut controller, &inv.positions),
        "edit" => cmd_edit(&mut controller, &inv.positions, &inv.command_args),
        "export" => cmd_export(&controller),
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[instrument(skip(controller, args))]
fn cmd_add<S: KeyValueStore>(
    controller: &mut TodoController<S>,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command add");

    match controller.submit(&args.join(" "))? {
        SubmitOutcome::Added(_) => {
            debug!(count = controller.len(), "task added");
            println!("Created task 1.");
        }
        SubmitOutcome::Rejected => println!("Nothing to add."),
    }
    Ok(())
}

#[instrument(skip(controller, renderer))]
fn cmd_list<S: KeyValueStore>(
    controller: &TodoController<S>,
    renderer: &mut Renderer,
) -> anyhow::Result<()> {
    info!("command list");

    if controller.placeholder_visible() {
        return renderer.print_empty_state(controller.empty_message());
    }
    renderer.print_task_table(controller.items())
}

#[instrument(skip(controller, renderer, positions))]
fn cmd_info<S: KeyValueStore>(
    controller: &TodoController<S>,
    renderer: &mut Renderer,
    positions: &[String],
) -> anyhow::Result<()> {
    info!("command info");

    let indexes = parse_positions(positions, controller.len())?;
    if indexes.is_empty() {
        return Err(anyhow!("info requires a task position"));
    }

    for (n, idx) in indexes.into_iter().enumerate() {
        if n > 0 {
            println!();
        }
        let item = controller
            .id_at(idx)
            .and_then(|id| controller.item(id))
            .ok_or_else(|| anyhow!("no task at position {}", idx + 1))?;
        renderer.print_task_info(idx + 1, item)?;
    }
    Ok(())
}

#[instrument(skip(controller, positions))]
fn cmd_delete<S: KeyValueStore>(
    controller: &mut TodoController<S>,
    positions: &[String],
) -> anyhow::Result<()> {
    info!("command delete");

    let ids = resolve_ids(controller, positions, "delete")?;
    let mut deleted = 0_u64;
    for id in ids {
        if controller.delete(id)? {
            deleted += 1;
        }
    }

    println!("Deleted {deleted} task(s).");
    if controller.placeholder_visible() {
        println!("{}", controller.empty_message());
    }
    Ok(())
}

#[instrument(skip(controller, positions))]
fn cmd_duplicate<S: KeyValueStore>(
    controller: &mut TodoController<S>,
    positions: &[String],
) -> anyhow::Result<()> {
    info!("command duplicate");

    let ids = resolve_ids(controller, positions, "duplicate")?;
    let mut duplicated = 0_u64;
    for id in ids {
        if controller.duplicate(id)?.is_some() {
            duplicated += 1;
        }
    }

    println!("Duplicated {duplicated} task(s).");
    Ok(())
}

#[instrument(skip(controller, positions, args))]
fn cmd_edit<S: KeyValueStore>(
    controller: &mut TodoController<S>,
    positions: &[String],
    args: &[String],
) -> anyhow::Result<()> {
    info!("command edit");

    let ids = resolve_ids(controller, positions, "edit")?;
    let [id] = ids.as_slice() else {
        return Err(anyhow!("edit takes exactly one task position"));
    };
    if args.is_empty() {
        return Err(anyhow!("edit requires the new task text"));
    }
    let position = controller
        .items()
        .iter()
        .position(|item| item.id == *id)
        .map(|idx| idx + 1)
        .unwrap_or_default();

    controller.begin_edit(*id);
    match controller.finish_edit(*id, &args.join(" "))? {
        EditOutcome::Saved => println!("Modified task {position}."),
        EditOutcome::Unchanged => println!("Task {position} unchanged."),
        EditOutcome::Missing => return Err(anyhow!("no task at position {position}")),
    }
    Ok(())
}

#[instrument(skip(controller))]
fn cmd_export<S: KeyValueStore>(controller: &TodoController<S>) -> anyhow::Result<()> {
    info!("command export");

    let out = serde_json::to_string(&controller.tasks()).context("failed to encode tasks")?;
    println!("{out}");
    Ok(())
}

#[instrument(skip(store, options))]
fn cmd_reset<S: KeyValueStore>(store: S, options: &TodoOptions) -> anyhow::Result<()> {
    info!("command reset");

    let mut store = TaskStore::with_options(store, options);
    store.clear()?;
    println!("Task list reset to the defaults.");
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "Commands: add TEXT, list, POS info, POS delete, POS duplicate, POS edit TEXT, export, reset, version"
    );
    println!("Positions are 1-based and may be lists (1,3) or ranges (2-4).");
    Ok(())
}

/// Positions are turned into ids up front so that earlier mutations do not
/// shift later positions.
fn resolve_ids<S: KeyValueStore>(
    controller: &TodoController<S>,
    positions: &[String],
    command: &str,
) -> anyhow::Result<Vec<ItemId>> {
    let indexes = parse_positions(positions, controller.len())?;
    if indexes.is_empty() {
        return Err(anyhow!("{command} requires a task position"));
    }

    indexes
        .into_iter()
        .map(|idx| {
            controller
                .id_at(idx)
                .ok_or_else(|| anyhow!("no task at position {}", idx + 1))
        })
        .collect()
}

/// Parses 1-based positions (`3`, `1,4`, `2-5`) into sorted, deduplicated
/// zero-based indexes below `len`.
pub fn parse_positions(terms: &[String], len: usize) -> anyhow::Result<Vec<usize>> {
    let mut out = BTreeSet::new();

    for term in terms.iter().flat_map(|term| term.split(',')) {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }

        let (start, end) = match term.split_once('-') {
            Some((start, end)) => (parse_position(start)?, parse_position(end)?),
            None => {
                let single = parse_position(term)?;
                (single, single)
            }
        };
        if start > end {
            return Err(anyhow!("invalid position range: {term}"));
        }
        if end > len {
            return Err(anyhow!(
                "no task at position {end} (the list has {len} task(s))"
            ));
        }

        out.extend((start..=end).map(|position| position - 1));
    }

    Ok(out.into_iter().collect())
}

fn parse_position(raw: &str) -> anyhow::Result<usize> {
    let position = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid task position: {raw}"))?;
    if position == 0 {
        return Err(anyhow!("task positions start at 1"));
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn abbreviations_must_be_unique() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("a", &known), Some("add"));
        assert_eq!(expand_command_abbrev("dup", &known), Some("duplicate"));
        assert_eq!(expand_command_abbrev("ex", &known), Some("export"));
        assert_eq!(expand_command_abbrev("d", &known), None);
        assert_eq!(expand_command_abbrev("e", &known), None);
        assert_eq!(expand_command_abbrev("list", &known), Some("list"));
    }

    #[test]
    fn positions_support_lists_and_ranges() {
        let parsed = parse_positions(&terms(&["3,1", "2-4"]), 5).expect("parse");
        assert_eq!(parsed, vec![0, 1, 2, 3]);
    }

    #[test]
    fn positions_are_bounded() {
        assert!(parse_positions(&terms(&["0"]), 3).is_err());
        assert!(parse_positions(&terms(&["4"]), 3).is_err());
        assert!(parse_positions(&terms(&["3-2"]), 3).is_err());
        assert!(parse_positions(&terms(&["two"]), 3).is_err());
        assert!(parse_positions(&[], 3).expect("empty").is_empty());
    }
}
