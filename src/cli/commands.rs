//! Command dispatch

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{
    PhaseBreakdown, RegisteredTree, SweepOutcome, TreeRegistry, TrialLookupService,
};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings};
use crate::domain::trial::display;
use crate::infrastructure::di::ServiceContainer;
use crate::tree_traits::TreeNodeConvert;

pub async fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `trialome --help`".into(),
        ));
    };

    // Commands that need no settings
    match command {
        Commands::Completion { shell } => {
            print_completions(*shell);
            return Ok(());
        }
        Commands::Config {
            command: ConfigCommands::Template,
        } => {
            output::info(&Settings::template());
            return Ok(());
        }
        _ => {}
    }

    let settings = Settings::load(cli.data_dir.as_deref())?;
    debug!(data_dir = %settings.data_dir.display(), "settings loaded");
    let container = ServiceContainer::new(settings)?;

    match command {
        Commands::Trees => cmd_trees(&container),
        Commands::Show { tree_id, json } => cmd_show(&container, tree_id, *json),
        Commands::Classify { label } => cmd_classify(&container, label),
        Commands::Sanitize { label, no_disease } => cmd_sanitize(&container, label, *no_disease),
        Commands::Counts { tree_id } => cmd_counts(&container, tree_id).await,
        Commands::Phases { tree_id } => cmd_phases(&container, tree_id).await,
        Commands::Studies { tree_id, node_id } => cmd_studies(&container, tree_id, node_id).await,
        Commands::Trials { query, file } => {
            cmd_trials(&container, query.as_deref(), file.as_deref())
        }
        Commands::Config { command } => cmd_config(&container, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Load the registry, reporting skipped documents as warnings.
fn load_registry(container: &ServiceContainer) -> CliResult<TreeRegistry> {
    let (registry, report) = container.load_trees()?;
    for skipped in &report.skipped {
        output::warning(&format!("skipped {}: {}", skipped.source, skipped.reason));
    }
    Ok(registry)
}

#[instrument(skip(container))]
fn cmd_trees(container: &ServiceContainer) -> CliResult<()> {
    let registry = load_registry(container)?;
    if registry.is_empty() {
        output::warning(&format!(
            "no graph documents in {}",
            container.settings.data_dir.display()
        ));
        return Ok(());
    }

    output::header(&format!("{} trees", registry.len()));
    for tree in registry.iter() {
        output::info(&format!(
            "{}\tnodes={}\tqueryable={}\tdepth={}",
            tree.tree_id,
            tree.root.node_count(),
            tree.root.queryable_nodes().len(),
            tree.root.depth()
        ));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_show(container: &ServiceContainer, tree_id: &str, json: bool) -> CliResult<()> {
    let registry = load_registry(container)?;
    let tree = registry.require(tree_id)?;

    if json {
        let text = serde_json::to_string_pretty(&tree.root).map_err(|e| {
            ApplicationError::OperationFailed {
                context: format!("serialize tree {tree_id}"),
                source: Box::new(e),
            }
        })?;
        output::info(&text);
        return Ok(());
    }

    output::header(&format!("{} ({})", tree.tree_id, tree.disease_full_name));
    if let Some(title) = &tree.raw.image_title {
        output::detail(title);
    }
    let columns = tree
        .root
        .column_headers(&container.settings.vocabulary().header_labels);
    for (depth, labels) in columns.iter().enumerate() {
        if !labels.is_empty() {
            output::action(&format!("level {depth}"), &labels.join(", "));
        }
    }
    output::info(&tree.root.to_tree_string());
    Ok(())
}

fn cmd_classify(container: &ServiceContainer, label: &str) -> CliResult<()> {
    let classifier = container.classifier();
    let sanitizer = container.sanitizer();
    let classification = classifier.classify(label);

    output::action("type", &classification.node_type);
    output::action("queryable", &classification.queryable);
    match classifier.extract_search_term(label) {
        Some(term) => {
            output::action("search term", &term);
            let query = sanitizer
                .query_term(&term, Some(&container.settings.disease.code))
                .unwrap_or_default();
            output::action("query", &query);
        }
        None => output::action("search term", &"-"),
    }
    Ok(())
}

fn cmd_sanitize(container: &ServiceContainer, label: &str, no_disease: bool) -> CliResult<()> {
    if label.trim().is_empty() {
        return Err(CliError::InvalidArgs("label must not be empty".into()));
    }
    let sanitizer = container.sanitizer();
    let sanitized = sanitizer.sanitize(label);
    let query = if no_disease {
        sanitized
    } else {
        sanitizer.enrich(&sanitized, Some(&container.settings.disease.code))
    };
    output::info(&query);
    Ok(())
}

/// Run a sweep that Ctrl-C supersedes.
async fn with_interrupt<T, F, Fut>(lookup: Arc<TrialLookupService>, sweep: F) -> SweepOutcome<T>
where
    F: FnOnce(Arc<TrialLookupService>) -> Fut,
    Fut: std::future::Future<Output = SweepOutcome<T>>,
{
    let canceller = {
        let lookup = Arc::clone(&lookup);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                lookup.begin_sweep();
            }
        })
    };
    let outcome = sweep(lookup).await;
    canceller.abort();
    outcome
}

fn report_cancelled<T>(outcome: &SweepOutcome<T>) {
    if outcome.cancelled {
        output::warning(&format!(
            "sweep interrupted after {} nodes",
            outcome.results.len()
        ));
    }
}

#[instrument(skip(container))]
async fn cmd_counts(container: &ServiceContainer, tree_id: &str) -> CliResult<()> {
    let registry = load_registry(container)?;
    let tree: RegisteredTree = registry.require(tree_id)?.clone();
    let lookup = Arc::new(container.lookup_service());
    let ticket = lookup.begin_sweep();

    output::header(&format!("Recruiting trials: {}", tree.tree_id));
    let outcome = with_interrupt(lookup, |lookup| async move {
        lookup.sweep_counts(&tree, ticket).await
    })
    .await;

    for entry in &outcome.results {
        output::heat_row(&output::heat(entry.value), &entry.node_id, &entry.label);
    }
    report_cancelled(&outcome);
    Ok(())
}

#[instrument(skip(container))]
async fn cmd_phases(container: &ServiceContainer, tree_id: &str) -> CliResult<()> {
    let registry = load_registry(container)?;
    let tree: RegisteredTree = registry.require(tree_id)?.clone();
    let lookup = Arc::new(container.lookup_service());
    let ticket = lookup.begin_sweep();

    output::header(&format!("Trials by phase (P1/P2/P3 = total): {}", tree.tree_id));
    let outcome = with_interrupt(lookup, |lookup| async move {
        lookup.sweep_phases(&tree, ticket).await
    })
    .await;

    for entry in &outcome.results {
        let PhaseBreakdown { p1, p2, p3, total } = entry.value;
        let cell = format!("{p1}/{p2}/{p3} = {}", output::heat(total));
        output::heat_row(&cell, &entry.node_id, &entry.label);
    }
    report_cancelled(&outcome);
    Ok(())
}

#[instrument(skip(container))]
async fn cmd_studies(container: &ServiceContainer, tree_id: &str, node_id: &str) -> CliResult<()> {
    let registry = load_registry(container)?;
    let tree = registry.require(tree_id)?;
    let node = tree.root.find_all(node_id).into_iter().next().ok_or_else(|| {
        ApplicationError::NodeNotFound {
            tree_id: tree_id.to_string(),
            node_id: node_id.to_string(),
        }
    })?;

    output::header(node.label.lines().next().unwrap_or_default());
    match &node.search_term {
        Some(term) => {
            let lookup = container.lookup_service();
            let listing = lookup.study_listing(term, Some(&tree.disease)).await?;
            output::action("query", &listing.query);
            output::action("recruiting", &output::heat(listing.total_count));
            for study in &listing.studies {
                output::detail(&format!("{}  {}", study.nct_id, study.title));
            }
            output::action("view all", &listing.view_all_url);
        }
        None => output::detail(&format!("{} node, not queried", node.node_type)),
    }

    let footnotes = registry.footnotes_for(tree_id, node);
    if !footnotes.is_empty() {
        output::header("Footnotes");
        for note in footnotes {
            output::detail(&format!("{}: {}", note.label, note.content));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_trials(container: &ServiceContainer, query: Option<&str>, file: Option<&Path>) -> CliResult<()> {
    let path = file
        .map(Path::to_path_buf)
        .or_else(|| container.settings.trials_file.clone())
        .ok_or_else(|| {
            CliError::Usage("no trials file: pass --file or set trials_file in config".into())
        })?;

    let table = container.trial_table_service().load(&path)?;
    let hits = table.search(query.unwrap_or_default());

    output::header(&format!("{} of {} trials", hits.len(), table.len()));
    for record in hits {
        output::info(&format!("{}  {}", record.nct_id, record.display_title()));
        output::detail(&format!(
            "status: {}  phase: {}  enrollment: {}",
            display(&record.status),
            display(&record.phase),
            display(&record.enrollment)
        ));
        if record.experimental_drugs.is_some() || record.biomarkers.is_some() {
            output::detail(&format!(
                "drugs: {}  biomarkers: {}",
                display(&record.experimental_drugs),
                display(&record.biomarkers)
            ));
        }
    }
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let global = config::global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "unavailable".into());
            output::action("global", &global);
            output::action(
                "local",
                &config::local_config_path(&container.settings.data_dir).display(),
            );
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
