// SPDX-License-Identifier: MIT

use anyhow::Context;
use approval_flow::config::DecodeOptions;
use approval_flow::workflow::{WorkflowGraph, WorkflowLoader};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the steps and transitions of a workflow file
    Show {
        /// Path to the workflow file (.json, .yaml or .yml)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Create an empty workflow file
    New {
        /// Name of the workflow
        #[arg(short, long)]
        name: String,

        /// Where to write it
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Apply an edit script to a workflow file
    Edit {
        /// Path to the workflow file
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the edit script
        #[arg(short, long)]
        script: PathBuf,

        /// Where to write the result (defaults to the input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize a workflow list payload
    Collection {
        /// Path to the list payload
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the payload that would be sent to save a workflow
    Export {
        /// Path to the workflow file
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let options = DecodeOptions::from_env()?;
    if !options.implicitly_locked.is_empty() {
        log::info!("Implicitly locked steps: {:?}", options.implicitly_locked);
    }
    let loader = WorkflowLoader::new(options);

    match args.command {
        Commands::Show { file } => {
            let graph = loader
                .load_workflow(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            print_workflow(&graph);
        }
        Commands::New { name, output } => {
            let graph = WorkflowGraph::named(name).with_id(uuid::Uuid::new_v4().to_string());
            loader
                .save_workflow(&output, &graph)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "Created workflow {} at {}",
                graph.id().unwrap_or_default(),
                output.display()
            );
        }
        Commands::Edit {
            file,
            script,
            output,
        } => {
            let graph = loader
                .load_workflow(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            let edits = loader
                .load_edits(&script)
                .with_context(|| format!("Failed to load edit script {}", script.display()))?;

            let edited = graph.apply_all(&edits);
            if edited == graph {
                log::warn!("Edit script left the workflow unchanged");
            }
            log::info!("Applied {} edits to {}", edits.len(), file.display());

            let output = output.unwrap_or(file);
            loader
                .save_workflow(&output, &edited)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Saved {}", output.display());
        }
        Commands::Collection { file } => {
            let collection = loader
                .load_collection(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;

            for item in &collection.items {
                println!(
                    "{} ({}): {} steps, {} transitions",
                    item.name().unwrap_or("<unnamed>"),
                    item.id().unwrap_or("<new>"),
                    item.step_count(),
                    item.transitions().len()
                );
            }
            for error in &collection.errors {
                println!("error: {}", error);
            }
            println!("can create: {}", collection.can_create);
        }
        Commands::Export { file } => {
            let graph = loader
                .load_workflow(&file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&graph.encode())?);
        }
    }

    Ok(())
}

fn print_workflow(graph: &WorkflowGraph) {
    println!(
        "Workflow: {} ({})",
        graph.name().unwrap_or("<unnamed>"),
        graph.id().unwrap_or("<new>")
    );
    println!("Initial: {}", graph.initial().unwrap_or("-"));
    if !graph.schema_ids().is_empty() {
        println!("Schemas: {}", graph.schema_ids().join(", "));
    }

    for step in graph.steps() {
        let mut flags = Vec::new();
        if step.is_locked {
            flags.push("locked".to_string());
        }
        if step.no_update == Some(true) {
            flags.push("no update".to_string());
        }
        if let Some(color) = &step.color {
            flags.push(color.clone());
        }

        if flags.is_empty() {
            println!("  {}", step.name);
        } else {
            println!("  {} [{}]", step.name, flags.join(", "));
        }

        for view in graph.get_transitions(step) {
            let transition = view.transition;
            let mut line = format!("    -> {}", transition.to);
            if let Some(expression) = &transition.expression {
                line.push_str(&format!(" when {}", expression));
            }
            if let Some(roles) = &transition.roles {
                line.push_str(&format!(" (roles: {})", roles.join(", ")));
            }
            println!("{}", line);
        }
    }

    println!(
        "Can update: {}, can delete: {}",
        graph.can_update(),
        graph.can_delete()
    );
}
