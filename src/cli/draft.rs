use std::path::Path;

use clap::Parser;
use dialoguer::Confirm;
use logbook::{FormValues, RecordId, Session};
use serde_json::json;
use tracing::instrument;

use super::{
    OutputFormat, edit,
    form_args::FormArgs,
    open_session,
    terminal::{Colorize, is_narrow, terminal_width, truncate},
};

#[derive(Debug, Parser)]
pub struct Draft {
    #[command(subcommand)]
    command: DraftCommand,
}

#[derive(Debug, Parser)]
enum DraftCommand {
    /// Save the given values as a new draft and select it
    New(FormArgs),

    /// List saved drafts
    List {
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Load a draft into the form
    Select {
        /// The draft to select
        id: RecordId,
    },

    /// Delete a draft
    Delete {
        /// The draft to delete
        id: RecordId,
    },

    /// Delete every draft
    Clear {
        /// Skip confirmation prompts
        #[arg(long, short)]
        yes: bool,
    },

    /// Fill in the form interactively, autosaving into the current draft
    ///
    /// Each field is prompted in turn. Once you pause typing, the form is
    /// saved into the selected draft, or into a new one if none is selected.
    Edit {
        /// Select this draft before editing
        id: Option<RecordId>,
    },
}

impl Draft {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut session = open_session(root);

        match self.command {
            DraftCommand::New(args) => {
                let mut values = FormValues::default();
                args.apply_to(&mut values);
                let id = session.create_draft(values);
                println!("{}", format!("Draft saved: {id}").success());
            }
            DraftCommand::List { output } => match output {
                OutputFormat::Table => list_table(&session),
                OutputFormat::Json => list_json(&session)?,
            },
            DraftCommand::Select { id } => {
                let Some(values) = session.select_draft(&id) else {
                    anyhow::bail!("Draft {id} not found");
                };
                println!("Selected draft {}", id.info());
                print_values(&values);
            }
            DraftCommand::Delete { id } => {
                if session.store().drafts().get(&id).is_none() {
                    anyhow::bail!("Draft {id} not found");
                }
                let was_current = session.delete_draft(&id);
                println!("{}", format!("Deleted draft {id}").success());
                if was_current {
                    println!("{}", "The form has been reset.".dim());
                }
            }
            DraftCommand::Clear { yes } => {
                let count = session.store().drafts().len();
                if count == 0 {
                    println!("No drafts to delete.");
                    return Ok(());
                }
                if !yes
                    && !Confirm::new()
                        .with_prompt(format!("Delete all {count} drafts?"))
                        .default(false)
                        .interact()?
                {
                    println!("Cancelled");
                    return Ok(());
                }
                session.clear_drafts();
                println!("{}", format!("Deleted {count} draft(s)").success());
            }
            DraftCommand::Edit { id } => edit::run(&mut session, id)?,
        }

        Ok(())
    }
}

fn list_table(session: &Session) {
    let drafts = session.store().drafts();
    if drafts.is_empty() {
        println!("No drafts yet. Start one with 'logbook draft edit'.");
        return;
    }

    let current = drafts.current_id();
    let label_width = terminal_width().map_or(40, |w| w.saturating_sub(62).max(12));

    for draft in drafts.items() {
        let marker = if current == Some(&draft.id) { "*" } else { " " };
        let label = truncate(&draft.label(), label_width);
        if is_narrow() {
            println!("{marker} {label}");
            println!("    {}", draft.id.dim());
        } else {
            println!(
                "{marker} {:<label_width$}  {}  {}",
                label,
                draft.updated_at.format("%Y-%m-%d %H:%M"),
                draft.id.dim(),
            );
        }
    }

    if let Some(saved) = drafts.last_saved_at() {
        println!();
        println!(
            "{}",
            format!("Last saved {}", saved.format("%Y-%m-%d %H:%M:%S")).dim()
        );
    }
}

fn list_json(session: &Session) -> anyhow::Result<()> {
    let drafts = session.store().drafts();
    let output = json!({
        "current_draft_id": drafts.current_id(),
        "last_saved_at": drafts.last_saved_at(),
        "drafts": drafts.items(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Prints form values one field per line.
pub fn print_values(values: &FormValues) {
    let rows = [
        ("Provider ID", values.provider_id.clone()),
        ("Service order", values.service_order.clone()),
        ("Car ID", values.car_id.clone()),
        ("Odometer", values.odometer.to_string()),
        ("Engine hours", values.engine_hours.to_string()),
        ("Start date", values.start_date.clone()),
        ("End date", values.end_date.clone()),
        ("Type", values.kind.to_string()),
        ("Description", values.service_description.clone()),
    ];
    for (label, value) in rows {
        let label = format!("{label}:");
        println!("  {} {value}", format!("{label:<14}").dim());
    }
}
