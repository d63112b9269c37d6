use std::path::Path;

use clap::Parser;
use dialoguer::Confirm;
use logbook::{
    FormValues, RecordId, ServiceLog, ServiceType, Session,
    domain::{LogFilter, ValidationErrors, validation::Field},
};
use tracing::instrument;

use super::{
    OutputFormat,
    draft::print_values,
    form_args::FormArgs,
    open_session,
    terminal::{Colorize, is_narrow, terminal_width, truncate},
};

#[derive(Debug, Parser)]
pub struct Log {
    #[command(subcommand)]
    command: LogCommand,
}

#[derive(Debug, Parser)]
enum LogCommand {
    /// Create a service log
    ///
    /// The form starts from the given draft, or from the current draft if
    /// there is one. Fields given on the command line override it.
    Submit(Submit),

    /// List service logs, newest last
    List(List),

    /// Show a single service log
    Show {
        /// The log to show
        id: RecordId,
    },

    /// Change the values of a service log
    Edit(Edit),

    /// Delete a service log
    Delete {
        /// The log to delete
        id: RecordId,

        /// Skip confirmation prompts
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Debug, Parser)]
struct Submit {
    /// Start from this draft instead of the current one
    #[arg(long, value_name = "ID")]
    draft: Option<RecordId>,

    #[command(flatten)]
    form: FormArgs,
}

#[derive(Debug, Parser)]
struct Edit {
    /// The log to edit
    id: RecordId,

    #[command(flatten)]
    form: FormArgs,
}

#[derive(Debug, Parser)]
struct List {
    /// Case-insensitive text matched against provider, order, car and
    /// description
    #[arg(long, short)]
    search: Option<String>,

    /// Earliest start date (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    from: Option<String>,

    /// Latest start date (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    to: Option<String>,

    /// Only logs of this type (planned, unplanned, emergency)
    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<ServiceType>,

    /// Output format (table, json)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting
    #[arg(long)]
    quiet: bool,
}

impl Log {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut session = open_session(root);

        match self.command {
            LogCommand::Submit(command) => command.run(&mut session),
            LogCommand::List(command) => command.run(&session),
            LogCommand::Show { id } => {
                let log = find(&session, &id)?;
                println!("Service log {}", log.id.info());
                println!("  {}", format!("created {}", log.created_at.to_rfc3339()).dim());
                print_values(&log.values);
                Ok(())
            }
            LogCommand::Edit(command) => command.run(&mut session),
            LogCommand::Delete { id, yes } => {
                find(&session, &id)?;
                let deleted = if yes {
                    session.delete_log(&id, &|_: &str| true)
                } else {
                    session.delete_log(&id, &ask)
                };
                if deleted {
                    println!("{}", format!("Deleted service log {id}").info());
                } else {
                    println!("Cancelled");
                }
                Ok(())
            }
        }
    }
}

impl Submit {
    fn run(self, session: &mut Session) -> anyhow::Result<()> {
        let draft = match &self.draft {
            Some(id) => Some(
                session
                    .store()
                    .drafts()
                    .get(id)
                    .ok_or_else(|| anyhow::anyhow!("Draft {id} not found"))?,
            ),
            None => session.store().drafts().current(),
        };
        let mut values = draft.map_or_else(FormValues::default, |draft| draft.values.clone());
        self.form.apply_to(&mut values);

        match session.submit_log(values) {
            Ok(log) => {
                println!("{}", format!("Service log created: {}", log.id).success());
                Ok(())
            }
            Err(errors) => {
                report_errors(&errors);
                anyhow::bail!("Service log not created");
            }
        }
    }
}

impl Edit {
    fn run(self, session: &mut Session) -> anyhow::Result<()> {
        if self.form.is_empty() {
            anyhow::bail!("Nothing to change. Pass the fields to update, e.g. --odometer 1200");
        }

        let mut values = find(session, &self.id)?.values.clone();
        self.form.apply_to(&mut values);

        match session.edit_log(&self.id, values) {
            Ok(_) => {
                println!("{}", format!("Service log updated: {}", self.id).success());
                Ok(())
            }
            Err(errors) => {
                report_errors(&errors);
                anyhow::bail!("Service log not updated");
            }
        }
    }
}

impl List {
    fn run(self, session: &Session) -> anyhow::Result<()> {
        let filter = LogFilter {
            search: self.search,
            from: self.from,
            to: self.to,
            kind: self.kind,
        };
        let logs: Vec<&ServiceLog> = filter.apply(session.store().logs().as_slice()).collect();

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&logs)?),
            OutputFormat::Table if self.quiet => {
                for log in logs {
                    println!("{}", log.id);
                }
            }
            OutputFormat::Table => print_table(&logs, session.store().logs().len()),
        }
        Ok(())
    }
}

fn print_table(logs: &[&ServiceLog], total: usize) {
    if total == 0 {
        println!("No service logs yet. Create one with 'logbook log submit'.");
        return;
    }
    if logs.is_empty() {
        println!("No service logs match the filters ({total} in total).");
        return;
    }

    if is_narrow() {
        for log in logs {
            let values = &log.values;
            println!(
                "{} {} {}",
                values.start_date,
                values.car_id,
                format!("[{}]", values.kind).dim()
            );
            println!("    {} / {}", values.provider_id, values.service_order);
            println!("    {}", log.id.dim());
        }
        return;
    }

    let description_width = terminal_width().map_or(30, |w| w.saturating_sub(88).max(10));
    println!(
        "{:<10}  {:<10}  {:<10}  {:<10}  {:<8}  {:<10}  {:>9}  {:>7}  Description",
        "Start", "End", "Provider", "Order", "Car", "Type", "Odometer", "Hours"
    );
    for log in logs {
        let values = &log.values;
        println!(
            "{:<10}  {:<10}  {:<10}  {:<10}  {:<8}  {:<10}  {:>9}  {:>7}  {}",
            values.start_date,
            values.end_date,
            truncate(&values.provider_id, 10),
            truncate(&values.service_order, 10),
            truncate(&values.car_id, 8),
            values.kind.as_str(),
            values.odometer,
            values.engine_hours,
            truncate(&values.service_description, description_width),
        );
    }
    println!();
    println!("{}", format!("{} of {total} service log(s)", logs.len()).dim());
}

fn find<'a>(session: &'a Session, id: &RecordId) -> anyhow::Result<&'a ServiceLog> {
    session
        .store()
        .logs()
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Service log {id} not found"))
}

fn ask(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or_else(|e| {
            tracing::warn!("confirmation prompt failed: {e}");
            false
        })
}

/// Prints the field errors of a rejected form.
pub fn report_errors(errors: &ValidationErrors) {
    eprintln!("{}", "The form has errors:".error());
    for (field, message) in errors.iter() {
        report_field_error(field, message);
    }
}

/// Prints one field error, indented under the form.
pub fn report_field_error(field: Field, message: &str) {
    eprintln!("  {}: {message}", field.to_string().warning());
}
