use std::{collections::BTreeMap, path::Path};

use clap::Parser;
use logbook::{ServiceType, Session};
use serde_json::json;
use tracing::instrument;

use super::{
    OutputFormat, open_session,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show draft and service log totals")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let session = open_session(root);
        let summary = Summary::of(&session);

        match self.output {
            OutputFormat::Json => summary.output_json()?,
            OutputFormat::Table if self.quiet => summary.output_quiet(),
            OutputFormat::Table => summary.output_table(),
        }

        Ok(())
    }
}

struct Summary {
    drafts: usize,
    current: Option<(String, String)>,
    last_saved: Option<String>,
    logs: BTreeMap<ServiceType, usize>,
}

impl Summary {
    fn of(session: &Session) -> Self {
        let drafts = session.store().drafts();

        let mut logs: BTreeMap<ServiceType, usize> =
            ServiceType::ALL.into_iter().map(|kind| (kind, 0)).collect();
        for log in session.store().logs().as_slice() {
            *logs.entry(log.values.kind).or_insert(0) += 1;
        }

        Self {
            drafts: drafts.len(),
            current: drafts
                .current()
                .map(|draft| (draft.id.to_string(), draft.label())),
            last_saved: drafts.last_saved_at().map(|at| at.to_rfc3339()),
            logs,
        }
    }

    fn total_logs(&self) -> usize {
        self.logs.values().sum()
    }

    fn output_json(&self) -> anyhow::Result<()> {
        let logs: BTreeMap<&str, usize> = self
            .logs
            .iter()
            .map(|(kind, count)| (kind.as_str(), *count))
            .collect();

        let output = json!({
            "drafts": {
                "count": self.drafts,
                "current": self.current.as_ref().map(|(id, label)| json!({ "id": id, "label": label })),
                "last_saved_at": self.last_saved,
            },
            "service_logs": {
                "count": self.total_logs(),
                "by_type": logs,
            },
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(&self) {
        println!("drafts={} logs={}", self.drafts, self.total_logs());
    }

    fn output_table(&self) {
        if self.drafts == 0 && self.total_logs() == 0 {
            println!("The logbook is empty. Start a draft with 'logbook draft edit'.");
            return;
        }

        println!("Drafts: {}", self.drafts);
        match &self.current {
            Some((id, label)) => println!("  current: {label} {}", id.dim()),
            None => println!("  {}", "no draft selected".dim()),
        }
        if let Some(saved) = &self.last_saved {
            println!("  last saved: {saved}");
        }

        println!();
        println!("Service logs");
        println!("{}", "────────────".dim());
        if is_narrow() {
            for (kind, count) in &self.logs {
                println!("{kind}: {count}");
            }
        } else {
            println!("{:<10} Count", "Type");
            for (kind, count) in &self.logs {
                println!("{:<10} {count}", kind.as_str());
            }
        }
        println!("Total      {}", self.total_logs());
    }
}
