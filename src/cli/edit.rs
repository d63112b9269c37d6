//! Interactive form editing with autosave.
//!
//! Each answered prompt is one change to the live form. Changes are fed to an
//! [`AutosaveScheduler`] on a wall-clock [`Stopwatch`] timeline; the scheduler
//! is polled whenever control returns from a prompt, so a save that fell due
//! while the user was typing is written before the next change restarts the
//! window. After each answer the form is checked and the error for the field
//! just edited, if any, is shown straight away.

use std::{thread, time::Duration};

use dialoguer::{Confirm, Input, Select};
use logbook::{
    AutosaveScheduler, FormValues, RecordId, ServiceType, Session,
    autosave::{Outcome, Stopwatch},
    domain::{
        form::parse_reading,
        validation::{Field, is_date},
    },
};
use tracing::instrument;

use super::{
    draft::print_values,
    log::{report_errors, report_field_error},
    terminal::Colorize,
};

struct Editor<'a> {
    session: &'a mut Session,
    autosave: AutosaveScheduler,
    clock: Stopwatch,
    values: FormValues,
}

impl Editor<'_> {
    /// Records a change to the form.
    fn change(&mut self, values: FormValues) {
        if values == self.values {
            return;
        }
        self.poll();
        self.values = values;
        self.autosave.value_changed(self.values.clone(), self.clock.now());
    }

    /// Shows the error for `field` in the form as it now stands.
    fn check(&self, field: Field) {
        if let Some(message) = field_error(self.session, &self.values, field) {
            report_field_error(field, &message);
        }
    }

    fn poll(&mut self) {
        let outcome = self.autosave.poll(self.clock.now(), self.session.store_mut());
        if let Some(Outcome::Saved(id)) = outcome {
            eprintln!("{}", format!("  saved to draft {id}").dim());
        }
    }

    /// Waits for a pending save to fire, then stops autosaving.
    fn settle(&mut self) {
        if let Some(due) = self.autosave.deadline() {
            let wait = due.saturating_sub(self.clock.now());
            thread::sleep(Duration::from_millis(wait));
            self.poll();
        }
        self.autosave.teardown();
    }

    fn text(
        &mut self,
        field: Field,
        label: &str,
        get: fn(&FormValues) -> &String,
        set: fn(&mut FormValues, String),
    ) -> anyhow::Result<()> {
        let answer = Input::<String>::new()
            .with_prompt(label)
            .with_initial_text(get(&self.values).clone())
            .allow_empty(true)
            .interact_text()?;
        self.answer(field, answer, set);
        Ok(())
    }

    fn date(
        &mut self,
        field: Field,
        label: &str,
        get: fn(&FormValues) -> &String,
        set: fn(&mut FormValues, String),
    ) -> anyhow::Result<()> {
        let answer = Input::<String>::new()
            .with_prompt(label)
            .with_initial_text(get(&self.values).clone())
            .allow_empty(true)
            .validate_with(|input: &String| date_input(input))
            .interact_text()?;
        self.answer(field, answer, set);
        Ok(())
    }

    fn answer<A>(&mut self, field: Field, answer: A, set: fn(&mut FormValues, A)) {
        let mut values = self.values.clone();
        set(&mut values, answer);
        self.change(values);
        self.check(field);
    }

    fn reading(
        &mut self,
        field: Field,
        label: &str,
        get: fn(&FormValues) -> f64,
        set: fn(&mut FormValues, f64),
    ) -> anyhow::Result<()> {
        let answer = Input::<String>::new()
            .with_prompt(label)
            .with_initial_text(get(&self.values).to_string())
            .allow_empty(true)
            .validate_with(|input: &String| -> Result<(), &str> {
                parse_reading(input).map(|_| ()).ok_or("Enter a number")
            })
            .interact_text()?;
        self.answer(field, parse_reading(&answer).unwrap_or_default(), set);
        Ok(())
    }

    fn kind(&mut self) -> anyhow::Result<()> {
        let current = ServiceType::ALL
            .iter()
            .position(|kind| *kind == self.values.kind)
            .unwrap_or_default();
        let choice = Select::new()
            .with_prompt("Type")
            .items(&ServiceType::ALL[..])
            .default(current)
            .interact()?;
        let mut values = self.values.clone();
        values.kind = ServiceType::ALL[choice];
        self.change(values);
        Ok(())
    }

    fn fill(&mut self) -> anyhow::Result<()> {
        self.text(Field::ProviderId, "Provider ID", |v| &v.provider_id, |v, s| v.provider_id = s)?;
        self.text(
            Field::ServiceOrder,
            "Service order",
            |v| &v.service_order,
            |v, s| v.service_order = s,
        )?;
        self.text(Field::CarId, "Car ID", |v| &v.car_id, |v, s| v.car_id = s)?;
        self.reading(Field::Odometer, "Odometer", |v| v.odometer, |v, n| v.odometer = n)?;
        self.reading(
            Field::EngineHours,
            "Engine hours",
            |v| v.engine_hours,
            |v, n| v.engine_hours = n,
        )?;
        self.date(Field::StartDate, "Start date", |v| &v.start_date, FormValues::set_start_date)?;
        self.date(Field::EndDate, "End date", |v| &v.end_date, |v, s| v.end_date = s)?;
        self.kind()?;
        self.text(
            Field::ServiceDescription,
            "Service description",
            |v| &v.service_description,
            |v, s| v.service_description = s,
        )
    }
}

/// The error for `field`, if the form fails validation there.
fn field_error(session: &Session, values: &FormValues, field: Field) -> Option<String> {
    session.validate(values).err()?.get(field).map(str::to_string)
}

/// Accepts a blank answer or a `YYYY-MM-DD` date.
fn date_input(input: &str) -> Result<(), &'static str> {
    if input.trim().is_empty() || is_date(input) {
        Ok(())
    } else {
        Err("Enter a date as YYYY-MM-DD")
    }
}

/// Runs an editing session against the current (or given) draft.
#[instrument(level = "debug", skip(session))]
pub fn run(session: &mut Session, id: Option<RecordId>) -> anyhow::Result<()> {
    let values = match id {
        Some(id) => session
            .select_draft(&id)
            .ok_or_else(|| anyhow::anyhow!("Draft {id} not found"))?,
        None => session
            .store()
            .drafts()
            .current()
            .map(|draft| draft.values.clone())
            .unwrap_or_default(),
    };

    let autosave = session.autosave();
    let mut editor = Editor {
        session,
        autosave,
        clock: Stopwatch::start(),
        values,
    };
    // the initial values are never saved
    editor
        .autosave
        .value_changed(editor.values.clone(), editor.clock.now());

    let filled = editor.fill();
    editor.settle();
    filled?;

    let values = editor.values.clone();
    println!();
    print_values(&values);
    match editor.session.store().drafts().current_id() {
        Some(id) => println!("{}", format!("Draft {id} is up to date.").success()),
        None => println!("{}", "Nothing was saved.".dim()),
    }

    if Confirm::new()
        .with_prompt("Submit as a service log?")
        .default(false)
        .interact()?
    {
        match editor.session.submit_log(values) {
            Ok(log) => println!("{}", format!("Service log created: {}", log.id).success()),
            Err(errors) => {
                report_errors(&errors);
                anyhow::bail!("Service log not created");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> FormValues {
        FormValues {
            provider_id: "P1".to_string(),
            service_order: "SO-1".to_string(),
            car_id: "C1".to_string(),
            odometer: 100.0,
            engine_hours: 10.0,
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-02".to_string(),
            kind: ServiceType::Planned,
            service_description: "Oil change".to_string(),
        }
    }

    #[test]
    fn field_error_reports_only_the_edited_field() {
        let session = Session::in_memory();
        let values = FormValues {
            provider_id: String::new(),
            end_date: "2023-12-31".to_string(),
            ..valid()
        };

        assert_eq!(
            field_error(&session, &values, Field::ProviderId).as_deref(),
            Some("Provider ID is required")
        );
        assert_eq!(
            field_error(&session, &values, Field::EndDate).as_deref(),
            Some("End date must be on or after start date")
        );
        assert_eq!(field_error(&session, &values, Field::CarId), None);
        assert_eq!(field_error(&session, &valid(), Field::ProviderId), None);
    }

    #[test]
    fn change_then_check_sees_the_new_values() {
        let mut session = Session::in_memory();
        let autosave = session.autosave();
        let mut editor = Editor {
            session: &mut session,
            autosave,
            clock: Stopwatch::start(),
            values: valid(),
        };

        editor.change(FormValues {
            car_id: " ".to_string(),
            ..valid()
        });

        assert_eq!(
            field_error(editor.session, &editor.values, Field::CarId).as_deref(),
            Some("Car ID is required")
        );
    }

    #[test]
    fn date_prompt_accepts_blank_or_iso_dates() {
        assert_eq!(date_input(""), Ok(()));
        assert_eq!(date_input("2024-03-01"), Ok(()));
        assert!(date_input("01/03/2024").is_err());
        assert!(date_input("2024-3-1").is_err());
    }
}
