use logbook::{FormPatch, FormValues, ServiceType, domain::form::parse_reading};

/// Form fields given on the command line.
///
/// Fields that are not given keep the value they already have.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FormArgs {
    /// Provider identifier
    #[arg(long, value_name = "ID")]
    provider_id: Option<String>,

    /// Service order number
    #[arg(long, value_name = "ORDER")]
    service_order: Option<String>,

    /// Vehicle identifier
    #[arg(long, value_name = "ID")]
    car_id: Option<String>,

    /// Odometer reading
    #[arg(long, value_name = "READING", value_parser = reading)]
    odometer: Option<f64>,

    /// Engine hour reading
    #[arg(long, value_name = "READING", value_parser = reading)]
    engine_hours: Option<f64>,

    /// First day of the service (YYYY-MM-DD). Moves the end date to the day
    /// after unless --end-date is also given.
    #[arg(long, value_name = "DATE")]
    start_date: Option<String>,

    /// Last day of the service (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    end_date: Option<String>,

    /// Service type (planned, unplanned, emergency)
    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<ServiceType>,

    /// Description of the work carried out
    #[arg(long, value_name = "TEXT")]
    description: Option<String>,
}

fn reading(text: &str) -> Result<f64, String> {
    parse_reading(text).ok_or_else(|| format!("'{text}' is not a number"))
}

impl FormArgs {
    /// Whether no field was given.
    pub fn is_empty(&self) -> bool {
        self.clone().into_patch().is_empty()
    }

    /// Writes the given fields into `values`, behaving like the form would.
    pub fn apply_to(self, values: &mut FormValues) {
        let start_date = self.start_date.clone();
        let mut patch = self.into_patch();
        if let Some(start_date) = start_date {
            values.set_start_date(start_date);
            patch.start_date = None;
        }
        patch.apply_to(values);
    }

    fn into_patch(self) -> FormPatch {
        FormPatch {
            provider_id: self.provider_id,
            service_order: self.service_order,
            car_id: self.car_id,
            odometer: self.odometer,
            engine_hours: self.engine_hours,
            start_date: self.start_date,
            end_date: self.end_date,
            kind: self.kind,
            service_description: self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        form: FormArgs,
    }

    fn parse(args: &[&str]) -> FormArgs {
        Harness::try_parse_from(std::iter::once("test").chain(args.iter().copied()))
            .unwrap()
            .form
    }

    fn blank() -> FormValues {
        FormValues::blank(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn start_date_moves_end_date() {
        let mut values = blank();
        parse(&["--start-date", "2024-03-10"]).apply_to(&mut values);

        assert_eq!(values.start_date, "2024-03-10");
        assert_eq!(values.end_date, "2024-03-11");
    }

    #[test]
    fn explicit_end_date_wins() {
        let mut values = blank();
        parse(&["--start-date", "2024-03-10", "--end-date", "2024-03-20"]).apply_to(&mut values);

        assert_eq!(values.end_date, "2024-03-20");
    }

    #[test]
    fn parses_readings_and_type() {
        let mut values = blank();
        let args = parse(&["--odometer", "1200.5", "--engine-hours", "", "--type", "Emergency"]);
        assert!(!args.is_empty());
        args.apply_to(&mut values);

        assert!((values.odometer - 1200.5).abs() < f64::EPSILON);
        assert!(values.engine_hours.abs() < f64::EPSILON);
        assert_eq!(values.kind, ServiceType::Emergency);
    }

    #[test]
    fn rejects_bad_readings() {
        let result = Harness::try_parse_from(["test", "--odometer", "lots"]);
        assert!(result.is_err());
    }

    #[test]
    fn no_arguments_change_nothing() {
        let args = parse(&[]);
        assert!(args.is_empty());

        let mut values = blank();
        args.apply_to(&mut values);
        assert_eq!(values, blank());
    }
}
