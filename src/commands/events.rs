//! `dsg events`: list the event catalog.

use serde::Serialize;
use tabled::Tabled;

use dsg_core::AppResult;
use dsg_plugin::EventName;

use crate::output::{self, OutputFormat};

#[derive(Serialize, Tabled)]
struct EventRow {
    #[tabled(rename = "Event")]
    event: &'static str,
    #[tabled(rename = "Before fields")]
    #[serde(skip)]
    fields: String,
    #[tabled(skip)]
    before: &'static [&'static str],
}

/// Execute the events command
pub fn execute(format: OutputFormat) -> AppResult<()> {
    let rows: Vec<EventRow> = EventName::ALL
        .iter()
        .map(|event| {
            let before = event.before_fields();
            EventRow {
                event: event.as_str(),
                fields: if before.is_empty() {
                    "{}".to_string()
                } else {
                    before.join(", ")
                },
                before,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => output::print_json(&rows),
        OutputFormat::Table => output::print_table("Events", &rows),
    }

    Ok(())
}
