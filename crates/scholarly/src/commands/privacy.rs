//! Privacy command handlers.

use serde::Serialize;
use tabled::Tabled;

use scholarly_core::{
    Engine, PrivacyFilterResult, PrivacySettings, Scholarship, filter_scholarships_by_privacy,
};

use crate::cli::{GlobalOpts, OutputFormat, PrivacyArgs, PrivacyCommand};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct FlagRow {
    #[tabled(rename = "Setting")]
    name: String,
    #[tabled(rename = "Visible")]
    visible: String,
}

#[derive(Serialize)]
struct Flag {
    name: &'static str,
    visible: bool,
}

#[derive(Tabled)]
struct ScholarshipRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Scholarship> for ScholarshipRow {
    fn from(s: &Scholarship) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            tags: s
                .tags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn print_settings(settings: &PrivacySettings, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            let flags: Vec<Flag> = settings
                .flags()
                .into_iter()
                .map(|(name, visible)| Flag { name, visible })
                .collect();
            output::render_list(
                &global.output,
                &flags,
                |f| FlagRow {
                    name: f.name.into(),
                    visible: if f.visible {
                        output::paint("visible", Tone::Good, color)
                    } else {
                        output::paint("hidden", Tone::Neutral, color)
                    },
                },
                |f| format!("{}={}", f.name, f.visible),
            )?
        }
        _ => output::render_single(&global.output, settings, |_| String::new(), |_| String::new())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(engine: &Engine, args: PrivacyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let preferences = engine.preferences();

    match args.command {
        PrivacyCommand::Show => print_settings(&preferences.privacy_settings()?, global),

        PrivacyCommand::Set { flag, visible } => {
            let settings = preferences.set_privacy_flag(&flag, visible)?;
            print_settings(&settings, global)
        }

        PrivacyCommand::Filter { file } => {
            let listings: Vec<Scholarship> = util::read_json_file(&file)?;
            let result =
                filter_scholarships_by_privacy(&listings, &preferences.privacy_settings()?);

            match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    let out = output::render_list(
                        &global.output,
                        &result.visible,
                        |s| ScholarshipRow::from(s),
                        |s| s.id.clone(),
                    )?;
                    output::print_output(&out, global.quiet);
                    if result.hidden_count > 0 && !global.quiet {
                        eprintln!(
                            "{} scholarship(s) hidden by your privacy settings",
                            result.hidden_count
                        );
                    }
                }
                _ => {
                    let out = output::render_single::<PrivacyFilterResult>(
                        &global.output,
                        &result,
                        |_| String::new(),
                        |_| String::new(),
                    )?;
                    output::print_output(&out, global.quiet);
                }
            }
            Ok(())
        }
    }
}
