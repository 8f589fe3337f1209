//! Saved / applied scholarship command handlers.

use tabled::Tabled;

use scholarly_core::{Engine, Scholarship, ScholarshipList};

use crate::cli::{GlobalOpts, ScholarshipsArgs, ScholarshipsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct IdRow {
    #[tabled(rename = "Scholarship")]
    id: String,
}

fn list_of(applied: bool) -> ScholarshipList {
    if applied {
        ScholarshipList::Applied
    } else {
        ScholarshipList::Saved
    }
}

pub fn handle(engine: &Engine, args: ScholarshipsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let preferences = engine.preferences();
    let note = |message: String| {
        if !global.quiet {
            eprintln!("{message}");
        }
    };

    match args.command {
        ScholarshipsCommand::Save { id } => {
            if preferences.add(ScholarshipList::Saved, &id)? {
                note(format!("Saved {id}"));
            } else {
                note(format!("{id} was already saved"));
            }
            Ok(())
        }

        ScholarshipsCommand::Unsave { id, applied } => {
            if preferences.remove(list_of(applied), &id)? {
                note(format!("Removed {id}"));
            } else {
                note(format!("{id} was not in the list"));
            }
            Ok(())
        }

        ScholarshipsCommand::Toggle { id } => {
            let saved = preferences.toggle(ScholarshipList::Saved, &id)?;
            note(format!("{id} is {}", if saved { "saved" } else { "no longer saved" }));
            Ok(())
        }

        ScholarshipsCommand::Apply { id } => {
            if preferences.add(ScholarshipList::Applied, &id)? {
                note(format!("Marked {id} as applied"));
            } else {
                note(format!("{id} was already marked as applied"));
            }
            Ok(())
        }

        ScholarshipsCommand::List { applied } => {
            let ids = preferences.scholarships(list_of(applied))?;
            let out = output::render_list(
                &global.output,
                &ids,
                |id| IdRow { id: id.clone() },
                Clone::clone,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ScholarshipsCommand::Link { name, slug } => {
            let scholarship = Scholarship {
                slug,
                ..Scholarship::new(String::new(), name, String::new())
            };
            output::print_output(preferences.scholarship_link(&scholarship).as_str(), global.quiet);
            Ok(())
        }
    }
}
