//! Cookie consent command handlers.

use scholarly_core::{CookieConsent, Engine};

use crate::cli::{ConsentArgs, ConsentCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn detail(c: &CookieConsent) -> String {
    [
        format!("Necessary: {}", output::yes_no(c.necessary)),
        format!("Analytics: {}", output::yes_no(c.analytics)),
        format!("Marketing: {}", output::yes_no(c.marketing)),
        format!("Decided:   {}", c.decided_at),
    ]
    .join("\n")
}

fn summary(c: &CookieConsent) -> String {
    format!("analytics={} marketing={}", c.analytics, c.marketing)
}

pub fn handle(engine: &Engine, args: ConsentArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let preferences = engine.preferences();

    let consent = match args.command {
        ConsentCommand::Show => match preferences.cookie_consent()? {
            Some(consent) => consent,
            None => {
                if !global.quiet {
                    eprintln!("No cookie decision recorded");
                }
                return Ok(());
            }
        },

        ConsentCommand::Set {
            accept_all,
            reject_optional: _,
            analytics,
            marketing,
        } => {
            let (analytics, marketing) = if accept_all {
                (true, true)
            } else {
                (analytics, marketing)
            };
            preferences.set_cookie_consent(analytics, marketing)?
        }
    };

    let out = output::render_single(&global.output, &consent, detail, summary)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
