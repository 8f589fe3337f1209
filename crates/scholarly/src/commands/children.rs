//! Child profile command handlers.

use tabled::Tabled;

use scholarly_core::{ChildProfile, Engine, InvitationStatus, NewChildProfile, Token};

use crate::cli::{ChildrenArgs, ChildrenCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ChildRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Grade")]
    grade: String,
    #[tabled(rename = "Invitation")]
    invitation: String,
}

impl ChildRow {
    fn new(c: &ChildProfile, color: bool) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.full_name(),
            grade: c.grade_level.clone().unwrap_or_default(),
            invitation: output::paint(
                &c.invitation_status.to_string(),
                invitation_tone(c.invitation_status),
                color,
            ),
        }
    }
}

fn invitation_tone(status: InvitationStatus) -> Tone {
    match status {
        InvitationStatus::NotInvited => Tone::Neutral,
        InvitationStatus::Pending => Tone::Waiting,
        InvitationStatus::Accepted => Tone::Good,
    }
}

fn detail(c: &ChildProfile) -> String {
    [
        format!("ID:         {}", c.id),
        format!("Name:       {}", c.full_name()),
        format!("Email:      {}", output::or_dash(c.email.as_deref())),
        format!("Grade:      {}", output::or_dash(c.grade_level.as_deref())),
        format!("School:     {}", output::or_dash(c.school.as_deref())),
        format!("Invitation: {}", c.invitation_status),
        format!("Token:      {}", output::or_dash(c.invitation_token.as_ref())),
        format!("Accepted:   {}", output::or_dash(c.accepted_at)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(engine: &Engine, args: ChildrenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let children = engine.children();
    let print_one = |child: &ChildProfile| -> Result<(), CliError> {
        let out = output::render_single(&global.output, child, detail, |c| c.id.to_string())?;
        output::print_output(&out, global.quiet);
        Ok(())
    };

    match args.command {
        ChildrenCommand::Add {
            first_name,
            last_name,
            email,
            grade,
            school,
        } => {
            let child = children.add(NewChildProfile {
                first_name,
                last_name,
                email,
                grade_level: grade,
                school,
            })?;
            print_one(&child)
        }

        ChildrenCommand::List => {
            let list = children.list()?;
            let out = output::render_list(
                &global.output,
                &list,
                |c| ChildRow::new(c, color),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ChildrenCommand::Invite { id } => {
            let child = children.invite(&Token::from(id))?;
            print_one(&child)?;
            if let (Some(token), false) = (&child.invitation_token, global.quiet) {
                eprintln!("Invitation link: {}", children.invitation_link(token));
            }
            Ok(())
        }

        ChildrenCommand::Accept { token } => {
            let child = children.accept(&Token::from(token))?;
            print_one(&child)
        }

        ChildrenCommand::Remove { id } => {
            let id = Token::from(id);
            if !util::confirm(&format!("Remove child profile {id}?"), global.yes)? {
                return Ok(());
            }
            let removed = children.remove(&id)?;
            if !global.quiet {
                eprintln!("Removed {}", removed.full_name());
            }
            Ok(())
        }
    }
}
