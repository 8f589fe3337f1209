//! Payment request command handlers.

use serde::Serialize;
use tabled::Tabled;

use scholarly_core::{
    Checkout, CheckoutReceipt, Engine, NewPaymentRequest, Payer, PaymentRequest,
    PaymentRequestStatus, Token,
};

use crate::cli::{GlobalOpts, RequestsArgs, RequestsCommand};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::parents::AccountView;
use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RequestRow {
    #[tabled(rename = "Token")]
    token: String,
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Type")]
    subscription_type: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl RequestRow {
    fn new(r: &PaymentRequest, color: bool) -> Self {
        Self {
            token: r.token.to_string(),
            student: r.student_name.clone(),
            parent: r.parent_email.clone(),
            subscription_type: r.subscription_type.to_string(),
            plan: r.plan.to_string(),
            amount: r.amount.to_string(),
            status: output::paint(&r.status.to_string(), status_tone(r.status), color),
            expires: r.expires_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn status_tone(status: PaymentRequestStatus) -> Tone {
    match status {
        PaymentRequestStatus::Pending => Tone::Waiting,
        PaymentRequestStatus::Completed => Tone::Good,
        PaymentRequestStatus::Expired => Tone::Bad,
    }
}

fn detail(r: &PaymentRequest, color: bool) -> String {
    [
        format!("Token:        {}", r.token),
        format!("ID:           {}", r.id),
        format!(
            "Status:       {}",
            output::paint(&r.status.to_string(), status_tone(r.status), color)
        ),
        format!("Student:      {}", r.student_name),
        format!("Student Mail: {}", output::or_dash(r.student_email.as_deref())),
        format!("Parent:       {}", r.parent_email),
        format!("Parent Name:  {}", output::or_dash(r.parent_name.as_deref())),
        format!("Message:      {}", output::or_dash(r.message.as_deref())),
        format!("Plan:         {} {}", r.subscription_type, r.plan),
        format!("Amount:       {}", r.amount),
        format!("Created:      {}", r.created_at),
        format!("Expires:      {}", r.expires_at),
        format!("Completed:    {}", output::or_dash(r.completed_at)),
    ]
    .join("\n")
}

/// A receipt with the parent account's password left out.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptView {
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<PaymentRequest>,
    subscription: scholarly_core::Subscription,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_account: Option<AccountView>,
}

impl From<CheckoutReceipt> for ReceiptView {
    fn from(r: CheckoutReceipt) -> Self {
        Self {
            request: r.request,
            subscription: r.subscription,
            parent_account: r.parent_account.as_ref().map(AccountView::from),
        }
    }
}

fn receipt_detail(r: &ReceiptView) -> String {
    let mut lines = vec![
        format!("Subscription: {} ({})", r.subscription.status, r.subscription.tier),
        format!("Expires:      {}", output::or_dash(r.subscription.expires_at)),
    ];
    if let Some(ref request) = r.request {
        lines.push(format!("Request:      {} ({})", request.token, request.status));
        lines.push(format!("Paid:         {}", request.amount));
    }
    if let Some(ref account) = r.parent_account {
        lines.push(format!(
            "Parent:       {} [{}] students: {}",
            account.email,
            account.account_type,
            account.linked_students.join(", ")
        ));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(engine: &Engine, args: RequestsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let requests = engine.payment_requests();

    let print_list = |list: &[PaymentRequest]| -> Result<(), CliError> {
        let out = output::render_list(
            &global.output,
            list,
            |r| RequestRow::new(r, color),
            |r| r.token.to_string(),
        )?;
        output::print_output(&out, global.quiet);
        Ok(())
    };
    let print_one = |request: &PaymentRequest| -> Result<(), CliError> {
        let out = output::render_single(
            &global.output,
            request,
            |r| detail(r, color),
            |r| r.token.to_string(),
        )?;
        output::print_output(&out, global.quiet);
        Ok(())
    };

    match args.command {
        RequestsCommand::Create {
            student,
            parent_email,
            parent_name,
            student_email,
            message,
            plan_type,
            plan,
        } => {
            let request = requests.create_payment_request(NewPaymentRequest {
                parent_name,
                student_email,
                message,
                subscription_type: plan_type.into(),
                billing_period: plan.into(),
                ..NewPaymentRequest::new(student, parent_email)
            })?;
            print_one(&request)?;
            if !global.quiet {
                eprintln!("Share with your parent: {}", link_for(engine, &request));
            }
            Ok(())
        }

        RequestsCommand::List { all } => {
            let list = if all {
                requests.all_payment_requests()?
            } else {
                requests.get_payment_requests()?
            };
            print_list(&list)
        }

        RequestsCommand::Get { token } => {
            let token = Token::from(token);
            let request = requests.get_payment_request_by_token(&token)?.ok_or_else(|| {
                CliError::NotFound {
                    resource_type: "payment request".into(),
                    identifier: token.to_string(),
                    list_command: "requests list --all".into(),
                }
            })?;
            print_one(&request)
        }

        RequestsCommand::Pending { latest } => {
            if latest {
                match requests.get_most_recent_pending_request()? {
                    Some(request) => print_one(&request),
                    None => {
                        if !global.quiet {
                            eprintln!("No pending payment requests");
                        }
                        Ok(())
                    }
                }
            } else {
                print_list(&requests.pending_requests()?)
            }
        }

        RequestsCommand::Validate { token } => {
            let request = requests.validate_payment_token(&Token::from(token))?;
            print_one(&request)
        }

        RequestsCommand::Pay {
            token,
            payer_email,
            payer_name,
            password,
        } => {
            let token = Token::from(token);
            let request = requests.validate_payment_token(&token)?;

            // Only a parent plan for an unknown payer creates an account.
            let needs_account = request.subscription_type
                == scholarly_core::SubscriptionType::Parent
                && engine.parent_accounts().find_by_email(&payer_email)?.is_none();
            let password = if needs_account {
                let pw = util::password_or_prompt(password)?;
                if pw.is_none() {
                    return Err(CliError::MissingInput {
                        what: "A password for the new parent account".into(),
                        flag: "--password".into(),
                    });
                }
                pw
            } else {
                None
            };

            let prompt = format!(
                "Pay {} for {}'s {} {} plan?",
                request.amount, request.student_name, request.subscription_type, request.plan
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }

            let session = engine.open_session()?;
            let receipt = Checkout::new(engine, &session).complete_payment_request(
                &token,
                Payer {
                    email: payer_email,
                    name: payer_name,
                    password,
                },
            )?;
            let view = ReceiptView::from(receipt);
            let out = output::render_single(&global.output, &view, receipt_detail, |v| {
                v.subscription.status.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RequestsCommand::Link { token, parent } => {
            let token = Token::from(token);
            let link = if parent {
                requests.parent_payment_link(&token)
            } else {
                requests.payment_link(&token)
            };
            output::print_output(link.as_str(), global.quiet);
            Ok(())
        }
    }
}

fn link_for(engine: &Engine, request: &PaymentRequest) -> url::Url {
    let requests = engine.payment_requests();
    match request.subscription_type {
        scholarly_core::SubscriptionType::Parent => requests.parent_payment_link(&request.token),
        scholarly_core::SubscriptionType::Student => requests.payment_link(&request.token),
    }
}
