//! Subscription command handlers.

use serde::Serialize;
use tabled::Tabled;

use scholarly_core::{
    BillingPeriod, Checkout, Engine, Entitlements, Feature, Subscription, SubscriptionSession,
    SubscriptionStatus, SubscriptionType, SubscriptionUpdate, is_feature_name_locked,
    subscription_price,
};

use crate::cli::{GlobalOpts, SubscriptionArgs, SubscriptionCommand, SubscriptionUpdateArgs};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionView {
    #[serde(flatten)]
    subscription: Subscription,
    #[serde(flatten)]
    entitlements: Entitlements,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds_remaining: Option<i64>,
}

impl SubscriptionView {
    fn of(session: &SubscriptionSession) -> Self {
        Self {
            subscription: session.current(),
            entitlements: session.entitlements(),
            seconds_remaining: session.time_remaining().map(|d| d.num_seconds()),
        }
    }
}

fn status_tone(status: SubscriptionStatus) -> Tone {
    match status {
        SubscriptionStatus::Active => Tone::Good,
        SubscriptionStatus::Trial => Tone::Waiting,
        SubscriptionStatus::Expired => Tone::Bad,
        SubscriptionStatus::Free => Tone::Neutral,
    }
}

fn detail(v: &SubscriptionView, color: bool) -> String {
    let s = &v.subscription;
    let locked = if v.entitlements.locked_features.is_empty() {
        "none".to_owned()
    } else {
        v.entitlements
            .locked_features
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let remaining = v
        .seconds_remaining
        .map_or_else(|| "-".into(), |secs| {
            util::format_remaining(chrono::Duration::seconds(secs))
        });
    [
        format!(
            "Status:      {}",
            output::paint(&s.status.to_string(), status_tone(s.status), color)
        ),
        format!("Tier:        {}", s.tier),
        format!("Premium:     {}", output::yes_no(v.entitlements.premium)),
        format!("Trial Ends:  {}", output::or_dash(s.trial_ends_at)),
        format!("Expires:     {}", output::or_dash(s.expires_at)),
        format!("Remaining:   {remaining}"),
        format!("Paid Via:    {}", output::or_dash(s.payment_method)),
        format!("Payer:       {}", output::or_dash(s.payer_email.as_deref())),
        format!("Payer Name:  {}", output::or_dash(s.payer_name.as_deref())),
        format!("Locked:      {locked}"),
    ]
    .join("\n")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeatureCheck {
    feature: String,
    known: bool,
    locked: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceEntry {
    subscription_type: SubscriptionType,
    plan: BillingPeriod,
    cents: u32,
}

#[derive(Tabled)]
struct PriceRow {
    #[tabled(rename = "Type")]
    subscription_type: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Price")]
    price: String,
}

impl From<&PriceEntry> for PriceRow {
    fn from(p: &PriceEntry) -> Self {
        Self {
            subscription_type: p.subscription_type.to_string(),
            plan: p.plan.to_string(),
            price: scholarly_core::Cents(p.cents).to_string(),
        }
    }
}

fn price_table() -> Vec<PriceEntry> {
    let mut entries = Vec::with_capacity(4);
    for subscription_type in [SubscriptionType::Student, SubscriptionType::Parent] {
        for plan in [BillingPeriod::Monthly, BillingPeriod::Annual] {
            entries.push(PriceEntry {
                subscription_type,
                plan,
                cents: subscription_price(subscription_type, plan).0,
            });
        }
    }
    entries
}

// ── Update args ─────────────────────────────────────────────────────

fn build_update(
    args: SubscriptionUpdateArgs,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<SubscriptionUpdate, CliError> {
    let expires_at = match (args.expires_at, args.expires_in) {
        (Some(raw), _) => Some(util::parse_timestamp("expires-at", &raw)?),
        (None, Some(raw)) => Some(Some(util::parse_relative("expires-in", &raw, now)?)),
        (None, None) => None,
    };
    let trial_ends_at = match (args.trial_ends_at, args.trial_ends_in) {
        (Some(raw), _) => Some(util::parse_timestamp("trial-ends-at", &raw)?),
        (None, Some(raw)) => Some(Some(util::parse_relative("trial-ends-in", &raw, now)?)),
        (None, None) => None,
    };

    let update = SubscriptionUpdate {
        status: args.status.map(Into::into),
        tier: args.tier.map(Into::into),
        expires_at,
        trial_ends_at,
        payment_method: args.payment_method.map(|m| Some(m.into())),
        payer_email: args.payer_email.map(Some),
        payer_name: args.payer_name.map(Some),
    };
    if update.is_empty() {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "no fields given; see `scholarly subscription update --help`".into(),
        });
    }
    Ok(update)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    engine: &Engine,
    args: SubscriptionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        // Prices never open a session, so they cannot start a trial.
        SubscriptionCommand::Prices => {
            let prices = price_table();
            let out = output::render_list(&global.output, &prices, |p| PriceRow::from(p), |p| {
                format!("{} {} {}", p.subscription_type, p.plan, p.cents)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        command => handle_session(engine, command, global).await,
    }
}

async fn handle_session(
    engine: &Engine,
    command: SubscriptionCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let session = engine.open_session()?;
    let show = |session: &SubscriptionSession| -> Result<(), CliError> {
        let view = SubscriptionView::of(session);
        let out = output::render_single(
            &global.output,
            &view,
            |v| detail(v, color),
            |v| v.subscription.status.to_string(),
        )?;
        output::print_output(&out, global.quiet);
        Ok(())
    };

    match command {
        SubscriptionCommand::Show => show(&session),

        SubscriptionCommand::Update(update_args) => {
            let update = build_update(update_args, engine.now())?;
            session.update_subscription(update)?;
            show(&session)
        }

        SubscriptionCommand::Clear => {
            if !util::confirm("Reset the subscription to the free plan?", global.yes)? {
                return Ok(());
            }
            session.clear_subscription()?;
            if !global.quiet {
                eprintln!("Subscription cleared");
            }
            Ok(())
        }

        SubscriptionCommand::Sweep => {
            let swept_now = session.sweep_expired()?;
            let lapsed = session.lapsed_on_open() || swept_now;
            if !global.quiet {
                eprintln!(
                    "{}",
                    if lapsed {
                        "Subscription lapsed and was downgraded"
                    } else {
                        "Nothing to expire"
                    }
                );
            }
            show(&session)
        }

        SubscriptionCommand::Watch => {
            let mut watch = session.watch();
            session.start().await?;
            show(&session)?;
            if engine.config().sweep_interval.is_zero() && !global.quiet {
                eprintln!("Background sweep is disabled (subscription.sweep_interval_secs = 0)");
            }

            loop {
                tokio::select! {
                    biased;
                    _ = tokio::signal::ctrl_c() => break,
                    next = watch.changed() => match next {
                        Some(_) => show(&session)?,
                        None => break,
                    },
                }
            }
            session.shutdown().await;
            Ok(())
        }

        SubscriptionCommand::Feature { name } => {
            let check = FeatureCheck {
                known: name.parse::<Feature>().is_ok(),
                locked: is_feature_name_locked(&session.current(), &name),
                feature: name,
            };
            let out = output::render_single(
                &global.output,
                &check,
                |c| {
                    let state = if c.locked {
                        output::paint("locked", Tone::Bad, color)
                    } else {
                        output::paint("unlocked", Tone::Good, color)
                    };
                    let note = if c.known { "" } else { " (unknown feature)" };
                    format!("{}: {state}{note}", c.feature)
                },
                |c| if c.locked { "locked" } else { "unlocked" }.into(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SubscriptionCommand::Checkout { plan } => {
            let period = BillingPeriod::from(plan);
            let prompt = format!(
                "Pay {} for a {period} premium plan?",
                subscription_price(SubscriptionType::Student, period)
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            Checkout::new(engine, &session).direct_checkout(period)?;
            show(&session)
        }

        SubscriptionCommand::Prices => Err(CliError::Internal(
            "prices are handled without a session".into(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::cli::{StatusArg, TierArg};

    fn empty_args() -> SubscriptionUpdateArgs {
        SubscriptionUpdateArgs {
            status: None,
            tier: None,
            expires_at: None,
            expires_in: None,
            trial_ends_at: None,
            trial_ends_in: None,
            payment_method: None,
            payer_email: None,
            payer_name: None,
        }
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(build_update(empty_args(), Utc::now()).is_err());
    }

    #[test]
    fn relative_and_cleared_fields() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let update = build_update(
            SubscriptionUpdateArgs {
                status: Some(StatusArg::Active),
                tier: Some(TierArg::Premium),
                expires_in: Some("30days".into()),
                trial_ends_at: Some("none".into()),
                ..empty_args()
            },
            now,
        )
        .unwrap();
        assert_eq!(update.status, Some(SubscriptionStatus::Active));
        assert_eq!(update.expires_at, Some(Some(now + chrono::Duration::days(30))));
        assert_eq!(update.trial_ends_at, Some(None));
        assert_eq!(update.payer_email, None);
    }

    #[test]
    fn price_table_covers_every_plan() {
        let table = price_table();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0].cents, 999);
        assert_eq!(table[3].cents, 14_999);
    }
}
