//! Clap derive structures for the `scholarly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only clap types appear here so `build.rs` can include this file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// scholarly -- subscription, payment-request and parent-account tooling
#[derive(Debug, Parser)]
#[command(
    name = "scholarly",
    version,
    about = "Manage Scholarly subscriptions, payment requests and parent accounts",
    long_about = "Inspect and drive the Scholarly subscription model from the command line.\n\n\
        Records live in a key-value store (a directory of JSON files by default):\n\
        the subscription, payment requests, parent accounts, child profiles and\n\
        privacy preferences.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "SCHOLARLY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the record files (overrides config)
    #[arg(long, short = 'd', env = "SCHOLARLY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Use a throwaway in-memory store
    #[arg(long, global = true, conflicts_with = "data_dir")]
    pub memory: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SCHOLARLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Free,
    Trial,
    Active,
    Expired,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TierArg {
    Free,
    Basic,
    Premium,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PaymentMethodArg {
    Direct,
    Parent,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlanArg {
    Monthly,
    Annual,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlanTypeArg {
    /// Premium for the student
    Student,
    /// Parent dashboard plan
    Parent,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AccountTypeArg {
    PaymentOnly,
    ParentFree,
    ParentPaid,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and change the current subscription
    #[command(alias = "sub", alias = "s")]
    Subscription(SubscriptionArgs),

    /// Manage "ask my parent to pay" payment requests
    #[command(alias = "req", alias = "r")]
    Requests(RequestsArgs),

    /// Manage parent accounts
    #[command(alias = "p")]
    Parents(ParentsArgs),

    /// Manage child profiles and invitations
    #[command(alias = "kids")]
    Children(ChildrenArgs),

    /// Privacy settings and scholarship filtering
    Privacy(PrivacyArgs),

    /// Cookie consent
    Consent(ConsentArgs),

    /// Saved and applied scholarships
    #[command(alias = "sch")]
    Scholarships(ScholarshipsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SUBSCRIPTION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SubscriptionArgs {
    #[command(subcommand)]
    pub command: SubscriptionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SubscriptionCommand {
    /// Show the subscription and what it unlocks
    Show,

    /// Merge field changes into the subscription
    Update(SubscriptionUpdateArgs),

    /// Reset to the free plan and delete the stored record
    Clear,

    /// Apply expiry rules now
    Sweep,

    /// Follow the subscription, printing each change until interrupted
    Watch,

    /// Check whether a feature is locked
    Feature {
        /// Feature name (e.g., "unlimited_scholarships")
        name: String,
    },

    /// Pay directly for a premium plan
    Checkout {
        #[arg(long, default_value = "monthly")]
        plan: PlanArg,
    },

    /// List plan prices
    Prices,
}

#[derive(Debug, Args)]
pub struct SubscriptionUpdateArgs {
    #[arg(long)]
    pub status: Option<StatusArg>,

    #[arg(long)]
    pub tier: Option<TierArg>,

    /// Expiry as RFC 3339, or "none" to clear
    #[arg(long, conflicts_with = "expires_in")]
    pub expires_at: Option<String>,

    /// Expiry relative to now (e.g., "30days")
    #[arg(long)]
    pub expires_in: Option<String>,

    /// Trial end as RFC 3339, or "none" to clear
    #[arg(long, conflicts_with = "trial_ends_in")]
    pub trial_ends_at: Option<String>,

    /// Trial end relative to now (e.g., "7days")
    #[arg(long)]
    pub trial_ends_in: Option<String>,

    #[arg(long)]
    pub payment_method: Option<PaymentMethodArg>,

    #[arg(long)]
    pub payer_email: Option<String>,

    #[arg(long)]
    pub payer_name: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PAYMENT REQUESTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RequestsArgs {
    #[command(subcommand)]
    pub command: RequestsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RequestsCommand {
    /// Ask a parent to pay for a plan
    Create {
        /// Student's name as the parent will see it
        #[arg(long)]
        student: String,

        #[arg(long)]
        parent_email: String,

        #[arg(long)]
        parent_name: Option<String>,

        #[arg(long)]
        student_email: Option<String>,

        /// Personal note for the parent
        #[arg(long, short = 'm')]
        message: Option<String>,

        #[arg(long = "type", default_value = "student")]
        plan_type: PlanTypeArg,

        #[arg(long, default_value = "monthly")]
        plan: PlanArg,
    },

    /// List payment requests
    #[command(alias = "ls")]
    List {
        /// Include expired requests
        #[arg(long)]
        all: bool,
    },

    /// Show a payment request by token
    Get { token: String },

    /// Show pending requests, newest first
    Pending {
        /// Only the most recent one
        #[arg(long)]
        latest: bool,
    },

    /// Check whether a token can still be paid
    Validate { token: String },

    /// Complete a payment request as the payer
    Pay {
        token: String,

        #[arg(long)]
        payer_email: String,

        #[arg(long)]
        payer_name: Option<String>,

        /// Password for a new parent account (prompted if needed)
        #[arg(long, env = "SCHOLARLY_PARENT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Print the payment link for a token
    Link {
        token: String,

        /// Use the parent-plan payment route
        #[arg(long)]
        parent: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PARENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ParentsArgs {
    #[command(subcommand)]
    pub command: ParentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ParentsCommand {
    /// Create a parent account
    Create {
        #[arg(long)]
        email: String,

        /// First student to link
        #[arg(long)]
        student: String,

        #[arg(long = "type", default_value = "parent-free")]
        account_type: AccountTypeArg,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        plan_type: Option<PlanTypeArg>,

        #[arg(long)]
        plan: Option<PlanArg>,

        /// Account password (prompted if omitted)
        #[arg(long, env = "SCHOLARLY_PARENT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show an account by id or email
    Get { account: String },

    /// List parent accounts
    #[command(alias = "ls")]
    List,

    /// Move an account to a higher tier
    Upgrade {
        /// Account id or email
        account: String,

        #[arg(long)]
        to: AccountTypeArg,

        #[arg(long)]
        plan_type: Option<PlanTypeArg>,

        #[arg(long)]
        plan: Option<PlanArg>,
    },

    /// Link another student to an account
    LinkStudent {
        /// Account id or email
        account: String,

        student: String,
    },

    /// Show what a parent with this email can do next
    Options { email: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHILDREN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ChildrenArgs {
    #[command(subcommand)]
    pub command: ChildrenCommand,
}

#[derive(Debug, Subcommand)]
pub enum ChildrenCommand {
    /// Add a child profile
    Add {
        first_name: String,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        grade: Option<String>,

        #[arg(long)]
        school: Option<String>,
    },

    /// List child profiles
    #[command(alias = "ls")]
    List,

    /// Issue an invitation for a child profile
    Invite { id: String },

    /// Accept an invitation by token
    Accept { token: String },

    /// Remove a child profile
    #[command(alias = "rm")]
    Remove { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PRIVACY & CONSENT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PrivacyArgs {
    #[command(subcommand)]
    pub command: PrivacyCommand,
}

#[derive(Debug, Subcommand)]
pub enum PrivacyCommand {
    /// Show every visibility flag
    Show,

    /// Set one visibility flag
    Set {
        /// Flag name (e.g., "gender", "scholarshipMatches")
        flag: String,

        /// Whether the attribute is visible
        #[arg(action = clap::ArgAction::Set)]
        visible: bool,
    },

    /// Filter a JSON list of scholarships through the current settings
    Filter {
        /// JSON file containing an array of scholarships
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ConsentArgs {
    #[command(subcommand)]
    pub command: ConsentCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConsentCommand {
    /// Show the recorded cookie decision
    Show,

    /// Record a cookie decision
    Set {
        /// Accept analytics and marketing cookies
        #[arg(long, conflicts_with_all = ["reject_optional", "analytics", "marketing"])]
        accept_all: bool,

        /// Accept only necessary cookies
        #[arg(long, conflicts_with_all = ["analytics", "marketing"])]
        reject_optional: bool,

        #[arg(long)]
        analytics: bool,

        #[arg(long)]
        marketing: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCHOLARSHIPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ScholarshipsArgs {
    #[command(subcommand)]
    pub command: ScholarshipsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScholarshipsCommand {
    /// Bookmark a scholarship
    Save { id: String },

    /// Remove a scholarship from the saved (or applied) list
    Unsave {
        id: String,

        #[arg(long)]
        applied: bool,
    },

    /// Flip whether a scholarship is saved
    Toggle { id: String },

    /// Mark a scholarship as applied to
    Apply { id: String },

    /// List saved (or applied) scholarship ids
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        applied: bool,
    },

    /// Print the share link for a scholarship
    Link {
        /// Scholarship name
        name: String,

        /// Explicit slug instead of one derived from the name
        #[arg(long)]
        slug: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a config file with guided setup
    Init {
        /// Write defaults without prompting
        #[arg(long)]
        defaults: bool,
    },

    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
