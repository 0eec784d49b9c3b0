use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "boleto-client",
    version,
    about = "student registration and billing notice client",
    long_about = "boleto-client talks to the student registration API: list and search students, register, edit and deactivate them, and generate billing notices (boletos).\n\nExamples:\n  boleto-client list --search silva\n  boleto-client update A1 --fee 180.00\n  boleto-client notice 7 99.90 2025-01-10\n  boleto-client shell\n\nTip: Use --config to persist the API address and output settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'f',
        long = "format",
        visible_alias = "output-format",
        value_name = "FORMAT",
        global = true,
        help_heading = "Output",
        help = "Output format (text, json, html)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        global = true,
        help_heading = "Output",
        help = "Write listings to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.boleto-client/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'u',
        long = "base-url",
        visible_alias = "url",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "API base URL (default http://localhost:8080)."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'T',
        long = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'p',
        long = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8888)."
    )]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StudentFields {
    #[arg(long = "name", value_name = "TEXT", help = "Full name.")]
    pub name: Option<String>,

    #[arg(long = "ra", value_name = "CODE", help = "Registration code (RA).")]
    pub code: Option<String>,

    #[arg(long = "email", value_name = "EMAIL", help = "Email address.")]
    pub email: Option<String>,

    #[arg(long = "fee", value_name = "AMOUNT", help = "Monthly fee.")]
    pub fee: Option<String>,

    #[arg(
        long = "active",
        value_name = "BOOL",
        help = "Active flag (true/false). New students default to true."
    )]
    pub active: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "List students, optionally narrowed by a search term")]
    List {
        #[arg(short = 's', long = "search", value_name = "TERM")]
        search: Option<String>,
    },

    #[command(about = "Show one student by registration code")]
    Show { ra: String },

    #[command(about = "Register a new student")]
    Create {
        #[command(flatten)]
        fields: StudentFields,
    },

    #[command(about = "Update a student; fields not given keep their current value")]
    Update {
        ra: String,
        #[command(flatten)]
        fields: StudentFields,
    },

    #[command(about = "Deactivate (soft-delete) a student")]
    Deactivate {
        ra: String,
        #[arg(short = 'y', long = "yes", help = "Do not ask for confirmation.")]
        yes: bool,
    },

    #[command(about = "List billing notices")]
    Notices,

    #[command(about = "Generate a billing notice for a student id")]
    Notice {
        student_id: i64,
        amount: String,
        #[arg(value_name = "DUE_DATE", help = "Due date (YYYY-MM-DD).")]
        due_date: String,
    },

    #[command(about = "List students as picker choices for notice generation")]
    Students,

    #[command(about = "Interactive session")]
    Shell,

    #[command(about = "Write a default config file if none exists")]
    InitConfig,
}
