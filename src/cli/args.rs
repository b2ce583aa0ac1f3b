use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "portfolio-cards",
    version,
    about = "render portfolio projects and certificates as filterable cards",
    long_about = "portfolio-cards loads the projects and certificates collections from static JSON files or a remote document store and renders them into a standalone HTML page with a category filter bar.\n\nExamples:\n  portfolio-cards --base ./site -o portfolio.html\n  portfolio-cards --backend documents --store-url https://store.example.com/v1/collections\n  portfolio-cards --config ~/.portfolio-cards/config.yml --of json -o rendered.json\n\nTip: Use --config to persist selectors and endpoints and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered page to FILE (stdout when omitted)."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: html or json (inferred from --output extension)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "title",
        value_name = "TEXT",
        help_heading = "Output",
        help = "Page title for HTML output."
    )]
    pub title: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.portfolio-cards/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'b',
        long = "be",
        visible_alias = "backend",
        value_name = "KIND",
        help_heading = "Source",
        help = "Data backend: static or documents."
    )]
    pub backend: Option<String>,

    #[arg(
        long = "base",
        value_name = "DIR|URL",
        help_heading = "Source",
        help = "Directory or URL relative static endpoints are resolved against."
    )]
    pub base: Option<String>,

    #[arg(
        short = 'p',
        long = "pe",
        visible_alias = "projects",
        value_name = "PATH",
        help_heading = "Source",
        help = "Projects endpoint (static file/URL or document collection path)."
    )]
    pub projects: Option<String>,

    #[arg(
        short = 'e',
        long = "ce",
        visible_alias = "certificates",
        value_name = "PATH",
        help_heading = "Source",
        help = "Certificates endpoint (static file/URL or document collection path)."
    )]
    pub certificates: Option<String>,

    #[arg(
        long = "su",
        visible_alias = "store-url",
        value_name = "URL",
        help_heading = "Source",
        help = "Document store base URL (documents backend)."
    )]
    pub store_url: Option<String>,

    #[arg(
        long = "st",
        visible_alias = "store-token",
        value_name = "TOKEN",
        help_heading = "Source",
        help = "Bearer token sent to the document store."
    )]
    pub store_token: Option<String>,

    #[arg(
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy for remote sources."
    )]
    pub proxy: Option<String>,

    #[arg(
        long = "dc",
        visible_alias = "default-category",
        value_name = "NAME",
        help_heading = "Cards",
        help = "Category for projects that declare none."
    )]
    pub default_category: Option<String>,

    #[arg(
        short = 'f',
        long = "flt",
        visible_alias = "filter",
        value_name = "LABEL=FILTER",
        action = ArgAction::Append,
        help_heading = "Cards",
        help = "Filter button, e.g. 'Web=.web' (repeatable; derived from categories when omitted)."
    )]
    pub filter: Vec<String>,
}
