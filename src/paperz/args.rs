use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "paperz")]
#[command(about = "Command-line client for paperless-ngx document servers", long_about = None)]
#[command(
    after_help = "The server is configured through PAPERLESS_SERVER_URL and \
                  PAPERLESS_AUTH_TOKEN (or the config command). Comma-separated \
                  arguments must not contain spaces, e.g. -t bill,phone,2019"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Compound document filter criteria, shared by find and export.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Filter by correspondent (name, slug or id)
    #[arg(short, long)]
    pub correspondent: Option<String>,

    /// Filter by document type (Statement, Bill, etc.)
    #[arg(short, long)]
    pub doctype: Option<String>,

    /// Filter by tags separated with commas, all must match (bill,visa,2019)
    #[arg(short, long)]
    pub tags: Option<String>,

    /// Keep documents carrying at least one of these comma-separated tags
    #[arg(long)]
    pub any_tags: Option<String>,

    /// Require comma-separated terms in the document title
    #[arg(short = 'l', long)]
    pub title: Option<String>,

    /// Filter by words in document content (comma separated)
    #[arg(short, long)]
    pub words: Option<String>,

    /// Filter by partial date: 2019, 2019-07 or 20190715
    #[arg(short = 'y', long)]
    pub date: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all tags
    #[command(alias = "t")]
    Tags,

    /// List all correspondents
    #[command(alias = "c")]
    Correspondents,

    /// List all document types
    #[command(alias = "d")]
    Doctypes,

    /// Find documents with any combination of filters
    #[command(alias = "f")]
    Find {
        #[command(flatten)]
        filters: FilterArgs,

        /// Also fetch document content (expensive)
        #[arg(long)]
        content: bool,
    },

    /// Fetch documents by id
    #[command(alias = "g")]
    Get {
        /// Document ids (e.g. 200 201 or 200,201,300)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Also fetch document content (expensive)
        #[arg(long)]
        content: bool,
    },

    /// Modify a document's fields or tags
    #[command(alias = "s")]
    Set(SetArgs),

    /// Download document PDFs or thumbnails, optionally merged
    #[command(alias = "x")]
    Export(ExportArgs),

    /// Show or set configuration values
    Config {
        /// Config key (server-url, filename-pattern)
        key: Option<String>,

        /// New value for the key
        value: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Document id
    pub id: u32,

    /// Change the correspondent (name, slug or id)
    #[arg(short, long)]
    pub correspondent: Option<String>,

    /// Change the document type
    #[arg(short, long)]
    pub doctype: Option<String>,

    /// Change the title
    #[arg(long)]
    pub title: Option<String>,

    /// Change the created date (YYYY-MM-DD)
    #[arg(long)]
    pub created: Option<String>,

    /// Add comma-separated tags
    #[arg(short = 'a', long)]
    pub add_tags: Option<String>,

    /// Remove comma-separated tags
    #[arg(short = 'r', long)]
    pub remove_tags: Option<String>,

    /// Resolve and report, but do not apply any change
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Export these document ids instead of filtering (200,201)
    #[arg(short = 'n', long)]
    pub ids: Option<String>,

    /// Output filename override
    #[arg(short, long)]
    pub output: Option<String>,

    /// Filename pattern, e.g. "[Bank]-ccc-YYYY-MM"
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Download thumbnails (PNG) instead of PDFs
    #[arg(long)]
    pub thumbs: bool,

    /// Merge the downloaded batch into one composite file
    #[arg(short, long)]
    pub merge: bool,

    /// Filename for the merged composite
    #[arg(long)]
    pub merge_output: Option<String>,

    /// Directory to write artifacts into
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}
