mod commands;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "villa-site")]
#[command(version, about = "Content service and site tools for a villa marketing site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Serve the public site and the admin API
    ///
    /// Set GITHUB_TOKEN and GITHUB_REPO to write content to GitHub instead
    /// of the local site directory. ADMIN_PASSWORD gates every write.
    Serve {
        /// Path to site directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Port to serve on (overrides site.toml)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Build the public site as static files
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory for generated site
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate content documents and images
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Show how gallery images are categorized
    Gallery {
        /// Path to site directory
        path: PathBuf,

        /// Folder under the public root (default: the gallery folder)
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Read or edit content through a running server
    Content {
        #[command(subcommand)]
        command: ContentCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
enum ContentCommand {
    /// Print a document, or one value with --pointer
    Get {
        #[arg(value_enum)]
        doc: Doc,

        /// JSON pointer, e.g. /hero/title
        #[arg(long)]
        pointer: Option<String>,

        #[arg(long, default_value = commands::content::DEFAULT_SERVER)]
        server: String,
    },

    /// Set a value and save
    Set {
        #[arg(value_enum)]
        doc: Doc,

        /// JSON pointer, e.g. /hero/title
        pointer: String,

        /// JSON value; anything that is not valid JSON is stored as a string
        value: String,

        #[arg(long, default_value = commands::content::DEFAULT_SERVER)]
        server: String,

        /// Admin password (defaults to ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Move a list item up or down and save
    Move {
        #[arg(value_enum)]
        doc: Doc,

        /// Pointer to the list item, e.g. /map/distances/2
        pointer: String,

        #[arg(value_enum)]
        direction: Direction,

        #[arg(long, default_value = commands::content::DEFAULT_SERVER)]
        server: String,

        /// Admin password (defaults to ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Remove a list item or key and save
    Remove {
        #[arg(value_enum)]
        doc: Doc,

        /// Pointer to remove, e.g. /marquee/items/0
        pointer: String,

        #[arg(long, default_value = commands::content::DEFAULT_SERVER)]
        server: String,

        /// Admin password (defaults to ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Doc {
    Global,
    Page,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

impl From<Doc> for villa_site_core::DocumentKind {
    fn from(doc: Doc) -> Self {
        match doc {
            Doc::Global => villa_site_core::DocumentKind::Global,
            Doc::Page => villa_site_core::DocumentKind::Page,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { path, port } => commands::serve::run(path, port).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Gallery { path, folder } => commands::gallery::run(path, folder).await,
        Command::Content { command } => match command {
            ContentCommand::Get {
                doc,
                pointer,
                server,
            } => commands::content::get(&server, doc.into(), pointer.as_deref()).await,
            ContentCommand::Set {
                doc,
                pointer,
                value,
                server,
                password,
            } => {
                let edit = commands::content::Edit::Set {
                    pointer,
                    value: commands::content::parse_value(&value),
                };
                commands::content::apply(&server, password, doc.into(), edit).await
            }
            ContentCommand::Move {
                doc,
                pointer,
                direction,
                server,
                password,
            } => {
                let edit = match direction {
                    Direction::Up => commands::content::Edit::MoveUp { pointer },
                    Direction::Down => commands::content::Edit::MoveDown { pointer },
                };
                commands::content::apply(&server, password, doc.into(), edit).await
            }
            ContentCommand::Remove {
                doc,
                pointer,
                server,
                password,
            } => {
                let edit = commands::content::Edit::Remove { pointer };
                commands::content::apply(&server, password, doc.into(), edit).await
            }
        },
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "villa-site", &mut io::stdout());
            Ok(())
        }
    }
}
