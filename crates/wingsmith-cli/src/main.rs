mod build;
mod completion;
mod logging;
mod render;
mod request;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use wingsmith_repository::ManifestRepository;
use wingsmith_security::sha256_file_hex;
use wingsmith_version::{compare_versions, highest_version, substitute_version};

use crate::build::{build_manifest, classify_against_repository, render_manifest, OutputFormat};
use crate::completion::{write_completions_script, CliCompletionShell};
use crate::logging::init_logging;
use crate::render::{
    current_output_style, render_installer_summary, render_ordering, OutputStyle,
    TerminalRenderer,
};
use crate::request::BuildRequest;

#[derive(Parser, Debug)]
#[command(name = "wingsmith")]
#[command(about = "Builds installer manifests for new package releases", long_about = None)]
struct Cli {
    /// Root of the manifest repository holding published releases.
    #[arg(long, global = true, env = "WINGSMITH_REPOSITORY_ROOT")]
    repository_root: Option<PathBuf>,
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Disable colored status output.
    #[arg(long, global = true)]
    plain: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an installer manifest from a request file.
    Build {
        request: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,
    },
    /// Compare two version strings in natural order.
    Compare { left: String, right: String },
    /// Print the highest of the given versions.
    Max {
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Roll embedded known versions in TEXT forward to the new version.
    Substitute {
        text: String,
        #[arg(long = "new")]
        new_version: String,
        #[arg(long = "known")]
        known_versions: Vec<String>,
    },
    /// List published versions of a package, newest first.
    Versions { identifier: String },
    /// Classify a version against the published history.
    State { identifier: String, version: String },
    /// Print the uppercase SHA-256 of a local file.
    Hash { file: PathBuf },
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let style = current_output_style(cli.plain);
    init_logging(cli.verbose, style == OutputStyle::Rich);
    run_cli(cli, TerminalRenderer::from_style(style))
}

fn run_cli(cli: Cli, renderer: TerminalRenderer) -> Result<()> {
    let repository_root = cli
        .repository_root
        .unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Build {
            request,
            output,
            format,
        } => {
            let repository = ManifestRepository::open(repository_root);
            let build_request = BuildRequest::load(&request)?;
            let base_dir = request.parent().unwrap_or_else(|| Path::new("."));

            renderer.print_section("Installers");
            let outcome = build_manifest(&repository, &build_request, base_dir, |installer| {
                renderer.print_status("step", &render_installer_summary(installer));
            })?;

            let previous = outcome
                .previous_version
                .as_deref()
                .map(|version| format!(", previous {version}"))
                .unwrap_or_default();
            renderer.print_status(
                "ok",
                &format!(
                    "built {} {} ({}{previous}, {} installers)",
                    outcome.manifest.package_identifier,
                    outcome.manifest.package_version,
                    outcome.update_state.as_str(),
                    outcome.manifest.installers.len()
                ),
            );

            let rendered = render_manifest(&outcome.manifest, format)?;
            match output {
                Some(path) => fs::write(&path, rendered)
                    .with_context(|| format!("failed writing manifest: {}", path.display()))?,
                None => print!("{rendered}"),
            }
        }
        Commands::Compare { left, right } => {
            println!("{}", render_ordering(compare_versions(&left, &right)));
        }
        Commands::Max { versions } => {
            if let Some(highest) = highest_version(versions.iter().map(String::as_str)) {
                println!("{highest}");
            }
        }
        Commands::Substitute {
            text,
            new_version,
            known_versions,
        } => {
            println!("{}", substitute_version(&text, &known_versions, &new_version));
        }
        Commands::Versions { identifier } => {
            let repository = ManifestRepository::open(repository_root);
            let versions = repository.package_versions(&identifier)?;
            if versions.is_empty() {
                renderer.print_status("warn", &format!("No published versions: {identifier}"));
            }
            for version in versions {
                println!("{version}");
            }
        }
        Commands::State {
            identifier,
            version,
        } => {
            let repository = ManifestRepository::open(repository_root);
            let state = classify_against_repository(&repository, &identifier, &version)?;
            println!("{}", state.as_str());
        }
        Commands::Hash { file } => {
            println!("{}", sha256_file_hex(&file)?.to_ascii_uppercase());
        }
        Commands::Completions { shell } => {
            let mut stdout = io::stdout();
            write_completions_script(shell, &mut stdout)?;
        }
    }

    Ok(())
}
