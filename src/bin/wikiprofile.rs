//! CLI binary for wiki-profile-builder.
//!
//! A thin shim over the library crate that maps CLI flags to `ClientConfig`,
//! wires the persistent client state through the subcommands, and prints
//! results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiki_profile_builder::{
    edit_wikitext, fetch_profile, generate_profile, html_to_wikitext, parse_wikitext,
    ClientConfig, ClientState, EditRequest, FetchOutcome, ProfileData, Source, WIKI_DOMAINS,
};

const AFTER_HELP: &str = r#"EXAMPLES:
  # Fetch your user page's wikitext from Meta-Wiki
  wikiprofile fetch "Example User" -o profile.wiki

  # Render wikitext to HTML (uses the saved state when no file is given)
  wikiprofile parse profile.wiki -o preview.html

  # Convert edited HTML back to wikitext (offline, no API key needed)
  wikiprofile convert edited.html -o profile.wiki

  # Ask Gemini for a targeted edit
  wikiprofile edit profile.wiki --instruction "add a Books section" -o profile.wiki

  # Generate a fresh profile (template fallback without GEMINI_API_KEY)
  wikiprofile generate "Example User" --location "Kyiv, Ukraine" --languages "Ukrainian (Native), English (Fluent)"

SUPPORTED DOMAINS:
  meta.wikimedia.org       Meta-Wiki (default)
  en.wikipedia.org         English Wikipedia
  commons.wikimedia.org    Wikimedia Commons
  www.wikidata.org         Wikidata
  en.wiktionary.org        English Wiktionary

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY           Google Gemini API key (AI edit/generate)
  WIKIPROFILE_DOMAIN       Override the default project domain
  WIKIPROFILE_STATE        Path of the client-state JSON file
"#;

/// Build and edit Wikimedia user-profile pages from the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "wikiprofile",
    version,
    about = "Fetch, edit, and regenerate Wikimedia user-profile pages",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Wikimedia project domain.
    #[arg(long, global = true, env = "WIKIPROFILE_DOMAIN")]
    domain: Option<String>,

    /// Client-state JSON file (username, domain, working wikitext).
    #[arg(
        long,
        global = true,
        env = "WIKIPROFILE_STATE",
        default_value = ".wikiprofile.json"
    )]
    state: PathBuf,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, global = true, env = "WIKIPROFILE_API_TIMEOUT", default_value_t = 30)]
    api_timeout: u64,

    /// Gemini model ID for AI subcommands.
    #[arg(long, global = true, env = "WIKIPROFILE_MODEL")]
    model: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the raw wikitext of a user's profile page.
    Fetch(FetchArgs),
    /// Render wikitext to HTML via the MediaWiki parse API.
    Parse(ParseArgs),
    /// Convert HTML back to wikitext (pure, offline).
    Convert(ConvertArgs),
    /// Apply a natural-language edit instruction via Gemini.
    Edit(EditArgs),
    /// Generate a new profile page from structured details.
    Generate(GenerateArgs),
    /// List the Wikimedia projects this tool knows about.
    Domains,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Wikimedia username (without the `User:` prefix).
    username: String,

    /// Write the wikitext to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not record the result in the client-state file.
    #[arg(long)]
    no_save: bool,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Wikitext file to render; `-` for stdin. Defaults to the saved state.
    input: Option<PathBuf>,

    /// Write the HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// HTML file to convert; `-` for stdin.
    input: PathBuf,

    /// Write the wikitext to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not record the result in the client-state file.
    #[arg(long)]
    no_save: bool,
}

#[derive(Args, Debug)]
struct EditArgs {
    /// Wikitext file to edit; `-` for stdin. Defaults to the saved state.
    input: Option<PathBuf>,

    /// Natural-language edit instruction.
    #[arg(short, long)]
    instruction: String,

    /// The selected portion the edit should be confined to.
    #[arg(long)]
    selection: Option<String>,

    /// Write the modified wikitext to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not record the result in the client-state file.
    #[arg(long)]
    no_save: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Wikimedia username the profile is for.
    username: String,

    #[arg(long)]
    real_name: Option<String>,
    #[arg(long)]
    location: Option<String>,
    /// Comma-separated, each entry optionally `Language (Proficiency)`.
    #[arg(long)]
    languages: Option<String>,
    /// Comma-separated interest keywords.
    #[arg(long)]
    interests: Option<String>,
    #[arg(long)]
    about_me: Option<String>,
    #[arg(long)]
    occupation: Option<String>,
    #[arg(long)]
    join_year: Option<String>,

    /// Skip Gemini and use the deterministic template directly.
    #[arg(long)]
    template_only: bool,

    /// Emit the result as JSON (wikitext plus its source) instead of raw wikitext.
    #[arg(long)]
    json: bool,

    /// Write the wikitext to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not record the result in the client-state file.
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Load state, build config ─────────────────────────────────────────
    // State is loaded once at startup; the domain priority is
    // flag > saved state > built-in default.
    let mut state = ClientState::load(&cli.state).context("Failed to load client state")?;
    let domain = cli
        .domain
        .clone()
        .unwrap_or_else(|| state.domain.clone());

    let mut builder = ClientConfig::builder()
        .domain(domain)
        .api_timeout_secs(cli.api_timeout);
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    match cli.command {
        Commands::Fetch(args) => {
            let client = config.http_client()?;
            let spinner = spinner(cli.quiet, format!("Fetching User:{}…", args.username));
            let outcome = fetch_profile(&client, &config, &args.username).await;
            finish(spinner);

            match outcome.context("Fetch failed")? {
                FetchOutcome::Found { wikitext } => {
                    emit(&wikitext, args.output.as_deref())?;
                    if !args.no_save {
                        state.username = args.username;
                        state.domain = config.domain.clone();
                        state.raw_wikitext = wikitext;
                        state.save(&cli.state).context("Failed to save client state")?;
                    }
                }
                FetchOutcome::Missing => {
                    eprintln!(
                        "User:{} does not exist on {} — try `wikiprofile generate`",
                        args.username, config.domain
                    );
                    std::process::exit(1);
                }
            }
        }

        Commands::Parse(args) => {
            let wikitext = match args.input {
                Some(path) => read_input(&path)?,
                None => {
                    anyhow::ensure!(
                        !state.raw_wikitext.is_empty(),
                        "No input file given and the client state holds no wikitext"
                    );
                    state.raw_wikitext.clone()
                }
            };

            let client = config.http_client()?;
            let spinner = spinner(cli.quiet, format!("Parsing on {}…", config.domain));
            let rendered = parse_wikitext(&client, &config, &wikitext).await;
            finish(spinner);

            let rendered = rendered.context("Parse failed")?;
            if !cli.quiet && !rendered.modules_loaded.is_empty() {
                eprintln!("Loaded {} style modules", rendered.modules_loaded.len());
            }
            emit(&rendered.html, args.output.as_deref())?;
        }

        Commands::Convert(args) => {
            let html = read_input(&args.input)?;
            let wikitext = html_to_wikitext(&html);
            emit(&wikitext, args.output.as_deref())?;
            if !args.no_save {
                state.raw_wikitext = wikitext;
                state.save(&cli.state).context("Failed to save client state")?;
            }
        }

        Commands::Edit(args) => {
            let original = match args.input {
                Some(path) => read_input(&path)?,
                None => {
                    anyhow::ensure!(
                        !state.raw_wikitext.is_empty(),
                        "No input file given and the client state holds no wikitext"
                    );
                    state.raw_wikitext.clone()
                }
            };

            let request = EditRequest {
                original_wikitext: original,
                selected_text: args.selection,
                instruction: args.instruction,
            };

            let client = config.http_client()?;
            let spinner = spinner(cli.quiet, format!("Editing with {}…", config.model));
            let edited = edit_wikitext(&client, &config, &request).await;
            finish(spinner);

            let edited = edited.context("AI edit failed")?;
            emit(&edited, args.output.as_deref())?;
            if !args.no_save {
                state.raw_wikitext = edited;
                state.save(&cli.state).context("Failed to save client state")?;
            }
        }

        Commands::Generate(args) => {
            let data = ProfileData {
                username: args.username.clone(),
                real_name: args.real_name,
                location: args.location,
                languages: args.languages,
                interests: args.interests,
                about_me: args.about_me,
                occupation: args.occupation,
                join_year: args.join_year,
            };

            let profile = if args.template_only {
                wiki_profile_builder::GeneratedProfile {
                    wikitext: wiki_profile_builder::fallback_markup(&data),
                    source: Source::Template,
                }
            } else {
                let client = config.http_client()?;
                let spinner = spinner(cli.quiet, format!("Generating with {}…", config.model));
                let result = generate_profile(&client, &config, &data).await;
                finish(spinner);
                result.context("Generation failed")?
            };

            if !cli.quiet {
                let label = match profile.source {
                    Source::Ai => "AI",
                    Source::Template => "template",
                };
                eprintln!("Generated via {label}");
            }
            if args.json {
                let rendered = serde_json::to_string_pretty(&profile)
                    .context("Failed to serialise profile")?;
                emit(&rendered, args.output.as_deref())?;
            } else {
                emit(&profile.wikitext, args.output.as_deref())?;
            }
            if !args.no_save {
                state.username = args.username;
                state.domain = config.domain.clone();
                state.raw_wikitext = profile.wikitext;
                state.save(&cli.state).context("Failed to save client state")?;
            }
        }

        Commands::Domains => {
            for (domain, label) in WIKI_DOMAINS {
                println!("{domain:<24} {label}");
            }
        }
    }

    Ok(())
}

/// Read a file argument, with `-` meaning stdin.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Print to stdout or write to a file, always ending with a newline.
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut contents = text.to_string();
            if !contents.ends_with('\n') {
                contents.push('\n');
            }
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(text.as_bytes()).context("stdout")?;
            if !text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }
    Ok(())
}

/// Spinner shown while a network or AI call is in flight.
fn spinner(quiet: bool, message: String) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

fn finish(spinner: Option<ProgressBar>) {
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
}
