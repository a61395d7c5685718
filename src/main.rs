use clap::{Parser, Subcommand};
use simple_press::generate::{self, BuildOptions};
use simple_press::highlight::{self, HighlightBridge};
use simple_press::render::DocumentRenderer;
use simple_press::{config, output};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that highlight code.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the highlight cache and re-highlight every code block
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "simple-press")]
#[command(about = "Static site generator for articles with build-time syntax highlighting")]
#[command(long_about = "\
Static site generator for articles with build-time syntax highlighting

Markdown files become pages. Fenced code blocks are highlighted once, at
build time, by a syntect engine configured in site.toml.

Content structure:

  content/
  ├── site.toml                         # Site config (optional)
  ├── index.md                          # → index.html
  ├── about.md                          # → about/index.html
  ├── articles/
  │   ├── 2024-03-01-first-post.md      # → articles/first-post/index.html
  │   └── 2024-05-20-unfinished.md      # draft = true: rendered, not listed
  ├── assets/css/main.css               # Copied through (passthrough globs)
  └── .scratch/                         # Hidden: ignored

Front matter (optional, TOML between +++ lines):
  title, date (YYYY-MM-DD), draft, layout, tags, list

Title resolution (first available wins):
  front matter title → first # heading → file name (dashes → spaces)

Run 'simple-press gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Show debug logs (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the site into the output directory
    Build(CacheArgs),
    /// Validate config and content, render without writing
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
    /// List the languages and themes the highlighter can load
    Languages,
    /// Highlight one snippet with the configured engine and print the HTML
    Highlight {
        /// Language of the snippet (name or extension)
        #[arg(long)]
        lang: String,
        /// Theme to use instead of the configured default
        #[arg(long)]
        theme: Option<String>,
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build(cache_args) => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);

            println!(
                "==> Building {} \u{2192} {}",
                cli.source.display(),
                cli.output.display()
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = generate::build(
                &cli.source,
                &cli.output,
                BuildOptions {
                    use_cache: !cache_args.no_cache,
                    events: Some(tx),
                },
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = result?;
            output::print_build_summary(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);

            println!("==> Checking {}", cli.source.display());
            let (manifest, report) = generate::check(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            println!();
            output::print_check_summary(&report);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Languages => {
            let site_config = config::load_config(&cli.source)?;
            let theme_dir = resolve_theme_dir(&cli.source, site_config.highlight.theme_dir.as_deref());
            let catalog = highlight::catalog(theme_dir.as_deref(), &site_config.highlight.langs)?;
            output::print_catalog(&catalog, &site_config.highlight);
        }
        Command::Highlight { lang, theme, file } => {
            let site_config = config::load_config(&cli.source)?;
            let code = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let mut renderer = DocumentRenderer::new(site_config.highlight.unknown_language);
            let bridge = HighlightBridge::initialize(
                site_config.highlight.to_highlight_config(&cli.source),
                &mut renderer,
            )?;
            let markup = match theme {
                Some(theme) => bridge.render_with_theme(&code, &lang, &theme)?,
                None => bridge.render(&code, &lang)?,
            };
            println!("{}", markup);
        }
    }

    Ok(())
}

/// Send diagnostics to stderr so stdout stays clean for command output.
///
/// `RUST_LOG` wins; otherwise `-v` selects debug and the default is warnings.
fn init_tracing(verbose: bool) {
    let default = if verbose { "simple_press=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn resolve_theme_dir(source: &Path, theme_dir: Option<&str>) -> Option<PathBuf> {
    theme_dir.map(|dir| source.join(dir))
}
