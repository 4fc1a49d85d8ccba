//! Roadmap command line
//!
//! Every subcommand opens a fresh session over the device state file, does
//! one thing and exits. Output goes to the supplied writer so the commands
//! can be driven from tests.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use roadmap_core::{CardView, HeadlessLayout, Roadmap, RoadmapConfig, SvgOverlay};
use roadmap_layout::StaticPlatform;
use roadmap_model::StepRepository;
use roadmap_store::FileStore;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

/// Default state file when neither `--store` nor `ROADMAP_STORE` is given
pub const DEFAULT_STORE: &str = ".roadmap-state.json";

/// Viewport width assumed by commands that do not lay anything out
const DEFAULT_VIEWPORT: f64 = 1280.0;

type Session = Roadmap<StaticPlatform, Rc<FileStore>>;

/// Argument definitions
#[must_use]
pub fn command() -> Command {
    Command::new("roadmap")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Curriculum roadmap with progress tracking")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("steps")
                .long("steps")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Step list (.json, .yaml or .yml); defaults to the built-in roadmap"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .env("ROADMAP_STORE")
                .default_value(DEFAULT_STORE)
                .value_parser(value_parser!(PathBuf))
                .help("State file holding completion and checklists"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging to stderr"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log as JSON lines"),
        )
        .subcommand(
            Command::new("list")
                .about("List steps with status")
                .arg(Arg::new("query").long("query").short('q').help("Search filter"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("show")
                .about("Show one step in full")
                .arg(step_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("done")
                .about("Toggle completion of a step")
                .arg(step_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Toggle a checklist item")
                .arg(step_arg())
                .arg(
                    Arg::new("item")
                        .required(true)
                        .value_parser(value_parser!(usize))
                        .help("Item number as shown by `show`, starting at 1"),
                ),
        )
        .subcommand(
            Command::new("reset")
                .about("Clear a step's checklist")
                .arg(step_arg()),
        )
        .subcommand(
            Command::new("progress")
                .about("Completed steps over total")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("render")
                .about("Lay the roadmap out headlessly and write the connector overlay as SVG")
                .arg(Arg::new("query").long("query").short('q').help("Search filter"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file; stdout when omitted"),
                )
                .arg(
                    Arg::new("viewport")
                        .long("viewport")
                        .default_value("1280")
                        .value_parser(value_parser!(f64))
                        .help("Viewport width deciding the single-column layout"),
                )
                .arg(
                    Arg::new("width")
                        .long("width")
                        .value_parser(value_parser!(f64))
                        .help("Container width; overrides the configured one"),
                )
                .arg(
                    Arg::new("open")
                        .long("open")
                        .action(ArgAction::Append)
                        .help("Expand this step (repeatable)"),
                )
                .arg(Arg::new("active").long("active").help("Highlight this step"))
                .arg(
                    Arg::new("cards")
                        .long("cards")
                        .action(ArgAction::SetTrue)
                        .help("Draw card outlines and titles"),
                )
                .arg(
                    Arg::new("links")
                        .long("links")
                        .action(ArgAction::SetTrue)
                        .help("Draw card-to-card links"),
                ),
        )
}

fn step_arg() -> Arg {
    Arg::new("id").required(true).help("Step id")
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

/// Install the stderr subscriber
///
/// `RUST_LOG` wins unless `verbose` is set; the default level is `warn`.
pub fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    // a subscriber may already be installed (tests)
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Parse `args` and run
///
/// # Errors
/// Returns error on invalid arguments or a failed command
pub fn run_from<I, T, W>(args: I, out: &mut W) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let matches = command().try_get_matches_from(args)?;
    run(&matches, out)
}

/// Run parsed arguments
///
/// # Errors
/// Returns error if inputs cannot be loaded or the command fails
pub fn run<W: Write>(matches: &ArgMatches, out: &mut W) -> Result<()> {
    let Some((name, args)) = matches.subcommand() else {
        bail!("no command given; see --help");
    };
    // global flags are propagated into the subcommand's matches
    let env = Environment::load(args)?;

    match name {
        "list" => list(&env, args, out),
        "show" => show(&env, args, out),
        "done" => done(&env, args, out),
        "check" => check(&env, args, out),
        "reset" => reset(&env, args, out),
        "progress" => progress(&env, args, out),
        "render" => render(&env, args, out),
        other => bail!("unknown command `{other}`"),
    }
}

/// Inputs shared by every command
struct Environment {
    config: RoadmapConfig,
    repo: StepRepository,
    store: Rc<FileStore>,
}

impl Environment {
    fn load(matches: &ArgMatches) -> Result<Self> {
        let config = match matches.get_one::<PathBuf>("config") {
            Some(path) => RoadmapConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RoadmapConfig::default(),
        };

        let repo = match matches.get_one::<PathBuf>("steps") {
            Some(path) => StepRepository::load(path)
                .with_context(|| format!("loading steps {}", path.display()))?,
            None => StepRepository::builtin(),
        };

        let store_path = matches
            .get_one::<PathBuf>("store")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
        tracing::debug!(store = %store_path.display(), steps = repo.len(), "environment loaded");

        Ok(Self {
            config,
            repo,
            store: Rc::new(FileStore::open(store_path)),
        })
    }

    fn session(&self, viewport: f64) -> Session {
        Roadmap::new(
            self.repo.clone(),
            StaticPlatform::new(viewport),
            Rc::clone(&self.store),
            self.config.clone(),
        )
    }

    fn step_id<'a>(&self, args: &'a ArgMatches) -> Result<&'a str> {
        let id = args
            .get_one::<String>("id")
            .context("missing step id")?
            .as_str();
        if !self.repo.contains(id) {
            bail!("unknown step `{id}`");
        }
        Ok(id)
    }
}

fn list<W: Write>(env: &Environment, args: &ArgMatches, out: &mut W) -> Result<()> {
    let mut roadmap = env.session(DEFAULT_VIEWPORT);
    if let Some(query) = args.get_one::<String>("query") {
        roadmap.set_query(query.as_str());
    }
    let view = roadmap.view();

    if args.get_flag("json") {
        serde_json::to_writer_pretty(&mut *out, &view.cards)?;
        writeln!(out)?;
        return Ok(());
    }

    if view.is_empty() {
        writeln!(out, "no steps match `{}`", view.query.trim())?;
        return Ok(());
    }
    for card in &view.cards {
        let mark = if card.done { "x" } else { " " };
        write!(
            out,
            "{:>2}. [{mark}] {:<22} {} ({})",
            card.index + 1,
            card.id.as_str(),
            card.title,
            card.badge
        )?;
        if let Some(list) = &card.checklist {
            write!(out, "  {}", list.progress_label())?;
        }
        writeln!(out)?;
    }
    writeln!(out, "{}", view.progress.label())?;
    Ok(())
}

fn show<W: Write>(env: &Environment, args: &ArgMatches, out: &mut W) -> Result<()> {
    let id = env.step_id(args)?;
    let mut roadmap = env.session(DEFAULT_VIEWPORT);
    let view = roadmap.view();
    let card = view.card(id).context("step is not visible")?;

    if args.get_flag("json") {
        serde_json::to_writer_pretty(&mut *out, card)?;
        writeln!(out)?;
        return Ok(());
    }
    write_card(card, out)
}

fn write_card<W: Write>(card: &CardView, out: &mut W) -> Result<()> {
    let status = if card.done { " ✓" } else { "" };
    writeln!(out, "{}{status}", card.title)?;
    writeln!(out, "id: {}  •  {}", card.id, card.badge)?;
    writeln!(out)?;
    writeln!(out, "{}", card.description)?;

    if !card.links.is_empty() {
        writeln!(out)?;
        writeln!(out, "Resources:")?;
        for link in &card.links {
            match &link.url {
                Some(url) => writeln!(out, "  - {} <{url}>", link.label)?,
                None => writeln!(out, "  - {} (unavailable)", link.label)?,
            }
        }
    }

    if let Some(list) = &card.checklist {
        writeln!(out)?;
        writeln!(out, "Checklist ({}):", list.progress_label())?;
        for item in &list.items {
            let mark = if item.checked { "x" } else { " " };
            writeln!(out, "  [{mark}] {}. {}", item.index + 1, item.text)?;
        }
    }

    if !card.tags.is_empty() {
        writeln!(out)?;
        let tags: Vec<String> = card.tags.iter().map(|t| format!("#{t}")).collect();
        writeln!(out, "{}", tags.join(" "))?;
    }
    Ok(())
}

fn done<W: Write>(env: &Environment, args: &ArgMatches, out: &mut W) -> Result<()> {
    let id = env.step_id(args)?;
    let mut roadmap = env.session(DEFAULT_VIEWPORT);
    let now_done = roadmap
        .toggle_done(id)
        .with_context(|| format!("unknown step `{id}`"))?;
    let state = if now_done { "done" } else { "not done" };
    writeln!(out, "{id}: {state}")?;
    writeln!(out, "{}", roadmap.progress().label())?;
    Ok(())
}

fn check<W: Write>(env: &Environment, args: &ArgMatches, out: &mut W) -> Result<()> {
    let id = env.step_id(args)?;
    let item = *args.get_one::<usize>("item").context("missing item number")?;
    let mut roadmap = env.session(DEFAULT_VIEWPORT);

    let total = roadmap
        .repository()
        .get(id)
        .map_or(0, |step| step.checklist.len());
    if total == 0 {
        bail!("step `{id}` has no checklist");
    }
    if item == 0 || item > total {
        bail!("item {item} is out of range 1..={total}");
    }

    let checked = roadmap
        .toggle_checklist_item(id, item - 1)
        .with_context(|| format!("cannot toggle item {item} of `{id}`"))?;
    let mark = if checked { "x" } else { " " };
    let label = roadmap
        .checklist(id)
        .map(|list| list.progress_label())
        .unwrap_or_default();
    writeln!(out, "[{mark}] {id} #{item}  ({label})")?;
    Ok(())
}

fn reset<W: Write>(env: &Environment, args: &ArgMatches, out: &mut W) -> Result<()> {
    let id = env.step_id(args)?;
    let mut roadmap = env.session(DEFAULT_VIEWPORT);
    if !roadmap.reset_checklist(id) {
        bail!("unknown step `{id}`");
    }
    writeln!(out, "{id}: checklist cleared")?;
    Ok(())
}

fn progress<W: Write>(env: &Environment, args: &ArgMatches, out: &mut W) -> Result<()> {
    let roadmap = env.session(DEFAULT_VIEWPORT);
    let summary = roadmap.progress();
    if args.get_flag("json") {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Progress {}", summary.label())?;
    }
    Ok(())
}

fn render<W: Write>(env: &Environment, args: &ArgMatches, out: &mut W) -> Result<()> {
    let viewport = args.get_one::<f64>("viewport").copied().unwrap_or(DEFAULT_VIEWPORT);
    let mut metrics = env.config.headless;
    if let Some(width) = args.get_one::<f64>("width") {
        if !(width.is_finite() && *width > 0.0) {
            bail!("--width must be a positive number");
        }
        metrics.container_width = *width;
    }

    let mut roadmap = env.session(viewport);
    if let Some(query) = args.get_one::<String>("query") {
        roadmap.set_query(query.as_str());
    }
    for id in args.get_many::<String>("open").into_iter().flatten() {
        if !env.repo.contains(id) {
            bail!("unknown step `{id}`");
        }
        if !roadmap.is_open(id) {
            roadmap.toggle_open(id);
        }
    }
    if let Some(id) = args.get_one::<String>("active") {
        if !env.repo.contains(id) {
            bail!("unknown step `{id}`");
        }
        roadmap.set_active(id);
    }

    let mut layout = HeadlessLayout::new(metrics);
    layout.attach(&mut roadmap);

    let view = roadmap.view();
    let snapshot = roadmap.snapshot();
    let links = if args.get_flag("links") {
        roadmap.sequence_links()
    } else {
        Vec::new()
    };
    let svg = SvgOverlay::new(&view, &snapshot)
        .with_sequence_links(&links)
        .with_cards(args.get_flag("cards"))
        .to_string();

    match args.get_one::<PathBuf>("out") {
        Some(path) => {
            std::fs::write(path, &svg).with_context(|| format!("writing {}", path.display()))?;
            writeln!(
                out,
                "wrote {} connectors to {}",
                view.connectors.len(),
                path.display()
            )?;
        }
        None => out.write_all(svg.as_bytes())?,
    }
    roadmap.teardown();
    Ok(())
}
