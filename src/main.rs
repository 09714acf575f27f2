use anyhow::{Context, Result};
use clap::Parser;
use manylinux_report::cli::{
    Command, CommandsArgs, GlobalArgs, ParseNameArgs, ReportArgs, RootArgs, SearchArgs,
    VersionArgs,
};
use manylinux_report::config::{self, ReportConfig};
use manylinux_report::exit::{exit_code, invalid_args};
use manylinux_report::index::{SharedIndex, VersionsIndex, MIN_QUERY_LEN};
use manylinux_report::name::{parse_image_ref, parse_repo_name};
use manylinux_report::render::{self, OutputFormat, VersionView};
use manylinux_report::report::ImageReport;
use manylinux_report::standards::STANDARDS;
use manylinux_report::version::Version;
use std::io::{self, Write};
use std::path::Path;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

static INDEX: SharedIndex = SharedIndex::new();

fn main() {
    let args = RootArgs::parse();
    init_tracing(args.global.verbose);
    if let Err(err) = run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

struct Session {
    config: ReportConfig,
    format: OutputFormat,
}

fn run(args: RootArgs) -> Result<()> {
    let ctx = load_session(&args.global)?;
    let output = match args.command {
        Command::ParseName(args) => cmd_parse_name(&ctx, &args)?,
        Command::Report(args) => cmd_report(&ctx, &args)?,
        Command::Version(args) => cmd_version(&ctx, &args)?,
        Command::Search(args) => cmd_search(&ctx, &args)?,
        Command::Commands(args) => cmd_commands(&ctx, &args)?,
        Command::Standards => render::render_standards(&STANDARDS, ctx.format)?,
    };
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("write output")?;
    stdout.flush().context("flush output")?;
    Ok(())
}

fn load_session(global: &GlobalArgs) -> Result<Session> {
    let config = config::load(global.config.as_deref())?;
    let format = global.format.unwrap_or_else(|| config.format());
    tracing::debug!(
        data_dir = %config.data_dir().display(),
        format = %format,
        "resolved config"
    );
    Ok(Session { config, format })
}

fn cmd_parse_name(ctx: &Session, args: &ParseNameArgs) -> Result<String> {
    let input = args.name.trim();
    let has_tag = input
        .rsplit_once('/')
        .is_some_and(|(_, last)| last.contains(':'));
    if has_tag {
        let image = parse_image_ref(input)?;
        render::render_repo_name(&image.repo, Some(&image.tag), ctx.format)
    } else {
        let repo = parse_repo_name(input)?;
        render::render_repo_name(&repo, None, ctx.format)
    }
}

fn cmd_report(ctx: &Session, args: &ReportArgs) -> Result<String> {
    let report = load_report(&args.path)?;
    render::render_report(&report, ctx.format)
}

fn cmd_commands(ctx: &Session, args: &CommandsArgs) -> Result<String> {
    let report = load_report(&args.path)?;
    render::render_commands(report.log(), args.failed, ctx.format)
}

fn load_report(path: &Path) -> Result<ImageReport> {
    let bytes = std::fs::read(path).with_context(|| format!("read report {}", path.display()))?;
    ImageReport::from_slice(&bytes).with_context(|| format!("load {}", path.display()))
}

fn cmd_version(ctx: &Session, args: &VersionArgs) -> Result<String> {
    let order = ctx.config.arch_order();
    let path = match (&args.path, &args.id) {
        (Some(path), _) => path.clone(),
        (None, Some(id)) => {
            let image = parse_image_ref(id).with_context(|| format!("parse version id {id}"))?;
            let repo = &image.repo;
            ctx.config.versions_dir().join(Version::filename_for(
                &repo.domain,
                &repo.org,
                &repo.name,
                &image.tag,
            ))
        }
        (None, None) => return Err(invalid_args("version needs a FILE or --id")),
    };
    let version = Version::load(&path, &order)?;
    let view = VersionView {
        version: &version,
        archs: version.archs(&order),
        differences_only: args.differences,
        today: OffsetDateTime::now_utc().date(),
    };
    render::render_version(&view, ctx.format)
}

fn cmd_search(ctx: &Session, args: &SearchArgs) -> Result<String> {
    if args.query.trim().len() < MIN_QUERY_LEN {
        return Err(invalid_args(format!(
            "search query must be at least {MIN_QUERY_LEN} characters"
        )));
    }
    let path = args
        .index
        .clone()
        .unwrap_or_else(|| ctx.config.index_path());
    let index = INDEX.get_or_load(|| VersionsIndex::load(&path))?;
    let refs = index.search(&args.query);
    tracing::debug!(query = %args.query, matches = refs.len(), "searched index");
    render::render_version_refs(&refs, ctx.format)
}
