use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "printmock", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a preview PNG for a request.
    Preview(PreviewArgs),
    /// Render a request and archive it as an order (source copy + mockup).
    Order(OrderArgs),
    /// Print the resolved layer paths for a model/view as JSON.
    Assets(AssetsArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Render request JSON.
    #[arg(long = "request")]
    request_path: PathBuf,

    /// Root directory of view assets (falls back to $PRINTMOCK_ASSETS_DIR).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Working storage root (falls back to $PRINTMOCK_TMP_DIR, then ./tmp).
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Output PNG path; defaults to a fresh file under the previews dir.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct OrderArgs {
    /// Render request JSON.
    #[arg(long = "request")]
    request_path: PathBuf,

    /// Root directory of view assets (falls back to $PRINTMOCK_ASSETS_DIR).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Working storage root (falls back to $PRINTMOCK_TMP_DIR, then ./tmp).
    #[arg(long)]
    work_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct AssetsArgs {
    /// Root directory of view assets (falls back to $PRINTMOCK_ASSETS_DIR).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Product model identifier.
    #[arg(long, default_value = "MT")]
    model: String,

    /// Product view identifier.
    #[arg(long, default_value = "front")]
    view: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Order(args) => cmd_order(args),
        Command::Assets(args) => cmd_assets(args),
    }
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let assets_root = assets_root(args.assets_root);
    let work = printmock::WorkDirs::prepare(work_root(args.work_dir))?;

    let request = read_request(&args.request_path)?;
    let placement = printmock::resolve_placement(&request)?;
    let image = printmock::render_mockup(
        &assets_root,
        &base_dir(),
        &request.model,
        &request.view,
        &placement,
    )?;

    let out = args
        .out
        .unwrap_or_else(|| work.preview_path(&request.model, &request.view));
    printmock::write_png(&image, &out)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_order(args: OrderArgs) -> anyhow::Result<()> {
    let assets_root = assets_root(args.assets_root);
    let work = printmock::WorkDirs::prepare(work_root(args.work_dir))?;

    let request = read_request(&args.request_path)?;
    let placement = printmock::resolve_placement(&request)?;
    let base = base_dir();
    let image = printmock::render_mockup(
        &assets_root,
        &base,
        &request.model,
        &request.view,
        &placement,
    )?;

    let source = printmock::resolve_source_path(&base, &placement.src);
    let arts = printmock::archive_order(&work, &request.model, &request.view, &source, &image)?;
    println!(
        "{}",
        serde_json::json!({
            "ok": true,
            "order": arts.order_id,
            "mockup": arts.mockup,
            "source": arts.source_copy,
        })
    );
    Ok(())
}

fn cmd_assets(args: AssetsArgs) -> anyhow::Result<()> {
    let assets_root = assets_root(args.assets_root);
    let paths = printmock::resolve_view_assets(&assets_root, &args.model, &args.view)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "dir": paths.dir,
            "background": paths.background,
            "mask": paths.mask,
            "overlay": paths.overlay,
            "mask_s1": paths.mask_s1,
            "mask_s2": paths.mask_s2,
        }))?
    );
    Ok(())
}

fn read_request(path: &PathBuf) -> anyhow::Result<printmock::RenderRequest> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read request '{}'", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse request '{}'", path.display()))
}

fn assets_root(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var_os("PRINTMOCK_ASSETS_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("mock_assets"))
}

fn work_root(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var_os("PRINTMOCK_TMP_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("tmp"))
}

fn base_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
