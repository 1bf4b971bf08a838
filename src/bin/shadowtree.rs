use std::{
    fmt::Write as _,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shadowtree", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Replay a command script through both actors and print the resulting native tree.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input script JSON: `{ "batches": [[command, ...], ...] }`.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Options JSON (defaults when omitted).
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Print the frame mutation records of every batch.
    #[arg(long)]
    dump_records: bool,
}

#[derive(serde::Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct Script {
    batches: Vec<Vec<shadowtree::Command>>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Replay(args) => cmd_replay(args),
    }
}

fn read_script(path: &Path) -> anyhow::Result<Script> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let r = BufReader::new(f);
    let script: Script = serde_json::from_reader(r).with_context(|| "parse script JSON")?;
    Ok(script)
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    let opts = match &args.opts {
        Some(path) => shadowtree::UiManagerOpts::from_path(path)?,
        None => shadowtree::UiManagerOpts::default(),
    };

    let rt = shadowtree::Runtime::start(opts, shadowtree::ComponentRegistry::with_defaults())?;
    for (i, batch) in script.batches.into_iter().enumerate() {
        for cmd in batch {
            rt.dispatch(cmd)?;
        }
        rt.batch_did_complete()?;
        if args.dump_records {
            let records = rt.with_manager(|m| m.last_records().to_vec())?;
            println!("batch {i}: {} records", records.len());
            for r in &records {
                println!("  {}", serde_json::to_string(r)?);
            }
        }
    }
    rt.flush()?;

    let tree = rt.with_views(render_tree)?;
    print!("{tree}");
    rt.shutdown()?;
    Ok(())
}

fn render_tree(views: &mut shadowtree::NativeRegistry) -> String {
    let mut out = String::new();
    let roots: Vec<shadowtree::Tag> = views.roots().collect();
    for root in roots {
        render_node(views, root, 0, &mut out);
    }
    out
}

fn render_node(
    views: &shadowtree::NativeRegistry,
    tag: shadowtree::Tag,
    depth: usize,
    out: &mut String,
) {
    let Some(node) = views.get(tag) else {
        return;
    };
    let f = node.view().frame();
    let _ = writeln!(
        out,
        "{:indent$}{tag} {} [{}, {}, {}x{}]{}",
        "",
        node.view_name(),
        f.x0,
        f.y0,
        f.width(),
        f.height(),
        if node.view().is_hidden() { " hidden" } else { "" },
        indent = depth * 2,
    );
    for &child in node.children() {
        render_node(views, child, depth + 1, out);
    }
}
