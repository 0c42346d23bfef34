//! # bplus-index CLI
//!
//! Builds an index from a JSON or CSV table, optionally tops it up from a set of
//! update tables, and reports depth, lookups and tree dumps.
//!
//! ```text
//! bplus-index --data reports.json [--capacity N]
//!             [--update data.json --update symptoms.json --update vax.json]
//!             [--filter VAX_TYPE=COVID19] [--key VAERS_ID]
//!             [--search 902465]... [--tree-out tree.txt] [--levels-out levels.txt]
//!             [--leaves-out leaves.txt]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `bplus_index=info`).

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use bplus_index::ingest::{
    self, collapse_symptoms, filter_eq, join_on, load_records, DedupPolicy, DEFAULT_KEY_FIELD,
};
use bplus_index::{BPlusTree, Error, IndexConfig, Record, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: bplus-index --data FILE [--capacity N] [--update FILE]... \
[--filter FIELD=VALUE] [--key FIELD] [--search ID]... [--tree-out FILE] [--levels-out FILE] \
[--leaves-out FILE]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    capacity: Option<usize>,
    data: PathBuf,
    updates: Vec<PathBuf>,
    filter: Option<(String, String)>,
    key_field: String,
    searches: Vec<i64>,
    tree_out: Option<PathBuf>,
    levels_out: Option<PathBuf>,
    leaves_out: Option<PathBuf>,
}

impl Args {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut parsed = Args {
            key_field: DEFAULT_KEY_FIELD.to_string(),
            ..Args::default()
        };
        let mut data = None;
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| Error::InvalidArgument(format!("{flag} needs a value")))
            };
            match flag.as_str() {
                "--capacity" => {
                    let raw = value()?;
                    let capacity = raw.parse().map_err(|_| {
                        Error::InvalidArgument(format!("--capacity must be a number, got `{raw}`"))
                    })?;
                    parsed.capacity = Some(capacity);
                }
                "--data" => data = Some(PathBuf::from(value()?)),
                "--update" => parsed.updates.push(PathBuf::from(value()?)),
                "--filter" => {
                    let raw = value()?;
                    let (field, expected) = raw.split_once('=').ok_or_else(|| {
                        Error::InvalidArgument(format!("--filter expects FIELD=VALUE, got `{raw}`"))
                    })?;
                    parsed.filter = Some((field.to_string(), expected.to_string()));
                }
                "--key" => parsed.key_field = value()?,
                "--search" => {
                    let raw = value()?;
                    let id = raw.parse().map_err(|_| {
                        Error::InvalidArgument(format!("--search expects an integer, got `{raw}`"))
                    })?;
                    parsed.searches.push(id);
                }
                "--tree-out" => parsed.tree_out = Some(PathBuf::from(value()?)),
                "--levels-out" => parsed.levels_out = Some(PathBuf::from(value()?)),
                "--leaves-out" => parsed.leaves_out = Some(PathBuf::from(value()?)),
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "unknown argument `{other}`\n{USAGE}"
                    )))
                }
            }
        }

        parsed.data =
            data.ok_or_else(|| Error::InvalidArgument(format!("--data is required\n{USAGE}")))?;
        Ok(parsed)
    }

    fn config(&self) -> Result<IndexConfig> {
        match self.capacity {
            Some(capacity) => IndexConfig::new(capacity),
            None => IndexConfig::from_env(),
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bplus_index=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = Args::parse(env::args().skip(1)).and_then(|args| run(&args));
    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.config()?;
    tracing::info!(capacity = config.capacity(), "initializing index");
    let mut tree = BPlusTree::with_config(config);

    let records = load_records(&args.data)?;
    ingest::load_into(&mut tree, records, &args.key_field, DedupPolicy::Always)?;
    println!("Depth: {}", tree.depth()?);

    for id in &args.searches {
        print_search(&tree, *id);
    }

    if !args.updates.is_empty() {
        let tables = args
            .updates
            .iter()
            .map(load_records)
            .collect::<Result<Vec<_>>>()?;
        let mut rows = join_on(&args.key_field, &tables)?;
        if let Some((field, expected)) = &args.filter {
            rows = filter_eq(rows, field, expected);
        }
        let records = collapse_symptoms(rows, &args.key_field)?;
        let report =
            ingest::load_into(&mut tree, records, &args.key_field, DedupPolicy::SkipExisting)?;
        println!("Update: {report}");
        println!("Depth after update: {}", tree.depth()?);
    }

    if let Some(path) = &args.tree_out {
        let mut out = BufWriter::new(File::create(path)?);
        tree.write_tree(&mut out)?;
        out.flush()?;
    }
    if let Some(path) = &args.levels_out {
        let mut out = BufWriter::new(File::create(path)?);
        tree.write_levels(&mut out)?;
        out.flush()?;
    }
    if let Some(path) = &args.leaves_out {
        let mut out = BufWriter::new(File::create(path)?);
        tree.write_leaves(&mut out)?;
        out.flush()?;
    }

    tracing::info!(stats = %tree.stats().snapshot(), "done");
    Ok(())
}

fn print_search(tree: &BPlusTree<i64, Record>, id: i64) {
    match tree.search(&id) {
        Some(bucket) => {
            println!("Values for key {id}:");
            for record in bucket {
                println!("  {record}");
            }
        }
        None => println!("No values for key {id}"),
    }
}
