use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use itertools::Itertools;
use rendezvous_hash::config::Config;
use rendezvous_hash::report::{sample_keys, KeyStyle, Remap, Spread};
use rendezvous_hash::{logging, Algorithm, Rendezvous};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

fn cli() -> Command {
    let keys = Arg::new("keys")
        .long("keys")
        .value_parser(value_parser!(usize))
        .default_value("10000")
        .help("number of sample keys");
    let uuid_keys = Arg::new("uuid-keys")
        .long("uuid-keys")
        .action(ArgAction::SetTrue)
        .help("use random UUIDs instead of key-0, key-1, ...");

    Command::new("rendezvous")
        .author("Steve Lee <sphen.lee@gmail.com>")
        .about("Pick nodes for keys with rendezvous hashing")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("config file (default: ./rendezvous.{toml,yaml,json} if present)"),
        )
        .arg(
            Arg::new("node")
                .long("node")
                .short('n')
                .global(true)
                .action(ArgAction::Append)
                .help("node name, may be repeated (replaces configured nodes)"),
        )
        .arg(
            Arg::new("algorithm")
                .long("algorithm")
                .short('a')
                .global(true)
                .value_parser(Algorithm::NAMES)
                .help("hash used to score nodes"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("print results as JSON"),
        )
        .subcommand(
            Command::new("get")
                .about("print the node for a key")
                .arg(Arg::new("key").required(true)),
        )
        .subcommand(
            Command::new("top")
                .about("print the best COUNT nodes for a key, best first")
                .arg(
                    Arg::new("count")
                        .required(true)
                        .value_parser(value_parser!(usize)),
                )
                .arg(Arg::new("key").required(true)),
        )
        .subcommand(
            Command::new("spread")
                .about("show how many sample keys each node gets")
                .arg(keys.clone())
                .arg(uuid_keys.clone()),
        )
        .subcommand(
            Command::new("remove")
                .about("show which sample keys move if a node is removed")
                .arg(Arg::new("removed").value_name("NODE").required(true))
                .arg(keys)
                .arg(uuid_keys),
        )
}

/// Config file and env vars, overridden by command line flags
fn load_config(args: &ArgMatches) -> Result<Config> {
    let mut config = Config::load(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    apply_flags(&mut config, args)?;
    Ok(config)
}

fn apply_flags(config: &mut Config, args: &ArgMatches) -> Result<()> {
    let nodes = args.get_many::<String>("node").map(|nodes| nodes.cloned());
    let algorithm = args
        .get_one::<String>("algorithm")
        .map(|name| name.parse::<Algorithm>())
        .transpose()?;

    config.override_with(nodes, algorithm);
    Ok(())
}

fn sample(args: &ArgMatches) -> Vec<String> {
    let count = args.get_one::<usize>("keys").copied().unwrap_or(10000);
    let style = if args.get_flag("uuid-keys") {
        KeyStyle::Uuid
    } else {
        KeyStyle::Sequential
    };

    sample_keys(count, style)
}

fn print<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = cli().get_matches();

    let config = load_config(&args)?;
    logging::setup(&config)?;
    config.validate().context("checking node list")?;

    let unique = config.nodes.iter().unique().count();
    if unique != config.nodes.len() {
        warn!(
            nodes = config.nodes.len(),
            unique, "node list has duplicates, they will be weighted more heavily in top N"
        );
    }

    debug!(algorithm = %config.algorithm, nodes = ?config.nodes, "loaded config");

    let mut rendezvous = Rendezvous::with_scorer(config.algorithm);
    rendezvous.add(config.nodes.iter().cloned());

    let json = args.get_flag("json");

    match args.subcommand() {
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").expect("key is required");
            let node = rendezvous.get(key);
            print(json, &node, || node.cloned().unwrap_or_default())
        }
        Some(("top", sub)) => {
            let count = *sub.get_one::<usize>("count").expect("count is required");
            let key = sub.get_one::<String>("key").expect("key is required");
            let nodes = rendezvous.get_n(count, key);
            print(json, &nodes, || nodes.iter().join("\n"))
        }
        Some(("spread", sub)) => {
            let keys = sample(sub);
            info!(keys = keys.len(), nodes = rendezvous.len(), "measuring spread");

            let spread = Spread::measure(&rendezvous, &keys);
            print(json, &spread, || {
                let rows = spread
                    .counts
                    .iter()
                    .map(|(node, count)| format!("{}\t{}", node, count))
                    .join("\n");
                format!(
                    "{}\nexpected {:.1} per node, max deviation {:.1}%",
                    rows,
                    spread.expected_per_node,
                    spread.max_deviation * 100.0
                )
            })
        }
        Some(("remove", sub)) => {
            let removed = sub
                .get_one::<String>("removed")
                .expect("node is required")
                .clone();
            if !rendezvous.nodes().any(|node| node == &removed) {
                warn!(node = %removed, "node is not in the node list, nothing will move");
            }

            let keys = sample(sub);
            info!(keys = keys.len(), node = %removed, "measuring remap");

            let remap = Remap::measure(&rendezvous, &removed, &keys);
            print(json, &remap, || {
                let rows = remap
                    .destinations
                    .iter()
                    .map(|(node, count)| format!("{}\t+{}", node, count))
                    .join("\n");
                format!(
                    "{} of {} keys moved ({} from {}, {} from other nodes)\n{}",
                    remap.moved,
                    remap.keys,
                    remap.moved_from_removed,
                    remap.removed,
                    remap.moved_from_others,
                    rows
                )
            })
        }
        _ => unreachable!("clap should have already checked the subcommands"),
    }
}
