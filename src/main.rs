//! Command-line interface for xdoc

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
use xdoc::{NodeKind, XDoc};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xdoc")]
#[command(author, version, about = "Query, format and build XML documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the nodes selected by a path
    Query {
        /// Path to the XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Element or attribute name, or a path query
        #[arg(value_name = "PATH")]
        path: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print a document indented, with an XML declaration
    Pretty {
        /// Path to the XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Build a document from path=value assignments
    Build {
        /// Name of the root element
        #[arg(value_name = "ROOT")]
        root: String,

        /// Assignments such as `item[2]/@id=7` or `title=Hello`
        #[arg(value_name = "PATH=VALUE")]
        assignments: Vec<String>,

        /// Indent the output
        #[arg(short, long)]
        pretty: bool,
    },
}

/// One selected node in JSON output
#[cfg(feature = "cli")]
#[derive(Serialize, Debug)]
struct Match {
    kind: NodeKind,
    name: String,
    value: String,
}

#[cfg(feature = "cli")]
fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query { file, path, json } => cmd_query(file, &path, json),
        Commands::Pretty { file } => cmd_pretty(file),
        Commands::Build {
            root,
            assignments,
            pretty,
        } => cmd_build(&root, &assignments, pretty),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn load_file(path: &PathBuf) -> Result<XDoc, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(XDoc::try_load(&text)?)
}

#[cfg(feature = "cli")]
fn cmd_query(file: PathBuf, path: &str, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_file(&file)?;
    let selected = doc.at(path);
    log::debug!("'{}' selected {} node(s)", path, selected.len());

    if json_output {
        let matches = selected
            .iter()
            .filter_map(|item| {
                let node = item.as_node()?;
                let value = match node.kind() {
                    NodeKind::Element => item.to_string(),
                    _ => item.contents(),
                };
                Some(Match {
                    kind: node.kind(),
                    name: item.name().ok()?,
                    value,
                })
            })
            .collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if selected.is_empty() {
        return Err(format!("no match for '{}'", path).into());
    }
    for item in &selected {
        match item.as_node().map(|node| node.kind()) {
            Some(NodeKind::Element) => println!("{}", item),
            _ => println!("{}", item.contents()),
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_pretty(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_file(&file)?;
    println!("{}", doc.to_pretty_string());
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_build(root: &str, assignments: &[String], pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = XDoc::new(root)?;
    for assignment in assignments {
        let (path, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected PATH=VALUE, got '{}'", assignment))?;
        doc.insert_value_at(path, value)?;
    }

    if pretty {
        println!("{}", doc.to_pretty_string());
    } else {
        println!("{}", doc.to_xml_string(true));
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
