use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use rayon::prelude::*;
use tracing::info;

use crate::catalog::registry::FragmentGroupRegistry;
use crate::cli::{signature_cell, OutputFormat};
use crate::core::group::FragmentGroup;
use crate::parsing::tsv::parse_signature_file;

#[derive(Args)]
pub struct GroupArgs {
    /// Signature table (fragment_id<TAB>signature), e.g. identify TSV output
    #[arg(required = true)]
    pub input: PathBuf,

    /// Only report groups with at least this many fragments
    #[arg(long, default_value = "1")]
    pub min_size: usize,

    /// Leave member lists out of the output
    #[arg(long)]
    pub counts_only: bool,
}

/// Execute group subcommand
///
/// # Errors
///
/// Returns an error if the signature table cannot be read or parsed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: GroupArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let rows = parse_signature_file(&args.input)
        .with_context(|| format!("Failed to read signature table {}", args.input.display()))?;

    let registry = FragmentGroupRegistry::new();
    rows.par_iter()
        .filter(|row| !row.signature.is_empty())
        .for_each(|row| {
            registry.assign(&row.signature, &row.fragment_id);
        });

    let unbarcoded = rows.iter().filter(|r| r.signature.is_empty()).count();
    info!(
        "Grouped {} fragments into {} groups ({} without barcodes)",
        rows.len() - unbarcoded,
        registry.len(),
        unbarcoded
    );
    if verbose {
        eprintln!("Read {} rows from {}", rows.len(), args.input.display());
    }

    let groups: Vec<_> = registry
        .groups()
        .into_iter()
        .filter(|g| g.len() >= args.min_size)
        .collect();

    match format {
        OutputFormat::Text => print_text_groups(&groups, unbarcoded, args.counts_only),
        OutputFormat::Json => print_json_groups(&groups, unbarcoded, args.counts_only)?,
        OutputFormat::Tsv => print_tsv_groups(&groups, args.counts_only)?,
    }

    Ok(())
}

fn print_text_groups(
    groups: &[Arc<FragmentGroup>],
    unbarcoded: usize,
    counts_only: bool,
) {
    for group in groups {
        println!("{}  ({} fragments)", group.signature(), group.len());
        if !counts_only {
            for member in group.members() {
                println!("    {member}");
            }
        }
    }
    println!();
    println!(
        "{} groups, {} fragments without barcodes",
        groups.len(),
        unbarcoded
    );
}

fn print_json_groups(
    groups: &[Arc<FragmentGroup>],
    unbarcoded: usize,
    counts_only: bool,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "num_groups": groups.len(),
        "unbarcoded": unbarcoded,
        "groups": groups.iter().map(|g| {
            let mut value = serde_json::json!({
                "signature": g.signature().encode(),
                "num_barcodes": g.signature().num_barcodes(),
                "size": g.len(),
            });
            if !counts_only {
                value["members"] = serde_json::json!(g.members());
            }
            value
        }).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_groups(groups: &[Arc<FragmentGroup>], counts_only: bool) -> anyhow::Result<()> {
    let mut out = BufWriter::new(std::io::stdout().lock());
    write_tsv_groups(&mut out, groups, counts_only)?;
    out.flush()?;
    Ok(())
}

/// Write a group table: signature, size and, unless `counts_only`, members
pub(crate) fn write_tsv_groups(
    out: &mut impl Write,
    groups: &[Arc<FragmentGroup>],
    counts_only: bool,
) -> std::io::Result<()> {
    if counts_only {
        writeln!(out, "signature\tsize")?;
    } else {
        writeln!(out, "signature\tsize\tmembers")?;
    }
    for group in groups {
        if counts_only {
            writeln!(out, "{}\t{}", signature_cell(group.signature()), group.len())?;
        } else {
            writeln!(
                out,
                "{}\t{}\t{}",
                signature_cell(group.signature()),
                group.len(),
                group.members().join(",")
            )?;
        }
    }
    Ok(())
}
