use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::element::Element;
use crate::core::layout::ReadLayout;
use crate::parsing::layout::load_layout_file;

#[derive(Args)]
pub struct LayoutArgs {
    /// Layout file (JSON)
    #[arg(required = true)]
    pub layout: PathBuf,

    /// List every candidate barcode
    #[arg(long)]
    pub barcodes: bool,
}

/// Execute layout subcommand
///
/// # Errors
///
/// Returns an error if the layout file cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: LayoutArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let layout = load_layout_file(&args.layout)
        .with_context(|| format!("Failed to load layout {}", args.layout.display()))?;

    if verbose {
        eprintln!("Loaded {}", args.layout.display());
    }

    match format {
        OutputFormat::Text => print_text_layout(&layout, args.barcodes),
        OutputFormat::Json => print_json_layout(&layout, args.barcodes)?,
        OutputFormat::Tsv => print_tsv_layout(&layout),
    }

    if layout.min_span() > layout.read_length() {
        eprintln!(
            "Warning: layout needs at least {} bases but declares a read length of {}",
            layout.min_span(),
            layout.read_length()
        );
    }

    Ok(())
}

fn print_text_layout(layout: &ReadLayout, list_barcodes: bool) {
    println!("Read length: {}", layout.read_length());
    println!("Minimum span: {}", layout.min_span());
    println!("Elements: {}", layout.len());
    println!();

    for (i, element) in layout.elements().iter().enumerate() {
        println!(
            "  {}. {} '{}'  {} variants, length {}, tolerance {}{}",
            i + 1,
            element.element_name(),
            element.id(),
            element.num_variants(),
            element.length(),
            element.max_edit_distance(),
            element
                .stop_signal()
                .map(|s| format!(", repeats until {}", s.sequence()))
                .unwrap_or_default()
        );
    }

    let barcodes = layout.all_barcodes();
    println!();
    println!("Distinct barcodes: {}", barcodes.len());
    if list_barcodes {
        for barcode in barcodes {
            println!("  {}\t{}", barcode.id(), barcode.sequence());
        }
    }
}

fn element_json(element: &Element) -> serde_json::Value {
    serde_json::json!({
        "kind": element.element_name(),
        "id": element.id(),
        "num_variants": element.num_variants(),
        "length": element.length(),
        "min_match_length": element.min_match_length(),
        "max_edit_distance": element.max_edit_distance(),
        "repeatable": element.is_repeatable(),
        "stop_signal": element.stop_signal().map(|s| s.sequence()),
    })
}

fn print_json_layout(layout: &ReadLayout, list_barcodes: bool) -> anyhow::Result<()> {
    let barcodes = layout.all_barcodes();
    let mut output = serde_json::json!({
        "read_length": layout.read_length(),
        "min_span": layout.min_span(),
        "elements": layout.elements().iter().map(element_json).collect::<Vec<_>>(),
        "num_barcodes": barcodes.len(),
    });
    if list_barcodes {
        output["barcodes"] = barcodes
            .iter()
            .map(|b| serde_json::json!({ "id": b.id(), "sequence": b.sequence() }))
            .collect();
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_layout(layout: &ReadLayout) {
    println!("position\tkind\tid\tvariants\tlength\tmin_match_length\tmax_edit_distance\trepeatable");
    for (i, element) in layout.elements().iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            i + 1,
            element.element_name(),
            element.id(),
            element.num_variants(),
            element.length(),
            element.min_match_length(),
            element.max_edit_distance(),
            element.is_repeatable()
        );
    }
}
