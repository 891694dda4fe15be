use std::fs::File;
use std::io::{BufWriter, StdoutLock, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::catalog::registry::FragmentGroupRegistry;
use crate::catalog::store::{FragmentStore, InMemoryFragmentStore};
use crate::cli::group::write_tsv_groups;
use crate::cli::{signature_cell, OutputFormat};
use crate::core::design::LigationDesign;
use crate::core::element::{BarcodeSet, FixedSequence};
use crate::core::fragment::{BarcodedFragment, FragmentLayouts};
use crate::core::layout::ReadLayout;
use crate::matching::batch::{match_batch, ReadPair};
use crate::matching::engine::{MatchingConfig, DEFAULT_MAX_REPEATS};
use crate::matching::extract::SwitchValues;
use crate::parsing::barcodes::barcodes_from_table;
use crate::parsing::fastq::PairedReads;
use crate::parsing::layout::load_layout_file;

#[derive(Args)]
pub struct IdentifyArgs {
    /// Read 1 FASTQ (plain or .gz)
    #[arg(long)]
    pub read1: Option<PathBuf>,

    /// Read 2 FASTQ (plain or .gz)
    #[arg(long)]
    pub read2: Option<PathBuf>,

    /// Layout file (JSON) for read 1
    #[arg(long)]
    pub layout1: Option<PathBuf>,

    /// Layout file (JSON) for read 2
    #[arg(long, conflicts_with = "design")]
    pub layout2: Option<PathBuf>,

    /// Build the read 2 layout from a ligation design preset
    #[arg(long, requires_all = ["y_barcodes", "even_barcodes", "odd_barcodes"])]
    pub design: Option<LigationDesign>,

    /// Y barcode table (barcode_id  barcode_sequence) for --design
    #[arg(long)]
    pub y_barcodes: Option<PathBuf>,

    /// Even barcode table for --design
    #[arg(long)]
    pub even_barcodes: Option<PathBuf>,

    /// Odd barcode table for --design
    #[arg(long)]
    pub odd_barcodes: Option<PathBuf>,

    /// Allowed errors per barcode for --design
    #[arg(long, default_value = "1")]
    pub max_mismatches: u32,

    /// Declared read 2 length for --design
    #[arg(long, default_value = "150")]
    pub read_length: usize,

    /// Longest run of a repeatable element
    #[arg(long, default_value_t = DEFAULT_MAX_REPEATS)]
    pub max_repeats: usize,

    /// Match layouts even if they cannot fit in their declared read length
    #[arg(long)]
    pub no_read_length_check: bool,

    /// Worker threads (0 uses all cores)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Read pairs matched per parallel batch
    #[arg(long, default_value = "10000")]
    pub batch_size: usize,

    /// Omit fragments with no barcodes from the output
    #[arg(long)]
    pub skip_unmatched: bool,

    /// Also write the identified fragments to a JSON fragment store
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Write the final group table (signature, size, members) to this file
    #[arg(long)]
    pub groups: Option<PathBuf>,
}

/// Execute identify subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read or a layout is invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: IdentifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let layouts = load_layouts(&args)?;
    if layouts.is_empty() {
        anyhow::bail!("A read layout is required: use --layout1, --layout2, or --design");
    }

    if verbose {
        for (side, layout) in [("1", &layouts.read1), ("2", &layouts.read2)] {
            if let Some(layout) = layout {
                eprintln!(
                    "Read {side} layout: {} elements, minimum span {} of {} bases",
                    layout.len(),
                    layout.min_span(),
                    layout.read_length()
                );
            }
        }
    }

    let config = MatchingConfig {
        max_repeats: args.max_repeats,
        enforce_read_length: !args.no_read_length_check,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .thread_name(|i| format!("identify-{i}"))
        .build()?;

    let registry = FragmentGroupRegistry::new();
    let mut reads = PairedReads::open(args.read1.as_deref(), args.read2.as_deref())?;
    let mut store = args.store.as_ref().map(|_| InMemoryFragmentStore::new());
    let mut output = ResultWriter::new(format);
    let batch_size = args.batch_size.max(1);

    output.begin()?;
    loop {
        let batch = reads
            .by_ref()
            .take(batch_size)
            .collect::<Result<Vec<ReadPair>, _>>()?;
        if batch.is_empty() {
            break;
        }
        let matched = pool.install(|| match_batch(&batch, &layouts, &config, &registry))?;
        for fragment in matched
            .iter()
            .filter(|f| !args.skip_unmatched || !f.barcodes().is_empty())
        {
            output.write(fragment)?;
            if let Some(store) = store.as_mut() {
                store.put(fragment)?;
            }
        }
    }
    output.finish(registry.len())?;

    info!(
        "Identified {} fragments in {} groups",
        output.written,
        registry.len()
    );

    if let (Some(path), Some(store)) = (&args.store, &store) {
        store
            .save(path)
            .with_context(|| format!("Failed to write fragment store {}", path.display()))?;
    }

    if let Some(path) = &args.groups {
        let mut out = BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create group table {}", path.display()))?,
        );
        write_tsv_groups(&mut out, &registry.groups(), false)?;
        out.flush()?;
    }

    Ok(())
}

fn load_layouts(args: &IdentifyArgs) -> anyhow::Result<FragmentLayouts> {
    let layout = |path: &Option<PathBuf>| -> anyhow::Result<Option<ReadLayout>> {
        path.as_deref()
            .map(|p| {
                load_layout_file(p)
                    .with_context(|| format!("Failed to load layout {}", p.display()))
            })
            .transpose()
    };

    let read1 = layout(&args.layout1)?;
    let read2 = match args.design {
        Some(design) => Some(design_layout(design, args)?),
        None => layout(&args.layout2)?,
    };
    Ok(FragmentLayouts::new(read1, read2))
}

fn design_layout(design: LigationDesign, args: &IdentifyArgs) -> anyhow::Result<ReadLayout> {
    let set = |name: &str, path: &Option<PathBuf>| -> anyhow::Result<BarcodeSet> {
        let path = path
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--{name}-barcodes is required with --design"))?;
        let barcodes = barcodes_from_table(path, args.max_mismatches)
            .with_context(|| format!("Failed to load barcode table {}", path.display()))?;
        Ok(BarcodeSet::new(name, barcodes)?)
    };

    Ok(design.read2_layout(
        set("y", &args.y_barcodes)?,
        set("even", &args.even_barcodes)?,
        set("odd", &args.odd_barcodes)?,
        args.read_length,
    )?)
}

fn switch_cell(switches: &SwitchValues) -> String {
    if switches.is_empty() {
        return ".".to_string();
    }
    switches
        .iter()
        .map(|(switch, options)| {
            let values: Vec<&str> = options.iter().map(FixedSequence::name).collect();
            format!("{}={}", switch.name(), values.join(","))
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn switch_json(switches: &SwitchValues) -> serde_json::Value {
    switches
        .iter()
        .map(|(switch, options)| {
            let values: Vec<&str> = options.iter().map(FixedSequence::name).collect();
            serde_json::json!({ "name": switch.name(), "options": values })
        })
        .collect()
}

/// Writes fragment results to stdout as each batch is matched
struct ResultWriter {
    format: OutputFormat,
    out: BufWriter<StdoutLock<'static>>,
    written: usize,
    with_barcodes: usize,
}

impl ResultWriter {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            out: BufWriter::new(std::io::stdout().lock()),
            written: 0,
            with_barcodes: 0,
        }
    }

    fn begin(&mut self) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => Ok(()),
            OutputFormat::Json => write!(self.out, "["),
            OutputFormat::Tsv => writeln!(self.out, "fragment_id\tsignature\tswitches"),
        }
    }

    fn write(&mut self, fragment: &BarcodedFragment) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Text => {
                if fragment.barcodes().is_empty() {
                    writeln!(self.out, "{}  (no barcodes)", fragment.id())?;
                } else {
                    writeln!(
                        self.out,
                        "{}  {}  [{} barcodes]",
                        fragment.id(),
                        fragment.barcodes(),
                        fragment.num_barcodes()
                    )?;
                    if !fragment.switches().is_empty() {
                        writeln!(self.out, "    switches: {}", switch_cell(fragment.switches()))?;
                    }
                }
            }
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "id": fragment.id(),
                    "signature": fragment.barcodes().encode(),
                    "barcodes": fragment.barcodes().barcodes(),
                    "switches": switch_json(fragment.switches()),
                });
                if self.written > 0 {
                    write!(self.out, ",")?;
                }
                write!(self.out, "\n{}", serde_json::to_string_pretty(&value)?)?;
            }
            OutputFormat::Tsv => writeln!(
                self.out,
                "{}\t{}\t{}",
                fragment.id(),
                signature_cell(fragment.barcodes()),
                switch_cell(fragment.switches())
            )?,
        }

        self.written += 1;
        if !fragment.barcodes().is_empty() {
            self.with_barcodes += 1;
        }
        Ok(())
    }

    fn finish(&mut self, num_groups: usize) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "{} fragments, {} with barcodes, {} groups",
                    self.written, self.with_barcodes, num_groups
                )?;
            }
            OutputFormat::Json => writeln!(self.out, "\n]")?,
            OutputFormat::Tsv => {}
        }
        self.out.flush()
    }
}
