use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use bible_compression::config::{self, Choices};
use bible_compression::prompt::{Prompt, TerminalPrompt};
use bible_compression::{logging, pipeline, Algorithm, Granularity, OutputKind};


#[derive(Debug, Parser)]
#[command(name = "bible_compression")]
#[command(about = "Compare how well gzip, bzip2, lzma and zlib compress the books, chapters and verses of a bible")]
struct Cli {
    /// Zefania XML bible file.
    #[arg(long, env = "BIBLE_XML")]
    input: Option<PathBuf>,

    /// books, chapters or verses
    #[arg(long)]
    granularity: Option<Granularity>,

    /// print, plot, text or csv
    #[arg(long)]
    output: Option<OutputKind>,

    /// Show only this many best and worst units (0 for all).
    #[arg(long)]
    top_bottom: Option<usize>,

    /// Directory for plots and saved statistics.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Comma separated: gzip, bzip2, lzma, zlib, ftree.
    #[arg(long, value_delimiter = ',')]
    algorithms: Option<Vec<Algorithm>>,

    #[arg(long, default_value = config::DEFAULT_CACHE)]
    cache: PathBuf,

    /// Always recompute statistics.
    #[arg(long)]
    no_cache: bool,

    /// Never prompt; unanswered settings take their defaults.
    #[arg(long)]
    no_prompt: bool,
}

impl Cli {
    fn choices(self) -> Choices {
        Choices {
            input: self.input,
            granularity: self.granularity,
            output: self.output,
            top_bottom: self.top_bottom,
            out_dir: self.out_dir,
            algorithms: self.algorithms,
            cache: Some(self.cache),
            no_cache: self.no_cache,
        }
    }
}


fn main() -> anyhow::Result<()> {

    let cli = Cli::parse();
    logging::init_tracing();

    let interactive = !cli.no_prompt && io::stdin().is_terminal();

    println!("\nWelcome to the Bible Compression Analysis Tool!");
    println!("This tool analyzes how well different compression algorithms perform on various parts of the Bible.");
    println!("Compression ratio is calculated as (compressed size) / (original size).");
    println!("A lower ratio indicates better compression efficiency.\n");

    let candidates = if interactive && cli.input.is_none() {
        config::xml_candidates(Path::new(".")).context("listing XML files in the current directory")?
    } else {
        Vec::new()
    };

    let mut terminal = TerminalPrompt::default();
    let prompt = interactive.then_some(&mut terminal as &mut dyn Prompt);

    let settings = cli.choices().resolve(prompt, &candidates)?;
    tracing::debug!(?settings, "resolved settings");

    let stats = pipeline::load_or_compute(&settings)?;

    let written = pipeline::emit(&settings, &stats, &mut io::stdout().lock())?;

    if let Some(path) = written {
        match settings.output {
            OutputKind::Plot => {
                println!("\nPlot saved as {}", path.display());
                println!("\nNote: The graph shows compression ratios for different algorithms.");
                println!("Each bar represents the ratio of compressed size to original size.");
                println!("Lower bars indicate better compression efficiency.");
            },
            _ => println!("Statistics saved to {}", path.display()),
        }
    }

    println!("\nThank you for using the Bible Compression Analysis Tool.");
    Ok(())
}
