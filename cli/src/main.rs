//! html2notion CLI - HTML and Markdown to Notion pages

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use html2notion::{
    extract_page_id, AssemblerOptions, ClientConfig, ConvertOptions, ConvertResult,
    ConverterRegistry, HtmlOptions, HttpClient, JsonFormat, OutputFormat, PageAssembler,
    ParseOptions, SourceFormat,
};
use html2notion::parser::DEFAULT_MAX_TABLE_ROWS;

#[derive(Parser)]
#[command(name = "html2notion")]
#[command(version)]
#[command(about = "Convert HTML and Markdown to Notion blocks and pages", long_about = None)]
struct Cli {
    /// Input HTML or Markdown file ("-" for stdin)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to all formats (Markdown, text, block JSON)
    Convert {
        /// Input file ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        conversion: ConversionArgs,
    },

    /// Convert a document to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input file ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        conversion: ConversionArgs,
    },

    /// Convert a document to Notion block JSON
    #[command(alias = "json")]
    Blocks {
        /// Input file ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        conversion: ConversionArgs,
    },

    /// Create a Notion page from a document
    Push {
        /// Input file ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Integration token
        #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
        token: String,

        /// Parent page id or URL
        #[arg(short, long, env = "NOTION_PARENT_PAGE")]
        parent: String,

        /// Page title (defaults to the document title or file name)
        #[arg(short, long)]
        title: Option<String>,

        /// Link back to the source document at the top of the page
        #[arg(long, value_name = "URL")]
        source_url: Option<String>,

        /// Skip the source link callout
        #[arg(long)]
        no_source_link: bool,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// API endpoint
        #[arg(long, env = "NOTION_API_BASE", hide = true)]
        api_base: Option<String>,

        #[command(flatten)]
        conversion: ConversionArgs,
    },

    /// Print the page id contained in an id, slug or page URL
    PageId {
        /// Page id, slug or URL
        #[arg(value_name = "ID")]
        input: String,
    },

    /// Show document information
    Info {
        /// Input file ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args, Clone)]
struct ConversionArgs {
    /// Base URL for resolving relative links and images
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Maximum data rows per table block (at most 99)
    #[arg(long, default_value = "99")]
    max_table_rows: usize,

    /// Keep numbering artifacts such as "11、" in list items
    #[arg(long)]
    keep_numbering: bool,
}

impl Default for ConversionArgs {
    fn default() -> Self {
        Self {
            base_url: None,
            max_table_rows: DEFAULT_MAX_TABLE_ROWS,
            keep_numbering: false,
        }
    }
}

impl ConversionArgs {
    fn html_options(&self) -> Result<HtmlOptions, Box<dyn std::error::Error>> {
        let mut options = HtmlOptions::new();
        if let Some(base) = &self.base_url {
            let url = url::Url::parse(base).map_err(|e| format!("Invalid base URL: {}", e))?;
            options = options.with_base_url(url);
        }
        Ok(options)
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_max_table_rows(self.max_table_rows)
            .with_numbering_cleanup(!self.keep_numbering)
    }

    fn convert_options(&self) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
        Ok(ConvertOptions::new()
            .with_html_options(self.html_options()?)
            .with_parse_options(self.parse_options()))
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            conversion,
        }) => cmd_convert(&input, output.as_deref(), &conversion),
        Some(Commands::Markdown {
            input,
            output,
            conversion,
        }) => cmd_markdown(&input, output.as_deref(), &conversion),
        Some(Commands::Blocks {
            input,
            output,
            compact,
            conversion,
        }) => cmd_blocks(&input, output.as_deref(), compact, &conversion),
        Some(Commands::Push {
            input,
            token,
            parent,
            title,
            source_url,
            no_source_link,
            timeout,
            api_base,
            conversion,
        }) => cmd_push(PushArgs {
            input,
            token,
            parent,
            title,
            source_url,
            no_source_link,
            timeout,
            api_base,
            conversion,
        }),
        Some(Commands::PageId { input }) => cmd_page_id(&input),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &ConversionArgs::default())
            } else {
                println!("{}", "Usage: html2notion <FILE> [OUTPUT]".yellow());
                println!("       html2notion --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Read a file, or stdin for "-".
fn read_input(input: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if input == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read(input)?)
    }
}

/// Format of an input, by extension first and content second.
fn input_format(input: &Path, bytes: &[u8]) -> SourceFormat {
    input
        .extension()
        .and_then(|e| e.to_str())
        .and_then(SourceFormat::from_extension)
        .unwrap_or_else(|| html2notion::detect_format(bytes))
}

fn convert_input(
    input: &Path,
    options: &ConvertOptions,
) -> Result<(SourceFormat, ConvertResult), Box<dyn std::error::Error>> {
    let bytes = read_input(input)?;
    let format = input_format(input, &bytes);
    log::debug!("Converting {} as {}", input.display(), format);
    let result =
        ConverterRegistry::with_defaults().convert_bytes(&bytes, format.extension(), options)?;
    Ok((format, result))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    conversion: &ConversionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Converting to Markdown...");
    let bytes = read_input(input)?;
    let ext = input_format(input, &bytes).extension();
    let registry = ConverterRegistry::with_defaults();
    let options = conversion.convert_options()?;
    let result = registry.convert_bytes(&bytes, ext, &options)?;
    fs::write(output_dir.join("page.md"), &result.content)?;
    pb.inc(1);

    pb.set_message("Generating text...");
    let text = registry.convert_bytes(&bytes, ext, &options.with_format(OutputFormat::Text))?;
    fs::write(output_dir.join("page.txt"), &text.content)?;
    pb.inc(1);

    pb.set_message("Generating block JSON...");
    let json = html2notion::blocks_to_json(&result.blocks, JsonFormat::Pretty)?;
    fs::write(output_dir.join("blocks.json"), &json)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} page.md", "├─".dimmed());
    println!("  {} page.txt", "├─".dimmed());
    println!("  {} blocks.json", "└─".dimmed());

    Ok(())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    conversion: &ConversionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, result) = convert_input(input, &conversion.convert_options()?)?;
    write_output(output, &result.content)
}

fn cmd_blocks(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    conversion: &ConversionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, result) = convert_input(input, &conversion.convert_options()?)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = html2notion::blocks_to_json(&result.blocks, format)?;
    write_output(output, &json)
}

struct PushArgs {
    input: PathBuf,
    token: String,
    parent: String,
    title: Option<String>,
    source_url: Option<String>,
    no_source_link: bool,
    timeout: u64,
    api_base: Option<String>,
    conversion: ConversionArgs,
}

fn cmd_push(args: PushArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(&args.input)?;
    let format = input_format(&args.input, &bytes);
    let source = std::str::from_utf8(&bytes)?;

    let mut config =
        ClientConfig::new(args.token).with_timeout(Duration::from_secs(args.timeout.max(1)));
    if let Some(base) = args.api_base {
        config = config.with_base_url(base);
    }
    let client = HttpClient::new(config)?;

    let options = AssemblerOptions::new()
        .with_source_link(!args.no_source_link)
        .with_html_options(args.conversion.html_options()?)
        .with_parse_options(args.conversion.parse_options());
    let assembler = PageAssembler::with_options(client, options);

    let fallback_title = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| s != "-")
        .unwrap_or_else(|| "Untitled".to_string());
    let title = args.title.unwrap_or_default();

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("#>-"),
    );
    let mut report = |progress: html2notion::Progress| {
        pb.set_position(u64::from(progress.percent));
        pb.set_message(progress.message);
    };

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        match format {
            SourceFormat::Html => {
                let title = if title.trim().is_empty() {
                    html2notion::html::convert_html(source, &HtmlOptions::new())
                        .title
                        .unwrap_or(fallback_title)
                } else {
                    title
                };
                assembler
                    .export_html(&title, &args.parent, source, args.source_url.as_deref(), &mut report)
                    .await
            }
            SourceFormat::Markdown => {
                let title = if title.trim().is_empty() {
                    fallback_title
                } else {
                    title
                };
                assembler
                    .export_markdown(
                        &title,
                        &args.parent,
                        source,
                        args.source_url.as_deref(),
                        &mut report,
                    )
                    .await
            }
        }
    });

    match result {
        Ok(page) => {
            pb.finish_with_message("Done!");
            println!("\n{} {}", "Created page".green().bold(), page.id);
            if !page.url.is_empty() {
                println!("  {}", page.url.underline());
            }
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            if let html2notion::Error::PartialUpload {
                page_url,
                blocks_written,
                ..
            } = &e
            {
                eprintln!(
                    "{} page exists with only the first {} blocks: {}",
                    "Warning:".yellow().bold(),
                    blocks_written,
                    page_url
                );
            }
            Err(e.into())
        }
    }
}

fn cmd_page_id(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id = extract_page_id(input).ok_or_else(|| format!("No page id found in '{}'", input))?;
    println!("{}", id);
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let options = ConvertOptions::new().with_stats(true);
    let (format, result) = convert_input(input, &options)?;
    let stats = result.stats.unwrap_or_default();

    if json {
        let value = serde_json::json!({
            "file": input.display().to_string(),
            "format": format.to_string(),
            "title": result.title,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    if let Some(ref title) = result.title {
        println!("{}: {}", "Title".bold(), title);
    }

    println!();
    println!("{}", "Block Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Top-level blocks".bold(), stats.top_level_blocks);
    println!("{}: {}", "Total blocks".bold(), stats.total_blocks);
    println!(
        "{}: {}",
        "Requests needed".bold(),
        stats
            .top_level_blocks
            .div_ceil(html2notion::notion::MAX_BLOCKS_PER_REQUEST as u32)
            .max(1)
    );
    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "List items".bold(), stats.list_item_count);
    println!("{}: {}", "Callouts".bold(), stats.callout_count);
    println!("{}: {}", "Code blocks".bold(), stats.code_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Images".bold(), stats.image_count);
    println!("{}: {}", "Words".bold(), stats.word_count);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "html2notion".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("HTML and Markdown to Notion pages");
    println!();
    println!("License: MIT");
}
