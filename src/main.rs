use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabclean::cli;
use tabclean::core::{CleanOptions, DEFAULT_PREVIEW_ROWS};
use tabclean::types::OutputFormat;

#[derive(Parser)]
#[command(name = "tabclean")]
#[command(about = "Preview, clean and convert CSV / Excel files.")]
#[command(long_about = "tabclean - CSV & Excel file cleaner and converter

Upload-style processing for tabular files: preview them, fill missing
numeric values with column means, drop columns, chart numeric columns and
export the result back to CSV or Excel.

COMMANDS:
  preview  - Show the first rows of each file
  columns  - List column names, types and missing counts
  clean    - Fill / drop / chart and write <name>_cleaned.<ext>
  chart    - Bar chart of the first two numeric columns

EXAMPLES:
  tabclean preview sales.csv stock.xlsx
  tabclean clean sales.csv --fill-missing --drop notes,id --format excel
  tabclean chart sales.csv --svg sales.svg

Set RUST_LOG=tabclean=debug for step-by-step logs on stderr.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the first rows of each file
    Preview {
        /// CSV or Excel (.xlsx) files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_PREVIEW_ROWS, env = "TABCLEAN_PREVIEW_ROWS")]
        rows: usize,
    },

    /// List column names, types and missing counts
    Columns {
        /// CSV or Excel (.xlsx) files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    #[command(long_about = "Clean files and write the converted output.

Steps run in a fixed order, each only when requested:
  1. --fill-missing  numeric gaps → column mean
  2. --drop a,b      remove columns (every name must exist)
  3. --chart         terminal bar chart of the first two numeric columns
  4. --format        write <name>_cleaned.csv or <name>_cleaned.xlsx

Every file is processed independently; a failing file is reported and the
rest still run. The exit status is non-zero if any file failed.

EXAMPLES:
  tabclean clean data.csv --fill-missing --format csv
  tabclean clean a.csv b.xlsx --drop comments --format excel -o out/")]
    /// Fill missing values, drop columns and convert files
    Clean {
        /// CSV or Excel (.xlsx) files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Fill missing numeric values with the column mean
        #[arg(long)]
        fill_missing: bool,

        /// Columns to drop (comma-separated or repeated)
        #[arg(short, long, value_delimiter = ',')]
        drop: Vec<String>,

        /// Show a bar chart of numeric columns
        #[arg(long)]
        chart: bool,

        /// Output format to write
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Directory for converted files
        #[arg(short, long, default_value = ".", env = "TABCLEAN_OUT_DIR")]
        out_dir: PathBuf,

        /// Rows shown in each preview
        #[arg(short = 'n', long, default_value_t = DEFAULT_PREVIEW_ROWS, env = "TABCLEAN_PREVIEW_ROWS")]
        rows: usize,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Bar chart of the first two numeric columns
    Chart {
        /// CSV or Excel (.xlsx) file
        file: PathBuf,

        /// Write the chart as SVG instead of printing it
        #[arg(long)]
        svg: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabclean=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preview { files, rows } => cli::preview(files, rows)?,

        Commands::Columns { files } => cli::columns(files)?,

        Commands::Clean {
            files,
            fill_missing,
            drop,
            chart,
            format,
            out_dir,
            rows,
            verbose,
        } => {
            let options = CleanOptions {
                fill_missing,
                drop_columns: drop,
                chart,
                format,
                preview_rows: rows,
            };
            cli::clean(files, options, out_dir, verbose)?
        }

        Commands::Chart { file, svg } => cli::chart(file, svg)?,
    }

    Ok(())
}
