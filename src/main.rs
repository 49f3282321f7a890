use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    version,
    about = "Convert Word documents into editor-ready HTML",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// DOCX file to convert
    input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit only the HTML instead of the {"html", "messages"} JSON object
    #[arg(long)]
    html_only: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Clean HTML pasted from Word (read from stdin)
    Paste {
        /// Treat stdin as plain text rather than HTML
        #[arg(long)]
        plain: bool,
    },
}

fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(Command::Paste { plain }) = cli.command {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        return Ok(if plain {
            docx_html::plain_text_to_html(&input)
        } else {
            docx_html::clean_word_paste(&input)
        });
    }

    let input = cli.input.ok_or("missing input file")?;
    let result = docx_html::convert_docx_file(&input)?;
    for message in &result.messages {
        log::info!("{}: {message}", input.display());
    }

    if cli.html_only {
        Ok(result.html)
    } else if cli.pretty {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(serde_json::to_string(&result)?)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let output = cli.output.clone();

    let rendered = match run(cli) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let written = match output {
        Some(path) => std::fs::write(&path, rendered),
        None => {
            println!("{rendered}");
            Ok(())
        }
    };
    if let Err(e) = written {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
