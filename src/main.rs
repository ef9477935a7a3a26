use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use docxfmt::{Preset, format_file};

#[derive(Parser)]
#[command(name = "docxfmt")]
#[command(version)]
#[command(about = "Normalize the layout of Chinese official-style DOCX documents", long_about = None)]
struct Cli {
    /// Input DOCX file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output DOCX file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Style preset
    #[arg(long, value_enum, default_value = "official")]
    preset: PresetName,

    /// Preset JSON file, required with `--preset custom`
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PresetName {
    /// 公文 (GB/T 9704 official document)
    Official,
    /// 学术论文 (academic paper)
    Academic,
    /// 法律文书 (legal document)
    Legal,
    /// Load styles from a JSON file (--config)
    Custom,
}

fn load_preset(cli: &Cli) -> Result<Preset, String> {
    match cli.preset {
        PresetName::Official => Ok(Preset::official()),
        PresetName::Academic => Ok(Preset::academic()),
        PresetName::Legal => Ok(Preset::legal()),
        PresetName::Custom => {
            let Some(path) = &cli.config else {
                return Err("--preset custom requires --config <FILE>".to_string());
            };
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("{}: {}", path.display(), e))?;
            Preset::from_json(&json).map_err(|e| e.to_string())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let preset = match load_preset(&cli) {
        Ok(preset) => preset,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::from(2);
        }
    };

    match format_file(&cli.input, &cli.output, &preset) {
        Ok(summary) => {
            println!("Statistics:");
            print!("{summary}");
            println!("Output: {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
