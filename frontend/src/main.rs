use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nichi_machines::registry;
use tracing_subscriber::EnvFilter;

mod config;
mod emulator;
mod error;
mod rom_path;
mod video;

use config::SnapConfig;
use emulator::{LineLevel, MemoryDump};
use error::SnapError;

const DEFAULT_SCALE: u32 = 2;

/// Render one frame of a Nichibutsu video board to a PNG file.
#[derive(Debug, Parser)]
#[command(name = "nichi-snap", version)]
struct Cli {
    /// Board to render (see --list)
    board: Option<String>,

    /// ROM ZIP, rompath directory, or directory of loose ROM files
    rom_path: Option<PathBuf>,

    /// Output PNG file
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Memory dump to replay, e.g. videoram=vram.bin
    /// (regions: videoram, colorram, spriteram, boardram)
    #[arg(long = "dump", value_name = "REGION=FILE")]
    dumps: Vec<MemoryDump>,

    /// Raw control line level, e.g. flip=1 (lines: flip, background)
    #[arg(long = "line", value_name = "LINE=LEVEL")]
    lines: Vec<LineLevel>,

    /// Integer output scale
    #[arg(long)]
    scale: Option<u32>,

    /// Settings file (default: <config dir>/nichi/snap.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List available boards and exit
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("nichi-snap: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SnapError> {
    if cli.list {
        for entry in registry::all() {
            println!("{:<8} {}", entry.name, entry.description);
        }
        return Ok(());
    }

    let config = SnapConfig::resolve(cli.config.as_deref())?;

    let board_name = cli
        .board
        .ok_or_else(|| SnapError::Usage("board name required (see --list)".into()))?;
    let entry = registry::find(&board_name).ok_or_else(|| SnapError::UnknownBoard {
        name: board_name.clone(),
        available: registry::all()
            .iter()
            .map(|e| e.name)
            .collect::<Vec<_>>()
            .join(", "),
    })?;
    let rom_path = cli
        .rom_path
        .or(config.rom_path)
        .ok_or_else(|| SnapError::Usage("ROM path required".into()))?;
    let out = cli
        .out
        .ok_or_else(|| SnapError::Usage("--out is required".into()))?;
    let scale = cli.scale.or(config.scale).unwrap_or(DEFAULT_SCALE);
    if scale == 0 {
        return Err(SnapError::Usage("--scale must be at least 1".into()));
    }

    let rom_set = rom_path::load_rom_set(entry.rom_name, &rom_path)?;
    let mut board = (entry.create)(&rom_set)?;
    tracing::info!(board = entry.name, roms = rom_set.len(), "board created");

    let frame = emulator::snapshot(board.as_mut(), &cli.dumps, &cli.lines)?;
    video::write_png(&out, &frame, scale)?;
    tracing::info!(path = %out.display(), scale, "frame written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_repeated_dumps_and_lines() {
        let cli = Cli::try_parse_from([
            "nichi-snap",
            "gomoku",
            "roms",
            "--out",
            "frame.png",
            "--dump",
            "videoram=v.bin",
            "--dump",
            "boardram=b.bin",
            "--line",
            "background=0",
        ])
        .unwrap();
        assert_eq!(cli.board.as_deref(), Some("gomoku"));
        assert_eq!(cli.dumps.len(), 2);
        assert_eq!(cli.lines.len(), 1);
        assert_eq!(cli.scale, None);
    }

    #[test]
    fn unknown_region_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["nichi-snap", "wiping", "--dump", "palette=p.bin"]).is_err());
    }
}
