use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Artifact set to produce; omit to print the C++ definitions to
    /// stdout for inspection.
    #[command(subcommand)]
    pub mode: Option<Mode>,

    /// Project root; when omitted, discovered by walking up from the
    /// current directory to the game's Makefile.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Skip documents that fail to compile instead of aborting the run.
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Write gen_mapdata.h / gen_mapdata.cpp into the project root.
    GenCxx,
    /// Write gen_assets.lua into the project root.
    GenLua,
}
