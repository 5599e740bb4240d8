pub mod builder;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod parser;
pub mod writer;

use anyhow::{Context, bail};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::cli::Mode;
use crate::config::BuildConfig;
use crate::database::MapDatabase;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let root = match args.root {
        Some(dir) => dir,
        None => find_project_root()?,
    };
    let cfg = BuildConfig::load(&root)?;

    // 1. ── Compile every document into the registry ───────────────────
    let db = compile_all(&root, &cfg, args.keep_going)?;

    // 2. ── Emit ───────────────────────────────────────────────────────
    match args.mode {
        Some(Mode::GenCxx) => {
            let h_path = root.join("gen_mapdata.h");
            let s_path = root.join("gen_mapdata.cpp");
            let mut h = File::create(&h_path)
                .with_context(|| format!("Creating {}", h_path.display()))?;
            let mut s = File::create(&s_path)
                .with_context(|| format!("Creating {}", s_path.display()))?;
            writer::cxx::emit_declarations(&db, &mut h)
                .with_context(|| "Writing C++ declarations")?;
            writer::cxx::emit_definitions(&db, &mut s)
                .with_context(|| "Writing C++ definitions")?;
        }
        Some(Mode::GenLua) => {
            let path = root.join("gen_assets.lua");
            let mut f =
                File::create(&path).with_context(|| format!("Creating {}", path.display()))?;
            writer::lua::emit_assets(&db, &mut f).with_context(|| "Writing Lua assets")?;
        }
        None => {
            let mut source = Vec::new();
            writer::cxx::emit_definitions(&db, &mut source)?;
            println!("Source:\n{}", String::from_utf8_lossy(&source));
        }
    }

    Ok(())
}

/// Parse → build → register every `.tmx` under `root`, one document at a
/// time. Two-phase by design: emission only starts once every document
/// has been processed, so portals may freely name maps that register
/// later.
fn compile_all(root: &Path, cfg: &BuildConfig, keep_going: bool) -> anyhow::Result<MapDatabase> {
    let mut db = MapDatabase::new();
    for path in tmx_files(root)? {
        println!("Processing Map: {}", path.display());
        if let Err(e) = compile_one(&path, cfg, &mut db) {
            if keep_going {
                eprintln!("Skipping {}: {:#}", path.display(), e);
                continue;
            }
            return Err(e);
        }
    }
    Ok(db)
}

/// A failure anywhere in here leaves the database untouched for this
/// document; registration is the last step.
fn compile_one(path: &Path, cfg: &BuildConfig, db: &mut MapDatabase) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading {}", path.display()))?;
    let raw = parser::parse(&text).with_context(|| format!("Parsing {}", path.display()))?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let map = builder::build(&raw, &builder::normalize_name(stem), cfg)
        .with_context(|| format!("Building {}", path.display()))?;
    db.register(map)
        .with_context(|| format!("Registering {}", path.display()))?;
    Ok(())
}

/// Every `*.tmx` directly under `dir`, sorted by path so registration
/// order (and with it the generated artifacts) never depends on
/// file-system enumeration order.
fn tmx_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Listing {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "tmx"))
        .collect();
    files.sort();
    Ok(files)
}

/// Walk up from the current directory until the game's Makefile shows up.
fn find_project_root() -> anyhow::Result<PathBuf> {
    let mut dir = std::env::current_dir().context("Reading current directory")?;
    loop {
        if dir.join("Makefile").is_file() {
            return Ok(dir);
        }
        if !dir.pop() {
            bail!("Could not find game folder (no Makefile above the current directory)");
        }
    }
}
