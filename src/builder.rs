//! Incremental compile-and-link orchestration.
//!
//! One pass over the configured source directories: a modified header forces
//! a full rebuild of the source set, otherwise each source file is compiled
//! only when its mtime differs from the one recorded in the build cache. The
//! collected objects are linked into a single executable, and the link itself
//! is skipped when the executable is already newer than every object, so a
//! run with no filesystem changes spawns no subprocess at all.
//!
//! Any failure aborts the session: a directory that cannot be read, a file
//! whose mtime cannot be read, a compiler that exits non-zero. A build tool
//! with a half-updated cache or partial artifacts should stop, not proceed.

use crate::cache::BuildCache;
use crate::config::ChiselConfig;
use crate::fsutil;
use crate::runner;
use crate::ui;
use anyhow::{Context, Result};
use colored::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(windows)]
pub const DEFAULT_CC: &str = "gcc";
#[cfg(not(windows))]
pub const DEFAULT_CC: &str = "cc";

pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";

/// Everything one application build needs to know.
pub struct AppConfig {
    pub src_ext: String,
    pub header_ext: String,
    /// Directory receiving objects, the executable and compile_commands.json.
    pub out_dir: PathBuf,
    /// Path of the linked executable.
    pub out_bin: PathBuf,
    pub src_dirs: Vec<PathBuf>,
    pub cflags: Vec<String>,
    /// Library names, passed to the linker as `-l<name>`.
    pub libs: Vec<String>,
    /// Session-wide override: treat every source file as stale.
    pub rebuild_all: bool,
}

impl AppConfig {
    /// Fill an `AppConfig` from an optional `chisel.toml`: sources under
    /// `src`, artifacts under `build`, executable named after the package.
    pub fn from_config(config: &ChiselConfig) -> Self {
        let build = config.build.as_ref();

        let out_dir = PathBuf::from(
            build
                .and_then(|b| b.out_dir.clone())
                .unwrap_or_else(|| "build".to_string()),
        );
        let src_dirs = build
            .and_then(|b| b.src_dirs.clone())
            .unwrap_or_else(|| vec!["src".to_string()])
            .into_iter()
            .map(PathBuf::from)
            .collect();

        let bin_name = if cfg!(target_os = "windows") {
            format!("{}.exe", config.package.name)
        } else {
            config.package.name.clone()
        };
        let out_bin = out_dir.join(bin_name);

        Self {
            src_ext: "c".to_string(),
            header_ext: "h".to_string(),
            out_dir,
            out_bin,
            src_dirs,
            cflags: build.and_then(|b| b.cflags.clone()).unwrap_or_default(),
            libs: build.and_then(|b| b.libs.clone()).unwrap_or_default(),
            rebuild_all: false,
        }
    }
}

/// Compile one source file into `out_dir` if it is stale or forced, returning
/// the object path and the compile-commands entry either way. The caller only
/// needs the artifact path for linking, not whether a compile actually ran.
fn compile_object(
    compiler: &str,
    cache: &mut BuildCache,
    out_dir: &Path,
    src: &Path,
    cflags: &[String],
    force: bool,
    directory: &str,
) -> Result<(PathBuf, serde_json::Value)> {
    let name = src
        .file_name()
        .with_context(|| format!("Invalid source path '{}'", src.display()))?;
    let obj = out_dir.join(name).with_extension("o");

    let mut argv = vec![
        compiler.to_string(),
        "-c".to_string(),
        src.display().to_string(),
        "-o".to_string(),
        obj.display().to_string(),
    ];
    argv.extend(cflags.iter().cloned());

    let entry = json!({
        "directory": directory,
        "command": argv.join(" "),
        "file": src.display().to_string(),
    });

    if cache.update(src)? || force {
        runner::run(&argv)?;
    }

    Ok((obj, entry))
}

/// Scan, compile and link one application. Terminal on the first error.
pub fn build_app(
    compiler: &str,
    app: &AppConfig,
    cache: &mut BuildCache,
    cache_file: &Path,
) -> Result<()> {
    if !app.out_dir.exists() {
        fs::create_dir_all(&app.out_dir)
            .with_context(|| format!("Failed to create directory '{}'", app.out_dir.display()))?;
    }

    let mut rebuild_all = app.rebuild_all;

    // A modified header invalidates every object, so scan headers before any
    // source is considered. Headers are tracked in the cache only to detect
    // their own future changes; they are never compiled.
    for dir in &app.src_dirs {
        for header in fsutil::visible_files(dir)? {
            if !fsutil::has_ext(&header, &app.header_ext) {
                continue;
            }
            if cache.update(&header)? {
                rebuild_all = true;
            }
        }
    }

    let directory = std::env::current_dir()?.display().to_string();
    let mut objects = Vec::new();
    let mut commands = Vec::new();

    for dir in &app.src_dirs {
        for src in fsutil::visible_files(dir)? {
            if !fsutil::has_ext(&src, &app.src_ext) {
                continue;
            }
            let (obj, entry) = compile_object(
                compiler,
                cache,
                &app.out_dir,
                &src,
                &app.cflags,
                rebuild_all,
                &directory,
            )?;
            objects.push(obj);
            commands.push(entry);
        }
    }

    if objects.is_empty() {
        ui::info("Nothing to build");
        return Ok(());
    }

    // An inconsistent cache is worse than no cache, so a save failure here is
    // fatal even though the compiles themselves succeeded.
    cache.save(cache_file).context("Failed to save build cache")?;
    write_compile_commands(&app.out_dir, &commands)?;

    if !needs_link(&app.out_bin, &objects)? {
        ui::info("Nothing to rebuild");
        return Ok(());
    }

    let inputs: Vec<String> = objects.iter().map(|o| o.display().to_string()).collect();
    let mut link_args = vec!["-o".to_string(), app.out_bin.display().to_string()];
    link_args.extend(app.cflags.iter().cloned());
    link_args.extend(app.libs.iter().map(|lib| format!("-l{}", lib)));
    runner::compile(compiler, &inputs, &link_args)?;

    println!("{} Built '{}'", "✓".green(), app.out_bin.display());
    Ok(())
}

/// Link only when the executable is missing or out of date against the
/// objects. Full-precision timestamps here, not the cache's second
/// granularity: an object produced in the same second as the previous link
/// must still win.
fn needs_link(out_bin: &Path, objects: &[PathBuf]) -> Result<bool> {
    let Ok(bin_meta) = fs::metadata(out_bin) else {
        return Ok(true);
    };
    let bin_time = bin_meta.modified()?;

    for obj in objects {
        // A missing object means the cache and the artifacts disagree; let
        // the linker surface the error.
        let Ok(meta) = fs::metadata(obj) else {
            return Ok(true);
        };
        if meta.modified()? > bin_time {
            return Ok(true);
        }
    }
    Ok(false)
}

fn write_compile_commands(out_dir: &Path, entries: &[serde_json::Value]) -> Result<()> {
    let json_str = serde_json::to_string_pretty(entries)?;
    fs::write(out_dir.join(COMPILE_COMMANDS_FILE), json_str)
        .context("Failed to write compile_commands.json")?;
    Ok(())
}

/// Remove every visible file from the output directory, then the cache file.
/// A missing output directory or cache file is "nothing to clean", not an
/// error.
pub fn clean(out_dir: &Path, cache_file: &Path) -> Result<()> {
    let mut found = false;

    if out_dir.exists() {
        for file in fsutil::visible_files(out_dir)? {
            fs::remove_file(&file)
                .with_context(|| format!("Failed to remove '{}'", file.display()))?;
            found = true;
        }
    }

    BuildCache::delete(cache_file).ok();

    if found {
        println!("{} Cleaned '{}'", "✓".green(), out_dir.display());
    } else {
        ui::info("Nothing to clean");
    }
    Ok(())
}
