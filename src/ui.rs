#![forbid(unsafe_code)]

use inquire::{Confirm, InquireError, Text};
use respak::pak;
use std::path::{Path, PathBuf};

fn prompt_err(e: InquireError) -> pak::PakError {
    pak::PakError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

fn ensure_pak_ext(p: &Path) -> PathBuf {
    if p.extension().and_then(|e| e.to_str()).unwrap_or("") == "pak" {
        return p.to_path_buf();
    }
    let mut s = p.to_string_lossy().to_string();
    if !s.ends_with('.') {
        s.push('.');
    }
    s.push_str("pak");
    PathBuf::from(s)
}

/// Packs every file under the chosen root, in file-name order.
pub fn run() -> pak::PakResult<()> {
    println!("respak wizard\n");

    let root = Text::new("Resource root directory")
        .with_default("./resources")
        .prompt()
        .map(PathBuf::from)
        .map_err(prompt_err)?;
    if !root.is_dir() {
        return Err(pak::PakError::MissingInput(root));
    }

    let output_raw = Text::new("Output .pak file")
        .with_default("./media.pak")
        .prompt()
        .map_err(prompt_err)?;
    if output_raw.trim().is_empty() {
        return Err(pak::PakError::Invalid("output path is empty".into()));
    }
    let output = ensure_pak_ext(Path::new(output_raw.trim()));

    let quiet = Confirm::new("Quiet (don't print resource names)?")
        .with_default(false)
        .prompt()
        .map_err(prompt_err)?;

    let inputs = pak::expand_inputs(std::slice::from_ref(&root))?;

    println!("\nPack summary:");
    println!("  root   : {}", root.display());
    println!("  output : {}", output.display());
    println!("  files  : {}", inputs.len());

    let proceed = Confirm::new("Proceed?")
        .with_default(true)
        .prompt()
        .map_err(prompt_err)?;
    if !proceed {
        return Ok(());
    }

    pak::pack(&root, &output, &inputs, quiet)
}
