use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;

use nbcodec::{
  cell_type, cells, is_cell, is_code_cell, is_display_output, is_gif_html,
  is_notebook, is_output, kernel_name, keys, load_gif_html, load_image_data,
  main_bundle_key, metadata, mimes, nbformat_version, output_type, source,
  NbcodecError, IMAGE_MIMES,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Check that a file is a well-formed Jupyter notebook
  Validate {
    /// Path to the .ipynb file
    file: PathBuf,
  },
  /// Print format version, kernel and cell statistics
  Info {
    /// Path to the .ipynb file
    file: PathBuf,
  },
  /// Extract images from display outputs into a directory
  ExtractImages {
    /// Path to the .ipynb file
    file: PathBuf,
    /// Directory the image files are written to
    #[arg(long, default_value = ".")]
    out: PathBuf,
  },
}

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Commands::Validate { file } => validate(&file),
    Commands::Info { file } => info(&file),
    Commands::ExtractImages { file, out } => extract_images(&file, &out),
  }
}

fn read_notebook(file: &Path) -> anyhow::Result<Value> {
  let content = fs::read_to_string(file)
    .with_context(|| format!("Failed to read {}", file.display()))?;
  let doc: Value = serde_json::from_str(&content)
    .with_context(|| format!("{} is not valid JSON", file.display()))?;

  if !is_notebook(&doc) {
    return Err(NbcodecError::NotANotebook)
      .with_context(|| format!("{} was rejected", file.display()));
  }
  Ok(doc)
}

fn outputs(cell: &Value) -> &[Value] {
  cell
    .get(keys::OUTPUTS)
    .and_then(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or_default()
}

fn validate(file: &Path) -> anyhow::Result<()> {
  let doc = read_notebook(file)?;
  let mut problems = 0;

  for (i, cell) in cells(&doc).iter().enumerate() {
    if !is_cell(cell) {
      println!("cell {i}: not a recognized markdown/code/raw cell");
      problems += 1;
      continue;
    }
    if let Err(e) = source(cell) {
      println!("cell {i}: {e}");
      problems += 1;
    }
    if is_code_cell(cell) {
      for (j, output) in outputs(cell).iter().enumerate() {
        if !is_output(output) {
          println!("cell {i}, output {j}: unknown output type");
          problems += 1;
        }
      }
    }
  }

  if problems > 0 {
    bail!("{problems} problem(s) found in {}", file.display());
  }
  println!("{} is a valid notebook", file.display());
  Ok(())
}

fn info(file: &Path) -> anyhow::Result<()> {
  let doc = read_notebook(file)?;

  let (major, minor) = nbformat_version(&doc);
  println!("nbformat: {major}.{minor}");

  let kernelspec = metadata(&doc)
    .get(keys::KERNELSPEC)
    .cloned()
    .unwrap_or(Value::Null);
  let kernel = kernel_name(&kernelspec);
  if !kernel.is_empty() {
    println!("kernel:   {kernel}");
  }

  let mut cell_counts: BTreeMap<String, usize> = BTreeMap::new();
  let mut output_counts: BTreeMap<String, usize> = BTreeMap::new();
  for cell in cells(&doc) {
    *cell_counts.entry(cell_type(cell).to_string()).or_default() += 1;
    for output in outputs(cell) {
      *output_counts
        .entry(output_type(output).to_string())
        .or_default() += 1;
    }
  }

  println!("cells:    {}", cells(&doc).len());
  for (kind, count) in &cell_counts {
    println!("  {kind}: {count}");
  }
  if !output_counts.is_empty() {
    println!("outputs:");
    for (kind, count) in &output_counts {
      println!("  {kind}: {count}");
    }
  }
  Ok(())
}

fn extract_images(file: &Path, out: &Path) -> anyhow::Result<()> {
  let doc = read_notebook(file)?;
  fs::create_dir_all(out)
    .with_context(|| format!("Failed to create {}", out.display()))?;

  let mut written = 0;
  for (i, cell) in cells(&doc).iter().enumerate() {
    for (j, output) in outputs(cell).iter().enumerate() {
      if !is_display_output(output) {
        continue;
      }

      // A decode failure in one output must not abort the walk
      match extract_bundle_image(&output[keys::DATA]) {
        Ok(Some((bytes, extension))) => {
          let path = out.join(format!("cell{i}-output{j}.{extension}"));
          fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
          println!("{}", path.display());
          written += 1;
        }
        Ok(None) => {}
        Err(e) => eprintln!("cell {i}, output {j}: {e}"),
      }
    }
  }

  println!("{written} image(s) extracted");
  Ok(())
}

/// Pick the richest image representation of a display bundle, if any.
fn extract_bundle_image(
  bundle: &Value,
) -> nbcodec::Result<Option<(Vec<u8>, &'static str)>> {
  let Some(key) = main_bundle_key(bundle) else {
    return Ok(None);
  };

  if IMAGE_MIMES.contains(&key.as_str()) {
    let bytes = load_image_data(bundle, &key)?;
    return Ok(Some((bytes, extension_for(&key))));
  }

  // Animated outputs hide a GIF inside a text/html wrapper
  if key == mimes::HTML && is_gif_html(&bundle[mimes::HTML]) {
    let bytes = load_gif_html(&bundle[mimes::HTML])?;
    return Ok(Some((bytes, "gif")));
  }

  Ok(None)
}

fn extension_for(mime: &str) -> &'static str {
  match mime {
    mimes::PNG => "png",
    mimes::GIF => "gif",
    mimes::JPEG => "jpg",
    mimes::BMP => "bmp",
    mimes::SVG => "svg",
    _ => "bin",
  }
}
