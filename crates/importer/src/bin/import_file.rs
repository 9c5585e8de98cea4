use std::{env, fs};

use anyhow::{Context, Result};

use importer::{import, ImportOptions};
use models::{ImportOutcome, RawFile, UniversalMapping};

fn main() -> Result<()> {
    // Usage:
    //   import_file <export.csv|xlsx> [locale] [--generic] [--mapping mapping.json]
    //
    // Prints the import outcome as pretty JSON on stdout; warnings and the
    // skipped-row summary go to stderr.
    let args: Vec<String> = env::args().skip(1).collect();

    let mut path: Option<String> = None;
    let mut locale: Option<String> = None;
    let mut force_generic = false;
    let mut mapping_path: Option<String> = None;

    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        if arg == "--generic" {
            force_generic = true;
        } else if arg == "--mapping" {
            mapping_path = Some(
                it.next()
                    .context("--mapping needs a path to a mapping JSON file")?,
            );
        } else if path.is_none() {
            path = Some(arg);
        } else if locale.is_none() {
            locale = Some(arg);
        } else {
            anyhow::bail!("Unexpected argument: {}", arg);
        }
    }

    let path = path.context(
        "Usage: import_file <export.csv|xlsx> [locale] [--generic] [--mapping mapping.json]",
    )?;

    let bytes = fs::read(&path).with_context(|| format!("Cannot open {}", path))?;
    let name = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path.as_str())
        .to_string();
    let file = RawFile::new(name, mime_for(&path), bytes);

    let outcome = if let Some(mapping_path) = mapping_path {
        let mapping_json = fs::read_to_string(&mapping_path)
            .with_context(|| format!("Cannot open {}", mapping_path))?;
        let mapping: UniversalMapping = serde_json::from_str(&mapping_json)
            .with_context(|| format!("{} is not a valid column mapping", mapping_path))?;

        let text = importer::decode::decode(&file)?;
        ImportOutcome::Parsed(importer::confirmed_import(
            &text,
            &mapping,
            locale.as_deref(),
        )?)
    } else {
        import(
            &file,
            &ImportOptions {
                locale,
                force_generic,
            },
        )?
    };

    match &outcome {
        ImportOutcome::Parsed(result) => {
            eprintln!(
                "{}: {} trades, {} rows skipped",
                result.broker,
                result.trades.len(),
                result.warnings.len()
            );
            for warning in &result.warnings {
                eprintln!("  {}", warning);
            }
        }
        ImportOutcome::RequiresMapping(req) => {
            eprintln!(
                "No broker format matched (confidence {:.2}); adjust the suggested mapping and re-run with --mapping",
                req.confidence
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn mime_for(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "csv" | "tsv" | "txt" => "text/csv",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        _ => "application/octet-stream",
    }
}
