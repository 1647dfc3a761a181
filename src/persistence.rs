//! File I/O for saving and loading move history.
//!
//! An export is written twice:
//! - `<name>.json`: the full [`HistoryExport`], loadable with [`load`]
//! - `<name>.txt`: one line per move, `<sequence> <source> <notation>`,
//!   followed by the whole history as a single replayable sequence

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::CubeError;
use crate::faces::format_sequence;
use crate::ledger::HistoryExport;

/// Path of the text companion written next to a JSON export.
pub fn text_path(path: &Path) -> PathBuf {
    path.with_extension("txt")
}

/// Saves an export to both JSON and text files.
pub fn save(path: &Path, export: &HistoryExport) -> Result<(), CubeError> {
    save_json(path, export)?;
    save_text(&text_path(path), export)?;
    log::info!("saved {} moves to {}", export.total_moves, path.display());
    Ok(())
}

fn save_json(path: &Path, export: &HistoryExport) -> Result<(), CubeError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, export)?;
    writer.flush()?;
    Ok(())
}

/// Saves the history in human-readable text format.
fn save_text(path: &Path, export: &HistoryExport) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{} moves:\n", export.total_moves)?;
    for record in &export.history {
        writeln!(
            file,
            "{:>5} {:<8} {}",
            record.sequence,
            record.source,
            record.as_move()
        )?;
    }
    let moves: Vec<_> = export.history.iter().map(|record| record.as_move()).collect();
    writeln!(file, "\nSequence: {}", format_sequence(&moves))?;
    file.flush()
}

/// Loads an export previously written by [`save`].
pub fn load(path: &Path) -> Result<HistoryExport, CubeError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_cube;
    use crate::faces::parse_sequence;
    use crate::ledger::{Ledger, Source};

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cuber-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_save_and_load_export() {
        let mut ledger = Ledger::default();
        for (i, mv) in parse_sequence("R Uw' f D").unwrap().into_iter().enumerate() {
            let source = if i % 2 == 0 { Source::User } else { Source::Scramble };
            ledger.record_at(mv, source, 1_000 + i as u64);
        }
        let cube = build_cube(4, 1.0, 0.01).unwrap();
        let export = ledger.export(5_000, cube.as_ref());
        let path = scratch("roundtrip");

        save(&path, &export).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, export);

        let text = std::fs::read_to_string(text_path(&path)).unwrap();
        assert!(text.starts_with("4 moves:"));
        assert!(text.contains("    2 scramble Uw'"));
        assert!(text.trim_end().ends_with("Sequence: R Uw' f D"));

        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(text_path(&path)).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(load(&scratch("missing")), Err(CubeError::Io(_))));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = scratch("garbage");
        std::fs::write(&path, "{\"history\": 3}").unwrap();
        assert!(matches!(load(&path), Err(CubeError::Json(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
