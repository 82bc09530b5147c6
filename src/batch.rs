use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::compositor::Watermarker;
use crate::{SUPPORTED_EXTENSIONS, WatermarkError, codec, metadata};

/// One input file on its way to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len() + self.skipped.len()
    }
}

pub fn is_supported(path: &Path) -> bool {
    codec::file_extension(path).is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

pub struct BatchDriver {
    watermarker: Watermarker,
    jpeg_quality: u8,
}

impl BatchDriver {
    pub fn new(watermarker: Watermarker, jpeg_quality: u8) -> Self {
        Self {
            watermarker,
            jpeg_quality,
        }
    }

    /// Watermark every supported file directly inside `input_dir`, writing
    /// results to `output_dir`. Status lines for the operator go to `out`.
    ///
    /// A failing file never stops the batch; only a failure to write to `out`
    /// does.
    pub fn run<W: Write>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        out: &mut W,
    ) -> std::io::Result<BatchReport> {
        let mut report = BatchReport::default();

        let entries = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry in {:?}: {}", input_dir, e);
                    continue;
                }
            };

            let path = entry.path();
            // Follows symlinks, so a link to a directory is skipped too
            if path.is_dir() {
                debug!("Ignoring subdirectory {:?}", path);
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();

            if !is_supported(path) {
                writeln!(out, "Skipping unsupported file: {}", name)?;
                report.skipped.push(path.to_path_buf());
                continue;
            }

            match self.process_file(path, output_dir) {
                Ok(task) => {
                    info!(
                        "Watermarked {:?} ({}x{}) -> {:?}",
                        task.source, task.width, task.height, task.output
                    );
                    writeln!(out, "Processed: {}", name)?;
                    report.processed.push(task.source);
                }
                Err(e) => {
                    error!("Failed to process {:?}: {}", path, e);
                    writeln!(out, "Error: failed to process {}: {}", name, e)?;
                    report.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
        }

        if report.total() == 0 {
            writeln!(out, "Warning: no files in input directory")?;
        }

        Ok(report)
    }

    /// Load, stamp and write a single file. Nothing is written unless every
    /// earlier step succeeded.
    pub fn process_file(&self, source: &Path, output_dir: &Path) -> Result<ImageTask, WatermarkError> {
        let loaded = codec::load(source)?;

        let file_name = source
            .file_name()
            .ok_or_else(|| WatermarkError::UnsupportedFormat(source.display().to_string()))?;
        let task = ImageTask {
            source: source.to_path_buf(),
            output: output_dir.join(file_name),
            width: loaded.width(),
            height: loaded.height(),
        };

        let text = metadata::read_capture_date(source)?.ok_or(WatermarkError::MissingCaptureDate)?;

        let stamped = self.watermarker.apply(&loaded.image, &text);
        codec::save(
            &stamped,
            &task.output,
            self.jpeg_quality,
            loaded.icc_profile.as_deref(),
        )?;

        Ok(task)
    }
}
