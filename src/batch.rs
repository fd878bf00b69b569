//! Batch poster generation with an append-only CSV log.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::compose::{load_template, save_png, MockupComposer};
use crate::config::BatchConfig;
use crate::error::PosterError;
use crate::ports::ImageGenerator;
use crate::prompt::build_prompt;
use crate::requester::request_artwork;

/// One row of the poster log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterLogRow {
    /// Subject term the poster shows.
    pub anatomy: String,
    /// File name of the poster.
    pub filename: String,
    /// Generation date, `YYYY-MM-DD`.
    pub date: String,
    /// Path of the poster file.
    pub path: String,
}

/// File name for a subject's poster on a given day.
#[must_use]
pub fn poster_filename(subject: &str, date: NaiveDate) -> String {
    let clean = subject.to_lowercase().replace(' ', "_");
    format!("popart_{clean}_{}.png", date.format("%Y-%m-%d"))
}

/// Append a row to the CSV log, writing the header only when the file is new.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written.
pub fn append_log(csv_path: &Path, row: &PosterLogRow) -> Result<(), PosterError> {
    let exists = csv_path.is_file();
    let file = OpenOptions::new().create(true).append(true).open(csv_path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(!exists).from_writer(file);
    writer.serialize(row)?;
    writer.flush()?;
    info!("CSV updated for {}", row.anatomy);
    Ok(())
}

/// What a batch run produced.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Posters written, in order.
    pub generated: Vec<PathBuf>,
    /// Subjects that failed, with the error text.
    pub failed: Vec<(String, String)>,
}

/// Settings shared by every subject in a run.
pub struct BatchJob<'a> {
    /// Image model name.
    pub model: &'a str,
    /// Style choice applied to every subject.
    pub style: Option<&'a str>,
    /// Watermark text.
    pub watermark: &'a str,
    /// Composer for the frame template.
    pub composer: &'a MockupComposer,
    /// Output locations.
    pub output: &'a BatchConfig,
    /// Date stamped into file names and log rows.
    pub date: NaiveDate,
}

/// Generate a poster for each subject with one shared generator.
///
/// A failing subject is logged and skipped. A missing template aborts the
/// run before anything is requested.
///
/// # Errors
///
/// Returns an error if the template cannot be loaded or the output
/// directory cannot be created.
pub async fn run_batch(
    generator: &dyn ImageGenerator,
    job: &BatchJob<'_>,
    subjects: &[String],
) -> Result<BatchReport, PosterError> {
    load_template(job.composer.template_path())?;
    std::fs::create_dir_all(&job.output.output_dir)?;

    let mut report = BatchReport::default();
    for subject in subjects {
        match generate_one(generator, job, subject).await {
            Ok(path) => report.generated.push(path),
            Err(e) => {
                error!("{subject}: {e}");
                if e.is_billing_limit() {
                    warn!("image service billing limit reached");
                }
                report.failed.push((subject.clone(), e.to_string()));
            }
        }
    }
    Ok(report)
}

async fn generate_one(
    generator: &dyn ImageGenerator,
    job: &BatchJob<'_>,
    subject: &str,
) -> Result<PathBuf, PosterError> {
    let prompt = build_prompt(subject, job.style);
    let artwork = request_artwork(generator, job.model, &prompt).await?;
    let mockup = job.composer.render(&artwork, job.watermark)?;

    let filename = poster_filename(subject, job.date);
    let path = job.output.output_dir.join(&filename);
    save_png(&mockup, &path)?;
    info!("poster saved: {}", path.display());

    append_log(
        &job.output.csv_path,
        &PosterLogRow {
            anatomy: subject.to_string(),
            filename,
            date: job.date.format("%Y-%m-%d").to_string(),
            path: path.display().to_string(),
        },
    )?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockupConfig;
    use crate::ports::image_generator::{GenerateFuture, GeneratedImage, ImageRequest, ImageResponse};
    use image::{DynamicImage, Rgba, RgbaImage};

    /// Succeeds for every prompt except ones mentioning `fail_on`.
    struct Picky {
        fail_on: &'static str,
    }

    impl ImageGenerator for Picky {
        fn generate(&self, request: &ImageRequest) -> GenerateFuture<'_> {
            let fail = request.prompt.contains(self.fail_on);
            Box::pin(async move {
                if fail {
                    return Err(PosterError::Api {
                        status: 400,
                        code: Some("billing_hard_limit_reached".into()),
                        message: "Billing hard limit has been reached".into(),
                    });
                }
                let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([9, 9, 9, 255])));
                let mut buf = std::io::Cursor::new(Vec::new());
                img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
                Ok(ImageResponse {
                    images: vec![GeneratedImage { data: buf.into_inner(), mime_type: "image/png".into() }],
                })
            })
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn filename_is_snake_cased_and_dated() {
        assert_eq!(poster_filename("Nervous system", day()), "popart_nervous_system_2026-03-14.png");
        assert_eq!(poster_filename("Heart", day()), "popart_heart_2026-03-14.png");
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("log.csv");
        let row = |a: &str| PosterLogRow {
            anatomy: a.into(),
            filename: format!("popart_{a}.png"),
            date: "2026-03-14".into(),
            path: format!("out/popart_{a}.png"),
        };

        append_log(&csv_path, &row("Heart")).unwrap();
        append_log(&csv_path, &row("Lung")).unwrap();

        let content = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "anatomy,filename,date,path");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "Lung,popart_Lung.png,2026-03-14,out/popart_Lung.png");

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let rows: Vec<PosterLogRow> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows[0], row("Heart"));
    }

    #[tokio::test]
    async fn failures_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("frame.png");
        RgbaImage::from_pixel(600, 700, Rgba([200, 200, 200, 255])).save(&template).unwrap();
        let composer = MockupComposer::new(&MockupConfig { template, ..MockupConfig::default() });
        let output = BatchConfig {
            output_dir: dir.path().join("posters"),
            csv_path: dir.path().join("log.csv"),
        };
        let job = BatchJob {
            model: "dall-e-3",
            style: Some("Hokusai"),
            watermark: "",
            composer: &composer,
            output: &output,
            date: day(),
        };
        let subjects = vec!["Heart".to_string(), "Knee".to_string(), "Oral cavity".to_string()];

        let report = run_batch(&Picky { fail_on: "Knee" }, &job, &subjects).await.unwrap();

        assert_eq!(report.generated.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "Knee");
        assert!(output.output_dir.join("popart_oral_cavity_2026-03-14.png").is_file());
        let log = std::fs::read_to_string(&output.csv_path).unwrap();
        assert_eq!(log.lines().count(), 3);
    }

    #[tokio::test]
    async fn missing_template_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let composer = MockupComposer::new(&MockupConfig {
            template: dir.path().join("nope.png"),
            ..MockupConfig::default()
        });
        let output = BatchConfig {
            output_dir: dir.path().join("posters"),
            csv_path: dir.path().join("log.csv"),
        };
        let job = BatchJob {
            model: "dall-e-3",
            style: None,
            watermark: "x",
            composer: &composer,
            output: &output,
            date: day(),
        };

        let err = run_batch(&Picky { fail_on: "Spleen" }, &job, &["Heart".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("template"));
        assert!(!output.csv_path.exists());
    }
}
