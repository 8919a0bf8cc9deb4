use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use outline_core::OutlineBuilder;

use crate::outline::{outline_document, to_json};
use crate::prelude::*;

#[derive(Debug, clap::Args, Clone)]
pub struct BatchOptions {
    /// Directory scanned for PDF files
    #[arg(short, long, env = "OUTLINER_INPUT_DIR", default_value = "/app/input")]
    input: PathBuf,

    /// Directory receiving one JSON file per document
    #[arg(short, long, env = "OUTLINER_OUTPUT_DIR", default_value = "/app/output")]
    output: PathBuf,

    /// Documents processed concurrently (defaults to the number of CPUs)
    #[arg(short, long, env = "OUTLINER_JOBS")]
    jobs: Option<usize>,

    /// Stop at the first document that fails. Documents already running
    /// still finish.
    #[arg(long)]
    fail_fast: bool,
}

/// PDF files directly inside `dir`, sorted by name. The extension match
/// ignores case.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputDirMissing(dir.display().to_string()).into());
    }

    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir).wrap_err_with(|| f!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }

    pdfs.sort();
    Ok(pdfs)
}

/// `<output_dir>/<stem>.json`, keeping any dots inside the stem.
pub fn output_path(output_dir: &Path, pdf: &Path) -> Result<PathBuf> {
    let stem = pdf
        .file_stem()
        .ok_or_else(|| eyre!("no file name in {}", pdf.display()))?;
    let mut name = stem.to_os_string();
    name.push(".json");
    Ok(output_dir.join(name))
}

/// Outline one document and write its JSON artifact. Blocking.
pub fn process_document(pdf: &Path, output_dir: &Path, builder: &OutlineBuilder) -> Result<PathBuf> {
    let outline = outline_document(pdf, builder)?;
    let target = output_path(output_dir, pdf)?;
    std::fs::write(&target, to_json(&outline)?)
        .wrap_err_with(|| f!("failed to write {}", target.display()))?;
    Ok(target)
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Run the whole directory. Returns the number of documents written.
pub async fn process_directory(
    options: &BatchOptions,
    builder: &OutlineBuilder,
    progress: &ProgressBar,
) -> Result<usize> {
    let pdfs = discover_pdfs(&options.input)?;
    if pdfs.is_empty() {
        warn!("No PDF files found in {}", options.input.display());
        return Ok(0);
    }

    std::fs::create_dir_all(&options.output)
        .wrap_err_with(|| f!("failed to create {}", options.output.display()))?;

    let total = pdfs.len();
    let jobs = options
        .jobs
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1)
        .max(1);
    progress.set_length(total as u64);
    info!("Processing {total} documents with {jobs} workers");

    // Set on the first failure under --fail-fast. Documents not yet started
    // are skipped; the ones already running finish before we return.
    let stop = Arc::new(AtomicBool::new(false));

    let mut results = stream::iter(pdfs)
        .map(|pdf| {
            let builder = builder.clone();
            let output_dir = options.output.clone();
            let stop = Arc::clone(&stop);
            async move {
                if stop.load(Ordering::SeqCst) {
                    return (pdf, None);
                }
                let result = tokio::task::spawn_blocking({
                    let pdf = pdf.clone();
                    move || process_document(&pdf, &output_dir, &builder)
                })
                .await
                .map_err(|e| eyre!(e))
                .and_then(|r| r);
                (pdf, Some(result))
            }
        })
        .buffer_unordered(jobs);

    let mut failed = 0;
    let mut first_error = None;
    while let Some((pdf, result)) = results.next().await {
        let Some(result) = result else {
            debug!("Skipped {}", pdf.display());
            continue;
        };
        progress.inc(1);
        match result {
            Ok(target) => {
                progress.set_message(f!("{}", target.display()));
                info!("Saved {} -> {}", pdf.display(), target.display());
            }
            Err(err) => {
                error!("{}: {err:#}", pdf.display());
                failed += 1;
                if options.fail_fast && first_error.is_none() {
                    stop.store(true, Ordering::SeqCst);
                    first_error = Some(err.wrap_err(f!("stopped at {}", pdf.display())));
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    if failed > 0 {
        return Err(Error::DocumentsFailed { failed, total }.into());
    }
    Ok(total)
}

pub async fn run(options: BatchOptions, global: crate::Global) -> Result<()> {
    let builder = crate::config::outline_builder(&global)?;
    let progress = progress_bar();

    let result = process_directory(&options, &builder, &progress).await;
    progress.finish_and_clear();

    let written = result?;
    info!("Done: {written} outlines in {}", options.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use lopdf::{dictionary, Object, Stream};

    fn options(input: &Path, output: &Path, fail_fast: bool) -> BatchOptions {
        BatchOptions {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            jobs: Some(2),
            fail_fast,
        }
    }

    /// A one-page PDF with no text.
    fn blank_pdf() -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_discover_pdfs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "A.PDF", "notes.txt", "c.Pdf", "pdf"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let names: Vec<String> = discover_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.PDF", "b.pdf", "c.Pdf"]);
    }

    #[test]
    fn test_discover_pdfs_missing_dir() {
        let err = discover_pdfs(Path::new("/no/such/input")).unwrap_err();
        assert!(err.to_string().contains("/no/such/input"));
    }

    #[test]
    fn test_output_path_keeps_inner_dots() {
        let out = Path::new("/out");
        assert_eq!(
            output_path(out, Path::new("/in/report.v2.PDF")).unwrap(),
            PathBuf::from("/out/report.v2.json")
        );
        assert_eq!(
            output_path(out, Path::new("/in/file.pdf")).unwrap(),
            PathBuf::from("/out/file.json")
        );
    }

    #[tokio::test]
    async fn test_empty_input_directory_writes_nothing() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let target = output.path().join("results");

        let written = process_directory(
            &options(input.path(), &target, false),
            &OutlineBuilder::default(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();
        assert_eq!(written, 0);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_broken_document_is_counted_and_skipped() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("one.pdf"), b"garbage").unwrap();
        std::fs::write(input.path().join("two.pdf"), b"also garbage").unwrap();

        let err = process_directory(
            &options(input.path(), output.path(), false),
            &OutlineBuilder::default(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "2 of 2 documents failed");
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_fail_fast_names_the_document() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("bad.pdf"), b"garbage").unwrap();

        let err = process_directory(
            &options(input.path(), output.path(), true),
            &OutlineBuilder::default(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("stopped at"));
        assert!(err.to_string().contains("bad.pdf"));
    }

    #[tokio::test]
    async fn test_fail_fast_skips_documents_not_yet_started() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("a.pdf"), b"garbage").unwrap();
        std::fs::write(input.path().join("b.pdf"), blank_pdf()).unwrap();

        let serial = |fail_fast| BatchOptions {
            jobs: Some(1),
            ..options(input.path(), output.path(), fail_fast)
        };

        let err = process_directory(&serial(true), &OutlineBuilder::default(), &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("a.pdf"));
        assert!(!output.path().join("b.json").exists());

        let err = process_directory(&serial(false), &OutlineBuilder::default(), &ProgressBar::hidden())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 documents failed");
        assert!(output.path().join("b.json").exists());
    }
}
