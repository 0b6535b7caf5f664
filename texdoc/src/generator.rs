//! End-to-end generation: render, compile in the output directory, clean up

use crate::compiler::{cleanup, CompileError, CompileOptions, Compiler};
use crate::config::Settings;
use crate::document::Document;
use crate::error::UsageError;
use crate::renderer::render;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Generation errors
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Drives a [`Compiler`] with the directory layout and cleanup policy from [`Settings`]
#[derive(Debug)]
pub struct Generator<C: Compiler> {
    settings: Settings,
    compiler: C,
}

impl<C: Compiler> Generator<C> {
    pub fn new(settings: Settings, compiler: C) -> Self {
        Self { settings, compiler }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Generate the PDF for `doc`
    ///
    /// # Parameters
    /// * `doc` - The finished document
    /// * `output_name` - File name of the artifact; defaults to the title with
    ///   spaces replaced by underscores, or `document.pdf` without a title
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path of the PDF in the output directory
    /// * `Err(GenerateError)` - Rendering, compilation or file handling failed
    pub fn generate(
        &self,
        doc: &Document,
        output_name: Option<&str>,
    ) -> Result<PathBuf, GenerateError> {
        let markup = render(doc)?;

        let job_name = job_name(doc, output_name);
        let output_dir = &self.settings.directories.output_dir;
        fs::create_dir_all(output_dir)?;

        // Provisioned images and fonts are addressed relative to the output
        // directory, so the engine must run there
        let staging = self.settings.temp_dir();
        let staged_tex = staging.join(format!("{}.tex", job_name));
        if staging != output_dir.as_path() {
            fs::create_dir_all(staging)?;
            fs::write(&staged_tex, &markup)?;
            log::debug!("Staged markup at {}", staged_tex.display());
        }

        let mut options = CompileOptions::from_settings(&self.settings, job_name.clone());
        options.engine = doc.engine();
        options.passes = doc.passes();

        let produced = self.compiler.compile(&markup, output_dir, &options)?;

        let target = output_dir.join(format!("{}.pdf", job_name));
        if produced != target {
            move_file(&produced, &target)?;
        }
        log::info!("Generated {}", target.display());

        let policy = &self.settings.file_management;
        if policy.cleanup {
            let extensions = policy.extensions_to_remove();
            cleanup(output_dir, &job_name, &extensions);
            if staging != output_dir.as_path() {
                cleanup(staging, &job_name, &extensions);
            }
        }

        Ok(target)
    }
}

/// Artifact base name without the `.pdf` extension
fn job_name(doc: &Document, output_name: Option<&str>) -> String {
    if let Some(name) = output_name {
        return Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
    }
    if doc.title().is_empty() {
        "document".to_string()
    } else {
        doc.title().replace([' ', '/', '\\'], "_")
    }
}

/// Rename, falling back to copy and delete across filesystems
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ContentScope, DocumentBuilder};
    use crate::resources::FsProvisioner;
    use std::cell::RefCell;

    /// Writes the markup and a placeholder PDF instead of running an engine
    #[derive(Debug, Default)]
    struct RecordingCompiler {
        calls: RefCell<Vec<CompileOptions>>,
    }

    impl Compiler for RecordingCompiler {
        fn compile(
            &self,
            markup: &str,
            workdir: &Path,
            options: &CompileOptions,
        ) -> Result<PathBuf, CompileError> {
            self.calls.borrow_mut().push(options.clone());
            fs::write(workdir.join(format!("{}.tex", options.job_name)), markup)?;
            fs::write(workdir.join(format!("{}.aux", options.job_name)), "")?;
            let pdf = workdir.join(format!("{}.pdf", options.job_name));
            fs::write(&pdf, b"%PDF-1.5")?;
            Ok(pdf)
        }
    }

    fn settings_in(root: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.directories.output_dir = root.join("out");
        settings.directories.temp_dir = Some(root.join("tmp"));
        settings
    }

    fn document(settings: &Settings, title: &str) -> Document {
        DocumentBuilder::with_settings(
            title,
            "A",
            "",
            settings,
            Box::new(FsProvisioner::from_settings(settings)),
        )
        .add_section("S")
        .add_text("body")
        .end_section()
        .build()
        .unwrap()
    }

    #[test]
    fn test_generate_moves_artifact_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_in(root.path());
        let doc = document(&settings, "Weekly Report");

        let generator = Generator::new(settings.clone(), RecordingCompiler::default());
        let pdf = generator.generate(&doc, None).unwrap();

        assert_eq!(pdf, root.path().join("out/Weekly_Report.pdf"));
        assert!(pdf.is_file());
        assert!(!root.path().join("out/Weekly_Report.tex").exists());
        assert!(!root.path().join("out/Weekly_Report.aux").exists());
        assert!(!root.path().join("tmp/Weekly_Report.tex").exists());

        let calls = generator.compiler.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].passes, 2);
    }

    #[test]
    fn test_keep_tex_and_explicit_name() {
        let root = tempfile::tempdir().unwrap();
        let mut settings = settings_in(root.path());
        settings.file_management.keep_tex = true;
        let doc = document(&settings, "");

        let generator = Generator::new(settings, RecordingCompiler::default());
        let pdf = generator.generate(&doc, Some("final.pdf")).unwrap();

        assert_eq!(pdf.file_name().unwrap(), "final.pdf");
        assert!(root.path().join("out/final.tex").is_file());
        assert!(root.path().join("tmp/final.tex").is_file());
    }

    /// Fails unless the provisioned image is reachable from the working directory
    #[derive(Debug)]
    struct ImageCheckingCompiler;

    impl Compiler for ImageCheckingCompiler {
        fn compile(
            &self,
            markup: &str,
            workdir: &Path,
            options: &CompileOptions,
        ) -> Result<PathBuf, CompileError> {
            if !markup.contains("images/plot.png") || !workdir.join("images/plot.png").is_file() {
                return Err(CompileError::Failed {
                    log: format!("images/plot.png not found from {}", workdir.display()),
                });
            }
            let pdf = workdir.join(format!("{}.pdf", options.job_name));
            fs::write(&pdf, b"%PDF-1.5")?;
            Ok(pdf)
        }
    }

    #[test]
    fn test_compiles_where_resources_were_provisioned() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_in(root.path());
        let image = root.path().join("plot.png");
        fs::write(&image, b"png").unwrap();

        let doc = DocumentBuilder::with_settings(
            "Plots",
            "A",
            "",
            &settings,
            Box::new(FsProvisioner::from_settings(&settings)),
        )
        .add_image(crate::elements::Image::new(&image))
        .unwrap()
        .build()
        .unwrap();

        let generator = Generator::new(settings, ImageCheckingCompiler);
        let pdf = generator.generate(&doc, None).unwrap();
        assert_eq!(pdf, root.path().join("out/Plots.pdf"));
    }

    #[test]
    fn test_default_job_names() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_in(root.path());
        assert_eq!(job_name(&document(&settings, ""), None), "document");
        assert_eq!(job_name(&document(&settings, "A/B test"), None), "A_B_test");
        assert_eq!(job_name(&document(&settings, "x"), Some("out.pdf")), "out");
    }
}
