//! Content classification for scanned files.
//!
//! All skip policy lives here, in one configuration object, so orphan
//! detection and relationship building downstream never re-derive or
//! second-guess it. Classification precedence:
//!
//! 1. sample pattern → `Sample`
//! 2. any other skip rule → `Skipped`
//! 3. below the per-context size floor → `Extra`
//! 4. otherwise → `Main`

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use seedscan_core::{FileRecord, RootKind};

/// Smallest size a library-root file can have and still count as main
/// content.
pub const LIBRARY_MAIN_SIZE_FLOOR: u64 = 100 * 1024 * 1024;

/// Smallest size a torrent-root file can have and still count as main
/// content. Deliberately more lenient than the library floor: torrent
/// payloads legitimately contain small video files, and the same absolute
/// path may classify differently per context.
pub const TORRENT_MAIN_SIZE_FLOOR: u64 = 10 * 1024 * 1024;

/// Disjoint classification of one scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClass {
    /// Main media content; feeds orphan detection and relationships.
    Main,
    /// Sample clip shipped alongside a release.
    Sample,
    /// Real but sub-floor content (shorts, extras).
    Extra,
    /// Subtitles, metadata, images, trailers, and other ignorable files.
    Skipped,
}

/// Classification policy.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ClassifierConfig {
    /// Case-insensitive substrings of the file name marking a sample.
    #[builder(default = "default_sample_markers()")]
    pub sample_markers: Vec<String>,

    /// Path segments marking a sample directory.
    #[builder(default = "default_sample_segments()")]
    pub sample_segments: Vec<String>,

    /// Extensions (lowercase, no dot) that are never main content.
    #[builder(default = "default_skip_extensions()")]
    pub skip_extensions: Vec<String>,

    /// Case-insensitive substrings of the file name marking skippable
    /// promo material.
    #[builder(default = "default_skip_markers()")]
    pub skip_markers: Vec<String>,

    /// Path segments marking bonus-content directories.
    #[builder(default = "default_skip_segments()")]
    pub skip_segments: Vec<String>,

    /// Extra user-supplied glob patterns to skip.
    #[builder(default)]
    pub skip_globs: Vec<String>,

    /// Size floor for main content under library roots.
    #[builder(default = "LIBRARY_MAIN_SIZE_FLOOR")]
    pub library_size_floor: u64,

    /// Size floor for main content under torrent roots.
    #[builder(default = "TORRENT_MAIN_SIZE_FLOOR")]
    pub torrent_size_floor: u64,
}

fn default_sample_markers() -> Vec<String> {
    vec!["sample".into()]
}

fn default_sample_segments() -> Vec<String> {
    vec!["sample".into(), "samples".into()]
}

fn default_skip_extensions() -> Vec<String> {
    [
        // subtitles
        "srt", "sub", "idx", "ass", "ssa", "vtt",
        // metadata and sidecars
        "nfo", "txt", "srr", "sfv", "md5",
        // artwork
        "jpg", "jpeg", "png", "gif", "bmp", "tbn",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_skip_markers() -> Vec<String> {
    vec!["trailer".into(), "proof".into()]
}

fn default_skip_segments() -> Vec<String> {
    vec![
        "extras".into(),
        "featurettes".into(),
        "behind the scenes".into(),
        "deleted scenes".into(),
    ]
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_markers: default_sample_markers(),
            sample_segments: default_sample_segments(),
            skip_extensions: default_skip_extensions(),
            skip_markers: default_skip_markers(),
            skip_segments: default_skip_segments(),
            skip_globs: Vec::new(),
            library_size_floor: LIBRARY_MAIN_SIZE_FLOOR,
            torrent_size_floor: TORRENT_MAIN_SIZE_FLOOR,
        }
    }
}

impl ClassifierConfig {
    /// Create a new config builder.
    pub fn builder() -> ClassifierConfigBuilder {
        ClassifierConfigBuilder::default()
    }

    /// The main-content size floor for a root category.
    pub fn size_floor(&self, root: RootKind) -> u64 {
        match root {
            RootKind::Torrent => self.torrent_size_floor,
            RootKind::Library => self.library_size_floor,
        }
    }
}

/// Files partitioned into the four classes.
#[derive(Debug, Default)]
pub struct Classified {
    pub main: Vec<FileRecord>,
    pub samples: Vec<FileRecord>,
    pub extras: Vec<FileRecord>,
    pub skipped: Vec<FileRecord>,
}

impl Classified {
    /// Total number of classified files, across all classes.
    pub fn total(&self) -> usize {
        self.main.len() + self.samples.len() + self.extras.len() + self.skipped.len()
    }
}

/// Applies a `ClassifierConfig` to scanned files.
pub struct FileClassifier {
    config: ClassifierConfig,
    globs: GlobSet,
}

impl FileClassifier {
    /// Classifier with the default policy.
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
            globs: GlobSet::empty(),
        }
    }

    /// Classifier with a custom policy. Fails on malformed skip globs.
    pub fn with_config(config: ClassifierConfig) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.skip_globs {
            builder.add(Glob::new(pattern)?);
        }
        let globs = builder.build()?;
        Ok(Self { config, globs })
    }

    /// The policy in effect.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one record in the context of its root category.
    pub fn classify(&self, record: &FileRecord, root: RootKind) -> FileClass {
        let name = record
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let segments: Vec<String> = record
            .path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_lowercase())
            .collect();

        if self.is_sample(&name, &segments) {
            return FileClass::Sample;
        }
        if self.is_skipped(record, &name, &segments) {
            return FileClass::Skipped;
        }
        if record.size < self.config.size_floor(root) {
            return FileClass::Extra;
        }
        FileClass::Main
    }

    /// Partition records into the four disjoint classes.
    pub fn partition(&self, records: &[FileRecord], root: RootKind) -> Classified {
        let classified: Vec<(FileClass, FileRecord)> = records
            .par_iter()
            .map(|record| (self.classify(record, root), record.clone()))
            .collect();

        let mut result = Classified::default();
        for (class, record) in classified {
            match class {
                FileClass::Main => result.main.push(record),
                FileClass::Sample => result.samples.push(record),
                FileClass::Extra => result.extras.push(record),
                FileClass::Skipped => result.skipped.push(record),
            }
        }
        result
    }

    fn is_sample(&self, name: &str, segments: &[String]) -> bool {
        if self.config.sample_markers.iter().any(|m| name.contains(m)) {
            return true;
        }
        segments
            .iter()
            .any(|segment| self.config.sample_segments.iter().any(|s| s == segment))
    }

    fn is_skipped(&self, record: &FileRecord, name: &str, segments: &[String]) -> bool {
        let extension = record
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if self.config.skip_extensions.iter().any(|e| *e == extension) {
            return true;
        }
        if self.config.skip_markers.iter().any(|m| name.contains(m)) {
            return true;
        }
        // The file's own name is not a directory segment.
        let dir_segments = &segments[..segments.len().saturating_sub(1)];
        if dir_segments
            .iter()
            .any(|segment| self.config.skip_segments.iter().any(|s| s == segment))
        {
            return true;
        }
        self.globs.is_match(&record.path)
    }
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new()
    }
}
