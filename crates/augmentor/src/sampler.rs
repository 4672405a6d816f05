// Augmentor — draws sources, runs the pipeline, writes the outputs

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codec::{clamp_quality, ImageCodec, DEFAULT_QUALITY};
use crate::error::Result;
use crate::image_folder::ImageFolder;
use crate::pipeline::Pipeline;
use crate::rng::{UniformSource, TIME_SEED};

/// Configuration for the sampling loop.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Directory the outputs are written to.
    pub output_dir: PathBuf,
    /// Output file name prefix; file i is `<prefix><i>.<extension>`.
    pub prefix: String,
    /// Output file extension, which also selects the encoder.
    pub extension: String,
    /// Encoder quality in `[0, 100]`.
    pub quality: u8,
    /// Seed for candidate selection (0 = time-derived).
    pub seed: u64,
    /// Create `output_dir` if it does not exist.
    pub create_output_dir: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            prefix: "output_".to_string(),
            extension: "jpg".to_string(),
            quality: DEFAULT_QUALITY,
            seed: TIME_SEED,
            create_output_dir: true,
        }
    }
}

impl SamplerConfig {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    pub fn quality(mut self, q: u8) -> Self {
        self.quality = clamp_quality(q);
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = s;
        self
    }

    pub fn create_output_dir(mut self, yes: bool) -> Self {
        self.create_output_dir = yes;
        self
    }

    /// Output path for run `index`.
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.{}", self.prefix, index, self.extension))
    }
}

/// Provenance of one sampled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    /// Run index.
    pub index: usize,
    /// Candidate the run was drawn from.
    pub source: PathBuf,
    /// Where the augmented result was written.
    pub output: PathBuf,
}

/// Drives N independent augmentation runs over a candidate list.
pub struct Augmentor<C: ImageCodec> {
    candidates: ImageFolder,
    pipeline: Pipeline,
    codec: C,
    config: SamplerConfig,
    rng: UniformSource,
}

impl<C: ImageCodec> Augmentor<C> {
    pub fn new(candidates: ImageFolder, pipeline: Pipeline, codec: C, config: SamplerConfig) -> Self {
        let rng = UniformSource::new(config.seed);
        Self {
            candidates,
            pipeline,
            codec,
            config,
            rng,
        }
    }

    pub fn candidates(&self) -> &ImageFolder {
        &self.candidates
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Produce `count` augmented outputs.
    ///
    /// Sources are drawn uniformly with replacement. Any load, transform or
    /// save failure aborts the remaining runs.
    pub fn sample(&mut self, count: usize) -> Result<Vec<SampleRecord>> {
        if self.config.create_output_dir && count > 0 {
            std::fs::create_dir_all(&self.config.output_dir)?;
        }

        let last = self.candidates.len() - 1;
        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            let pick = self.rng.next_index(0..=last);
            let source = self.candidates.path_of(pick).to_path_buf();
            let output = self.config.output_path(index);
            self.run_one(&source, &output)?;
            debug!(index, source = %source.display(), output = %output.display(), "sampled");
            records.push(SampleRecord {
                index,
                source,
                output,
            });
        }
        info!(
            count,
            output_dir = %self.config.output_dir.display(),
            "sampling finished"
        );
        Ok(records)
    }

    fn run_one(&mut self, source: &Path, output: &Path) -> Result<()> {
        let image = self.codec.load(source)?;
        let image = self.pipeline.run(image)?;
        self.codec.save(&image, output, self.config.quality)
    }
}

#[cfg(feature = "file-codec")]
impl Augmentor<crate::codec::FileCodec> {
    /// Scan `input_dir` for JPEGs and write outputs into `output_dir`.
    pub fn from_dirs(
        input_dir: impl AsRef<Path>,
        output_dir: impl Into<PathBuf>,
        pipeline: Pipeline,
    ) -> Result<Self> {
        let candidates = ImageFolder::new(input_dir).build()?;
        let config = SamplerConfig::default().output_dir(output_dir);
        Ok(Self::new(
            candidates,
            pipeline,
            crate::codec::FileCodec,
            config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::codec::MemoryCodec;
    use crate::error::Error;

    fn codec_with(names: &[&str]) -> MemoryCodec {
        let codec = MemoryCodec::new();
        for (i, name) in names.iter().enumerate() {
            let img = PixelBuffer::from_fn(4, 4, 3, |_, _, _| i as u8 * 40).unwrap();
            codec.insert(*name, img).unwrap();
        }
        codec
    }

    fn config() -> SamplerConfig {
        SamplerConfig::default()
            .output_dir("mem-out")
            .create_output_dir(false)
            .seed(17)
    }

    #[test]
    fn output_names_follow_index() {
        let cfg = SamplerConfig::default().output_dir("out").prefix("aug_").extension(".png");
        assert_eq!(cfg.output_path(3), PathBuf::from("out").join("aug_3.png"));
        assert_eq!(
            SamplerConfig::default().output_path(0),
            PathBuf::from(".").join("output_0.jpg")
        );
    }

    #[test]
    fn sample_draws_with_replacement() {
        let codec = codec_with(&["a.jpg", "b.jpg"]);
        let folder = ImageFolder::from_paths(["a.jpg", "b.jpg"]).unwrap();
        let mut aug = Augmentor::new(folder, Pipeline::new(), codec, config());
        let records = aug.sample(20).unwrap();
        assert_eq!(records.len(), 20);
        let from_a = records.iter().filter(|r| r.source == Path::new("a.jpg")).count();
        assert!(from_a > 0 && from_a < 20);
    }

    #[test]
    fn missing_source_aborts() {
        let codec = codec_with(&["a.jpg"]);
        let folder = ImageFolder::from_paths(["ghost.jpg"]).unwrap();
        let mut aug = Augmentor::new(folder, Pipeline::new(), codec, config());
        assert!(matches!(aug.sample(3), Err(Error::Decode { .. })));
    }

    #[test]
    fn seeded_selection_reproduces() {
        let run = || {
            let codec = codec_with(&["a.jpg", "b.jpg", "c.jpg"]);
            let folder = ImageFolder::from_paths(["a.jpg", "b.jpg", "c.jpg"]).unwrap();
            let mut aug = Augmentor::new(folder, Pipeline::new(), codec, config());
            aug.sample(10).unwrap()
        };
        assert_eq!(run(), run());
    }
}
