use std::env;
use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

use sprout_core::ingest::SourceSpec;
use sprout_core::model::generation_input::GenerationInput;
use sprout_core::service::GenerationService;

const SAMPLE_TEXT: &str = "\
    the cat sat on the mat. the dog ran far away. \
    the cat chased the dog over the fence! the dog sat on the mat too. \
    did the cat run far away? the mat stayed where it was.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Any file paths on the command line become the training source;
    // otherwise a small built-in corpus is used.
    let paths: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    let spec = if paths.is_empty() {
        SourceSpec::Inline {
            text: SAMPLE_TEXT.to_owned(),
        }
    } else {
        SourceSpec::TextFile { paths }
    };

    // Reject sentences where a verbatim run from the training text
    // covers more than 60% of the tokens.
    let mut input = GenerationInput::default();
    input.set_max_overlap_ratio(0.6)?;

    // The cache keeps the built model across posts for the same source.
    let service = GenerationService::with_cache().with_input(input);

    // Validate the source once, the way bot creation would.
    let corpus = service.ingest(&spec)?;
    println!("corpus: {} bytes", corpus.as_str().len());

    // A seeded random source makes the run reproducible; swap in
    // rand::rng() for fresh posts every run.
    let mut rng = StdRng::seed_from_u64(2026);

    for i in 0..10 {
        match service.generate_post_text_with(&spec, &mut rng)? {
            Some(text) => println!("post {}: {}", i + 1, text),
            None => println!("post {}: *the bot hums gently*", i + 1),
        }
    }

    Ok(())
}
