use data_loader::{Corpus, TextSource};
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/ml-latest-small");

    println!("Loading MovieLens latest-small dataset...\n");

    let start = Instant::now();
    let corpus = Corpus::load_from_dir(data_dir, TextSource::Genres)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let rated = corpus.movies().iter().filter(|m| m.num_ratings > 0).count();
    let linked = corpus.movies().iter().filter(|m| m.tmdb_id.is_some()).count();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Movies: {}", corpus.len());
    println!("Rated movies: {}", rated);
    println!("Movies with TMDB link: {}", linked);
    println!("Genres: {}", corpus.genres().len());
    println!("\nPerformance: {:.0} movies/second",
             corpus.len() as f64 / elapsed.as_secs_f64());
}
