use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{MovieId, TextSource};
use posters::{PosterLookup, PosterSource, TmdbClient, TmdbConfig};
use recommender::{EngineConfig, MovieRecommendation, RecommendationService};
use similarity::MovieQuery;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// movie-recs - content-based movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Movie recommendations from TF-IDF similarity over genres, titles or tags", long_about = None)]
struct Cli {
    /// Directory holding movies.csv, ratings.csv and optionally tags.csv / links.csv
    #[arg(short, long, default_value = "data/sample")]
    data_dir: PathBuf,

    /// Text vectorized per movie: genres, title-genres or tags
    #[arg(long, default_value = "genres")]
    text_source: TextSource,

    /// Skip poster lookups even when TMDB_API_KEY is set
    #[arg(long)]
    no_posters: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Movies most similar to a given movie
    Similar {
        /// Movie title (exact match preferred, else first case-insensitive substring match)
        #[arg(long, required_unless_present = "id", conflicts_with = "id")]
        title: Option<String>,

        /// Movie ID
        #[arg(long)]
        id: Option<MovieId>,

        /// Number of recommendations to return (default 5)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Best-rated movies in a genre
    Top {
        /// Genre (case-insensitive substring of the genre field)
        #[arg(long)]
        genre: String,

        /// Number of movies to return (default 10)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List all genre tags
    Genres,

    /// List all movie titles
    Titles,

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run concurrent similarity queries against the shared engine
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let poster_source = if cli.no_posters {
        None
    } else {
        build_poster_source()?
    };

    let config = EngineConfig {
        text_source: cli.text_source,
        ..EngineConfig::default()
    };

    println!("Loading dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let service = RecommendationService::load(&cli.data_dir, config, poster_source)
        .await
        .context("Failed to build recommendation engine")?;
    println!(
        "{} Built {} similarity index over {} movies in {:?}",
        "✓".green(),
        cli.text_source,
        service.engine().corpus().len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Similar { title, id, limit } => {
            let query = match (id, title) {
                (Some(id), _) => MovieQuery::Id(id),
                (None, Some(title)) => MovieQuery::Title(title),
                (None, None) => unreachable!("clap requires --title or --id"),
            };
            handle_similar(&service, query, limit).await
        }
        Commands::Top { genre, limit } => handle_top(&service, &genre, limit).await,
        Commands::Genres => handle_genres(&service),
        Commands::Titles => handle_titles(&service),
        Commands::Search { title } => handle_search(&service, &title),
        Commands::Benchmark { requests } => handle_benchmark(&service, requests).await?,
    }

    Ok(())
}

/// TMDB client from `TMDB_*` env vars, `None` when no key is configured
fn build_poster_source() -> Result<Option<Arc<dyn PosterSource>>> {
    let tmdb_config = TmdbConfig::from_env().context("Failed to load TMDB config")?;
    match TmdbClient::from_config(&tmdb_config) {
        Some(client) => {
            info!(api_url = %tmdb_config.api_url, "Poster lookups enabled");
            Ok(Some(Arc::new(client)))
        }
        None => {
            info!("TMDB_API_KEY not set, poster lookups disabled");
            Ok(None)
        }
    }
}

/// Handle the 'similar' command
async fn handle_similar(service: &RecommendationService, query: MovieQuery, limit: Option<usize>) {
    let engine = service.engine();
    let Some(movie) = engine.resolve(&query).and_then(|row| engine.corpus().get(row)) else {
        println!("{}", format!("No movie matches {:?}", query).yellow());
        return;
    };

    // Query by id so the printed header and the results agree
    let recommendations = service.similar(&MovieQuery::Id(movie.id), limit).await;
    if recommendations.is_empty() {
        println!("{}", "No recommendations for this movie.".yellow());
        return;
    }

    println!("{}", format!("Movies similar to {}:", movie.title).bold().blue());
    print_recommendations(&recommendations);
}

/// Handle the 'top' command
async fn handle_top(service: &RecommendationService, genre: &str, limit: Option<usize>) {
    let recommendations = service.top_by_genre(genre, limit).await;
    if recommendations.is_empty() {
        println!("{}", format!("No movies in genre '{}'.", genre).yellow());
        return;
    }

    println!(
        "{}",
        format!("Top {} movies in genre '{}':", recommendations.len(), genre)
            .bold()
            .blue()
    );
    print_recommendations(&recommendations);
}

/// Handle the 'genres' command
fn handle_genres(service: &RecommendationService) {
    println!("{}", "Genres:".bold().blue());
    for genre in service.genres() {
        println!("{}{}", "• ".green(), genre);
    }
}

/// Handle the 'titles' command
fn handle_titles(service: &RecommendationService) {
    let titles = service.titles();
    println!("{}", format!("{} titles:", titles.len()).bold().blue());
    for title in titles {
        println!("{}{}", "• ".green(), title);
    }
}

/// Handle the 'search' command
fn handle_search(service: &RecommendationService, title: &str) {
    let matches = service.search(title);
    if matches.is_empty() {
        println!("{}", format!("No titles contain '{}'.", title).yellow());
        return;
    }

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for movie in matches.iter().take(20) {
        println!(
            "{}: {} [{}] avg {:.2} ({} ratings)",
            movie.movie_id,
            movie.title,
            movie.genres.join(", "),
            movie.avg_rating,
            movie.num_ratings
        );
    }
    if matches.len() > 20 {
        println!("... and {} more", matches.len() - 20);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(service: &RecommendationService, requests: usize) -> Result<()> {
    let engine = service.engine().clone();
    let corpus_len = engine.corpus().len();
    let k = service.config().similar_k;

    // Random movie rows to query
    let rows: Vec<usize> = (0..requests)
        .map(|_| rand::random::<u32>() as usize % corpus_len)
        .collect();

    // Queries are CPU-bound reads of the shared matrix
    let wall_start = Instant::now();
    let mut handles = vec![];
    for row in rows {
        let engine = engine.clone();
        let id = engine.corpus().movies()[row].id;
        let handle = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let recs = engine.recommend_similar(&MovieQuery::Id(id), k);
            (start.elapsed(), recs.len())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        let (elapsed, _) = handle.await.context("Benchmark task panicked")?;
        timings.push(elapsed);
    }
    let wall_time = wall_start.elapsed();

    if timings.is_empty() {
        println!("No requests made.");
        return Ok(());
    }

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / wall_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[MovieRecommendation]) {
    for (i, rec) in recommendations.iter().enumerate() {
        let rank = i + 1;
        let score = rec
            .similarity
            .map(|s| format!(" - Similarity: {:.3}", s))
            .unwrap_or_default();
        println!(
            "{}. {} [{}] ⭐ {:.2} ({} ratings){}",
            rank.to_string().green(),
            rec.title.bold(),
            rec.genres.join(", "),
            rec.avg_rating,
            rec.num_ratings,
            score
        );
        match &rec.poster {
            PosterLookup::Found(url) => println!("   Poster: {}", url),
            PosterLookup::NotFound => {}
            PosterLookup::Unavailable(_) => println!("   {}", "Poster unavailable".dimmed()),
        }
    }
}
