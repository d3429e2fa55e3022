//! Tests for the recommendation service, with a scripted poster source.

use async_trait::async_trait;
use data_loader::{Corpus, MovieRow, RatingRow, TextSource};
use posters::{PosterLookup, PosterSource};
use recommender::{EngineConfig, RecommendationService};
use similarity::MovieQuery;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Test Fixtures
// ============================================================================

fn sample_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/sample")
}

/// Poster source with fixed answers per TMDB id, counting calls
#[derive(Default)]
struct ScriptedPosters {
    calls: AtomicUsize,
}

#[async_trait]
impl PosterSource for ScriptedPosters {
    async fn poster_url(&self, tmdb_id: u32) -> PosterLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match tmdb_id {
            // Toy Story
            862 => PosterLookup::Found("http://img.local/toy-story.jpg".to_string()),
            // Balto
            21032 => PosterLookup::Unavailable("connection reset".to_string()),
            _ => PosterLookup::NotFound,
        }
    }
}

fn small_corpus() -> Corpus {
    let movies = vec![
        MovieRow {
            movie_id: 1,
            title: "Toy Story (1995)".to_string(),
            genres: "Animation|Comedy".to_string(),
        },
        MovieRow {
            movie_id: 2,
            title: "Jumanji (1995)".to_string(),
            genres: "Adventure|Comedy".to_string(),
        },
        MovieRow {
            movie_id: 3,
            title: "Heat (1995)".to_string(),
            genres: "Action|Crime".to_string(),
        },
    ];
    let ratings = vec![RatingRow {
        user_id: 1,
        movie_id: 3,
        rating: 4.0,
    }];
    Corpus::build(movies, &ratings, None, None, TextSource::Genres).unwrap()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_load_sample_dataset() -> anyhow::Result<()> {
    let service = RecommendationService::load(sample_dir(), EngineConfig::default(), None).await?;

    assert_eq!(service.engine().corpus().len(), 22);
    assert!(!service.posters_enabled());
    assert!(service.genres().contains(&"Comedy".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_titles_are_sorted_and_unique() -> anyhow::Result<()> {
    let service = RecommendationService::load(sample_dir(), EngineConfig::default(), None).await?;

    let titles = service.titles();
    assert_eq!(titles.len(), 22);
    assert!(titles.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(titles.contains(&"Sabrina (1954)".to_string()));
    assert!(titles.contains(&"Sabrina (1995)".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_load_missing_directory_fails() {
    let result =
        RecommendationService::load("/no/such/dataset", EngineConfig::default(), None).await;
    let err = result.err().expect("load should fail");
    assert!(format!("{err:#}").contains("Failed to open file"));
}

#[tokio::test]
async fn test_similar_uses_default_k() -> anyhow::Result<()> {
    let service = RecommendationService::load(sample_dir(), EngineConfig::default(), None).await?;

    let recs = service.similar(&MovieQuery::from("Toy Story"), None).await;
    assert_eq!(recs.len(), 5);
    assert!(recs.iter().all(|r| r.movie_id != 1));
    assert!(recs.iter().all(|r| r.similarity.is_some()));
    // No poster source configured: no lookups, every poster NotFound
    assert!(recs.iter().all(|r| r.poster == PosterLookup::NotFound));
    Ok(())
}

#[tokio::test]
async fn test_top_by_genre_uses_default_n() -> anyhow::Result<()> {
    let service = RecommendationService::load(sample_dir(), EngineConfig::default(), None).await?;

    let top = service.top_by_genre("comedy", None).await;
    assert_eq!(top.len(), 10);
    assert!(top.iter().all(|r| r.similarity.is_none()));

    let top3 = service.top_by_genre("comedy", Some(3)).await;
    assert_eq!(top3.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_poster_outcomes_are_carried_per_result() -> anyhow::Result<()> {
    let posters = Arc::new(ScriptedPosters::default());
    let service = RecommendationService::load(
        sample_dir(),
        EngineConfig::default(),
        Some(posters.clone() as Arc<dyn PosterSource>),
    )
    .await?;

    // Every Children movie in the sample has a TMDB link
    let recs = service.top_by_genre("children", Some(10)).await;
    let toy_story = recs.iter().find(|r| r.movie_id == 1).unwrap();
    let balto = recs.iter().find(|r| r.movie_id == 13).unwrap();
    let jumanji = recs.iter().find(|r| r.movie_id == 2).unwrap();

    assert_eq!(toy_story.poster.url(), Some("http://img.local/toy-story.jpg"));
    assert!(matches!(balto.poster, PosterLookup::Unavailable(_)));
    assert_eq!(jumanji.poster, PosterLookup::NotFound);
    assert_eq!(posters.calls.load(Ordering::SeqCst), recs.len());
    Ok(())
}

#[tokio::test]
async fn test_movies_without_tmdb_id_skip_lookup() -> anyhow::Result<()> {
    let posters = Arc::new(ScriptedPosters::default());
    // small_corpus has no links table
    let service = RecommendationService::new(
        small_corpus(),
        EngineConfig::default(),
        Some(posters.clone() as Arc<dyn PosterSource>),
    )?;

    let recs = service.similar(&MovieQuery::Id(1), Some(2)).await;
    assert_eq!(recs.len(), 2);
    assert!(recs.iter().all(|r| r.poster == PosterLookup::NotFound));
    assert_eq!(posters.calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_not_found_query_is_empty() -> anyhow::Result<()> {
    let service = RecommendationService::new(small_corpus(), EngineConfig::default(), None)?;

    assert!(service.similar(&MovieQuery::from("Casablanca"), None).await.is_empty());
    assert!(service.top_by_genre("Western", None).await.is_empty());
    assert!(service.search("Casablanca").is_empty());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_queries_share_one_engine() -> anyhow::Result<()> {
    let service = RecommendationService::new(small_corpus(), EngineConfig::default(), None)?;
    let expected = service.similar(&MovieQuery::Id(1), Some(2)).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.similar(&MovieQuery::Id(1), Some(2)).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await?, expected);
    }
    Ok(())
}
