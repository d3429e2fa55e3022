//! Parser for the MovieLens CSV tables.
//!
//! - movies.csv: movieId,title,genres
//! - ratings.csv: userId,movieId,rating,timestamp
//! - tags.csv: userId,movieId,tag,timestamp
//! - links.csv: movieId,imdbId,tmdbId
//!
//! Each table's header is validated before any record is read so that a
//! missing join key is reported by name instead of as a deserialize error
//! on line 2.

use crate::error::{DataError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const MOVIE_COLUMNS: &[&str] = &["movieId", "title", "genres"];
pub const RATING_COLUMNS: &[&str] = &["userId", "movieId", "rating"];
pub const TAG_COLUMNS: &[&str] = &["movieId", "tag"];
pub const LINK_COLUMNS: &[&str] = &["movieId", "tmdbId"];

/// Open a file, mapping "not found" to a [`DataError::FileNotFound`]
fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read every record of a CSV table after checking its header row.
///
/// `file` is only used to label errors.
pub fn read_table<T, R>(reader: R, file: &str, required: &[&str]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| DataError::Csv {
            file: file.to_string(),
            source,
        })?
        .clone();

    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DataError::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
            });
        }
    }

    csv_reader
        .deserialize()
        .map(|record| {
            record.map_err(|source| DataError::Csv {
                file: file.to_string(),
                source,
            })
        })
        .collect()
}

fn read_file<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    let file = open(path)?;
    read_table(file, &file_label(path), required)
}

/// Parse movies.csv
pub fn parse_movies(path: &Path) -> Result<Vec<MovieRow>> {
    read_file(path, MOVIE_COLUMNS)
}

/// Parse ratings.csv
pub fn parse_ratings(path: &Path) -> Result<Vec<RatingRow>> {
    read_file(path, RATING_COLUMNS)
}

/// Parse tags.csv
pub fn parse_tags(path: &Path) -> Result<Vec<TagRow>> {
    read_file(path, TAG_COLUMNS)
}

/// Parse links.csv
pub fn parse_links(path: &Path) -> Result<Vec<LinkRow>> {
    read_file(path, LINK_COLUMNS)
}

/// Split a pipe-separated genre field
///
/// Example: "Action|Adventure|Sci-Fi" -> ["Action", "Adventure", "Sci-Fi"]
pub fn split_genres(s: &str) -> Vec<String> {
    s.split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_genres() {
        assert_eq!(
            split_genres("Action|Adventure|Sci-Fi"),
            vec!["Action", "Adventure", "Sci-Fi"]
        );
        assert!(split_genres("").is_empty());
        assert_eq!(split_genres("(no genres listed)"), vec!["(no genres listed)"]);
    }

    #[test]
    fn test_read_movies_with_quoted_title() {
        let data = "movieId,title,genres\n\
                    1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy\n\
                    11,\"American President, The (1995)\",Comedy|Drama|Romance\n";
        let movies: Vec<MovieRow> = read_table(data.as_bytes(), "movies.csv", MOVIE_COLUMNS).unwrap();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[1].movie_id, 11);
        assert_eq!(movies[1].title, "American President, The (1995)");
        assert_eq!(movies[1].genres, "Comedy|Drama|Romance");
    }

    #[test]
    fn test_missing_join_column() {
        let data = "id,title,genres\n1,Toy Story (1995),Comedy\n";
        let err = read_table::<MovieRow, _>(data.as_bytes(), "movies.csv", MOVIE_COLUMNS)
            .unwrap_err();

        match err {
            DataError::MissingColumn { file, column } => {
                assert_eq!(file, "movies.csv");
                assert_eq!(column, "movieId");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ratings_ignore_extra_columns() {
        let data = "userId,movieId,rating,timestamp\n1,1,4.0,964982703\n1,3,4.5,964981247\n";
        let ratings: Vec<RatingRow> =
            read_table(data.as_bytes(), "ratings.csv", RATING_COLUMNS).unwrap();

        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[1].movie_id, 3);
        assert_eq!(ratings[1].rating, 4.5);
    }

    #[test]
    fn test_blank_tmdb_id_is_none() {
        let data = "movieId,imdbId,tmdbId\n1,0114709,862\n791,0113610,\n";
        let links: Vec<LinkRow> = read_table(data.as_bytes(), "links.csv", LINK_COLUMNS).unwrap();

        assert_eq!(links[0].tmdb_id, Some(862));
        assert_eq!(links[1].tmdb_id, None);
    }

    #[test]
    fn test_malformed_rating_is_csv_error() {
        let data = "userId,movieId,rating\n1,1,great\n";
        let err = read_table::<RatingRow, _>(data.as_bytes(), "ratings.csv", RATING_COLUMNS)
            .unwrap_err();
        assert!(matches!(err, DataError::Csv { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_movies(Path::new("/definitely/not/here/movies.csv")).unwrap_err();
        assert!(matches!(err, DataError::FileNotFound { .. }));
    }
}
