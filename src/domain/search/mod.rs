pub mod value_objects;

pub use value_objects::{
    available, normalize_query, parse_runtime, parse_year, MovieDetails, SearchCandidate,
    MIN_QUERY_CHARS,
};
