// src/integrations/mod.rs
//
// External Integrations
//
// Traits at the seams (auth provider, metadata lookup, change feed) and the
// concrete clients behind them. Services only ever see the traits.

pub mod auth_provider;
pub mod change_feed;
pub mod metadata;
pub mod omdb;
pub mod supabase;

pub use auth_provider::{
    AuthProvider, AuthStateCallback, OAuthProvider, SignUpOutcome, SignUpRequest,
};
pub use change_feed::{
    ChangeCallback, ChangeFeed, ChangeFilter, ChangeKind, FeedSubscription, RowChange,
};
pub use metadata::MetadataClient;
pub use omdb::OmdbClient;
pub use supabase::{PollingChangeFeed, SupabaseAuthClient, SupabaseHttp};

#[cfg(test)]
pub use metadata::MockMetadataClient;
