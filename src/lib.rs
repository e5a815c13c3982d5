pub mod consensus;
pub mod emr;
pub mod fake_feed;
pub mod feed;
pub mod http_client;
pub mod insights;
pub mod normalize;
pub mod odds_fetch;
pub mod parlay_role;
pub mod persist;
pub mod rank;
pub mod state;
