pub mod derivation_cache;
pub mod league_state;
