pub mod invalidate_cache;
pub mod matches;
pub mod player;
pub mod season;
