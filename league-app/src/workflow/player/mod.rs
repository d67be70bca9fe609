use league_core::{PlayerId, PreferredSide, SideStatistics};
use serde::Serialize;

pub mod get_rating;
pub mod get_state;
pub mod list_states;
pub mod register;
pub mod side_stats;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSideView {
    pub player_id: PlayerId,
    pub statistics: SideStatistics,
    pub preferred_side: Option<PreferredSide>,
}
