use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{
    LeagueError, MatchId, PlayerId, record::MatchRecord, season::SeasonWindow,
};

/// The authoritative, append-only set of played matches.
///
/// Storage order carries no meaning. Anything order dependent goes through
/// [`MatchLog::chronological`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchLog {
    records: Vec<MatchRecord>,
}

impl MatchLog {
    pub fn new(records: Vec<MatchRecord>) -> Result<Self, LeagueError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate()?;
            if !seen.insert(&record.id) {
                return Err(LeagueError::malformed(&record.id.0, "duplicate match id"));
            }
        }
        Ok(Self { records })
    }

    /// Builds a log from stored JSON objects keyed by match id.
    ///
    /// A record without an `id` field takes its key. Any record of the wrong
    /// shape fails the whole log.
    pub fn from_raw<I>(raw: I) -> Result<Self, LeagueError>
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        let records = raw
            .into_iter()
            .map(|(key, mut value)| {
                let serde_json::Value::Object(object) = &mut value else {
                    return Err(LeagueError::malformed(&key, "record is not an object"));
                };
                object
                    .entry("id")
                    .or_insert_with(|| serde_json::Value::String(key.clone()));
                serde_json::from_value::<MatchRecord>(value)
                    .map_err(|e| LeagueError::malformed(&key, e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(records)
    }

    pub fn all(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, match_id: &MatchId) -> Option<&MatchRecord> {
        self.records.iter().find(|r| r.id == *match_id)
    }

    pub fn for_player<'a>(
        &'a self,
        player_id: &'a PlayerId,
    ) -> impl Iterator<Item = &'a MatchRecord> + 'a {
        self.records.iter().filter(move |r| r.involves(player_id))
    }

    pub fn within<'a>(
        &'a self,
        season: &'a SeasonWindow,
    ) -> impl Iterator<Item = &'a MatchRecord> + 'a {
        self.records.iter().filter(move |r| season.contains_match(r))
    }

    /// Sorts by `played_at`, then by id so equal timestamps stay deterministic.
    pub fn chronological<'a, I>(records: I) -> Vec<&'a MatchRecord>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut sorted: Vec<&MatchRecord> = records.into_iter().collect();
        sorted.sort_by(|a, b| a.played_at.cmp(&b.played_at).then_with(|| a.id.cmp(&b.id)));
        sorted
    }

    pub fn player_ids(&self) -> BTreeSet<PlayerId> {
        self.records
            .iter()
            .flat_map(|r| [r.player1_id.clone(), r.player2_id.clone()])
            .collect()
    }

    /// Groups already ordered records by participant in one pass. Each
    /// player's list keeps the input order.
    pub fn group_by_player<'a>(
        records: &[&'a MatchRecord],
    ) -> HashMap<&'a PlayerId, Vec<&'a MatchRecord>> {
        let mut grouped: HashMap<&PlayerId, Vec<&MatchRecord>> = HashMap::new();
        for &record in records {
            grouped.entry(&record.player1_id).or_default().push(record);
            grouped.entry(&record.player2_id).or_default().push(record);
        }
        grouped
    }
}
