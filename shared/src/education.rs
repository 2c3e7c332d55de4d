use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// FIPS county code, the join key between the geography and education datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountyId(pub u32);

impl fmt::Display for CountyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CountyId {
    type Err = std::num::ParseIntError;

    /// Accepts zero-padded codes such as `"01001"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(CountyId)
    }
}

/// One row of the education dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub fips: CountyId,
    pub state: String,
    pub area_name: String,
    /// Percentage (0–100) of adults 25+ holding a bachelor's degree or higher.
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// Lookup from county id to its education record.
///
/// When the dataset repeats an id, the first record wins.
#[derive(Debug, Clone, Default)]
pub struct JoinIndex {
    records: Vec<EducationRecord>,
    by_id: HashMap<CountyId, usize>,
}

impl JoinIndex {
    pub fn build(records: Vec<EducationRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            by_id.entry(record.fips).or_insert(idx);
        }
        Self { records, by_id }
    }

    pub fn get(&self, id: CountyId) -> Option<&EducationRecord> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    /// Number of source records, duplicates included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EducationRecord> {
        self.records.iter()
    }

    /// `(min, max)` of the finite percentages, or `None` if there are none.
    pub fn extent(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .map(|r| r.bachelors_or_higher)
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
