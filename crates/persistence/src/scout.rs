//! Scout vocabulary: countable in-match events that make up a player's round score

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A scout code outside the known vocabulary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scout code: {0}")]
pub struct UnknownScoutCode(pub String);

/// One countable in-match event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoutCode {
    Assist,
    YellowCard,
    RedCard,
    DifficultSave,
    PenaltySave,
    Tackle,
    FoulCommitted,
    ShotSaved,
    ShotWide,
    FoulSuffered,
    ShotOnPost,
    Goal,
    OwnGoal,
    GoalConceded,
    Offside,
    PenaltyCommitted,
    MisplacedPass,
    PenaltyMissed,
    PenaltyWon,
    BallRecovered,
    CleanSheet,
    Win,
}

impl ScoutCode {
    pub const COUNT: usize = 22;

    /// All codes, in column order
    pub const ALL: [ScoutCode; Self::COUNT] = [
        ScoutCode::Assist,
        ScoutCode::YellowCard,
        ScoutCode::RedCard,
        ScoutCode::DifficultSave,
        ScoutCode::PenaltySave,
        ScoutCode::Tackle,
        ScoutCode::FoulCommitted,
        ScoutCode::ShotSaved,
        ScoutCode::ShotWide,
        ScoutCode::FoulSuffered,
        ScoutCode::ShotOnPost,
        ScoutCode::Goal,
        ScoutCode::OwnGoal,
        ScoutCode::GoalConceded,
        ScoutCode::Offside,
        ScoutCode::PenaltyCommitted,
        ScoutCode::MisplacedPass,
        ScoutCode::PenaltyMissed,
        ScoutCode::PenaltyWon,
        ScoutCode::BallRecovered,
        ScoutCode::CleanSheet,
        ScoutCode::Win,
    ];

    /// Upstream code as it appears in the `scout` mapping
    pub fn code(self) -> &'static str {
        match self {
            ScoutCode::Assist => "A",
            ScoutCode::YellowCard => "CA",
            ScoutCode::RedCard => "CV",
            ScoutCode::DifficultSave => "DD",
            ScoutCode::PenaltySave => "DP",
            ScoutCode::Tackle => "DS",
            ScoutCode::FoulCommitted => "FC",
            ScoutCode::ShotSaved => "FD",
            ScoutCode::ShotWide => "FF",
            ScoutCode::FoulSuffered => "FS",
            ScoutCode::ShotOnPost => "FT",
            ScoutCode::Goal => "G",
            ScoutCode::OwnGoal => "GC",
            ScoutCode::GoalConceded => "GS",
            ScoutCode::Offside => "I",
            ScoutCode::PenaltyCommitted => "PC",
            ScoutCode::MisplacedPass => "PE",
            ScoutCode::PenaltyMissed => "PP",
            ScoutCode::PenaltyWon => "PS",
            ScoutCode::BallRecovered => "RB",
            ScoutCode::CleanSheet => "SG",
            ScoutCode::Win => "V",
        }
    }

    /// Column holding this code's count in `score_records`
    pub fn column(self) -> &'static str {
        match self {
            ScoutCode::Assist => "scout_a",
            ScoutCode::YellowCard => "scout_ca",
            ScoutCode::RedCard => "scout_cv",
            ScoutCode::DifficultSave => "scout_dd",
            ScoutCode::PenaltySave => "scout_dp",
            ScoutCode::Tackle => "scout_ds",
            ScoutCode::FoulCommitted => "scout_fc",
            ScoutCode::ShotSaved => "scout_fd",
            ScoutCode::ShotWide => "scout_ff",
            ScoutCode::FoulSuffered => "scout_fs",
            ScoutCode::ShotOnPost => "scout_ft",
            ScoutCode::Goal => "scout_g",
            ScoutCode::OwnGoal => "scout_gc",
            ScoutCode::GoalConceded => "scout_gs",
            ScoutCode::Offside => "scout_i",
            ScoutCode::PenaltyCommitted => "scout_pc",
            ScoutCode::MisplacedPass => "scout_pe",
            ScoutCode::PenaltyMissed => "scout_pp",
            ScoutCode::PenaltyWon => "scout_ps",
            ScoutCode::BallRecovered => "scout_rb",
            ScoutCode::CleanSheet => "scout_sg",
            ScoutCode::Win => "scout_v",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for ScoutCode {
    type Err = UnknownScoutCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScoutCode::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| UnknownScoutCode(s.to_string()))
    }
}

impl fmt::Display for ScoutCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Event counts for one round, every known code present (zero when absent upstream)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scouts([i64; ScoutCode::COUNT]);

impl Scouts {
    pub fn get(&self, code: ScoutCode) -> i64 {
        self.0[code.index()]
    }

    pub fn set(&mut self, code: ScoutCode, count: i64) {
        self.0[code.index()] = count;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoutCode, i64)> + '_ {
        ScoutCode::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

impl Serialize for Scouts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ScoutCode::COUNT))?;
        for (code, count) in self.iter() {
            map.serialize_entry(code.code(), &count)?;
        }
        map.end()
    }
}
