//! Database schema definitions

/// SQL to create all tables
/// NOTE: Decimal values (score, price, delta, average) are stored as TEXT to keep
/// rust_decimal::Decimal precision
pub const CREATE_TABLES: &str = r#"
-- Clubs of the current season roster
CREATE TABLE IF NOT EXISTS clubs (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    abbreviation TEXT NOT NULL CHECK (length(abbreviation) <= 3),
    badge_30x30 TEXT NOT NULL DEFAULT '',
    badge_45x45 TEXT NOT NULL DEFAULT '',
    badge_60x60 TEXT NOT NULL DEFAULT ''
);

-- Fixtures, one row per (round, home, away)
CREATE TABLE IF NOT EXISTS matches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    round INTEGER NOT NULL,
    home_club_id INTEGER NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
    away_club_id INTEGER NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
    home_position INTEGER NOT NULL,
    away_position INTEGER NOT NULL,
    home_form TEXT NOT NULL,
    away_form TEXT NOT NULL,
    home_score INTEGER,
    away_score INTEGER,
    kickoff TEXT NOT NULL,
    venue TEXT NOT NULL,
    valid INTEGER NOT NULL,
    detail_url TEXT NOT NULL,
    UNIQUE (round, home_club_id, away_club_id)
);

CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    nickname TEXT NOT NULL,
    photo TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS positions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    abbreviation TEXT NOT NULL CHECK (length(abbreviation) <= 3)
);

CREATE TABLE IF NOT EXISTS statuses (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

-- Per player, per round scoring snapshot
CREATE TABLE IF NOT EXISTS score_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year INTEGER NOT NULL,
    round INTEGER NOT NULL,
    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    club_id INTEGER NOT NULL REFERENCES clubs(id) ON DELETE CASCADE,
    position_id INTEGER NOT NULL REFERENCES positions(id),
    status_id INTEGER NOT NULL REFERENCES statuses(id),
    score TEXT NOT NULL DEFAULT '0',
    price TEXT NOT NULL DEFAULT '0',
    price_delta TEXT NOT NULL DEFAULT '0',
    average TEXT NOT NULL DEFAULT '0',
    games_played INTEGER NOT NULL DEFAULT 0,
    scout_a INTEGER NOT NULL DEFAULT 0,
    scout_ca INTEGER NOT NULL DEFAULT 0,
    scout_cv INTEGER NOT NULL DEFAULT 0,
    scout_dd INTEGER NOT NULL DEFAULT 0,
    scout_dp INTEGER NOT NULL DEFAULT 0,
    scout_ds INTEGER NOT NULL DEFAULT 0,
    scout_fc INTEGER NOT NULL DEFAULT 0,
    scout_fd INTEGER NOT NULL DEFAULT 0,
    scout_ff INTEGER NOT NULL DEFAULT 0,
    scout_fs INTEGER NOT NULL DEFAULT 0,
    scout_ft INTEGER NOT NULL DEFAULT 0,
    scout_g INTEGER NOT NULL DEFAULT 0,
    scout_gc INTEGER NOT NULL DEFAULT 0,
    scout_gs INTEGER NOT NULL DEFAULT 0,
    scout_i INTEGER NOT NULL DEFAULT 0,
    scout_pc INTEGER NOT NULL DEFAULT 0,
    scout_pe INTEGER NOT NULL DEFAULT 0,
    scout_pp INTEGER NOT NULL DEFAULT 0,
    scout_ps INTEGER NOT NULL DEFAULT 0,
    scout_rb INTEGER NOT NULL DEFAULT 0,
    scout_sg INTEGER NOT NULL DEFAULT 0,
    scout_v INTEGER NOT NULL DEFAULT 0,
    UNIQUE (year, round, player_id)
);

-- ========== INDEXES ==========

CREATE INDEX IF NOT EXISTS idx_matches_round ON matches(round);
CREATE INDEX IF NOT EXISTS idx_scores_round ON score_records(year, round);
CREATE INDEX IF NOT EXISTS idx_scores_club ON score_records(club_id)
"#;
