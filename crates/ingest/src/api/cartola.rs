//! CartolaFC API client — public endpoints mapped into persistence records
//!
//! Uses `partidas/{round}` for clubs and fixtures and `atletas/mercado` for players,
//! positions, statuses and per-round scoring.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

use persistence::{Club, Match, Player, Position, ScoreRecord, ScoutCode, Scouts, Status};

use crate::clock::{Clock, SystemClock};
use crate::config::IngestConfig;
use crate::error::{IngestError, IngestResult};
use crate::fetch::Fetcher;
use crate::http::ReqwestTransport;
use crate::store::{require, RecordStore};

/// `partida_data` layout
const KICKOFF_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The round 1 payload embeds the season's club roster
const ROSTER_ROUND: i64 = 1;

const LOGIN_SERVICE_ID: u32 = 4728;

// ---------------------------------------------------------------------------
// Deserialization structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RosterResponse {
    clubes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawClub {
    id: i64,
    nome: String,
    abreviacao: String,
    /// Badge URL by size, e.g. "30x30"
    #[serde(default)]
    escudos: HashMap<String, String>,
}

/// `partidas/{round}` returns `{ "partidas": [...], "rodada": n, ... }`
#[derive(Debug, Deserialize)]
struct RoundResponse {
    partidas: Vec<RawMatch>,
    rodada: i64,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    clube_casa_id: i64,
    clube_visitante_id: i64,
    clube_casa_posicao: i64,
    clube_visitante_posicao: i64,
    #[serde(default)]
    aproveitamento_mandante: Vec<String>,
    #[serde(default)]
    aproveitamento_visitante: Vec<String>,
    placar_oficial_mandante: Option<i64>,
    placar_oficial_visitante: Option<i64>,
    partida_data: String,
    local: String,
    valida: bool,
    url_confronto: String,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    atleta_id: i64,
    nome: String,
    apelido: String,
    #[serde(default)]
    foto: Option<String>,
}

/// Full market entry: the player plus this round's scoring
#[derive(Debug, Deserialize)]
struct RawAthlete {
    atleta_id: i64,
    rodada_id: i64,
    clube_id: i64,
    posicao_id: i64,
    status_id: i64,
    pontos_num: Decimal,
    preco_num: Decimal,
    variacao_num: Decimal,
    media_num: Decimal,
    jogos_num: i64,
    #[serde(default)]
    scout: Option<BTreeMap<String, i64>>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    id: i64,
    nome: String,
    abreviacao: String,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    id: i64,
    nome: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "glbId")]
    glb_id: String,
}

/// Decoded `atletas/mercado` payload, mapped lazily by the `*_from` methods.
///
/// All three collections are required: a 2xx body without them (a maintenance notice,
/// say) is a decode error rather than an empty market.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketPayload {
    atletas: Vec<Value>,
    posicoes: Map<String, Value>,
    status: Map<String, Value>,
}

impl MarketPayload {
    pub fn athlete_count(&self) -> usize {
        self.atletas.len()
    }
}

/// Fixtures of one round together with the round the upstream says they belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundFixtures {
    pub round: i64,
    pub matches: Vec<Match>,
}

// ---------------------------------------------------------------------------
// Client implementation
// ---------------------------------------------------------------------------

/// CartolaFC client: fetches upstream JSON and maps it into ready-to-persist records.
///
/// Foreign keys (match clubs, score record player/club/position/status) are resolved
/// through the injected [`RecordStore`]; a missing parent aborts the whole call.
#[derive(Clone)]
pub struct CartolaClient {
    fetcher: Fetcher,
    api_url: String,
    login_url: String,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl CartolaClient {
    /// Client over reqwest with the configured timeout and retry budget
    pub fn new(config: &IngestConfig, store: Arc<dyn RecordStore>) -> IngestResult<Self> {
        let transport = ReqwestTransport::new(config.http_timeout).map_err(IngestError::Transport)?;
        let fetcher = Fetcher::new(Arc::new(transport), config.max_attempts, config.retry_delay);
        Ok(Self::with_fetcher(config, fetcher, store))
    }

    pub fn with_fetcher(config: &IngestConfig, fetcher: Fetcher, store: Arc<dyn RecordStore>) -> Self {
        Self {
            fetcher,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            login_url: config.login_url.clone(),
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    /// POST credentials to the login endpoint and return the `glbId` token
    pub async fn login(&self, email: &str, password: &str) -> IngestResult<String> {
        let body = json!({
            "payload": {
                "email": email,
                "password": password,
                "serviceId": LOGIN_SERVICE_ID,
            },
            "captcha": "",
        });

        let resp = self.fetcher.post(&self.login_url, &body).await?;
        let login: LoginResponse = serde_json::from_value(resp)?;
        info!("Login token obtained");
        Ok(login.glb_id)
    }

    /// GET partidas/1: clubs of the current roster, in payload order
    pub async fn clubs(&self) -> IngestResult<Vec<Club>> {
        let url = self.url(&format!("partidas/{}", ROSTER_ROUND));
        let roster: RosterResponse = serde_json::from_value(self.fetcher.fetch(&url).await?)?;

        let clubs = roster
            .clubes
            .values()
            .map(|entry| -> IngestResult<Club> {
                let raw = RawClub::deserialize(entry)?;
                check_abbreviation("club", raw.id, &raw.abreviacao)?;
                Ok(Club {
                    id: raw.id,
                    badge_30x30: badge(&raw.escudos, "30x30"),
                    badge_45x45: badge(&raw.escudos, "45x45"),
                    badge_60x60: badge(&raw.escudos, "60x60"),
                    name: raw.nome,
                    abbreviation: raw.abreviacao,
                })
            })
            .collect::<IngestResult<Vec<_>>>()?;

        info!(count = clubs.len(), "Clubs mapped");
        Ok(clubs)
    }

    /// GET partidas/{round}: fixtures, stamped with the round the response reports
    pub async fn matches(&self, round: i64) -> IngestResult<Vec<Match>> {
        Ok(self.fixtures(round).await?.matches)
    }

    /// Like [`matches`](Self::matches), but also returns the reported round, which is
    /// known even when the round has no fixtures.
    ///
    /// The response's `rodada` wins over `round`: the upstream may answer a request for
    /// a past or future round with the current one.
    pub async fn fixtures(&self, round: i64) -> IngestResult<RoundFixtures> {
        let url = self.url(&format!("partidas/{}", round));
        let resp: RoundResponse = serde_json::from_value(self.fetcher.fetch(&url).await?)?;

        if resp.rodada != round {
            debug!(requested = round, rodada = resp.rodada, "Upstream answered with another round");
        }

        let mut matches = Vec::with_capacity(resp.partidas.len());
        for raw in resp.partidas {
            let home = require(self.store.club(raw.clube_casa_id), "club", raw.clube_casa_id).await?;
            let away = require(
                self.store.club(raw.clube_visitante_id),
                "club",
                raw.clube_visitante_id,
            )
            .await?;

            matches.push(Match {
                id: None,
                round: resp.rodada,
                home_club_id: home.id,
                away_club_id: away.id,
                home_position: raw.clube_casa_posicao,
                away_position: raw.clube_visitante_posicao,
                home_form: raw.aproveitamento_mandante.concat(),
                away_form: raw.aproveitamento_visitante.concat(),
                home_score: raw.placar_oficial_mandante,
                away_score: raw.placar_oficial_visitante,
                kickoff: parse_kickoff(&raw.partida_data)?,
                venue: raw.local,
                valid: raw.valida,
                detail_url: raw.url_confronto,
            });
        }

        info!(round = resp.rodada, count = matches.len(), "Matches mapped");
        Ok(RoundFixtures {
            round: resp.rodada,
            matches,
        })
    }

    /// GET atletas/mercado once; map it with the `*_from` methods
    pub async fn fetch_market(&self) -> IngestResult<MarketPayload> {
        let url = self.url("atletas/mercado");
        let payload: MarketPayload = serde_json::from_value(self.fetcher.fetch(&url).await?)?;
        debug!(athletes = payload.athlete_count(), "Market fetched");
        Ok(payload)
    }

    /// GET atletas/mercado: players
    pub async fn players(&self) -> IngestResult<Vec<Player>> {
        let market = self.fetch_market().await?;
        self.players_from(&market)
    }

    /// GET atletas/mercado: positions
    pub async fn positions(&self) -> IngestResult<Vec<Position>> {
        let market = self.fetch_market().await?;
        self.positions_from(&market)
    }

    /// GET atletas/mercado: statuses
    pub async fn statuses(&self) -> IngestResult<Vec<Status>> {
        let market = self.fetch_market().await?;
        self.statuses_from(&market)
    }

    /// GET atletas/mercado: score records; every referenced parent must already be stored
    pub async fn score_records(&self) -> IngestResult<Vec<ScoreRecord>> {
        let market = self.fetch_market().await?;
        self.score_records_from(&market).await
    }

    pub fn players_from(&self, market: &MarketPayload) -> IngestResult<Vec<Player>> {
        let players = market
            .atletas
            .iter()
            .map(|entry| -> IngestResult<Player> {
                let raw = RawPlayer::deserialize(entry)?;
                Ok(Player {
                    id: raw.atleta_id,
                    name: raw.nome,
                    nickname: raw.apelido,
                    photo: raw.foto.unwrap_or_default(),
                })
            })
            .collect::<IngestResult<Vec<_>>>()?;

        info!(count = players.len(), "Players mapped");
        Ok(players)
    }

    pub fn positions_from(&self, market: &MarketPayload) -> IngestResult<Vec<Position>> {
        market
            .posicoes
            .values()
            .map(|entry| -> IngestResult<Position> {
                let raw = RawPosition::deserialize(entry)?;
                check_abbreviation("position", raw.id, &raw.abreviacao)?;
                Ok(Position {
                    id: raw.id,
                    name: raw.nome,
                    abbreviation: raw.abreviacao,
                })
            })
            .collect()
    }

    pub fn statuses_from(&self, market: &MarketPayload) -> IngestResult<Vec<Status>> {
        market
            .status
            .values()
            .map(|entry| -> IngestResult<Status> {
                let raw = RawStatus::deserialize(entry)?;
                Ok(Status {
                    id: raw.id,
                    name: raw.nome,
                })
            })
            .collect()
    }

    /// Score records stamped with the clock's current year and each entry's own round
    pub async fn score_records_from(&self, market: &MarketPayload) -> IngestResult<Vec<ScoreRecord>> {
        let year = i64::from(self.clock.current_year());

        let mut records = Vec::with_capacity(market.atletas.len());
        for entry in &market.atletas {
            let raw = RawAthlete::deserialize(entry)?;

            let player = require(self.store.player(raw.atleta_id), "player", raw.atleta_id).await?;
            let club = require(self.store.club(raw.clube_id), "club", raw.clube_id).await?;
            let position =
                require(self.store.position(raw.posicao_id), "position", raw.posicao_id).await?;
            let status = require(self.store.status(raw.status_id), "status", raw.status_id).await?;

            records.push(ScoreRecord {
                year,
                round: raw.rodada_id,
                player_id: player.id,
                club_id: club.id,
                position_id: position.id,
                status_id: status.id,
                score: raw.pontos_num,
                price: raw.preco_num,
                price_delta: raw.variacao_num,
                average: raw.media_num,
                games_played: raw.jogos_num,
                scouts: flatten_scouts(raw.scout.as_ref())?,
            });
        }

        info!(year, count = records.len(), "Score records mapped");
        Ok(records)
    }
}

fn badge(escudos: &HashMap<String, String>, size: &str) -> String {
    escudos.get(size).cloned().unwrap_or_default()
}

fn check_abbreviation(entity: &str, id: i64, abbreviation: &str) -> IngestResult<()> {
    if abbreviation.chars().count() > 3 {
        return Err(IngestError::Parse(format!(
            "{entity} {id}: abbreviation {abbreviation:?} is longer than 3 characters"
        )));
    }
    Ok(())
}

fn parse_kickoff(raw: &str) -> IngestResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, KICKOFF_FORMAT)
        .map_err(|e| IngestError::Parse(format!("partida_data {raw:?}: {e}")))
}

/// Every known code gets a slot; codes missing upstream stay zero, unknown codes fail
fn flatten_scouts(raw: Option<&BTreeMap<String, i64>>) -> IngestResult<Scouts> {
    let mut scouts = Scouts::default();
    for (code, count) in raw.into_iter().flatten() {
        scouts.set(code.parse::<ScoutCode>()?, *count);
    }
    Ok(scouts)
}
