//! Round state machine and scoring/ranking engine
//!
//! A `Session` owns the player ledger and all round state. Classified events
//! are fed in one at a time; everything a line can cause (kill attribution,
//! map change, round close) happens before the next line is looked at, so a
//! snapshot taken between lines is always consistent.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::player::Player;
use crate::config::Config;
use crate::parser::{Event, Weapon, WORLD};

/// Phase of play. The very first map is always a warmup lobby: real play
/// starts once a second map is loaded, and every round close drops back to
/// warmup until the next map change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Active,
}

/// Best values observed this session, over non-ignored players only.
/// Recomputed in full at every round close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionMaxima {
    pub kills: i32,
    pub deaths: i32,
    pub kill_death_ratio: f64,
    pub killing_streak: i32,
    pub rocket_kills: i32,
    pub railgun_kills: i32,
    pub gauntlet_kills: i32,
    pub suicides: i32,
}

/// Read-only view handed to the presentation side after each line.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreboardSnapshot {
    pub map_name: String,
    pub round_id: String,
    pub warmup: bool,
    /// Non-ignored players in display order
    pub players: Vec<Player>,
    pub maxima: SessionMaxima,
    pub generated_at: DateTime<Utc>,
}

pub struct Session {
    players: HashMap<String, Player>,
    config: Arc<Config>,

    phase: Phase,
    map_name: String,
    map_changes: u32,
    /// Reassigned on every real map change; hash of that line's timestamp
    round_id: String,
    /// True while consecutive scoreboard lines are being consumed; the
    /// round is saved only on the first of them
    receiving_scores: bool,

    maxima: SessionMaxima,
}

impl Session {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            players: HashMap::new(),
            config,
            phase: Phase::Warmup,
            map_name: String::new(),
            map_changes: 0,
            round_id: String::new(),
            receiving_scores: false,
            maxima: SessionMaxima::default(),
        }
    }

    /// Dispatch one classified event. Any event other than a score line ends
    /// a scoreboard in progress.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::Kill {
                attacker,
                victim,
                weapon,
            } => {
                self.end_scoreboard();
                self.record_kill(&attacker, &victim, weapon);
            }
            Event::MapChange { map, timestamp } => {
                self.end_scoreboard();
                self.change_map(&map, &timestamp);
            }
            Event::ScoreReport => self.handle_score_report(),
            Event::Unrecognized => self.end_scoreboard(),
        }
    }

    fn end_scoreboard(&mut self) {
        if self.receiving_scores {
            debug!(round = %self.round_id, "scoreboard ended, resuming normal parsing");
            self.receiving_scores = false;
        }
    }

    /// A repeated line for the current map is a complete no-op. A real
    /// change discards every player's in-progress round, reassigns the
    /// round id and, from the second map on, leaves warmup.
    fn change_map(&mut self, map: &str, timestamp: &str) {
        if map == self.map_name {
            return;
        }

        self.map_name = map.to_string();
        self.map_changes += 1;
        self.round_id = hex::encode(Sha256::digest(timestamp.as_bytes()));

        if self.map_changes > 1 {
            self.phase = Phase::Active;
        }

        for player in self.players.values_mut() {
            player.discard_round();
        }

        let warmup = self.phase == Phase::Warmup;
        info!(
            map = %self.map_name,
            round = %self.round_id,
            changes = self.map_changes,
            warmup,
            "map change"
        );
    }

    /// Attribute one kill. During warmup nothing happens, not even player
    /// creation. World kills and suicides penalize the victim and credit
    /// nobody; a normal kill credits the attacker and their weapon class.
    fn record_kill(&mut self, attacker: &str, victim: &str, weapon: Weapon) {
        if self.phase == Phase::Warmup {
            return;
        }

        self.ensure_player(attacker);
        self.ensure_player(victim);

        if attacker == WORLD || attacker == victim {
            if let Some(victim) = self.players.get_mut(victim) {
                victim.subtract_kill();
                victim.add_death();
                victim.add_suicide_death();
            }
            debug!(victim, "suicide or environmental death");
        } else {
            if let Some(attacker) = self.players.get_mut(attacker) {
                attacker.add_kill();
                attacker.add_weapon_kill(weapon);
            }
            if let Some(victim) = self.players.get_mut(victim) {
                victim.add_death();
            }
            debug!(attacker, victim, ?weapon, "kill");
        }
    }

    /// First score line of a scoreboard closes the round, unless the round
    /// is in the configured skip list or play never left warmup. Follow-up
    /// score lines of the same scoreboard are coalesced.
    fn handle_score_report(&mut self) {
        if self.receiving_scores {
            return;
        }
        if self.phase == Phase::Warmup {
            debug!("score line during warmup, nothing to save");
            return;
        }

        self.receiving_scores = true;

        if self.config.is_skipped(&self.round_id) {
            info!(round = %self.round_id, "round is in the skip list, not saving");
            return;
        }

        self.close_round();
    }

    /// Round close: score every player against the derived frag limit,
    /// re-rank, refresh the session maxima and drop back to warmup.
    fn close_round(&mut self) {
        let frag_limit = self.frag_limit();
        info!(
            round = %self.round_id,
            map = %self.map_name,
            frag_limit,
            "saving round"
        );

        for player in self.players.values_mut() {
            player.save_round(frag_limit);
        }

        self.assign_ranks();
        self.recompute_maxima();
        self.phase = Phase::Warmup;
    }

    /// Derived frag limit: the highest round-kill count on the board. Stands
    /// in for the server's configured limit, which never appears in the log.
    fn frag_limit(&self) -> i32 {
        self.players
            .values()
            .fold(0, |limit, p| limit.max(p.round_kills))
    }

    /// Rank 1..N over all players, ignored ones included in the ordering so
    /// rank numbers stay stable, though their own rank is never written.
    fn assign_ranks(&mut self) {
        let mut order: Vec<&mut Player> = self.players.values_mut().collect();
        order.sort_by(|a, b| ranking_order(a, b));
        for (index, player) in order.iter_mut().enumerate() {
            player.set_rank(index as u32 + 1);
        }
    }

    fn recompute_maxima(&mut self) {
        let mut maxima = SessionMaxima::default();
        for p in self.players.values().filter(|p| !p.is_ignored) {
            maxima.kills = maxima.kills.max(p.kills);
            maxima.deaths = maxima.deaths.max(p.deaths);
            maxima.kill_death_ratio = maxima.kill_death_ratio.max(p.kill_death_ratio);
            maxima.killing_streak = maxima.killing_streak.max(p.killing_streak);
            maxima.rocket_kills = maxima.rocket_kills.max(p.rocket_kills);
            maxima.railgun_kills = maxima.railgun_kills.max(p.railgun_kills);
            maxima.gauntlet_kills = maxima.gauntlet_kills.max(p.gauntlet_kills);
            maxima.suicides = maxima.suicides.max(p.suicide_deaths);
        }
        self.maxima = maxima;
    }

    /// Resolve-or-create. The ignored and cider flags come from the config
    /// at creation time only.
    fn ensure_player(&mut self, name: &str) {
        if !self.players.contains_key(name) {
            let player = Player::new(
                name,
                self.config.is_ignored(name),
                self.config.drinks_cider(name),
            );
            self.players.insert(name.to_string(), player);
        }
    }

    /// Non-ignored players in display order: ranked before unranked, then
    /// ascending rank, then descending kills, then descending name.
    pub fn sorted_players(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self
            .players
            .values()
            .filter(|p| !p.is_ignored)
            .cloned()
            .collect();
        players.sort_by(display_order);
        players
    }

    pub fn snapshot(&self) -> ScoreboardSnapshot {
        ScoreboardSnapshot {
            map_name: self.map_name.clone(),
            round_id: self.round_id.clone(),
            warmup: self.phase == Phase::Warmup,
            players: self.sorted_players(),
            maxima: self.maxima,
            generated_at: Utc::now(),
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.get(name)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn round_id(&self) -> &str {
        &self.round_id
    }

    pub fn is_warmup(&self) -> bool {
        self.phase == Phase::Warmup
    }

    pub fn maxima(&self) -> &SessionMaxima {
        &self.maxima
    }
}

/// Round-close ranking order: cumulative score descending, then kills
/// descending, then name descending. When the (equal) score is exactly
/// zero, kills are deliberately skipped and the tie falls straight through
/// to the name.
fn ranking_order(a: &Player, b: &Player) -> Ordering {
    match b.score.partial_cmp(&a.score) {
        Some(Ordering::Equal) | None => {}
        Some(order) => return order,
    }
    if a.score == 0.0 {
        return b.name.cmp(&a.name);
    }
    b.kills.cmp(&a.kills).then_with(|| b.name.cmp(&a.name))
}

/// Display order for the scoreboard; rank 0 means never ranked and sorts
/// last.
fn display_order(a: &Player, b: &Player) -> Ordering {
    let rank_a = if a.rank == 0 { u32::MAX } else { a.rank };
    let rank_b = if b.rank == 0 { u32::MAX } else { b.rank };
    rank_a
        .cmp(&rank_b)
        .then_with(|| b.kills.cmp(&a.kills))
        .then_with(|| b.name.cmp(&a.name))
}
