//! Per-player ledger: cumulative and round-volatile counters

use serde::Serialize;

use super::score::format_score;
use crate::parser::Weapon;

/// One entry per distinct name ever seen in the stream. Ignored players
/// (including the `<world>` sentinel) keep a ledger entry so bookkeeping
/// stays consistent, but every counter mutation on them is a no-op and they
/// are excluded from ranking and display.
///
/// Cumulative fields only ever change at round close; the `round_*` fields
/// are volatile and reset on every map change and every round save.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Player {
    pub name: String,

    // Ranking (0 = never ranked)
    pub rank: u32,
    pub prev_rank: u32,

    // Scores
    pub score: f64,
    pub diff: f64,
    pub score_text: String,
    pub diff_text: String,

    // Cumulative stats
    pub kills: i32,
    pub deaths: i32,
    pub kill_death_ratio: f64,
    pub rocket_kills: i32,
    pub railgun_kills: i32,
    pub gauntlet_kills: i32,
    pub suicide_deaths: i32,
    pub killing_streak: i32,

    // Round-volatile stats
    pub round_kills: i32,
    pub round_deaths: i32,
    pub round_rocket_kills: i32,
    pub round_railgun_kills: i32,
    pub round_gauntlet_kills: i32,
    pub round_suicide_deaths: i32,
    pub round_best_streak: i32,
    pub round_current_streak: i32,

    // Flags, applied once at creation
    pub is_drinking_cider: bool,
    pub is_ignored: bool,
}

impl Player {
    pub fn new(name: &str, is_ignored: bool, is_drinking_cider: bool) -> Self {
        Self {
            name: name.to_string(),
            is_ignored,
            is_drinking_cider,
            ..Self::default()
        }
    }

    /// Credit a normal kill: round kills and the current streak grow, the
    /// round's best streak follows.
    pub fn add_kill(&mut self) {
        if self.is_ignored {
            return;
        }
        self.round_kills += 1;
        self.round_current_streak += 1;
        self.round_best_streak = self.round_best_streak.max(self.round_current_streak);
    }

    /// Penalize a suicide or environmental death: one round kill is taken
    /// away and the streak breaks. Round kills can go negative.
    pub fn subtract_kill(&mut self) {
        if self.is_ignored {
            return;
        }
        self.round_current_streak = 0;
        self.round_kills -= 1;
    }

    pub fn add_death(&mut self) {
        if self.is_ignored {
            return;
        }
        self.round_current_streak = 0;
        self.round_deaths += 1;
    }

    pub fn add_suicide_death(&mut self) {
        if self.is_ignored {
            return;
        }
        self.round_current_streak = 0;
        self.round_suicide_deaths += 1;
    }

    /// Bump the weapon-class counter for a tracked weapon.
    pub fn add_weapon_kill(&mut self, weapon: Weapon) {
        if self.is_ignored {
            return;
        }
        match weapon {
            Weapon::Rocket => self.round_rocket_kills += 1,
            Weapon::Railgun => self.round_railgun_kills += 1,
            Weapon::Gauntlet => self.round_gauntlet_kills += 1,
            Weapon::Other => {}
        }
    }

    /// Round close: score the round against the derived frag limit, fold the
    /// round counters into the cumulative ones and clear them.
    ///
    /// A frag limit of 0 (a scoreboard with no kills at all) yields a delta
    /// of 0 rather than dividing by zero; everything else still runs.
    pub fn save_round(&mut self, frag_limit: i32) {
        if self.is_ignored {
            return;
        }

        let diff = if frag_limit == 0 {
            0.0
        } else {
            f64::from(self.round_kills) / f64::from(frag_limit)
        };
        self.score += diff;
        self.diff = diff;
        self.score_text = format_score(self.score, self.is_drinking_cider);
        self.diff_text = format_score(diff, self.is_drinking_cider);

        self.kills += self.round_kills;
        self.deaths += self.round_deaths;
        self.rocket_kills += self.round_rocket_kills;
        self.railgun_kills += self.round_railgun_kills;
        self.gauntlet_kills += self.round_gauntlet_kills;
        self.suicide_deaths += self.round_suicide_deaths;
        self.killing_streak = self.killing_streak.max(self.round_best_streak);

        self.clear_round();
        self.recalculate_kill_death_ratio();
    }

    /// Map change: the in-progress round for the outgoing map is thrown
    /// away, nothing is folded.
    pub fn discard_round(&mut self) {
        self.clear_round();
    }

    fn clear_round(&mut self) {
        self.round_kills = 0;
        self.round_deaths = 0;
        self.round_rocket_kills = 0;
        self.round_railgun_kills = 0;
        self.round_gauntlet_kills = 0;
        self.round_suicide_deaths = 0;
        self.round_best_streak = 0;
        self.round_current_streak = 0;
    }

    /// With no deaths the ratio is just the kill count. Otherwise suicide
    /// deaths are carved out of the denominator, which can make it zero or
    /// negative; the resulting infinite or sign-flipped ratio is accepted
    /// as-is.
    pub fn recalculate_kill_death_ratio(&mut self) {
        if self.is_ignored {
            return;
        }
        if self.deaths == 0 {
            self.kill_death_ratio = f64::from(self.kills);
        } else {
            self.kill_death_ratio =
                f64::from(self.kills) / f64::from(self.deaths - self.suicide_deaths);
        }
    }

    /// Shift the current rank into the previous one before overwriting.
    /// Ignored players are never ranked.
    pub fn set_rank(&mut self, rank: u32) {
        if self.is_ignored {
            return;
        }
        self.prev_rank = self.rank;
        self.rank = rank;
    }
}
