//! Plain-text scoreboard rendering

use tokio::sync::watch;

use crate::game::{Player, ScoreboardSnapshot, SessionMaxima};

/// Tolerance for comparing float stats against a session maximum
const FLOAT_TOLERANCE: f64 = 1e-5;

/// Score above which the top-ranked player has won the game
const WINNING_SCORE: f64 = 16.0;

/// Redraw loop: repaint the scoreboard whenever a new snapshot arrives.
pub async fn run(mut updates: watch::Receiver<ScoreboardSnapshot>) {
    while updates.changed().await.is_ok() {
        let table = {
            let snapshot = updates.borrow_and_update();
            render_table(&snapshot)
        };
        // Clear screen, home cursor, repaint
        print!("\x1b[2J\x1b[H{table}");
    }
}

fn almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_TOLERANCE
}

/// Render the whole scoreboard as fixed-width text. Values sitting at the
/// session maximum get a `*`, the round winner a `»` and the game winner
/// a `♛`.
pub fn render_table(snapshot: &ScoreboardSnapshot) -> String {
    let mut out = String::new();

    let phase = if snapshot.warmup { " (warmup)" } else { "" };
    out.push_str(&format!(
        "💀 Fragwatch — map {}{}\n\n",
        if snapshot.map_name.is_empty() {
            "?"
        } else {
            &snapshot.map_name
        },
        phase
    ));

    out.push_str(&format!(
        "{:>3} {:<8} {:<20} {:>9} {:<18} {:<14} {:>6} {:>7} {:>9} {:>7} {:>8} {:>9} {:>7} {:>9}\n",
        "",
        "Rank",
        "Name",
        "Score",
        "Score 14",
        "Diff 14",
        "Kills",
        "Deaths",
        "Ratio",
        "Rocket",
        "Railgun",
        "Gauntlet",
        "Streak",
        "Suicides",
    ));

    for player in &snapshot.players {
        out.push_str(&render_row(player, &snapshot.maxima));
    }

    out.push_str(&format!(
        "\nround {}  updated {}\n",
        if snapshot.round_id.is_empty() {
            "-"
        } else {
            &snapshot.round_id
        },
        snapshot.generated_at.format("%H:%M:%S"),
    ));

    out
}

fn render_row(player: &Player, maxima: &SessionMaxima) -> String {
    format!(
        "{:>3} {:<8} {:<20} {:>9.4} {:<18} {:<14} {:>6} {:>7} {:>9} {:>7} {:>8} {:>9} {:>7} {:>9}\n",
        winner_marker(player),
        rank_label(player.rank, player.prev_rank),
        player.name,
        player.score,
        player.score_text,
        player.diff_text,
        mark_int(player.kills, maxima.kills),
        mark_int(player.deaths, maxima.deaths),
        mark_float(player.kill_death_ratio, maxima.kill_death_ratio),
        mark_int(player.rocket_kills, maxima.rocket_kills),
        mark_int(player.railgun_kills, maxima.railgun_kills),
        mark_int(player.gauntlet_kills, maxima.gauntlet_kills),
        mark_int(player.killing_streak, maxima.killing_streak),
        mark_int(player.suicide_deaths, maxima.suicides),
    )
}

/// `♛` for the game winner, `»` for whoever took the last round outright.
fn winner_marker(player: &Player) -> &'static str {
    if player.rank == 1 && player.score > WINNING_SCORE {
        "♛"
    } else if almost_equal(player.diff, 1.0) {
        "»"
    } else {
        ""
    }
}

/// Rank with movement against the previous round, e.g. `(+2) 1`. Rank 0
/// means never ranked and renders empty.
fn rank_label(rank: u32, prev_rank: u32) -> String {
    if rank == 0 {
        return String::new();
    }
    if rank != prev_rank && prev_rank != 0 {
        let delta = prev_rank as i64 - rank as i64;
        if delta > 0 {
            format!("(+{delta}) {rank}")
        } else {
            format!("({delta}) {rank}")
        }
    } else {
        format!("{rank}")
    }
}

fn mark_int(value: i32, max: i32) -> String {
    if value == max {
        format!("{value}*")
    } else {
        format!("{value}")
    }
}

fn mark_float(value: f64, max: f64) -> String {
    if almost_equal(value, max) {
        format!("{value:.4}*")
    } else {
        format!("{value:.4}")
    }
}
