//! Log file following and line dispatch

use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::game::{ScoreboardSnapshot, Session};
use crate::parser;

/// How long to wait before re-checking a file that has no new data
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Follow a growing log file: existing content is consumed from the start,
/// then the file is polled for appended lines. Each complete line runs
/// classify → dispatch → possible round close before the next snapshot is
/// published, so readers never see a half-applied line.
pub async fn follow(
    path: &Path,
    mut session: Session,
    updates: watch::Sender<ScoreboardSnapshot>,
) -> anyhow::Result<()> {
    let file = File::open(path).await?;
    let mut reader = BufReader::new(file);
    info!(path = %path.display(), "tailing log file");

    // Lines can land in the file in pieces; hold the partial tail until the
    // newline arrives
    let mut pending = String::new();
    loop {
        let mut chunk = String::new();
        let read = reader.read_line(&mut chunk).await?;
        if read == 0 {
            sleep(POLL_INTERVAL).await;
            continue;
        }

        pending.push_str(&chunk);
        if !pending.ends_with('\n') {
            continue;
        }

        let line = pending.trim_end_matches(['\n', '\r']).to_string();
        pending.clear();

        process_line(&line, &mut session);
        // Renderer may already be gone during shutdown
        let _ = updates.send(session.snapshot());
    }
}

/// Process one line. Every parse error is local to its line: log it and
/// move on.
pub fn process_line(line: &str, session: &mut Session) {
    match parser::classify(line) {
        Ok(event) => session.apply(event),
        Err(err) => warn!(%err, "discarding line"),
    }
}
