//! Score-to-drink-unit formatting

/// Sips in one beer
const SIPS_PER_BEER: f64 = 14.0;

/// Format a score in the unit the player drinks.
pub fn format_score(score: f64, drinking_cider: bool) -> String {
    if drinking_cider {
        format_ciders(score)
    } else {
        format_beers_and_sips(score)
    }
}

/// Half a score point is one bottle, a bottle is 0.33 of a cider.
/// Singular/plural switches on the cider count, not the raw score.
fn format_ciders(score: f64) -> String {
    let ciders = (score / 0.5) * 0.33;
    if ciders > 1.0 {
        format!("{ciders:.2} ciders")
    } else {
        format!("{ciders:.2} cider")
    }
}

/// Whole beers plus a 14-sip remainder. A zero or negative score has no
/// beer text at all.
fn format_beers_and_sips(score: f64) -> String {
    let mut beers = score.floor() as i64;
    let mut sips = ((score - score.floor()) * SIPS_PER_BEER).round() as i64;

    // 14 sips roll over into a full beer
    if sips == 14 {
        beers += 1;
        sips = 0;
    }

    if beers < 0 || (beers == 0 && sips == 0) {
        return String::new();
    }
    if beers == 0 {
        return sips_label(sips);
    }
    if sips == 0 {
        return beers_label(beers);
    }
    format!("{} & {}", beers_label(beers), sips_label(sips))
}

fn beers_label(count: i64) -> String {
    if count == 1 {
        "1 beer".to_string()
    } else {
        format!("{count} beers")
    }
}

fn sips_label(count: i64) -> String {
    if count == 1 {
        "1 sip".to_string()
    } else {
        format!("{count} sips")
    }
}
