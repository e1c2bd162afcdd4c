//! Human-readable summaries for chat notifications.

use rand::seq::IndexedRandom;

use crate::types::ArtistRef;

const NO_NEWS: [&str; 4] = [
    "Nothing new this time around.",
    "All quiet on the release front.",
    "Your artists took the week off.",
    "No fresh releases for you today.",
];

/// Formats a release line as "Artist, Other Artist - Name".
pub fn artist_line(artists: &[ArtistRef], name: &str) -> String {
    let credited: Vec<&str> = artists.iter().map(|a| a.name.as_str()).collect();
    format!("{} - {}", credited.join(", "), name)
}

fn random_no_news() -> &'static str {
    NO_NEWS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(NO_NEWS[0])
}

fn push_section(out: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str(">> ");
    out.push_str(title);
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
}

/// What one weekly playlist update actually queued, grouped the way the
/// notification presents it.
#[derive(Debug, Default)]
pub struct WeeklyStats {
    pub albums: Vec<String>,
    pub singles: Vec<String>,
    pub features: Vec<String>,
}

impl WeeklyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_new(&self) -> bool {
        !(self.albums.is_empty() && self.singles.is_empty() && self.features.is_empty())
    }

    pub fn describe(&self, playlist_name: &str, link: Option<&str>) -> String {
        if !self.has_new() {
            return random_no_news().to_string();
        }

        let mut out = format!("New releases went into \"{}\":\n\n", playlist_name);
        push_section(&mut out, "Albums", &self.albums);
        push_section(&mut out, "Singles", &self.singles);
        push_section(&mut out, "Features", &self.features);
        if let Some(link) = link {
            out.push_str(&format!("Check them out: {}\n", link));
        }
        out
    }
}

/// What one yearly liked-playlist update queued.
#[derive(Debug, Default)]
pub struct YearlyStats {
    pub tracks: Vec<String>,
}

impl YearlyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_new(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn describe(&self, playlist_name: &str, link: Option<&str>) -> String {
        if !self.has_new() {
            return random_no_news().to_string();
        }

        let mut out = format!("Fresh likes went into \"{}\":\n\n", playlist_name);
        push_section(&mut out, "Tracks", &self.tracks);
        if let Some(link) = link {
            out.push_str(&format!("Check them out: {}\n", link));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(name: &str) -> ArtistRef {
        ArtistRef {
            id: name.to_lowercase(),
            name: name.to_string(),
        }
    }

    #[test]
    fn artist_line_joins_credits() {
        let line = artist_line(&[artist("Foo"), artist("Bar")], "Song");
        assert_eq!(line, "Foo, Bar - Song");
    }

    #[test]
    fn has_new_tracks_every_section() {
        let mut weekly = WeeklyStats::new();
        assert!(!weekly.has_new());
        weekly.singles.push("Foo - One".to_string());
        assert!(weekly.has_new());

        let mut yearly = YearlyStats::new();
        assert!(!yearly.has_new());
        yearly.tracks.push("Foo - One".to_string());
        assert!(yearly.has_new());
    }

    #[test]
    fn empty_stats_fall_back_to_no_news() {
        let stats = WeeklyStats::new();
        let text = stats.describe("May W2 2026", None);
        assert!(NO_NEWS.contains(&text.as_str()));
    }

    #[test]
    fn describe_lists_sections_and_link() {
        let mut stats = WeeklyStats::new();
        stats.albums.push("Foo - Record".to_string());
        stats.features.push("Bar - Guest Spot".to_string());

        let text = stats.describe("May W2 2026", Some("spotify:playlist:abc"));
        assert!(text.contains(">> Albums"));
        assert!(text.contains("Foo - Record"));
        assert!(!text.contains(">> Singles"));
        assert!(text.contains(">> Features"));
        assert!(text.contains("spotify:playlist:abc"));
    }
}
