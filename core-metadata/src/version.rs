//! Version Tag Model
//!
//! Classifies the character of a recording (studio, live, remix, ...) and
//! infers a tag from free-form title/album text. The inference rule is
//! pure, total, and deterministic: every (title, album) pair maps to
//! exactly one of {Live, Remix, Compilation, Remaster, Studio}.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Album keywords that mark a compilation release.
const COMPILATION_KEYWORDS: &[&str] = &["greatest hits", "best of", "collection", "anthology"];

/// A recording's version classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionTag {
    Studio,
    Live,
    Remix,
    Remaster,
    Compilation,
    Instrumental,
    Acoustic,
    Original,
}

impl VersionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionTag::Studio => "studio",
            VersionTag::Live => "live",
            VersionTag::Remix => "remix",
            VersionTag::Remaster => "remaster",
            VersionTag::Compilation => "compilation",
            VersionTag::Instrumental => "instrumental",
            VersionTag::Acoustic => "acoustic",
            VersionTag::Original => "original",
        }
    }

    /// Keyword set used both for inference and for scanning independent
    /// metadata records. Tags without a keyword set (studio, original,
    /// instrumental, acoustic) are confirmed by mere existence instead.
    pub fn keywords(&self) -> Option<&'static [&'static str]> {
        match self {
            VersionTag::Live => Some(&["live"]),
            VersionTag::Remix => Some(&["remix", "mix"]),
            VersionTag::Remaster => Some(&["remaster"]),
            VersionTag::Compilation => Some(COMPILATION_KEYWORDS),
            _ => None,
        }
    }

    /// Whether any of this tag's keywords occurs in `text`
    /// (case-insensitive). Tags without keywords never match.
    pub fn matches_text(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords()
            .map(|keywords| keywords.iter().any(|k| lowered.contains(k)))
            .unwrap_or(false)
    }
}

impl FromStr for VersionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "studio" => Ok(VersionTag::Studio),
            "live" => Ok(VersionTag::Live),
            "remix" => Ok(VersionTag::Remix),
            "remaster" => Ok(VersionTag::Remaster),
            "compilation" => Ok(VersionTag::Compilation),
            "instrumental" => Ok(VersionTag::Instrumental),
            "acoustic" => Ok(VersionTag::Acoustic),
            "original" => Ok(VersionTag::Original),
            _ => Err(format!("unknown version tag: {}", s)),
        }
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Infer a candidate's version tag from its title and album text.
///
/// Priority order matters: a live cut on a greatest-hits album is still
/// live.
pub fn infer_version(title: &str, album: &str) -> VersionTag {
    let title_lower = title.to_lowercase();
    let album_lower = album.to_lowercase();

    if title_lower.contains("live") || album_lower.contains("live") {
        return VersionTag::Live;
    }
    if title_lower.contains("remix") || title_lower.contains("mix") {
        return VersionTag::Remix;
    }
    if COMPILATION_KEYWORDS.iter().any(|k| album_lower.contains(k)) {
        return VersionTag::Compilation;
    }
    if title_lower.contains("remaster") || album_lower.contains("remaster") {
        return VersionTag::Remaster;
    }
    VersionTag::Studio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_live() {
        assert_eq!(infer_version("Song (Live at Wembley)", "Album"), VersionTag::Live);
        assert_eq!(infer_version("Song", "Live in Tokyo"), VersionTag::Live);
    }

    #[test]
    fn test_infer_remix() {
        assert_eq!(infer_version("Song (Club Remix)", "Album"), VersionTag::Remix);
        assert_eq!(infer_version("Song (Extended Mix)", "Album"), VersionTag::Remix);
    }

    #[test]
    fn test_infer_compilation_from_album() {
        assert_eq!(
            infer_version("Song", "Greatest Hits Vol. 2"),
            VersionTag::Compilation
        );
        assert_eq!(infer_version("Song", "The Best of Band"), VersionTag::Compilation);
    }

    #[test]
    fn test_infer_remaster() {
        assert_eq!(
            infer_version("Song - 2011 Remaster", "Album"),
            VersionTag::Remaster
        );
        assert_eq!(infer_version("Song", "Album (Remastered)"), VersionTag::Remaster);
    }

    #[test]
    fn test_infer_studio_default() {
        assert_eq!(infer_version("Song", "Album"), VersionTag::Studio);
    }

    #[test]
    fn test_live_takes_priority_over_compilation() {
        assert_eq!(
            infer_version("Song (Live)", "Greatest Hits"),
            VersionTag::Live
        );
    }

    #[test]
    fn test_inference_is_total() {
        // Any input maps to exactly one of the five inferable tags.
        for (title, album) in [
            ("", ""),
            ("Weird Ünïcode 🎶", "Öther"),
            ("mixtape", "collection"),
        ] {
            let tag = infer_version(title, album);
            assert!(matches!(
                tag,
                VersionTag::Studio
                    | VersionTag::Live
                    | VersionTag::Remix
                    | VersionTag::Remaster
                    | VersionTag::Compilation
            ));
        }
    }

    #[test]
    fn test_keyword_matching() {
        assert!(VersionTag::Live.matches_text("Recorded LIVE at the Apollo"));
        assert!(VersionTag::Remix.matches_text("1999 club mix"));
        assert!(!VersionTag::Remaster.matches_text("plain studio take"));
        // Tags without keyword sets never match by text.
        assert!(!VersionTag::Studio.matches_text("studio"));
    }

    #[test]
    fn test_from_str_roundtrip() {
        for tag in [
            VersionTag::Studio,
            VersionTag::Live,
            VersionTag::Remix,
            VersionTag::Remaster,
            VersionTag::Compilation,
            VersionTag::Instrumental,
            VersionTag::Acoustic,
            VersionTag::Original,
        ] {
            assert_eq!(tag.as_str().parse::<VersionTag>().unwrap(), tag);
        }
        assert!("bootleg".parse::<VersionTag>().is_err());
    }
}
