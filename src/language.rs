use crate::LanguageTrack;

/// Note attached to records whose language was not one the caller asked for
pub const FALLBACK_NOTE: &str = "fallback language";

/// Track-selection strategies, tried in order until one yields a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// A track whose code equals a preferred code, per code in preference order
    Exact,
    /// A generated track whose code starts with a preferred code, else the first generated
    Generated,
    /// The first track in the listing
    AnyTrack,
}

impl Pass {
    pub const ORDER: [Pass; 3] = [Pass::Exact, Pass::Generated, Pass::AnyTrack];

    fn select<'a>(self, tracks: &'a [LanguageTrack], preferred: &[String]) -> Option<&'a LanguageTrack> {
        match self {
            Pass::Exact => preferred.iter().find_map(|code| exact_match(tracks, code)),
            Pass::Generated => {
                let generated: Vec<&LanguageTrack> = tracks.iter().filter(|t| t.is_generated).collect();
                preferred
                    .iter()
                    .find_map(|code| {
                        generated
                            .iter()
                            .copied()
                            .find(|t| t.language_code.starts_with(code.as_str()))
                    })
                    .or_else(|| generated.first().copied())
            }
            Pass::AnyTrack => tracks.first(),
        }
    }
}

// Manual tracks win over generated ones carrying the same code
fn exact_match<'a>(tracks: &'a [LanguageTrack], code: &str) -> Option<&'a LanguageTrack> {
    tracks
        .iter()
        .find(|t| !t.is_generated && t.language_code == code)
        .or_else(|| tracks.iter().find(|t| t.is_generated && t.language_code == code))
}

/// The track chosen for a video and the pass that chose it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub track: &'a LanguageTrack,
    pub pass: Pass,
}

impl Resolution<'_> {
    /// Whether the chosen language falls outside the caller's preferences
    pub fn is_fallback(&self, preferred: &[String]) -> bool {
        match self.pass {
            Pass::Exact => false,
            Pass::Generated => !preferred
                .iter()
                .any(|code| self.track.language_code.starts_with(code.as_str())),
            Pass::AnyTrack => true,
        }
    }
}

/// Pick a track using the exact, generated and any-track passes in order
pub fn resolve_track<'a>(tracks: &'a [LanguageTrack], preferred: &[String]) -> Option<Resolution<'a>> {
    Pass::ORDER
        .iter()
        .find_map(|&pass| pass.select(tracks, preferred).map(|track| Resolution { track, pass }))
}

/// Candidates for an any-language fetch: generated tracks first, then manual
pub fn any_language_candidates(tracks: &[LanguageTrack]) -> Vec<&LanguageTrack> {
    let (generated, manual): (Vec<&LanguageTrack>, Vec<&LanguageTrack>) = tracks.iter().partition(|t| t.is_generated);
    generated.into_iter().chain(manual).collect()
}
