use serde::Serialize;

/// The four surface forms the service ever predicts among.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Candidate {
    #[serde(rename = "die")]
    Die,
    #[serde(rename = "dat")]
    Dat,
    #[serde(rename = "Die")]
    DieCapitalized,
    #[serde(rename = "Dat")]
    DatCapitalized,
}

impl Candidate {
    /// Fixed candidate order. Score vectors are indexed in this order.
    pub const ALL: [Candidate; 4] = [
        Candidate::Die,
        Candidate::Dat,
        Candidate::DieCapitalized,
        Candidate::DatCapitalized,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Candidate::Die => "die",
            Candidate::Dat => "dat",
            Candidate::DieCapitalized => "Die",
            Candidate::DatCapitalized => "Dat",
        }
    }

    /// The homophone with the same capitalization.
    pub fn swapped(self) -> Self {
        match self {
            Candidate::Die => Candidate::Dat,
            Candidate::Dat => Candidate::Die,
            Candidate::DieCapitalized => Candidate::DatCapitalized,
            Candidate::DatCapitalized => Candidate::DieCapitalized,
        }
    }

    /// Exact, case-sensitive lookup of a bare word.
    pub fn from_word(word: &str) -> Option<Self> {
        Candidate::ALL.into_iter().find(|c| c.as_str() == word)
    }
}

/// Case-insensitive marker table: `_die_` / `_dat_` keyed by lowercase body,
/// capitalized when the first letter inside the underscores is upper case.
const MARKER_TABLE: [(&str, Candidate, Candidate); 2] = [
    ("die", Candidate::Die, Candidate::DieCapitalized),
    ("dat", Candidate::Dat, Candidate::DatCapitalized),
];

/// A word wrapped in underscores naming the ambiguous slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub own: Candidate,
}

impl Marker {
    /// Parses `_die_`, `_Dat_`, `_DIE_`, ... Returns `None` for anything else.
    pub fn parse(word: &str) -> Option<Self> {
        let body = word.strip_prefix('_')?.strip_suffix('_')?;
        let capitalized = body.chars().next()?.is_uppercase();
        let key = body.to_lowercase();
        MARKER_TABLE
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|&(_, lower, upper)| Marker {
                own: if capitalized { upper } else { lower },
            })
    }

    pub fn swapped(self) -> Candidate {
        self.own.swapped()
    }
}

/// Verdict comparing a prediction with the token the user wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpretation {
    Correct,
    Incorrect,
}

impl Interpretation {
    pub fn from_match(matches: bool) -> Self {
        if matches {
            Interpretation::Correct
        } else {
            Interpretation::Incorrect
        }
    }
}

/// Raw model scores for each candidate, in [`Candidate::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScores(pub [f32; 4]);

impl CandidateScores {
    /// Highest-scoring candidate and its raw score. Ties keep the earlier candidate.
    pub fn best(&self) -> (Candidate, f32) {
        let mut best = 0;
        for (i, score) in self.0.iter().enumerate().skip(1) {
            if *score > self.0[best] {
                best = i;
            }
        }
        (Candidate::ALL[best], self.0[best])
    }
}
