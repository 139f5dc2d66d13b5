// Province -> population reference table used to fill `city_pop` on scoring requests.
use crate::error::{EngineError, EngineResult};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeMap;
use std::io::Read;

const BUNDLED_PROVINCES: &str = include_str!("provinces.csv");

/// Immutable province table. Keys are lower-case and free of diacritics; the
/// lookup only lower-cases and trims, so callers fold accents themselves
/// (see [`fold_diacritics`]).
#[derive(Debug, Clone)]
pub struct ReferenceLookup {
    populations: BTreeMap<String, u64>,
}

impl ReferenceLookup {
    /// The 63 Vietnamese provinces and centrally-run cities, plus the `hanoi`
    /// and `hcm` spellings.
    pub fn bundled() -> EngineResult<Self> {
        Self::from_reader(BUNDLED_PROVINCES.as_bytes())
    }

    // CSV Header: name,population
    pub fn from_reader<R: Read>(reader: R) -> EngineResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut populations = BTreeMap::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;

            let name = record
                .get(0)
                .map(normalize_key)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| EngineError::ReferenceDataError(format!("Missing province name at line {}", line)))?;
            let population_str = record
                .get(1)
                .ok_or_else(|| EngineError::ReferenceDataError(format!("Missing population at line {}", line)))?;
            let population = population_str
                .parse::<u64>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| {
                    EngineError::ReferenceDataError(format!(
                        "Invalid population '{}' for '{}' at line {}",
                        population_str, name, line
                    ))
                })?;

            if populations.insert(name.clone(), population).is_some() {
                return Err(EngineError::ReferenceDataError(format!(
                    "Duplicate province '{}' at line {}",
                    name, line
                )));
            }
        }

        tracing::debug!(entries = populations.len(), "Loaded province reference table");
        Ok(ReferenceLookup { populations })
    }

    pub fn population_of(&self, name: &str) -> Option<u64> {
        self.populations.get(&normalize_key(name)).copied()
    }

    pub fn is_valid_city(&self, name: &str) -> bool {
        self.population_of(name).is_some()
    }

    /// All entries, ordered by name.
    pub fn provinces(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.populations.iter().map(|(name, pop)| (name.as_str(), *pop))
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }
}

fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

const VIETNAMESE_FOLDS: &[(&str, char)] = &[
    ("àáảãạăằắẳẵặâầấẩẫậ", 'a'),
    ("ÀÁẢÃẠĂẰẮẲẴẶÂẦẤẨẪẬ", 'A'),
    ("èéẻẽẹêềếểễệ", 'e'),
    ("ÈÉẺẼẸÊỀẾỂỄỆ", 'E'),
    ("ìíỉĩị", 'i'),
    ("ÌÍỈĨỊ", 'I'),
    ("òóỏõọôồốổỗộơờớởỡợ", 'o'),
    ("ÒÓỎÕỌÔỒỐỔỖỘƠỜỚỞỠỢ", 'O'),
    ("ùúủũụưừứửữự", 'u'),
    ("ÙÚỦŨỤƯỪỨỬỮỰ", 'U'),
    ("ỳýỷỹỵ", 'y'),
    ("ỲÝỶỸỴ", 'Y'),
    ("đ", 'd'),
    ("Đ", 'D'),
];

/// Folds Vietnamese letters to their ASCII base ("Hà Nội" -> "Ha Noi").
/// Combining marks from decomposed input are dropped.
pub fn fold_diacritics(name: &str) -> String {
    name.chars()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .map(|c| {
            VIETNAMESE_FOLDS
                .iter()
                .find(|(accented, _)| accented.contains(c))
                .map_or(c, |(_, base)| *base)
        })
        .collect()
}
