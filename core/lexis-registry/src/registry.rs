use std::collections::{BTreeMap, HashMap};

use lexis_morph::codec::MAX_LEMMA_ID;
use lexis_protocol::{LemmaId, PosFamily};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

pub const REGISTRY_VERSION: u32 = 1;

/// Closed interval of identities reserved for one part-of-speech family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionRange {
    pub start: u32,
    pub max: u32,
}

impl PartitionRange {
    pub const NOUNS: Self = Self::new(10_001, 69_999);
    pub const VERBS: Self = Self::new(70_001, 99_999);

    pub const fn new(start: u32, max: u32) -> Self {
        Self { start, max }
    }

    pub fn contains(&self, id: u32) -> bool {
        (self.start..=self.max).contains(&id)
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.max && other.start <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryRanges {
    pub nouns: PartitionRange,
    pub verbs: PartitionRange,
}

impl Default for RegistryRanges {
    fn default() -> Self {
        Self {
            nouns: PartitionRange::NOUNS,
            verbs: PartitionRange::VERBS,
        }
    }
}

impl RegistryRanges {
    pub fn get(&self, family: PosFamily) -> PartitionRange {
        match family {
            PosFamily::Noun => self.nouns,
            PosFamily::Verb => self.verbs,
        }
    }

    /// Ranges must be non-empty, disjoint and encodable as form-id lemmas.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for (family, range) in [(PosFamily::Noun, self.nouns), (PosFamily::Verb, self.verbs)] {
            if range.start == 0 || range.start > range.max {
                return Err(RegistryError::InvalidRanges(format!(
                    "{family} range {}-{} is empty or starts at zero",
                    range.start, range.max
                )));
            }
            if range.max > MAX_LEMMA_ID {
                return Err(RegistryError::InvalidRanges(format!(
                    "{family} range {}-{} exceeds the form-id lemma bound {MAX_LEMMA_ID}",
                    range.start, range.max
                )));
            }
        }
        if self.nouns.overlaps(&self.verbs) {
            return Err(RegistryError::InvalidRanges(format!(
                "noun range {}-{} overlaps verb range {}-{}",
                self.nouns.start, self.nouns.max, self.verbs.start, self.verbs.max
            )));
        }
        Ok(())
    }
}

/// Persistent `{normalized lemma -> id}` mapping, one partition per family.
///
/// Entries are only ever appended. Keys are kept in a `BTreeMap` so the
/// serialized document is stable between saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaRegistry {
    version: u32,
    next_noun_id: u32,
    next_verb_id: u32,
    nouns: BTreeMap<String, u32>,
    verbs: BTreeMap<String, u32>,
    #[serde(skip)]
    ranges: RegistryRanges,
}

impl Default for LemmaRegistry {
    fn default() -> Self {
        Self::new(RegistryRanges::default())
    }
}

impl LemmaRegistry {
    /// Empty registry with each watermark at the start of its range.
    pub fn new(ranges: RegistryRanges) -> Self {
        Self {
            version: REGISTRY_VERSION,
            next_noun_id: ranges.nouns.start,
            next_verb_id: ranges.verbs.start,
            nouns: BTreeMap::new(),
            verbs: BTreeMap::new(),
            ranges,
        }
    }

    /// Re-attaches the configured ranges after deserialization.
    pub(crate) fn with_ranges(mut self, ranges: RegistryRanges) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn ranges(&self) -> RegistryRanges {
        self.ranges
    }

    fn partition(&self, family: PosFamily) -> (&BTreeMap<String, u32>, u32) {
        match family {
            PosFamily::Noun => (&self.nouns, self.next_noun_id),
            PosFamily::Verb => (&self.verbs, self.next_verb_id),
        }
    }

    fn partition_mut(&mut self, family: PosFamily) -> (&mut BTreeMap<String, u32>, &mut u32) {
        match family {
            PosFamily::Noun => (&mut self.nouns, &mut self.next_noun_id),
            PosFamily::Verb => (&mut self.verbs, &mut self.next_verb_id),
        }
    }

    pub fn get(&self, family: PosFamily, lemma: &str) -> Option<LemmaId> {
        self.partition(family).0.get(lemma).copied().map(LemmaId)
    }

    /// The watermark: identity the next unseen lemma of `family` would get.
    pub fn next_id(&self, family: PosFamily) -> u32 {
        self.partition(family).1
    }

    pub fn len(&self, family: PosFamily) -> usize {
        self.partition(family).0.len()
    }

    pub fn total_len(&self) -> usize {
        self.nouns.len() + self.verbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    pub fn entries(&self, family: PosFamily) -> impl Iterator<Item = (&str, LemmaId)> {
        self.partition(family)
            .0
            .iter()
            .map(|(lemma, id)| (lemma.as_str(), LemmaId(*id)))
    }

    /// Returns the existing identity of `lemma`, or issues the watermark.
    ///
    /// Fails without touching the watermark once the range is exhausted.
    pub fn get_or_assign(&mut self, family: PosFamily, lemma: &str) -> Result<LemmaId, RegistryError> {
        if let Some(id) = self.get(family, lemma) {
            return Ok(id);
        }

        let range = self.ranges.get(family);
        let (entries, next) = self.partition_mut(family);
        let id = *next;
        if id > range.max {
            return Err(RegistryError::Overflow {
                family,
                lemma: lemma.to_string(),
                next: id,
                max: range.max,
            });
        }

        entries.insert(lemma.to_string(), id);
        *next = id + 1;
        Ok(LemmaId(id))
    }

    /// Assigns identities to every unseen lemma, most frequent first.
    ///
    /// `candidates` may repeat a lemma (one item per sense row); its highest
    /// frequency counts. Returns the number of newly assigned lemmas.
    pub fn populate<'a, I>(&mut self, family: PosFamily, candidates: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let before = self.len(family);
        for (lemma, _) in rank_by_frequency(candidates) {
            self.get_or_assign(family, lemma)?;
        }
        Ok(self.len(family) - before)
    }

    /// Checks version, ranges, watermarks and uniqueness of every identity.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.version != REGISTRY_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                found: self.version,
                expected: REGISTRY_VERSION,
            });
        }
        self.ranges.validate()?;

        for family in [PosFamily::Noun, PosFamily::Verb] {
            let range = self.ranges.get(family);
            let (entries, next) = self.partition(family);

            let mut owners: HashMap<u32, &str> = HashMap::with_capacity(entries.len());
            let mut max_issued = 0;
            for (lemma, &id) in entries {
                if !range.contains(id) {
                    return Err(RegistryError::IdOutOfRange {
                        family,
                        lemma: lemma.clone(),
                        id,
                        start: range.start,
                        max: range.max,
                    });
                }
                if let Some(first) = owners.insert(id, lemma) {
                    return Err(RegistryError::Collision {
                        family,
                        id,
                        first: first.to_string(),
                        second: lemma.clone(),
                    });
                }
                max_issued = max_issued.max(id);
            }

            let limit = range.max + 1;
            if next < range.start || next > limit || next <= max_issued {
                return Err(RegistryError::Watermark {
                    family,
                    next,
                    start: range.start,
                    limit,
                    max_issued,
                });
            }
        }

        Ok(())
    }

    /// Asserts that every mapping of `original` survives unchanged in `self`.
    pub fn verify_extends(&self, original: &LemmaRegistry) -> Result<(), RegistryError> {
        for family in [PosFamily::Noun, PosFamily::Verb] {
            let current = self.partition(family).0;
            for (lemma, &original_id) in original.partition(family).0 {
                match current.get(lemma) {
                    None => {
                        return Err(RegistryError::Removed {
                            family,
                            lemma: lemma.clone(),
                        })
                    }
                    Some(&id) if id != original_id => {
                        return Err(RegistryError::Changed {
                            family,
                            lemma: lemma.clone(),
                            original: original_id,
                            current: id,
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

/// Collapses repeated lemmas to their highest frequency and orders them by
/// frequency descending, ties by lemma text ascending.
pub fn rank_by_frequency<'a, I>(candidates: I) -> Vec<(&'a str, u32)>
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    let mut best: HashMap<&'a str, u32> = HashMap::new();
    for (lemma, frequency) in candidates {
        let entry = best.entry(lemma).or_insert(frequency);
        *entry = (*entry).max(frequency);
    }

    let mut ranked: Vec<_> = best.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}
