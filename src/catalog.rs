use serde::{Deserialize, Serialize};

pub const COMPOUND_ID_OFFSET: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IntervalCategory {
    Basic,
    Compound,
}

/// One catalog entry. `ratio` is `(upper, lower)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalDef {
    pub id: u32,
    pub harmonic: u32,
    pub name: String,
    pub ratio: (u32, u32),
    pub category: IntervalCategory,
    /// Display-only label of the interval a compound entry was derived from.
    pub parent_name: Option<String>,
}

impl IntervalDef {
    fn basic(id: u32, name: &str, upper: u32, lower: u32) -> Self {
        Self {
            id,
            harmonic: id,
            name: name.to_string(),
            ratio: (upper, lower),
            category: IntervalCategory::Basic,
            parent_name: None,
        }
    }

    pub fn ratio_value(&self) -> f64 {
        self.ratio.0 as f64 / self.ratio.1 as f64
    }

    pub fn ratio_label(&self) -> String {
        format!("{}:{}", self.ratio.0, self.ratio.1)
    }

    pub fn is_compound(&self) -> bool {
        self.category == IntervalCategory::Compound
    }
}

/// Basic set, ids 1..=17.
pub fn basic_intervals() -> Vec<IntervalDef> {
    vec![
        IntervalDef::basic(1, "Unison", 1, 1),
        IntervalDef::basic(2, "Octave", 2, 1),
        IntervalDef::basic(3, "Perfect fifth", 3, 2),
        IntervalDef::basic(4, "Perfect fourth", 4, 3),
        IntervalDef::basic(5, "Major third", 5, 4),
        IntervalDef::basic(6, "Minor third", 6, 5),
        IntervalDef::basic(7, "Harmonic seventh", 7, 4),
        IntervalDef::basic(8, "Major sixth", 5, 3),
        IntervalDef::basic(9, "Minor sixth", 8, 5),
        IntervalDef::basic(10, "Major tone", 9, 8),
        IntervalDef::basic(11, "Minor tone", 10, 9),
        IntervalDef::basic(12, "Diatonic semitone", 16, 15),
        IntervalDef::basic(13, "Chromatic semitone", 25, 24),
        IntervalDef::basic(14, "Augmented fourth", 45, 32),
        IntervalDef::basic(15, "Diminished fifth", 64, 45),
        IntervalDef::basic(16, "Major seventh", 15, 8),
        IntervalDef::basic(17, "Minor seventh", 9, 5),
    ]
}

/// Derive the "Octave + X" entries from a basic set.
pub fn compound_intervals(basics: &[IntervalDef]) -> Vec<IntervalDef> {
    basics
        .iter()
        .filter(|base| base.name != "Unison" && base.name != "Octave")
        .enumerate()
        .map(|(idx, base)| IntervalDef {
            id: COMPOUND_ID_OFFSET + idx as u32 + 1,
            harmonic: 0,
            name: format!("Octave + {}", base.name),
            ratio: (base.ratio.0 * 2, base.ratio.1),
            category: IntervalCategory::Compound,
            parent_name: Some(base.name.clone()),
        })
        .collect()
}

/// Ordered, immutable list of every interval the exam can ask for.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    intervals: Vec<IntervalDef>,
}

impl Catalog {
    pub fn new(intervals: Vec<IntervalDef>) -> Self {
        Self { intervals }
    }

    /// Basics followed by their compounds.
    pub fn standard() -> Self {
        let basics = basic_intervals();
        let compounds = compound_intervals(&basics);
        let mut intervals = basics;
        intervals.extend(compounds);
        Self { intervals }
    }

    pub fn all(&self) -> &[IntervalDef] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&IntervalDef> {
        self.intervals.iter().find(|i| i.id == id)
    }

    pub fn ids(&self) -> Vec<u32> {
        self.intervals.iter().map(|i| i.id).collect()
    }

    pub fn basics(&self) -> impl Iterator<Item = &IntervalDef> {
        self.intervals.iter().filter(|i| !i.is_compound())
    }

    pub fn compounds(&self) -> impl Iterator<Item = &IntervalDef> {
        self.intervals.iter().filter(|i| i.is_compound())
    }

    /// Entries whose id is in `ids`, in catalog order.
    pub fn filter_ids(&self, ids: &[u32]) -> Vec<&IntervalDef> {
        self.intervals
            .iter()
            .filter(|i| ids.contains(&i.id))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
