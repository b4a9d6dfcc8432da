use serde::Serialize;

/// How a band is matched: a half-open numeric interval or an exact option id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BandKey {
    /// `[lower, upper)`; `None` leaves that side unbounded.
    Range {
        lower: Option<f64>,
        upper: Option<f64>,
    },
    Choice,
}

impl BandKey {
    fn contains(&self, value: f64) -> bool {
        match self {
            BandKey::Range { lower, upper } => {
                lower.map_or(true, |lower| value >= lower)
                    && upper.map_or(true, |upper| value < upper)
            }
            BandKey::Choice => false,
        }
    }
}

/// One row of a range table. `id` doubles as the option identifier a form submits when the
/// clinician picks the band directly instead of entering a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub id: &'static str,
    pub key: BandKey,
    pub points: u32,
    pub label: &'static str,
}

impl Band {
    pub const fn range(
        id: &'static str,
        lower: Option<f64>,
        upper: Option<f64>,
        points: u32,
        label: &'static str,
    ) -> Self {
        Self {
            id,
            key: BandKey::Range { lower, upper },
            points,
            label,
        }
    }

    pub const fn choice(id: &'static str, points: u32, label: &'static str) -> Self {
        Self {
            id,
            key: BandKey::Choice,
            points,
            label,
        }
    }
}

/// Ordered bands for a single variable, lowest values first.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RangeTable {
    pub variable: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    pub bands: &'static [Band],
}

impl RangeTable {
    /// Band whose interval contains `value`.
    pub fn lookup(&self, value: f64) -> Option<&'static Band> {
        if !value.is_finite() {
            return None;
        }
        self.bands.iter().find(|band| band.key.contains(value))
    }

    /// Band selected by option id.
    pub fn choose(&self, option: &str) -> Option<&'static Band> {
        self.bands.iter().find(|band| band.id == option)
    }

    pub fn accepts_measurements(&self) -> bool {
        self.bands
            .iter()
            .any(|band| matches!(band.key, BandKey::Range { .. }))
    }

    pub fn max_points(&self) -> u32 {
        self.bands.iter().map(|band| band.points).max().unwrap_or(0)
    }

    /// Checks that numeric bands tile the real line: unbounded at both ends, each upper
    /// bound equal to the next lower bound. Option ids must be unique.
    pub fn partition_defects(&self) -> Vec<String> {
        let mut defects = Vec::new();

        for (index, band) in self.bands.iter().enumerate() {
            if self.bands[..index].iter().any(|other| other.id == band.id) {
                defects.push(format!("{}: duplicate option '{}'", self.variable, band.id));
            }
        }

        let ranges: Vec<(Option<f64>, Option<f64>)> = self
            .bands
            .iter()
            .filter_map(|band| match band.key {
                BandKey::Range { lower, upper } => Some((lower, upper)),
                BandKey::Choice => None,
            })
            .collect();

        if ranges.is_empty() {
            return defects;
        }
        if ranges.len() != self.bands.len() {
            defects.push(format!("{}: mixes ranges and choices", self.variable));
        }

        if let Some((Some(lower), _)) = ranges.first() {
            defects.push(format!("{}: bounded below at {lower}", self.variable));
        }
        if let Some((_, Some(upper))) = ranges.last() {
            defects.push(format!("{}: bounded above at {upper}", self.variable));
        }

        for pair in ranges.windows(2) {
            let (current_lower, current_upper) = pair[0];
            let (next_lower, _) = pair[1];
            match (current_upper, next_lower) {
                (Some(upper), Some(lower)) if upper == lower => {}
                (upper, lower) => defects.push(format!(
                    "{}: band ending at {upper:?} does not meet band starting at {lower:?}",
                    self.variable
                )),
            }
            if let (Some(lower), Some(upper)) = (current_lower, current_upper) {
                if lower >= upper {
                    defects.push(format!("{}: empty band [{lower}, {upper})", self.variable));
                }
            }
        }

        defects
    }
}

/// Maps a total score to a tier. `max_total` is inclusive; the last band leaves it open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierBand {
    pub max_total: Option<u32>,
    pub tier: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl TierBand {
    pub const fn up_to(max_total: u32, tier: &'static str, note: Option<&'static str>) -> Self {
        Self {
            max_total: Some(max_total),
            tier,
            note,
        }
    }

    pub const fn open(tier: &'static str, note: Option<&'static str>) -> Self {
        Self {
            max_total: None,
            tier,
            note,
        }
    }
}
