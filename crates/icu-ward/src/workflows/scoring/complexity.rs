//! Kinesiology complexity categorization, recorded once per patient per day.

use super::{Band, RangeTable, Scale, TierBand};

const VENTILATORY_SUPPORT: RangeTable = RangeTable {
    variable: "ventilatory_support",
    name: "Ventilatory support",
    unit: None,
    bands: &[
        Band::choice("spontaneous", 1, "Spontaneous breathing"),
        Band::choice("non_invasive", 2, "Non-invasive ventilation or high-flow"),
        Band::choice("invasive_weaning", 3, "Invasive ventilation, weaning"),
        Band::choice("invasive_full", 4, "Invasive ventilation, full support"),
    ],
};

const AIRWAY: RangeTable = RangeTable {
    variable: "airway",
    name: "Airway",
    unit: None,
    bands: &[
        Band::choice("natural", 1, "Natural airway"),
        Band::choice("tracheostomy", 2, "Stable tracheostomy"),
        Band::choice("endotracheal_tube", 3, "Endotracheal tube"),
        Band::choice("difficult_airway", 4, "Artificial airway with difficult management"),
    ],
};

const SECRETIONS: RangeTable = RangeTable {
    variable: "secretions",
    name: "Secretion management",
    unit: None,
    bands: &[
        Band::choice("none", 1, "No secretions"),
        Band::choice("scarce_effective_cough", 2, "Scarce, effective cough"),
        Band::choice("moderate_assisted", 3, "Moderate, assisted clearance"),
        Band::choice("abundant_suction", 4, "Abundant, frequent suctioning"),
    ],
};

const OXYGEN_REQUIREMENT: RangeTable = RangeTable {
    variable: "oxygen_requirement",
    name: "Oxygen requirement",
    unit: None,
    bands: &[
        Band::choice("room_air", 1, "Room air"),
        Band::choice("fio2_lt_40", 2, "FiO2 below 40%"),
        Band::choice("fio2_40_60", 3, "FiO2 40% - 60%"),
        Band::choice("fio2_gt_60", 4, "FiO2 above 60%"),
    ],
};

const MOBILITY: RangeTable = RangeTable {
    variable: "mobility",
    name: "Mobility",
    unit: None,
    bands: &[
        Band::choice("independent", 1, "Independent ambulation"),
        Band::choice("assisted_transfer", 2, "Assisted transfers"),
        Band::choice("bed_active", 3, "Bedridden, active mobilization"),
        Band::choice("bed_passive", 4, "Bedridden, passive mobilization only"),
    ],
};

const CONSCIOUSNESS: RangeTable = RangeTable {
    variable: "consciousness",
    name: "Consciousness and cooperation",
    unit: None,
    bands: &[
        Band::choice("alert_cooperative", 1, "Alert and cooperative"),
        Band::choice("drowsy_partial", 2, "Drowsy, partially cooperative"),
        Band::choice("sedated_responsive", 3, "Sedated, responds to stimuli"),
        Band::choice("deep_sedation", 4, "Deep sedation or coma"),
    ],
};

pub const KINESIOLOGY: Scale = Scale {
    id: "kinesiology_complexity",
    name: "Kinesiology complexity",
    tables: &[
        VENTILATORY_SUPPORT,
        AIRWAY,
        SECRETIONS,
        OXYGEN_REQUIREMENT,
        MOBILITY,
        CONSCIOUSNESS,
    ],
    derived: &[],
    tiers: &[
        TierBand::up_to(11, "Low Complexity", None),
        TierBand::up_to(17, "Medium Complexity", None),
        TierBand::open("High Complexity", None),
    ],
};
