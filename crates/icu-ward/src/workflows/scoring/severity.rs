//! APACHE II acute physiology and chronic health evaluation.
//!
//! Physiology values are the worst recorded in the first 24 hours. Age points are derived
//! from the patient's birth date and never entered by hand.

use super::{Band, RangeTable, Scale, TierBand};

pub const AGE: &str = "age";
pub const CHRONIC_HEALTH: &str = "chronic_health";

const TEMPERATURE: RangeTable = RangeTable {
    variable: "temperature",
    name: "Rectal temperature",
    unit: Some("°C"),
    bands: &[
        Band::range("lt_30", None, Some(30.0), 4, "<= 29.9"),
        Band::range("30_31_9", Some(30.0), Some(32.0), 3, "30 - 31.9"),
        Band::range("32_33_9", Some(32.0), Some(34.0), 2, "32 - 33.9"),
        Band::range("34_35_9", Some(34.0), Some(36.0), 1, "34 - 35.9"),
        Band::range("36_38_4", Some(36.0), Some(38.5), 0, "36 - 38.4"),
        Band::range("38_5_38_9", Some(38.5), Some(39.0), 1, "38.5 - 38.9"),
        Band::range("39_40_9", Some(39.0), Some(41.0), 3, "39 - 40.9"),
        Band::range("ge_41", Some(41.0), None, 4, ">= 41"),
    ],
};

const MEAN_ARTERIAL_PRESSURE: RangeTable = RangeTable {
    variable: "mean_arterial_pressure",
    name: "Mean arterial pressure",
    unit: Some("mmHg"),
    bands: &[
        Band::range("lt_50", None, Some(50.0), 4, "<= 49"),
        Band::range("50_69", Some(50.0), Some(70.0), 2, "50 - 69"),
        Band::range("70_109", Some(70.0), Some(110.0), 0, "70 - 109"),
        Band::range("110_129", Some(110.0), Some(130.0), 2, "110 - 129"),
        Band::range("130_159", Some(130.0), Some(160.0), 3, "130 - 159"),
        Band::range("ge_160", Some(160.0), None, 4, ">= 160"),
    ],
};

const HEART_RATE: RangeTable = RangeTable {
    variable: "heart_rate",
    name: "Heart rate",
    unit: Some("bpm"),
    bands: &[
        Band::range("lt_40", None, Some(40.0), 4, "<= 39"),
        Band::range("40_54", Some(40.0), Some(55.0), 3, "40 - 54"),
        Band::range("55_69", Some(55.0), Some(70.0), 2, "55 - 69"),
        Band::range("70_109", Some(70.0), Some(110.0), 0, "70 - 109"),
        Band::range("110_139", Some(110.0), Some(140.0), 2, "110 - 139"),
        Band::range("140_179", Some(140.0), Some(180.0), 3, "140 - 179"),
        Band::range("ge_180", Some(180.0), None, 4, ">= 180"),
    ],
};

const RESPIRATORY_RATE: RangeTable = RangeTable {
    variable: "respiratory_rate",
    name: "Respiratory rate",
    unit: Some("breaths/min"),
    bands: &[
        Band::range("lt_6", None, Some(6.0), 4, "<= 5"),
        Band::range("6_9", Some(6.0), Some(10.0), 2, "6 - 9"),
        Band::range("10_11", Some(10.0), Some(12.0), 1, "10 - 11"),
        Band::range("12_24", Some(12.0), Some(25.0), 0, "12 - 24"),
        Band::range("25_34", Some(25.0), Some(35.0), 1, "25 - 34"),
        Band::range("35_49", Some(35.0), Some(50.0), 3, "35 - 49"),
        Band::range("ge_50", Some(50.0), None, 4, ">= 50"),
    ],
};

// A-aDO2 applies when FiO2 >= 0.5, PaO2 otherwise; the form offers both families.
const OXYGENATION: RangeTable = RangeTable {
    variable: "oxygenation",
    name: "Oxygenation",
    unit: Some("mmHg"),
    bands: &[
        Band::choice("aado2_ge_500", 4, "FiO2 >= 0.5, A-aDO2 >= 500"),
        Band::choice("aado2_350_499", 3, "FiO2 >= 0.5, A-aDO2 350 - 499"),
        Band::choice("aado2_200_349", 2, "FiO2 >= 0.5, A-aDO2 200 - 349"),
        Band::choice("aado2_lt_200", 0, "FiO2 >= 0.5, A-aDO2 < 200"),
        Band::choice("pao2_gt_70", 0, "FiO2 < 0.5, PaO2 > 70"),
        Band::choice("pao2_61_70", 1, "FiO2 < 0.5, PaO2 61 - 70"),
        Band::choice("pao2_55_60", 3, "FiO2 < 0.5, PaO2 55 - 60"),
        Band::choice("pao2_lt_55", 4, "FiO2 < 0.5, PaO2 < 55"),
    ],
};

const ARTERIAL_PH: RangeTable = RangeTable {
    variable: "arterial_ph",
    name: "Arterial pH",
    unit: None,
    bands: &[
        Band::range("lt_7_15", None, Some(7.15), 4, "< 7.15"),
        Band::range("7_15_7_24", Some(7.15), Some(7.25), 3, "7.15 - 7.24"),
        Band::range("7_25_7_32", Some(7.25), Some(7.33), 2, "7.25 - 7.32"),
        Band::range("7_33_7_49", Some(7.33), Some(7.5), 0, "7.33 - 7.49"),
        Band::range("7_5_7_59", Some(7.5), Some(7.6), 1, "7.5 - 7.59"),
        Band::range("7_6_7_69", Some(7.6), Some(7.7), 3, "7.6 - 7.69"),
        Band::range("ge_7_7", Some(7.7), None, 4, ">= 7.7"),
    ],
};

const SODIUM: RangeTable = RangeTable {
    variable: "sodium",
    name: "Serum sodium",
    unit: Some("mmol/L"),
    bands: &[
        Band::range("le_110", None, Some(111.0), 4, "<= 110"),
        Band::range("111_119", Some(111.0), Some(120.0), 3, "111 - 119"),
        Band::range("120_129", Some(120.0), Some(130.0), 2, "120 - 129"),
        Band::range("130_149", Some(130.0), Some(150.0), 0, "130 - 149"),
        Band::range("150_154", Some(150.0), Some(155.0), 1, "150 - 154"),
        Band::range("155_159", Some(155.0), Some(160.0), 2, "155 - 159"),
        Band::range("160_179", Some(160.0), Some(180.0), 3, "160 - 179"),
        Band::range("ge_180", Some(180.0), None, 4, ">= 180"),
    ],
};

const POTASSIUM: RangeTable = RangeTable {
    variable: "potassium",
    name: "Serum potassium",
    unit: Some("mmol/L"),
    bands: &[
        Band::range("lt_2_5", None, Some(2.5), 4, "< 2.5"),
        Band::range("2_5_2_9", Some(2.5), Some(3.0), 2, "2.5 - 2.9"),
        Band::range("3_3_4", Some(3.0), Some(3.5), 1, "3 - 3.4"),
        Band::range("3_5_5_4", Some(3.5), Some(5.5), 0, "3.5 - 5.4"),
        Band::range("5_5_5_9", Some(5.5), Some(6.0), 1, "5.5 - 5.9"),
        Band::range("6_6_9", Some(6.0), Some(7.0), 3, "6 - 6.9"),
        Band::range("ge_7", Some(7.0), None, 4, ">= 7"),
    ],
};

const CREATININE: RangeTable = RangeTable {
    variable: "creatinine",
    name: "Serum creatinine",
    unit: Some("mg/dL"),
    bands: &[
        Band::range("lt_0_6", None, Some(0.6), 2, "< 0.6"),
        Band::range("0_6_1_4", Some(0.6), Some(1.5), 0, "0.6 - 1.4"),
        Band::range("1_5_1_9", Some(1.5), Some(2.0), 2, "1.5 - 1.9"),
        Band::range("2_3_4", Some(2.0), Some(3.5), 3, "2 - 3.4"),
        Band::range("ge_3_5", Some(3.5), None, 4, ">= 3.5"),
    ],
};

const HEMATOCRIT: RangeTable = RangeTable {
    variable: "hematocrit",
    name: "Hematocrit",
    unit: Some("%"),
    bands: &[
        Band::range("lt_20", None, Some(20.0), 4, "< 20"),
        Band::range("20_29_9", Some(20.0), Some(30.0), 2, "20 - 29.9"),
        Band::range("30_45_9", Some(30.0), Some(46.0), 0, "30 - 45.9"),
        Band::range("46_49_9", Some(46.0), Some(50.0), 1, "46 - 49.9"),
        Band::range("50_59_9", Some(50.0), Some(60.0), 2, "50 - 59.9"),
        Band::range("ge_60", Some(60.0), None, 4, ">= 60"),
    ],
};

const WHITE_BLOOD_CELLS: RangeTable = RangeTable {
    variable: "white_blood_cells",
    name: "White blood cell count",
    unit: Some("x1000/mm³"),
    bands: &[
        Band::range("lt_1", None, Some(1.0), 4, "< 1"),
        Band::range("1_2_9", Some(1.0), Some(3.0), 2, "1 - 2.9"),
        Band::range("3_14_9", Some(3.0), Some(15.0), 0, "3 - 14.9"),
        Band::range("15_19_9", Some(15.0), Some(20.0), 1, "15 - 19.9"),
        Band::range("20_39_9", Some(20.0), Some(40.0), 2, "20 - 39.9"),
        Band::range("ge_40", Some(40.0), None, 4, ">= 40"),
    ],
};

// Points are 15 minus the observed score.
const GLASGOW_COMA_SCALE: RangeTable = RangeTable {
    variable: "glasgow_coma_scale",
    name: "Glasgow coma scale",
    unit: None,
    bands: &[
        Band::range("gcs_3", None, Some(4.0), 12, "3"),
        Band::range("gcs_4", Some(4.0), Some(5.0), 11, "4"),
        Band::range("gcs_5", Some(5.0), Some(6.0), 10, "5"),
        Band::range("gcs_6", Some(6.0), Some(7.0), 9, "6"),
        Band::range("gcs_7", Some(7.0), Some(8.0), 8, "7"),
        Band::range("gcs_8", Some(8.0), Some(9.0), 7, "8"),
        Band::range("gcs_9", Some(9.0), Some(10.0), 6, "9"),
        Band::range("gcs_10", Some(10.0), Some(11.0), 5, "10"),
        Band::range("gcs_11", Some(11.0), Some(12.0), 4, "11"),
        Band::range("gcs_12", Some(12.0), Some(13.0), 3, "12"),
        Band::range("gcs_13", Some(13.0), Some(14.0), 2, "13"),
        Band::range("gcs_14", Some(14.0), Some(15.0), 1, "14"),
        Band::range("gcs_15", Some(15.0), None, 0, "15"),
    ],
};

const AGE_POINTS: RangeTable = RangeTable {
    variable: AGE,
    name: "Age",
    unit: Some("years"),
    bands: &[
        Band::range("le_44", None, Some(45.0), 0, "<= 44"),
        Band::range("45_54", Some(45.0), Some(55.0), 2, "45 - 54"),
        Band::range("55_64", Some(55.0), Some(65.0), 3, "55 - 64"),
        Band::range("65_74", Some(65.0), Some(75.0), 5, "65 - 74"),
        Band::range("ge_75", Some(75.0), None, 6, ">= 75"),
    ],
};

const CHRONIC_HEALTH_POINTS: RangeTable = RangeTable {
    variable: CHRONIC_HEALTH,
    name: "Chronic health",
    unit: None,
    bands: &[
        Band::choice("none", 0, "No severe organ insufficiency or immunocompromise"),
        Band::choice(
            "elective_postoperative",
            2,
            "Organ insufficiency or immunocompromise, elective postoperative",
        ),
        Band::choice(
            "nonoperative_or_emergency_postoperative",
            5,
            "Organ insufficiency or immunocompromise, non-operative or emergency postoperative",
        ),
    ],
};

pub const APACHE_II: Scale = Scale {
    id: "apache_ii",
    name: "APACHE II",
    tables: &[
        TEMPERATURE,
        MEAN_ARTERIAL_PRESSURE,
        HEART_RATE,
        RESPIRATORY_RATE,
        OXYGENATION,
        ARTERIAL_PH,
        SODIUM,
        POTASSIUM,
        CREATININE,
        HEMATOCRIT,
        WHITE_BLOOD_CELLS,
        GLASGOW_COMA_SCALE,
        AGE_POINTS,
        CHRONIC_HEALTH_POINTS,
    ],
    derived: &[AGE],
    tiers: &[
        TierBand::up_to(4, "Low", Some("~4% in-hospital mortality")),
        TierBand::up_to(9, "Low-Moderate", Some("~8% in-hospital mortality")),
        TierBand::up_to(14, "Moderate", Some("~15% in-hospital mortality")),
        TierBand::up_to(19, "Moderate-High", Some("~25% in-hospital mortality")),
        TierBand::up_to(24, "High", Some("~40% in-hospital mortality")),
        TierBand::up_to(29, "Very High", Some("~55% in-hospital mortality")),
        TierBand::up_to(34, "Severe", Some("~75% in-hospital mortality")),
        TierBand::open("Critical", Some("~85% in-hospital mortality")),
    ],
};
