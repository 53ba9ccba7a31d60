//! Demonstration grammar.
//!
//! A handful of vowel junctions, one reverse consonant junction and a few
//! dozen bytes of lexicon. Enough to exercise every engine path; not a claim
//! about complete phonology.
//!
//! ```text
//! label      rule  children            carries
//! phrase     r1    word + word         -
//! np         r2    word + word         NUMBER from both, CASE from right
//! sentence   r3    phrase + word       -
//! ```
//!
//! Parameter layout: position 0 is part of speech, 1 case, 2 number,
//! 3 gender.

use crate::{
    Analyzer, BaseKind, Bundle, ChronologicalLayer, EngineConfig, FrequencyRecord, InitError, MorphEntry,
    MorphRuleRecord, ParameterVector, ProjectionRecord, RuleTables, SandhiDirection, SandhiGroupRecord,
    SandhiRuleRecord, Term,
};

// Positions
pub const POS: usize = 0;
pub const CASE: usize = 1;
pub const NUMBER: usize = 2;
pub const GENDER: usize = 3;

// Term ids
pub const NOUN: u8 = 1;
pub const VERB: u8 = 2;
pub const INDECLINABLE: u8 = 3;
pub const NOM: u8 = 10;
pub const ACC: u8 = 11;
pub const LOC: u8 = 12;
pub const SG: u8 = 20;
pub const PL: u8 = 21;
pub const MASC: u8 = 30;
pub const FEM: u8 = 31;
pub const NEUT: u8 = 32;

pub const VEDIC: ChronologicalLayer = ChronologicalLayer(1);
pub const CLASSICAL: ChronologicalLayer = ChronologicalLayer(2);

/// Name of the only sandhi group.
pub const VOWEL_GROUP: &str = "vowel";

fn term(id: u8, label: &str, alternate: &str) -> Term {
    Term {
        id,
        label: label.to_string(),
        alternate_label: Some(alternate.to_string()),
        alternate_property_label: None,
    }
}

fn child(label: &str, parameters: ParameterVector, carry: &[usize]) -> ProjectionRecord {
    ProjectionRecord { label: label.to_string(), parameters, carry: carry.to_vec() }
}

fn sandhi(id: u32, direction: SandhiDirection, left: &str, right: &str, joined: &str) -> SandhiRuleRecord {
    SandhiRuleRecord {
        id,
        direction,
        left: left.to_string(),
        right: right.to_string(),
        joined: joined.to_string(),
        left_condition: None,
        right_condition: None,
    }
}

pub fn tables() -> RuleTables {
    use SandhiDirection::{Forward, Reverse};

    let terms = vec![
        term(NOUN, "noun", "nāman"),
        term(VERB, "verb", "ākhyāta"),
        term(INDECLINABLE, "indeclinable", "avyaya"),
        term(NOM, "nom", "prathamā"),
        term(ACC, "acc", "dvitīyā"),
        term(LOC, "loc", "saptamī"),
        term(SG, "sg", "ekavacana"),
        term(PL, "pl", "bahuvacana"),
        term(MASC, "masc", "puṃliṅga"),
        term(FEM, "fem", "strīliṅga"),
        term(NEUT, "neut", "napuṃsakaliṅga"),
    ];

    let mut reverse_da = sandhi(4, Reverse, "t", "a", "da");
    // t voices before a vowel only after a vowel
    reverse_da.left_condition = Some("[aāiīuūeo]".to_string());

    let sandhi_groups = vec![SandhiGroupRecord {
        name: VOWEL_GROUP.to_string(),
        rules: vec![
            sandhi(1, Forward, "a", "i", "e"),
            sandhi(2, Forward, "a", "a", "ā"),
            sandhi(3, Forward, "a", "u", "o"),
            reverse_da,
            sandhi(5, Forward, "a", "ā", "ā"),
            sandhi(6, Forward, "ā", "i", "e"),
            sandhi(7, Forward, "i", "i", "ī"),
        ],
    }];

    let rules = vec![
        MorphRuleRecord {
            id: 1,
            label: "phrase".to_string(),
            pattern: params![],
            sandhi_group: VOWEL_GROUP.to_string(),
            base: BaseKind::Compound,
            is_virtual: true,
            output: params![],
            left: child("word", params![], &[]),
            right: child("word", params![], &[]),
        },
        MorphRuleRecord {
            id: 2,
            label: "np".to_string(),
            pattern: params![],
            sandhi_group: VOWEL_GROUP.to_string(),
            base: BaseKind::Compound,
            is_virtual: true,
            output: params![POS => NOUN],
            left: child("word", params![POS => NOUN], &[NUMBER]),
            right: child("word", params![POS => NOUN], &[CASE, NUMBER]),
        },
        MorphRuleRecord {
            id: 3,
            label: "sentence".to_string(),
            pattern: params![],
            sandhi_group: VOWEL_GROUP.to_string(),
            base: BaseKind::Compound,
            is_virtual: true,
            output: params![],
            left: child("phrase", params![], &[]),
            right: child("word", params![], &[]),
        },
    ];

    RuleTables { terms, rules, sandhi_groups }
}

pub fn lexicon() -> Vec<MorphEntry> {
    let entry = |id, surface: &str, parameters, base| MorphEntry::lexical(id, surface, parameters, base, "sample");
    vec![
        entry(1, "gata", params![POS => NOUN, CASE => NOM, NUMBER => SG, GENDER => MASC], BaseKind::Participial),
        entry(2, "gatā", params![POS => NOUN, CASE => NOM, NUMBER => SG, GENDER => FEM], BaseKind::Participial),
        entry(3, "iti", params![POS => INDECLINABLE], BaseKind::Indeclinable),
        entry(4, "tat", params![POS => NOUN, CASE => NOM, NUMBER => SG, GENDER => NEUT], BaseKind::Pronominal),
        entry(5, "asti", params![POS => VERB, NUMBER => SG], BaseKind::Verbal),
        entry(6, "deva", params![POS => NOUN, CASE => NOM, NUMBER => SG, GENDER => MASC], BaseKind::Nominal),
        entry(7, "ālaya", params![POS => NOUN, CASE => NOM, NUMBER => SG, GENDER => MASC], BaseKind::Nominal),
        entry(8, "ālayāḥ", params![POS => NOUN, CASE => NOM, NUMBER => PL, GENDER => MASC], BaseKind::Nominal),
    ]
}

pub fn frequencies() -> Vec<FrequencyRecord> {
    let f = |surface: &str, layer, frequency| FrequencyRecord { surface: surface.to_string(), layer, frequency };
    vec![
        f("gata", CLASSICAL, 40.0),
        f("gatā", CLASSICAL, 10.0),
        f("iti", VEDIC, 120.0),
        f("iti", CLASSICAL, 300.0),
        f("tat", VEDIC, 50.0),
        f("tat", CLASSICAL, 60.0),
        f("asti", VEDIC, 80.0),
        f("asti", CLASSICAL, 90.0),
        f("deva", VEDIC, 200.0),
        f("deva", CLASSICAL, 150.0),
        f("ālaya", CLASSICAL, 30.0),
        f("ālayāḥ", CLASSICAL, 5.0),
        f("gateti", CLASSICAL, 2.0),
    ]
}

pub fn bundle() -> Bundle {
    Bundle { tables: tables(), lexicon: lexicon(), frequencies: frequencies() }
}

/// Analyzer over the demonstration grammar with the default worker pool.
pub fn analyzer() -> Result<Analyzer, InitError> {
    Analyzer::from_bundle(bundle(), EngineConfig::default())
}
