use smokesim_game::rng::SeededSource;
use smokesim_game::{
    MessageCategory, MortalityTable, RandomSource, RngBundle, ScriptedSource, SimConfig,
    SimRules, SimState,
};
use std::convert::TryFrom;

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

fn rate(hits: usize) -> f64 {
    let total = f64::from(u32::try_from(SAMPLE_SIZE).expect("sample size fits"));
    f64::from(u32::try_from(hits).expect("count fits")) / total
}

#[test]
fn meal_refusal_tracks_capped_addiction() {
    let rules = SimRules::default();
    let mut rng = RngBundle::from_user_seed(0xACED);
    let mut template = SimState::default();
    template.addiction_level = 95.0;

    let mut refused = 0usize;
    for _ in 0..SAMPLE_SIZE {
        let mut state = template.clone();
        let out = rules.heal(&mut state, &mut rng, 0);
        if out.last_feedback().map(|f| f.category) == Some(MessageCategory::Refusal) {
            refused += 1;
        }
    }
    let observed = rate(refused);
    assert!(
        (observed - 0.85).abs() <= TOLERANCE,
        "refusal rate drifted: observed {observed:.4}"
    );
}

#[test]
fn meal_refusal_scales_below_cap() {
    let rules = SimRules::default();
    let mut rng = RngBundle::from_user_seed(77);
    let mut template = SimState::default();
    template.addiction_level = 60.0;

    let mut refused = 0usize;
    for _ in 0..SAMPLE_SIZE {
        let mut state = template.clone();
        if rules.heal(&mut state, &mut rng, 0).last_feedback().map(|f| f.category)
            == Some(MessageCategory::Refusal)
        {
            refused += 1;
        }
    }
    assert!((rate(refused) - 0.60).abs() <= TOLERANCE);
}

#[test]
fn disease_roll_rate_matches_tick_probability() {
    let mut cfg = SimConfig::default();
    cfg.mortality.disease_tick_probability = 0.2;
    let table = MortalityTable::default_table();
    let mut source = SeededSource::new(0xBEEF);

    let mut deaths = 0usize;
    for _ in 0..SAMPLE_SIZE {
        // one eligible cause at this age
        let mut state = SimState::default();
        state.biological_age_months = 500.0;
        let mut out = smokesim_game::Transition::applied();
        smokesim_game::mortality::evaluate(&mut state, &cfg, table, &mut source, &mut out);
        if state.is_terminal {
            deaths += 1;
        }
    }
    assert!((rate(deaths) - 0.2).abs() <= TOLERANCE);
    assert_eq!(source.draws(), u64::try_from(SAMPLE_SIZE).expect("fits"));
}

#[test]
fn flavor_stream_never_shifts_outcomes() {
    let rules = SimRules::default();
    let outcome_draws = [0.3, 0.7, 0.1, 0.9, 0.5, 0.2];

    let run = |flavor: f64| {
        let mut rng = RngBundle::with_sources(
            Box::new(ScriptedSource::new(outcome_draws, 0.5)),
            Box::new(ScriptedSource::constant(flavor)),
        );
        let mut state = SimState::default();
        state.addiction_level = 80.0;
        for step in 0..6 {
            rules.heal(&mut state, &mut rng, step);
            rules.consume(&mut state, &mut rng, step);
        }
        state
    };

    assert_eq!(run(0.0), run(0.95));
}
