//! End-to-end tests over realistic two-book snapshots.
//!
//! Fixtures live in `tests/fixtures/` and use the bundled vocabulary.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use odds_edge::config::Config;
use odds_edge::engine::{detect_drops, find_opportunities, EngineSettings, ExclusionReason, RankBy};
use odds_edge::normalize::{CanonicalParticipant, Canonicalizer};
use odds_edge::odds::RawOddsRecord;

fn fixture(name: &str) -> Vec<RawOddsRecord> {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name].iter().collect();
    let text = std::fs::read_to_string(&path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn canonicalizer() -> Canonicalizer {
    Config::default().canonicalizer().unwrap()
}

fn close(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= dec!(0.0001)
}

#[test]
fn snapshot_comparison_finds_ranked_opportunities() {
    let report = find_opportunities(
        &fixture("pinnacle.json"),
        &fixture("bet365.json"),
        &canonicalizer(),
        &EngineSettings::default(),
    );

    let keys: Vec<String> = report
        .opportunities
        .iter()
        .map(|o| format!("{}|{}|{}", o.market, o.participant, o.line))
        .collect();
    assert_eq!(
        keys,
        vec![
            "total-goals-full-match|over|2.5".to_string(),
            "handicap-full-match|palmeiras|-0.5".to_string(),
        ]
    );

    let total = &report.opportunities[0];
    assert_eq!(total.reference_odd, dec!(1.92));
    assert_eq!(total.opposite_odd, dec!(1.98));
    assert_eq!(total.candidate_odd, dec!(2.05));
    assert!(close(total.fair_probability, dec!(0.5077)));
    assert!(close(total.ev, dec!(0.0408)));

    let handicap = &report.opportunities[1];
    assert_eq!(handicap.opposite_participant, CanonicalParticipant::Team("santos".to_string()));
    assert_eq!(handicap.opposite_line.to_string(), "+0.5");
    assert!(close(handicap.ev, dec!(0.015)));
}

#[test]
fn snapshot_comparison_accounts_for_every_skip() {
    let report = find_opportunities(
        &fixture("pinnacle.json"),
        &fixture("bet365.json"),
        &canonicalizer(),
        &EngineSettings::default(),
    );
    let stats = &report.stats;

    assert_eq!(stats.reference_records, 12);
    assert_eq!(stats.candidate_records, 10);
    assert_eq!(stats.reference_keys, 11);
    assert_eq!(stats.candidate_keys, 7);
    assert_eq!(stats.duplicates_discarded, 2);
    assert_eq!(stats.unmatched, 1);
    assert_eq!(stats.not_better, 1);
    // first-half handicap and corners both price below fair
    assert_eq!(stats.below_threshold, 2);
    assert_eq!(stats.emitted, 2);

    assert_eq!(report.exclusions.get(ExclusionReason::UnmappedMarket), 1);
    assert_eq!(report.exclusions.get(ExclusionReason::NonTwoSidedTotal), 1);
    assert_eq!(report.exclusions.get(ExclusionReason::AmbiguousOpposite), 1);
    assert_eq!(report.exclusions.get(ExclusionReason::MissingOpposite), 0);
    assert_eq!(report.unmapped_labels.get("bet365: Escanteios 1x2"), Some(&1));
}

#[test]
fn no_emitted_opportunity_breaks_the_filters() {
    let settings = EngineSettings {
        min_ev: dec!(0.02),
        rank_by: RankBy::Edge,
        ..EngineSettings::default()
    };
    let report = find_opportunities(
        &fixture("pinnacle.json"),
        &fixture("bet365.json"),
        &canonicalizer(),
        &settings,
    );

    assert_eq!(report.opportunities.len(), 1);
    for opp in &report.opportunities {
        assert!(opp.candidate_odd > opp.reference_odd);
        assert!(opp.ev > settings.min_ev);
        assert!(close(opp.fair_probability + opp.fair_probability_opposite, Decimal::ONE));
    }
}

#[test]
fn swapped_roles_price_the_other_book() {
    let report = find_opportunities(
        &fixture("bet365.json"),
        &fixture("pinnacle.json"),
        &canonicalizer(),
        &EngineSettings::default(),
    );

    assert_eq!(report.opportunities.len(), 1);
    let under = &report.opportunities[0];
    assert_eq!(under.candidate_book, "pinnacle");
    assert_eq!(under.participant, CanonicalParticipant::Under);
    // bet365 keeps its single 2.05 over price as the opposite
    assert_eq!(under.opposite_odd, dec!(2.05));
    assert!(close(under.ev, dec!(0.0276)));
}

#[test]
fn report_serializes_with_canonical_text() {
    let report = find_opportunities(
        &fixture("pinnacle.json"),
        &fixture("bet365.json"),
        &canonicalizer(),
        &EngineSettings::default(),
    );
    let json = serde_json::to_value(&report).unwrap();

    let handicap = &json["opportunities"][1];
    assert_eq!(handicap["market"], "handicap-full-match");
    assert_eq!(handicap["participant"], "palmeiras");
    assert_eq!(handicap["line"], "-0.5");
    assert_eq!(handicap["kind"], "sided");
    assert_eq!(json["exclusions"]["unmapped_market"], 1);
    assert_eq!(json["stats"]["emitted"], 2);
}

#[test]
fn bad_odd_in_snapshot_excludes_one_record() {
    let candidate: Vec<RawOddsRecord> = serde_json::from_str(
        r#"[
            {"market": "Gols +/-", "participant": "Mais de", "line": "2.5", "odd": "2,05", "book": "bet365"},
            {"market": "Gols +/-", "participant": "Menos de", "line": "2.5", "odd": "SP", "book": "bet365"}
        ]"#,
    )
    .unwrap();

    let report = find_opportunities(
        &fixture("pinnacle.json"),
        &candidate,
        &canonicalizer(),
        &EngineSettings::default(),
    );

    assert_eq!(report.exclusions.get(ExclusionReason::InvalidOdd), 1);
    assert_eq!(report.stats.candidate_keys, 1);
    assert_eq!(report.opportunities.len(), 1);
    assert_eq!(report.opportunities[0].candidate_odd, dec!(2.05));
}

#[test]
fn movement_reports_drops_between_snapshots() {
    let previous = fixture("bet365.json");
    let mut current = previous.clone();
    for record in &mut current {
        if record.market == "Handicap Asiático" {
            record.odd = dec!(1.80); // 1.95 → 1.80 is a 7.69% drop
        }
    }

    let report = detect_drops(&previous, &current, &canonicalizer(), dec!(3));

    assert_eq!(report.drops.len(), 1);
    assert_eq!(report.drops[0].key, "handicap-full-match|palmeiras|-0.5");
    assert_eq!(report.drops[0].drop_pct, dec!(7.69));
    assert_eq!(report.matched, 7);
}
