extern crate ppe_detect;

use ppe_detect::common::{PpeBox, PpeClass};
use ppe_detect::data::{ClassRemap, LabelShiftFix, LabelThresholds};
use ppe_detect::label_resolver::LabelResolver;

use fixtures::detection;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| n.to_string()).collect()
}

#[test]
fn aliases_resolve_to_canonical_classes() {
    let resolver = LabelResolver::new(
        "mixed",
        &names(&["person", "Hard Hat", "safety-vest", "hand glove", "Work Boots", "footwear", "ladder"]),
        None,
    ).unwrap();

    assert_eq!(resolver.class_of(0), Some(PpeClass::Person));
    assert_eq!(resolver.class_of(1), Some(PpeClass::Helmet));
    assert_eq!(resolver.class_of(2), Some(PpeClass::Vest));
    assert_eq!(resolver.class_of(3), Some(PpeClass::Glove));
    assert_eq!(resolver.class_of(4), Some(PpeClass::Boot));
    assert_eq!(resolver.class_of(5), Some(PpeClass::Boot));
    assert_eq!(resolver.class_of(6), None);
    assert_eq!(resolver.class_of(42), None);
    assert!(resolver.resolves(PpeClass::Boot));
}

#[test]
fn separator_runs_collapse() {
    let resolver = LabelResolver::new("seps", &names(&["  Safety -- Vest ", "HARD-HAT", "safety_shoes"]), None).unwrap();
    assert_eq!(resolver.class_of(0), Some(PpeClass::Vest));
    assert_eq!(resolver.class_of(1), Some(PpeClass::Helmet));
    assert_eq!(resolver.class_of(2), Some(PpeClass::Boot));
}

#[test]
fn helmet_vest_shift_remaps_classes() {
    let fix = LabelShiftFix::helmet_vest_shift("hv-model");
    assert_eq!(fix.apply(PpeClass::Vest), Some(PpeClass::Helmet));
    assert_eq!(fix.apply(PpeClass::Boot), Some(PpeClass::Vest));
    assert_eq!(fix.apply(PpeClass::Helmet), None);
    assert_eq!(fix.apply(PpeClass::Glove), Some(PpeClass::Glove));
    assert!(fix.applies_to("hv-model"));
    assert!(!fix.applies_to("hv-model-v2"));

    let resolver = LabelResolver::new("hv-model", &names(&["helmet", "vest", "boots"]), Some(&fix)).unwrap();
    assert_eq!(resolver.class_of(0), None);
    assert_eq!(resolver.class_of(1), Some(PpeClass::Helmet));
    assert_eq!(resolver.class_of(2), Some(PpeClass::Vest));
    assert!(!resolver.resolves(PpeClass::Boot));
}

#[test]
fn split_applies_thresholds_after_remap() {
    let fix = LabelShiftFix::helmet_vest_shift("hv-model");
    let resolver = LabelResolver::new("hv-model", &names(&["helmet", "vest", "boots"]), Some(&fix)).unwrap();
    let thresholds = LabelThresholds {
        helmet: 0.6,
        vest: 0.3,
        ..LabelThresholds::default()
    };

    let detections = vec![
        // raw "vest", judged as a helmet against 0.6
        detection(1, 0., 0., 10., 10., 0.5),
        detection(1, 0., 0., 20., 20., 0.7),
        // raw "boots", judged as a vest against 0.3
        detection(2, 0., 0., 30., 30., 0.4),
        // raw "helmet" is dropped by the fix whatever its score
        detection(0, 0., 0., 40., 40., 0.99),
    ];
    let set = resolver.split(&detections, &thresholds, &[PpeClass::Helmet, PpeClass::Vest]);

    assert_eq!(set.helmets, vec![PpeBox::new(0., 0., 20., 20.)]);
    assert_eq!(set.vests, vec![PpeBox::new(0., 0., 30., 30.)]);
    assert!(set.gloves.is_empty() && set.boots.is_empty());
}

#[test]
fn split_keeps_only_wanted_classes() {
    let resolver = LabelResolver::new("all", &names(&["helmet", "vest", "gloves", "boots"]), None).unwrap();
    let detections = vec![
        detection(0, 0., 0., 10., 10., 0.9),
        detection(2, 0., 0., 10., 10., 0.9),
        detection(3, 0., 0., 10., 10., 0.9),
        detection(9, 0., 0., 10., 10., 0.9),
    ];
    let set = resolver.split(&detections, &LabelThresholds::default(), &[PpeClass::Glove, PpeClass::Boot]);

    assert!(set.get(PpeClass::Helmet).is_empty());
    assert_eq!(set.get(PpeClass::Glove).len(), 1);
    assert_eq!(set.get(PpeClass::Boot).len(), 1);
}

#[test]
fn threshold_floor_is_inclusive() {
    let thresholds = LabelThresholds::default();
    assert!(thresholds.check_conf(PpeClass::Helmet, 0.55));
    assert!(!thresholds.check_conf(PpeClass::Helmet, 0.549));
    assert!(thresholds.check_conf(PpeClass::Person, 0.25));
    assert_eq!(thresholds.get(PpeClass::Boot), 0.35);
}

#[test]
fn class_names_and_report_names() {
    assert_eq!(PpeClass::from_str("Gloves"), Some(PpeClass::Glove));
    assert_eq!(PpeClass::from_str("ladder"), None);
    assert_eq!(PpeClass::Glove.to_string(), "glove");
    assert_eq!(PpeClass::Boot.report_name(), "boots");
    assert_eq!(PpeClass::from_alias("safety_vest"), Some(PpeClass::Vest));
    assert_eq!(PpeClass::from_alias("Safety Vest"), None);

    for class in PpeClass::EQUIPMENT.into_iter().chain([PpeClass::Person]) {
        assert_eq!(PpeClass::from_str(class.str_lowercase()), Some(class));
        assert_eq!(class.to_string(), class.str_lowercase());
    }
}

#[test]
fn shift_fix_round_trips_through_json() {
    let fix = LabelShiftFix {
        model_artifact: "hv-model".to_string(),
        remaps: vec![ClassRemap { from: PpeClass::Vest, to: Some(PpeClass::Helmet) }],
    };
    let json = serde_json::to_string(&fix).unwrap();
    assert!(json.contains("\"vest\""));
    let back: LabelShiftFix = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fix);
}
