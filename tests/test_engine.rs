extern crate ppe_detect;

use image::{Rgb, RgbImage};
use ppe_detect::common::{PpeClass, PpeFrame};
use ppe_detect::data::{EngineConfig, FrameDiagnostics, FrameResult, LabelShiftFix};
use ppe_detect::matching::BootPass;
use ppe_detect::{DetectorRole, EngineError, PpeEngine};

use fixtures::{black_frame, person, BrokenDetector, CompliantScene, ScriptedPersons, ScriptedPpe, PRIMARY_MODEL};

fn compliant_engine(config: EngineConfig) -> PpeEngine {
    PpeEngine::new(
        config,
        Box::new(ScriptedPersons::constant(vec![CompliantScene::person()])),
        Box::new(ScriptedPpe::primary(vec![CompliantScene::helmet_vest()])),
        Some(Box::new(ScriptedPpe::secondary(vec![CompliantScene::gloves_boots()]))),
    ).unwrap()
}

fn scene_frame() -> PpeFrame {
    black_frame(CompliantScene::WIDTH, CompliantScene::HEIGHT)
}

#[test]
fn compliant_person_becomes_present_after_debounce() {
    let mut engine = compliant_engine(EngineConfig::default());
    let frame = scene_frame();

    let (_, first) = engine.process(&frame).unwrap();
    assert!(first.any_person_fully_compliant);
    assert!(!first.any_helmet && !first.any_vest && !first.any_gloves && !first.any_boots);
    assert_eq!(first.violation_code().as_deref(), Some("helmet_vest_gloves_boots_missing"));

    let report = &first.diagnostics.persons[0];
    assert!(report.outcome.is_fully_compliant());
    assert_eq!(report.outcome.gloves.len(), 2);
    assert_eq!(report.outcome.boots.len(), 2);
    assert_eq!(report.boot_pass, Some(BootPass::Strict));
    assert_eq!(first.diagnostics.counts_text(), "P:1 H:1 V:1 G:2 B:2 | RELAX:true | FIX:false");

    let (_, second) = engine.process(&frame).unwrap();
    assert!(second.any_vest && second.any_gloves && second.any_boots);
    assert!(!second.any_helmet);
    assert_eq!(second.violation_code().as_deref(), Some("helmet_missing"));

    let (_, third) = engine.process(&frame).unwrap();
    assert!(third.any_helmet);
    assert_eq!(third.violation_code(), None);
    assert!(PpeClass::EQUIPMENT.iter().all(|c| third.is_present(*c)));
}

#[test]
fn missing_secondary_never_reports_gloves_or_boots() {
    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![CompliantScene::person()])),
        Box::new(ScriptedPpe::primary(vec![CompliantScene::helmet_vest()])),
        None,
    ).unwrap();
    let frame = scene_frame();

    let results: Vec<FrameResult> = (0..6).map(|_| engine.process(&frame).unwrap().1).collect();
    for result in &results {
        assert!(!result.any_gloves && !result.any_boots);
        assert!(!result.any_person_fully_compliant);
    }
    let last = &results[5];
    assert!(last.any_helmet && last.any_vest);
    assert_eq!(last.diagnostics.glove_candidates, 0);
    assert_eq!(last.violation_code().as_deref(), Some("gloves_boots_missing"));
}

#[test]
fn empty_scene_reports_nothing_but_advances_trackers() {
    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![])),
        Box::new(ScriptedPpe::primary(vec![CompliantScene::helmet_vest()])),
        Some(Box::new(ScriptedPpe::secondary(vec![CompliantScene::gloves_boots()]))),
    ).unwrap();
    let frame = scene_frame();

    for _ in 0..3 {
        let (_, result) = engine.process(&frame).unwrap();
        assert!(!result.any_helmet && !result.any_vest && !result.any_gloves && !result.any_boots);
        assert!(!result.any_person_fully_compliant);
        assert_eq!(result.violation_code(), None);
        assert_eq!(result.diagnostics.person_count, 0);
        assert_eq!(result.diagnostics.helmet_candidates, 1);
    }
    assert_eq!(engine.trackers().helmet.state().off_streak, 3);
}

#[test]
fn presence_is_gated_when_the_person_leaves() {
    let p = CompliantScene::person();
    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::new(vec![vec![p], vec![p], vec![p], vec![]])),
        Box::new(ScriptedPpe::primary(vec![CompliantScene::helmet_vest()])),
        Some(Box::new(ScriptedPpe::secondary(vec![CompliantScene::gloves_boots()]))),
    ).unwrap();
    let frame = scene_frame();

    for _ in 0..3 {
        engine.process(&frame).unwrap();
    }
    let (_, gone) = engine.process(&frame).unwrap();
    assert!(!gone.any_vest);
    // The tracker itself is still inside its off window.
    assert!(engine.trackers().vest.is_present());
}

#[test]
fn duplicate_and_low_confidence_persons_are_dropped() {
    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![
            CompliantScene::person(),
            person(202., 42., 362., 462., 0.7),
            person(450., 40., 600., 460., 0.2),
        ])),
        Box::new(ScriptedPpe::primary(vec![CompliantScene::helmet_vest()])),
        None,
    ).unwrap();

    let (_, result) = engine.process(&scene_frame()).unwrap();
    assert_eq!(result.diagnostics.person_count, 1);
    assert_eq!(result.diagnostics.persons[0].confidence, 0.9);
}

#[test]
fn label_shift_fix_reroutes_primary_classes() {
    let config = EngineConfig::default().with_label_shift(LabelShiftFix::helmet_vest_shift(PRIMARY_MODEL));
    let helmet_vest = CompliantScene::helmet_vest();
    // The shifted model reports helmets as "vest" and vests as "boots".
    let shifted = vec![
        helmet_vest[0].clone().with_class_id(1),
        helmet_vest[1].clone().with_class_id(2),
        helmet_vest[1].clone().with_class_id(0),
    ];
    let mut engine = PpeEngine::new(
        config,
        Box::new(ScriptedPersons::constant(vec![CompliantScene::person()])),
        Box::new(ScriptedPpe::new(PRIMARY_MODEL, &["helmet", "vest", "boots"], vec![shifted])),
        None,
    ).unwrap();

    let (_, result) = engine.process(&scene_frame()).unwrap();
    let outcome = &result.diagnostics.persons[0].outcome;
    assert_eq!(outcome.helmet, Some(helmet_vest[0].bbox));
    assert_eq!(outcome.vest, Some(helmet_vest[1].bbox));
    assert_eq!(result.diagnostics.helmet_candidates, 1);
    assert_eq!(result.diagnostics.vest_candidates, 1);
    assert!(result.diagnostics.counts_text().ends_with("FIX:true"));
}

#[test]
fn label_shift_for_another_model_is_rejected() {
    let config = EngineConfig::default().with_label_shift(LabelShiftFix::helmet_vest_shift("older-model.onnx"));
    let err = PpeEngine::new(
        config,
        Box::new(ScriptedPersons::constant(vec![])),
        Box::new(ScriptedPpe::primary(vec![])),
        None,
    ).err().unwrap();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
}

#[test]
fn unusable_detectors_are_rejected() {
    let err = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![])),
        Box::new(ScriptedPpe::new("coco", &["person", "car", "dog"], vec![])),
        None,
    ).err().unwrap();
    assert!(matches!(err, EngineError::InvalidConfig(_)));

    let err = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![])),
        Box::new(ScriptedPpe::primary(vec![])),
        Some(Box::new(ScriptedPpe::new("hv-again", &["helmet", "vest"], vec![]))),
    ).err().unwrap();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
}

#[test]
fn invalid_config_fails_at_construction() {
    let mut config = EngineConfig::default();
    config.hysteresis.helmet_on = 0;
    assert!(config.validate().is_err());

    let result = ppe_detect::init_engine(
        config,
        Box::new(ScriptedPersons::constant(vec![])),
        Box::new(ScriptedPpe::primary(vec![])),
        None,
    );
    let err = result.err().unwrap();
    assert!(matches!(err.downcast_ref::<EngineError>(), Some(EngineError::InvalidConfig(_))));

    let mut config = EngineConfig::default();
    config.confidence.helmet = 0.;
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.matcher.max_matches = 1;
    config.matcher.require_two_gloves = true;
    assert!(config.validate().is_err());

    let mut config = EngineConfig::default();
    config.dedup.nms_iou = f32::NAN;
    assert!(config.validate().is_err());

    assert!(EngineConfig::default().validate().is_ok());
}

#[test]
fn detector_failures_name_the_detector() {
    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(BrokenDetector::new(&[])),
        Box::new(ScriptedPpe::primary(vec![])),
        None,
    ).unwrap();
    let err = engine.process(&scene_frame()).err().unwrap();
    assert_eq!(err.detector_role(), Some(DetectorRole::Person));
    assert!(matches!(err, EngineError::Detector { .. }));
    let source = std::error::Error::source(&err).map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("inference session lost"));

    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![CompliantScene::person()])),
        Box::new(ScriptedPpe::primary(vec![])),
        Some(Box::new(BrokenDetector::new(&["gloves", "boots"]))),
    ).unwrap();
    let err = engine.process(&scene_frame()).err().unwrap();
    assert_eq!(err.detector_role(), Some(DetectorRole::SecondaryPpe));
    assert_eq!(err.to_string(), "secondary PPE detector failed");
}

#[test]
fn out_of_range_confidence_is_a_contract_violation() {
    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![person(0., 0., 10., 10., 1.5)])),
        Box::new(ScriptedPpe::primary(vec![])),
        None,
    ).unwrap();
    let err = engine.process(&scene_frame()).err().unwrap();
    assert!(matches!(err, EngineError::InvalidDetection { role: DetectorRole::Person, .. }));

    let mut nan_helmet = CompliantScene::helmet_vest();
    nan_helmet[0].confidence = f32::NAN;
    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![CompliantScene::person()])),
        Box::new(ScriptedPpe::primary(vec![nan_helmet])),
        None,
    ).unwrap();
    let err = engine.process(&scene_frame()).err().unwrap();
    assert_eq!(err.detector_role(), Some(DetectorRole::PrimaryPpe));
}

#[test]
fn empty_frame_is_rejected() {
    let mut engine = compliant_engine(EngineConfig::default());
    let err = engine.process(&PpeFrame::new(RgbImage::new(0, 0))).err().unwrap();
    assert!(matches!(err, EngineError::MalformedFrame(_)));
    // Nothing was fed to the trackers.
    assert_eq!(engine.trackers().vest.state().on_streak, 0);
}

#[test]
fn overlay_draws_on_the_copy_only() {
    let mut engine = compliant_engine(EngineConfig::default());
    let frame = scene_frame();

    let (annotated, _) = engine.process(&frame).unwrap();
    assert!(frame.as_raw().iter().all(|v| *v == 0));
    // Left edge of a fully compliant person box.
    assert_eq!(*annotated.get_pixel(200, 250), Rgb([0, 200, 0]));

    let mut in_place = scene_frame();
    engine.process_in_place(&mut in_place).unwrap();
    assert_eq!(*in_place.get_pixel(200, 250), Rgb([0, 200, 0]));

    let mut quiet = compliant_engine(EngineConfig::default().with_debug_overlay(false));
    let (annotated, _) = quiet.process(&frame).unwrap();
    assert_eq!(annotated.as_raw(), frame.as_raw());
}

#[test]
fn overlay_survives_persons_outside_the_frame() {
    let mut engine = PpeEngine::new(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![
            person(100., -1e10, 300., -1e10 + 4e9, 0.9),
            person(-5e9, 100., 5e9, 300., 0.9),
            person(900., 900., 1000., 1000., 0.9),
        ])),
        Box::new(ScriptedPpe::primary(vec![])),
        None,
    ).unwrap();
    assert!(engine.config().debug_overlay);

    let frame = scene_frame();
    let (annotated, result) = engine.process(&frame).unwrap();
    assert_eq!(result.diagnostics.person_count, 3);
    // Only the box straddling the frame is visible; its top edge runs along y = 100.
    assert_eq!(*annotated.get_pixel(320, 100), Rgb([255, 0, 0]));
    assert_eq!(*annotated.get_pixel(320, 479), Rgb([0, 0, 0]));

    let mut in_place = scene_frame();
    assert!(engine.process_in_place(&mut in_place).is_ok());
}

#[test]
fn reset_starts_debouncing_again() {
    let mut engine = compliant_engine(EngineConfig::default());
    let frame = scene_frame();
    for _ in 0..3 {
        engine.process(&frame).unwrap();
    }
    assert!(engine.trackers().helmet.is_present());

    engine.reset_trackers();
    let (_, result) = engine.process(&frame).unwrap();
    assert!(!result.any_helmet && !result.any_vest);
    assert!(result.any_person_fully_compliant);
}

#[test]
fn engines_do_not_share_state() {
    let mut busy = compliant_engine(EngineConfig::default());
    let mut idle = compliant_engine(EngineConfig::default());
    let frame = scene_frame();

    for _ in 0..3 {
        busy.process(&frame).unwrap();
    }
    assert!(busy.trackers().helmet.is_present());
    assert!(!idle.trackers().helmet.is_present());

    let (_, first) = idle.process(&frame).unwrap();
    assert!(!first.any_helmet);
}

#[test]
fn run_compliance_wraps_process() {
    let mut engine = ppe_detect::init_engine(
        EngineConfig::default(),
        Box::new(ScriptedPersons::constant(vec![CompliantScene::person()])),
        Box::new(ScriptedPpe::primary(vec![CompliantScene::helmet_vest()])),
        None,
    ).unwrap();
    let (annotated, result) = ppe_detect::run_compliance(&mut engine, &scene_frame()).unwrap();
    assert_eq!(annotated.dimensions(), (CompliantScene::WIDTH, CompliantScene::HEIGHT));
    assert_eq!(result.diagnostics.person_count, 1);
    assert_eq!(result.diagnostics.hud_text(), engine.config().hud_text());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["any_helmet"], serde_json::Value::Bool(false));
    assert_eq!(json["diagnostics"]["persons"][0]["boot_pass"], serde_json::Value::Null);
}

#[test]
fn violation_codes() {
    let with_person = |helmet, vest, gloves, boots| FrameResult {
        any_helmet: helmet,
        any_vest: vest,
        any_gloves: gloves,
        any_boots: boots,
        any_person_fully_compliant: false,
        diagnostics: FrameDiagnostics {
            person_count: 1,
            ..FrameDiagnostics::default()
        },
    };

    assert_eq!(with_person(false, false, true, true).violation_code().as_deref(), Some("helmet_and_vest_missing"));
    assert_eq!(with_person(true, false, true, true).violation_code().as_deref(), Some("vest_missing"));
    assert_eq!(with_person(false, true, false, true).violation_code().as_deref(), Some("helmet_gloves_missing"));
    assert_eq!(with_person(true, true, true, false).violation_code().as_deref(), Some("boots_missing"));
    assert_eq!(with_person(true, true, true, true).violation_code(), None);
    assert_eq!(FrameResult::default().violation_code(), None);
}

#[test]
fn config_loads_from_json() {
    let json = r#"{
        "matcher": { "relaxed": false, "boot": { "require_two_boots": true } },
        "hysteresis": { "helmet_on": 1 },
        "label_shift": { "model_artifact": "hv.onnx", "remaps": [ { "from": "vest", "to": "helmet" } ] },
        "debug_overlay": false
    }"#;
    let config = EngineConfig::from_json_str(json).unwrap();
    assert!(!config.matcher.relaxed);
    assert!(config.matcher.boot.require_two_boots);
    assert!(config.matcher.boot.relax_fallback);
    assert_eq!(config.hysteresis.helmet_on, 1);
    assert_eq!(config.hysteresis.helmet_off, 5);
    assert_eq!(config.confidence.helmet, 0.55);
    assert!(!config.debug_overlay);
    assert_eq!(config.label_shift.as_ref().map(|f| f.apply(PpeClass::Vest)), Some(Some(PpeClass::Helmet)));
    assert!(config.validate().is_ok());

    let path = std::env::temp_dir().join("ppe_detect_engine_config.json");
    std::fs::write(&path, json).unwrap();
    assert_eq!(EngineConfig::from_json_file(&path).unwrap(), config);
    let _ = std::fs::remove_file(&path);

    assert!(EngineConfig::from_json_str("{").is_err());
    assert!(EngineConfig::from_json_file("/nonexistent/ppe.json").is_err());
    assert!(config.summary().contains("Label shift fix: hv.onnx"));
}
