extern crate ppe_detect;

use image::{DynamicImage, Rgb, RgbaImage};
use ndarray::{array, Array2, Array3};
use ppe_detect::common::PpeFrame;
use ppe_detect::detection_processing::{process_predictions, ScaleInfo};
use ppe_detect::EngineError;

fn scale() -> ScaleInfo {
    ScaleInfo {
        model_width: 640.,
        model_height: 640.,
        img_width: 1280.,
        img_height: 720.,
    }
}

fn classes() -> Vec<String> {
    vec!["helmet".to_string(), "vest".to_string()]
}

#[test]
fn rows_are_scaled_filtered_and_suppressed() {
    let output: Array2<f32> = array![
        [320., 320., 100., 100., 0.9, 1.],
        [322., 321., 100., 100., 0.8, 1.],
        [100., 100., 40., 40., 0.6, 0.],
        [500., 500., 40., 40., 0.1, 0.],
        [200., 200., 40., 40., 0.9, -1.],
    ];
    let detections = process_predictions(&output.view(), &classes(), scale(), 0.25, 0.5).unwrap();

    assert_eq!(detections.len(), 2);
    let vest = &detections[0];
    assert_eq!(vest.class_id, 1);
    assert_eq!(vest.get_label(), "vest");
    assert_eq!(vest.bbox.xy1_xy2(), (540., 303.75, 740., 416.25));

    let helmet = &detections[1];
    assert_eq!(helmet.get_label(), "helmet");
    assert_eq!(helmet.confidence, 0.6);
}

#[test]
fn unknown_class_ids_keep_no_label() {
    let output: Array2<f32> = array![[320., 320., 100., 100., 0.9, 7.]];
    let detections = process_predictions(&output.view(), &classes(), scale(), 0.25, 0.5).unwrap();
    assert_eq!(detections[0].class_id, 7);
    assert_eq!(detections[0].label, None);
}

#[test]
fn malformed_outputs_are_errors() {
    let short: Array2<f32> = array![[320., 320., 100., 100., 0.9]];
    assert!(process_predictions(&short.view(), &classes(), scale(), 0.25, 0.5).is_err());

    let output: Array2<f32> = array![[320., 320., 100., 100., 0.9, 1.]];
    let empty_model = ScaleInfo {
        model_width: 0.,
        ..scale()
    };
    assert!(process_predictions(&output.view(), &classes(), empty_model, 0.25, 0.5).is_err());
}

#[test]
fn frame_from_array_keeps_pixel_layout() {
    let mut pixels = Array3::<u8>::zeros((2, 3, 3));
    pixels[[1, 2, 0]] = 255;
    pixels[[0, 1, 2]] = 128;

    let frame = PpeFrame::from_array(pixels.view()).unwrap();
    assert_eq!(frame.dimensions(), (3, 2));
    assert_eq!(*frame.get_pixel(2, 1), Rgb([255, 0, 0]));
    assert_eq!(*frame.get_pixel(1, 0), Rgb([0, 0, 128]));

    let gray = Array3::<u8>::zeros((2, 3, 1));
    assert!(matches!(PpeFrame::from_array(gray.view()), Err(EngineError::MalformedFrame(_))));
}

#[test]
fn frame_from_raw_checks_length() {
    let frame = PpeFrame::from_raw(2, 2, 3, vec![7; 12]).unwrap();
    assert_eq!(*frame.get_pixel(1, 1), Rgb([7, 7, 7]));
    assert!((frame.diagonal() - 8f32.sqrt()).abs() < 1e-6);

    assert!(matches!(PpeFrame::from_raw(2, 2, 3, vec![0; 11]), Err(EngineError::MalformedFrame(_))));
    assert!(matches!(PpeFrame::from_raw(2, 2, 4, vec![0; 16]), Err(EngineError::MalformedFrame(_))));
}

#[test]
fn frames_convert_from_other_pixel_formats() {
    let rgba = RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
    let frame = PpeFrame::from(rgba);
    assert_eq!(*frame.get_pixel(3, 2), Rgb([10, 20, 30]));

    let frame = PpeFrame::from(DynamicImage::new_luma8(5, 5));
    assert_eq!(frame.dimensions(), (5, 5));
    assert!(frame.validate().is_ok());

    assert!(PpeFrame::default().validate().is_err());
}
