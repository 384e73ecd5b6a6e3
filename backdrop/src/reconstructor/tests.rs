use super::*;
use crate::pixel::Rgb8;

const GRAY: Rgb8 = Rgb8::new(100, 100, 100);
const BLUE: Rgb8 = Rgb8::new(0, 0, 250);

fn flat_frames(count: usize, width: usize, height: usize) -> Vec<Frame> {
    vec![Frame::new_filled(width, height, GRAY); count]
}

fn exact_params() -> ProcessingParams {
    ProcessingParams::new(0, 10, 0, 0)
}

fn loaded(frames: Vec<Frame>) -> BackgroundReconstructor {
    let mut reconstructor = BackgroundReconstructor::new(ReconstructorConfig::default());
    reconstructor.load_frames(frames).unwrap();
    reconstructor
}

// =============================================================================
// Preconditions
// =============================================================================

#[test]
fn test_new_reconstructor_is_empty() {
    let mut reconstructor = BackgroundReconstructor::new(ReconstructorConfig::default());
    assert_eq!(reconstructor.state(), State::Empty);
    assert_eq!(reconstructor.frame_count(), 0);
    assert!(reconstructor.output_image().is_none());
    assert!(reconstructor.uncovered_pixel_count().is_none());

    assert_eq!(
        reconstructor.request_preview(&exact_params()).unwrap_err(),
        Error::NoFramesLoaded
    );
    assert_eq!(
        reconstructor.commit_current_mask().unwrap_err(),
        Error::NoFramesLoaded
    );
}

#[test]
fn test_load_rejects_single_frame() {
    let mut reconstructor = BackgroundReconstructor::new(ReconstructorConfig::default());
    let err = reconstructor.load_frames(flat_frames(1, 4, 4)).unwrap_err();
    assert_eq!(err, Error::NotEnoughFrames { count: 1 });
    assert_eq!(reconstructor.state(), State::Empty);
}

#[test]
fn test_load_rejects_mismatched_dimensions() {
    let mut frames = flat_frames(3, 4, 4);
    frames[2] = Frame::new_filled(4, 5, GRAY);

    let mut reconstructor = BackgroundReconstructor::new(ReconstructorConfig::default());
    let err = reconstructor.load_frames(frames).unwrap_err();
    assert_eq!(
        err,
        Error::DimensionMismatch {
            index: 2,
            expected: (4, 4),
            actual: (4, 5),
        }
    );
}

#[test]
fn test_load_rejects_empty_frames() {
    let mut reconstructor = BackgroundReconstructor::new(ReconstructorConfig::default());
    for (width, height) in [(0, 0), (0, 3), (3, 0)] {
        let frames = vec![Frame::new_filled(width, height, GRAY); 2];
        let err = reconstructor.load_frames(frames).unwrap_err();
        assert_eq!(err, Error::EmptyFrame { width, height });
        assert_eq!(reconstructor.state(), State::Empty);
    }
}

#[test]
fn test_load_rejects_invalid_scale_factor() {
    let config = ReconstructorConfig {
        scale_factor: 0.0,
        ..ReconstructorConfig::default()
    };
    let mut reconstructor = BackgroundReconstructor::new(config);
    let err = reconstructor.load_frames(flat_frames(2, 4, 4)).unwrap_err();
    assert_eq!(err, Error::InvalidScaleFactor(0.0));
    assert_eq!(reconstructor.state(), State::Empty);
}

#[test]
fn test_failed_load_keeps_previous_session() {
    let mut reconstructor = loaded(flat_frames(3, 6, 4));
    reconstructor.request_preview(&exact_params()).unwrap();

    assert!(reconstructor.load_frames(flat_frames(1, 2, 2)).is_err());
    assert_eq!(reconstructor.state(), State::AwaitingValidatedMask);
    assert_eq!(reconstructor.frame_count(), 3);
    assert_eq!(reconstructor.original_size(), Some((6, 4)));
}

#[test]
fn test_commit_requires_preview() {
    let mut reconstructor = loaded(flat_frames(2, 4, 4));
    assert_eq!(reconstructor.state(), State::Ready);
    assert!(reconstructor.current_mask().is_none());

    let err = reconstructor.commit_current_mask().unwrap_err();
    assert_eq!(err, Error::MaskNotValidated { reference: 0 });
    assert_eq!(reconstructor.uncovered_pixel_count(), Some(16));
}

#[test]
fn test_invalid_threshold_is_rejected() {
    let mut reconstructor = loaded(flat_frames(2, 4, 4));
    let err = reconstructor
        .request_preview(&ProcessingParams::new(0, 300, 0, 0))
        .unwrap_err();
    assert_eq!(err, Error::ThresholdOutOfRange(300));
    assert_eq!(reconstructor.state(), State::Ready);
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn test_load_initializes_session() {
    let config = ReconstructorConfig {
        sentinel_color: Rgb8::new(1, 2, 3),
        ..ReconstructorConfig::default()
    };
    let mut reconstructor = BackgroundReconstructor::new(config);
    reconstructor.load_frames(flat_frames(2, 5, 3)).unwrap();

    assert_eq!(reconstructor.state(), State::Ready);
    assert_eq!(reconstructor.reference_index(), Some(0));
    assert_eq!(reconstructor.working_size(), Some((5, 3)));
    assert_eq!(reconstructor.uncovered_pixel_count(), Some(15));
    let output = reconstructor.output_image().unwrap();
    assert!(output.iter().all(|&px| px == Rgb8::new(1, 2, 3)));
}

#[test]
fn test_preview_marks_mask_validated() {
    let mut reconstructor = loaded(flat_frames(2, 4, 4));
    let preview = reconstructor.request_preview(&exact_params()).unwrap();

    assert!(preview.mask_valid);
    assert_eq!(preview.new_pixels, 16);
    assert_eq!(preview.overlay.size(), (4, 4));
    assert_eq!(reconstructor.state(), State::AwaitingValidatedMask);
    assert_eq!(reconstructor.current_mask().map(Mask::count_ones), Some(16));
    // previewing does not move the cursor
    assert_eq!(reconstructor.reference_index(), Some(0));
}

#[test]
fn test_repeated_preview_reuses_pipeline() {
    let mut reconstructor = loaded(flat_frames(3, 8, 8));
    let params = ProcessingParams::new(2, 20, 1, 1);
    reconstructor.request_preview(&params).unwrap();
    let aggregations = reconstructor.pipeline().unwrap().filter().aggregation_count();

    reconstructor.request_preview(&params).unwrap();
    assert_eq!(
        reconstructor.pipeline().unwrap().filter().aggregation_count(),
        aggregations
    );
}

#[test]
fn test_full_agreement_succeeds_on_first_commit() {
    let mut reconstructor = loaded(flat_frames(3, 4, 4));
    reconstructor.request_preview(&exact_params()).unwrap();

    assert_eq!(reconstructor.commit_current_mask().unwrap(), Status::Success);
    assert_eq!(reconstructor.state(), State::Finished(Outcome::Success));
    assert_eq!(reconstructor.uncovered_pixel_count(), Some(0));
    assert!(reconstructor.output_image().unwrap().iter().all(|&px| px == GRAY));

    assert_eq!(
        reconstructor.request_preview(&exact_params()).unwrap_err(),
        Error::SessionFinished
    );
    assert_eq!(
        reconstructor.commit_current_mask().unwrap_err(),
        Error::SessionFinished
    );
}

#[test]
fn test_commit_advances_and_drops_validation() {
    let mut frames = flat_frames(3, 4, 4);
    frames[0][(0, 0)] = BLUE;
    let mut reconstructor = loaded(frames);

    reconstructor.request_preview(&exact_params()).unwrap();
    assert_eq!(reconstructor.commit_current_mask().unwrap(), Status::Continue);
    assert_eq!(reconstructor.state(), State::Ready);
    assert_eq!(reconstructor.reference_index(), Some(1));
    assert!(reconstructor.current_mask().is_none());
    assert_eq!(
        reconstructor.commit_current_mask().unwrap_err(),
        Error::MaskNotValidated { reference: 1 }
    );
}

#[test]
fn test_exhausted_references_fail() {
    // every frame disagrees with every other one
    let frames = vec![
        Frame::new_filled(3, 3, Rgb8::new(0, 0, 0)),
        Frame::new_filled(3, 3, Rgb8::new(120, 120, 120)),
        Frame::new_filled(3, 3, Rgb8::new(240, 240, 240)),
    ];
    let mut reconstructor = loaded(frames);

    for _ in 0..2 {
        let preview = reconstructor.request_preview(&exact_params()).unwrap();
        // nothing to fill, but committing still moves on
        assert!(!preview.mask_valid);
        assert_eq!(preview.new_pixels, 0);
        assert_eq!(reconstructor.commit_current_mask().unwrap(), Status::Continue);
    }
    reconstructor.request_preview(&exact_params()).unwrap();
    assert_eq!(reconstructor.commit_current_mask().unwrap(), Status::Fail);
    assert_eq!(reconstructor.state(), State::Finished(Outcome::Failure));

    // coverage and output stay queryable
    assert_eq!(reconstructor.uncovered_pixel_count(), Some(9));
    assert_eq!(reconstructor.reference_index(), Some(3));
    assert!(reconstructor
        .output_image()
        .unwrap()
        .iter()
        .all(|&px| px == Rgb8::RED));
}

#[test]
fn test_reset_returns_to_empty() {
    let mut reconstructor = loaded(flat_frames(2, 4, 4));
    reconstructor.request_preview(&exact_params()).unwrap();
    reconstructor.reset();

    assert_eq!(reconstructor.state(), State::Empty);
    assert_eq!(reconstructor.frame_count(), 0);
    assert!(reconstructor.output_image().is_none());
    assert!(reconstructor.current_mask().is_none());
}

#[test]
fn test_status_display() {
    assert_eq!(Status::Continue.to_string(), "Continue");
    assert_eq!(State::AwaitingValidatedMask.to_string(), "AwaitingValidatedMask");
}
