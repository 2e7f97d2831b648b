use proptest::prelude::*;
use squeeze_workflow::constants::MAX_UPLOAD_SIZE;
use squeeze_workflow::{
    calculate_reduction, check_constraints, format_file_size, CompressionParameters, Reduction,
    ValidationError,
};

proptest! {
    #[test]
    fn format_file_size_unit_follows_magnitude(bytes in 0u64..=u64::MAX / 2) {
        let formatted = format_file_size(bytes);
        if bytes < 1024 {
            prop_assert_eq!(formatted, format!("{} B", bytes));
        } else if bytes < 1024 * 1024 {
            prop_assert!(formatted.ends_with(" KB"));
        } else {
            prop_assert!(formatted.ends_with(" MB"));
        }
    }

    #[test]
    fn format_file_size_is_deterministic(bytes in any::<u64>()) {
        prop_assert_eq!(format_file_size(bytes), format_file_size(bytes));
    }

    #[test]
    fn oversized_files_are_too_large_whatever_the_type(
        excess in 1u64..=1024 * 1024 * 1024,
        mime in prop::sample::select(vec!["image/png", "image/jpeg", "text/plain", "", "application/zip"])
    ) {
        let size = MAX_UPLOAD_SIZE + excess;
        prop_assert_eq!(
            check_constraints(mime, size),
            Err(ValidationError::TooLarge(size, MAX_UPLOAD_SIZE))
        );
    }

    #[test]
    fn non_image_types_are_wrong_type(
        mime in "(text|video|audio|application)/[a-z0-9.+-]{1,12}",
        size in 0u64..=MAX_UPLOAD_SIZE
    ) {
        prop_assert!(matches!(
            check_constraints(&mime, size),
            Err(ValidationError::WrongType(_))
        ));
    }

    #[test]
    fn image_types_within_ceiling_pass(
        subtype in "[a-z0-9.+-]{1,12}",
        size in 0u64..=MAX_UPLOAD_SIZE
    ) {
        let mime = format!("image/{}", subtype);
        prop_assert!(check_constraints(&mime, size).is_ok());
    }

    #[test]
    fn parameters_accept_exactly_the_slider_range(quality in any::<u8>(), max_dimension in any::<u32>()) {
        let result = CompressionParameters::new(quality, max_dimension);
        let valid = (1..=100).contains(&quality) && max_dimension > 0;
        prop_assert_eq!(result.is_ok(), valid);
    }

    #[test]
    fn shrinking_results_reduce_between_zero_and_hundred(
        original in 1u64..=MAX_UPLOAD_SIZE,
        fraction in 0.0f64..=1.0
    ) {
        let compressed = (original as f64 * fraction) as u64;
        match calculate_reduction(original, compressed) {
            Reduction::Percent(p) => prop_assert!((0..=100).contains(&p)),
            Reduction::Undefined => prop_assert!(false, "defined for non-empty originals"),
        }
    }
}

#[test]
fn unit_boundaries() {
    assert!(format_file_size(1023).ends_with(" B"));
    assert!(format_file_size(1024).ends_with(" KB"));
    assert!(format_file_size(1_048_576).ends_with(" MB"));
}

#[test]
fn empty_non_image_is_wrong_type() {
    assert!(matches!(
        check_constraints("text/plain", 0),
        Err(ValidationError::WrongType(_))
    ));
}
