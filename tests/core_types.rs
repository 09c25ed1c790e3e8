use stereocorr::{
    Extrinsics, FeatureField, FeatureShape, ImageView, Intrinsics, Ncc, NccConfig, OwnedImage,
    StereoCorrError,
};

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1, 1).err().unwrap();
    assert_eq!(
        err,
        StereoCorrError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::from_slice(&data, 2, 2, 0).err().unwrap();
    assert_eq!(err, StereoCorrError::InvalidChannels { channels: 0 });
}

#[test]
fn image_view_rejects_invalid_stride() {
    let data = [0u8; 24];

    let err = ImageView::new(&data, 4, 1, 3, 11).err().unwrap();
    assert_eq!(
        err,
        StereoCorrError::InvalidStride {
            row_len: 12,
            stride: 11,
        }
    );
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [0u8; 11];

    let err = ImageView::from_slice(&data, 2, 2, 3).err().unwrap();
    assert_eq!(err, StereoCorrError::BufferTooSmall { needed: 12, got: 11 });
}

#[test]
fn image_view_padded_rows_index_correctly() {
    // 2x2 RGB with one padding element per row.
    let data: Vec<u8> = (0u8..14).collect();
    let view = ImageView::new(&data, 2, 2, 3, 7).unwrap();
    assert_eq!(view.row(0).unwrap(), &[0u8, 1, 2, 3, 4, 5]);
    assert_eq!(view.row(1).unwrap(), &[7u8, 8, 9, 10, 11, 12]);
    assert_eq!(view.get(1, 1).unwrap(), &[10u8, 11, 12]);
    assert!(view.get(2, 0).is_none());
    assert!(view.row(2).is_none());
}

#[test]
fn owned_image_requires_exact_length() {
    let err = OwnedImage::new(vec![0.0f32; 7], 2, 2, 2).err().unwrap();
    assert_eq!(
        err,
        StereoCorrError::BufferSizeMismatch {
            expected: 8,
            got: 7
        }
    );

    let img = OwnedImage::new(vec![0.5f32; 8], 2, 2, 2).unwrap();
    assert_eq!(img.view().stride(), 4);
    assert_eq!(img.view().get(1, 1).unwrap(), &[0.5, 0.5]);
}

#[test]
fn feature_field_reports_shape() {
    let field = FeatureField::new(vec![0.0; 4 * 3 * 27], 4, 3, 3, 3).unwrap();
    assert_eq!(
        field.shape(),
        FeatureShape {
            width: 4,
            height: 3,
            channels: 3,
            window_size: 3,
        }
    );
    assert_eq!(field.vector_len(), 27);
    assert_eq!(field.vector(3, 2).unwrap().len(), 27);
    assert!(field.vector(4, 0).is_none());
}

#[test]
fn singular_intrinsics_are_rejected() {
    let err = Intrinsics::from_params(0.0, 500.0, 320.0, 240.0, 0.0)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StereoCorrError::SingularMatrix {
            matrix: "intrinsics",
            ..
        }
    ));
}

#[test]
fn singular_extrinsics_are_rejected() {
    let rt = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0, 2.0],
    ];
    let err = Extrinsics::new(rt).err().unwrap();
    assert!(matches!(
        err,
        StereoCorrError::SingularMatrix {
            matrix: "extrinsics",
            ..
        }
    ));
}

#[test]
fn ncc_config_validates_window() {
    assert!(NccConfig::default().validate().is_ok());

    let err = Ncc::new(NccConfig {
        window_size: 4,
        parallel: false,
    })
    .err()
    .unwrap();
    assert_eq!(err, StereoCorrError::InvalidWindowSize { window_size: 4 });

    let ncc = Ncc::new(NccConfig::default()).unwrap();
    let ncc = ncc
        .with_config(NccConfig {
            window_size: 7,
            parallel: true,
        })
        .unwrap();
    assert_eq!(ncc.config().window_size, 7);
}
