//! Reusable element fixtures.
//!
//! Each builder returns a small, deterministic set of elements so tests can
//! compare what comes back out of a container with what went in.

use ffivec_core::StdVectorError;
use ffivec_stdvector::{
    BoxAttributes, ChipDetails, ColumnVector, DPoint, DatasetBox, DatasetImage,
    FullObjectDetection, MModRect, Matrix, OverlayRect, Point, RectDetection, Rectangle, RgbPixel,
    SamplePair, StdString, SurfPoint, SURF_DESCRIPTOR_LEN,
};

/// `n` distinct rectangles; rectangle `i` is `(i, i, i + 10, i + 20)`.
pub fn rectangles(n: usize) -> Vec<Rectangle> {
    (0..n as i64)
        .map(|i| Rectangle::new(i, i, i + 10, i + 20))
        .collect()
}

/// `n` points along the diagonal.
pub fn points(n: usize) -> Vec<Point> {
    (0..n as i64).map(|i| Point::new(i, -i)).collect()
}

/// Strings `"A"`, `"B"`, ... for the first `n` letters.
pub fn letters(n: usize) -> Result<Vec<StdString>, StdVectorError> {
    (b'A'..=b'Z')
        .take(n)
        .map(|c| StdString::new([c]))
        .collect()
}

/// Mmod rects labelled `"face"` and `"car"`, with the second ignored.
pub fn mmod_rects() -> Result<Vec<MModRect>, StdVectorError> {
    Ok(vec![
        MModRect::new(Rectangle::new(0, 0, 31, 31), 0.9, false, "face")?,
        MModRect::new(Rectangle::new(40, 10, 79, 49), 0.25, true, "car")?,
    ])
}

/// Two rect detections with distinct weight indices.
pub fn rect_detections() -> Result<Vec<RectDetection>, StdVectorError> {
    Ok(vec![
        RectDetection::new(Rectangle::new(1, 1, 5, 5), 0.5, 3)?,
        RectDetection::new(Rectangle::new(2, 2, 8, 8), 1.5, 7)?,
    ])
}

/// A detection with `parts` landmark points.
pub fn full_object_detection(parts: usize) -> Result<FullObjectDetection, StdVectorError> {
    FullObjectDetection::new(Rectangle::new(0, 0, 99, 99), &points(parts))
}

/// Pairs `(0, 1)`, `(1, 2)`, ... with distance equal to the first index.
pub fn sample_pairs(n: usize) -> Result<Vec<SamplePair>, StdVectorError> {
    (0..n as u64)
        .map(|i| SamplePair::new(i, i + 1, i as f64))
        .collect()
}

/// A `rows x columns` matrix counting up from zero in row-major order.
pub fn counting_matrix(rows: usize, columns: usize) -> Result<Matrix<f64>, StdVectorError> {
    let data: Vec<f64> = (0..rows * columns).map(|i| i as f64).collect();
    Matrix::from_data(rows, columns, &data)
}

/// `n` column vectors; vector `i` holds `0.0, 1.0, ..., i`.
pub fn column_vectors(n: usize) -> Result<Vec<ColumnVector>, StdVectorError> {
    (0..n)
        .map(|i| {
            let values: Vec<f64> = (0..=i).map(|v| v as f64).collect();
            ColumnVector::new(&values)
        })
        .collect()
}

/// Chip details over [`rectangles`], each rotated a further quarter radian.
pub fn chip_details(n: usize) -> Result<Vec<ChipDetails>, StdVectorError> {
    rectangles(n)
        .into_iter()
        .enumerate()
        .map(|(i, r)| ChipDetails::new(r, i as f64 * 0.25, 32, 32))
        .collect()
}

/// A SURF point at `(x, x / 2)` whose descriptor holds its index.
pub fn surf_point(x: f64) -> Result<SurfPoint, StdVectorError> {
    let mut descriptor = [0.0; SURF_DESCRIPTOR_LEN];
    for (i, d) in descriptor.iter_mut().enumerate() {
        *d = i as f64 / SURF_DESCRIPTOR_LEN as f64;
    }
    SurfPoint::new(DPoint::new(x, x / 2.0), 2.0, 0.5, 1.0, 0.0, &descriptor)
}

/// Red overlay rectangles labelled `"A"`, `"B"`, ... over [`rectangles`].
pub fn overlay_rects(n: usize) -> Result<Vec<OverlayRect>, StdVectorError> {
    let red = RgbPixel {
        red: 255,
        green: 0,
        blue: 0,
    };
    rectangles(n)
        .into_iter()
        .zip(b'A'..=b'Z')
        .map(|(r, c)| OverlayRect::new(r, red, &char::from(c).to_string()))
        .collect()
}

/// A face box with two named landmarks.
pub fn dataset_box() -> Result<DatasetBox, StdVectorError> {
    let attributes = BoxAttributes {
        occluded: true,
        pose: 30.0,
        ..BoxAttributes::default()
    };
    DatasetBox::new(
        Rectangle::new(10, 10, 59, 59),
        "face",
        attributes,
        &[("left_eye", Point::new(20, 25)), ("right_eye", Point::new(45, 25))],
    )
}

/// An image named `filename` holding `boxes` copies of [`dataset_box`].
pub fn dataset_image(filename: &str, boxes: usize) -> Result<DatasetImage, StdVectorError> {
    let boxes = (0..boxes)
        .map(|_| dataset_box())
        .collect::<Result<Vec<_>, _>>()?;
    DatasetImage::new(filename, &boxes)
}
