//! # Reference path
//!
//! This module defines the fixed reference path the controller tracks. The
//! path is loaded once at startup from a recorded-odometry CSV file (one
//! header row, then `x, y, theta` rows) and never mutated afterwards.
//!
//! Indexing into the path is cyclic: `at(i)` takes `i` modulo the path
//! length. This is a first-class operation, not an error case, since the
//! horizon extraction deliberately runs off the end of the path when the
//! robot is near it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::loc::Pose2D;
use util::maths::unwrap_angles;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The reference path defining the desired trajectory of the robot.
#[derive(Clone, Serialize, Debug)]
pub struct RefPath {
    poses: Vec<Pose2D>,

    /// The heading column unwrapped once at load, so heading discontinuities
    /// stored in the file do not bias the nearest-point cost.
    unwrapped_headings_rad: Vec<f64>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Errors which can occur while loading a reference path.
#[derive(Debug, thiserror::Error)]
pub enum RefPathError {
    #[error("Cannot read the trajectory file: {0}")]
    FileError(csv::Error),

    /// The file parsed but contained no data rows. A path must have at least
    /// one point.
    #[error("The trajectory file contains no data rows")]
    NoRows,

    /// A data row did not contain three parseable floats. The index is the
    /// zero-based data row number (the header row is not counted).
    #[error("Row {0} of the trajectory file is invalid, expected three floats")]
    InvalidRow(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RefPath {
    /// Load a reference path from a recorded-odometry CSV file.
    ///
    /// The first row of the file is a header and is skipped.
    pub fn load<P: AsRef<std::path::Path>>(file_path: P) -> Result<Self, RefPathError> {
        let reader = csv::Reader::from_path(file_path)
            .map_err(RefPathError::FileError)?;

        Self::from_csv_reader(reader)
    }

    /// Build a reference path from an already-open CSV reader.
    fn from_csv_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>
    ) -> Result<Self, RefPathError> {
        let mut poses: Vec<Pose2D> = Vec::new();

        for (i, record) in reader.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(_) => return Err(RefPathError::InvalidRow(i))
            };

            // Each row must be exactly three floats: x, y, theta
            if record.len() != 3 {
                return Err(RefPathError::InvalidRow(i));
            }

            let mut fields = [0f64; 3];
            for (j, field) in record.iter().enumerate() {
                fields[j] = field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| RefPathError::InvalidRow(i))?;
            }

            poses.push(Pose2D::new(fields[0], fields[1], fields[2]));
        }

        Self::from_poses(poses)
    }

    /// Build a reference path directly from a sequence of poses.
    ///
    /// Fails if the sequence is empty.
    pub fn from_poses(poses: Vec<Pose2D>) -> Result<Self, RefPathError> {
        if poses.is_empty() {
            return Err(RefPathError::NoRows);
        }

        // Unwrap the heading column once here rather than on every
        // nearest-point scan
        let headings: Vec<f64> = poses.iter().map(|p| p.heading_rad).collect();
        let unwrapped_headings_rad = unwrap_angles(&headings);

        Ok(Self {
            poses,
            unwrapped_headings_rad,
        })
    }

    /// Get the number of points in the path.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Get the point at the given index, taken modulo the path length.
    pub fn at(&self, index: usize) -> &Pose2D {
        &self.poses[index % self.poses.len()]
    }

    /// Get the unwrapped heading of the point at the given index, taken
    /// modulo the path length.
    pub fn unwrapped_heading(&self, index: usize) -> f64 {
        self.unwrapped_headings_rad[index % self.poses.len()]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    fn reader_from(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new().from_reader(data.as_bytes())
    }

    #[test]
    fn test_load_csv() {
        let path = RefPath::from_csv_reader(reader_from(
            "x,y,theta\n0.0,0.0,0.0\n1.0,0.5,0.1\n2.0,1.0,0.2\n"
        )).unwrap();

        assert_eq!(path.len(), 3);
        assert_eq!(path.at(1).position_m[0], 1.0);
        assert_eq!(path.at(1).position_m[1], 0.5);
        assert_eq!(path.at(2).heading_rad, 0.2);
    }

    #[test]
    fn test_cyclic_indexing() {
        let path = RefPath::from_csv_reader(reader_from(
            "x,y,theta\n0.0,0.0,0.0\n1.0,0.0,0.0\n2.0,0.0,0.0\n"
        )).unwrap();

        // Indices wrap modulo the path length
        assert_eq!(path.at(3).position_m[0], 0.0);
        assert_eq!(path.at(4).position_m[0], 1.0);
        assert_eq!(path.at(302).position_m[0], 2.0);
    }

    #[test]
    fn test_heading_column_unwrapped() {
        // Stored headings jump across the pi boundary, the unwrapped column
        // must not
        let path = RefPath::from_poses(vec![
            Pose2D::new(0.0, 0.0, 3.0),
            Pose2D::new(1.0, 0.0, -3.0),
            Pose2D::new(2.0, 0.0, -2.8),
        ]).unwrap();

        for i in 1..path.len() {
            let diff = path.unwrapped_heading(i) - path.unwrapped_heading(i - 1);
            assert!(diff.abs() <= PI);
        }

        // The represented directions are unchanged
        assert!((path.unwrapped_heading(1) - (2.0 * PI - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_file_rejected() {
        match RefPath::from_csv_reader(reader_from("x,y,theta\n")) {
            Err(RefPathError::NoRows) => (),
            other => panic!("Expected NoRows, got {:?}", other.map(|p| p.len()))
        }
    }

    #[test]
    fn test_invalid_row_rejected() {
        match RefPath::from_csv_reader(reader_from(
            "x,y,theta\n0.0,0.0,0.0\n1.0,not_a_float,0.0\n"
        )) {
            Err(RefPathError::InvalidRow(1)) => (),
            other => panic!("Expected InvalidRow(1), got {:?}", other.map(|p| p.len()))
        }

        // Rows with the wrong number of fields are also invalid
        match RefPath::from_csv_reader(reader_from("x,y,theta\n0.0,0.0\n")) {
            Err(RefPathError::InvalidRow(0)) => (),
            other => panic!("Expected InvalidRow(0), got {:?}", other.map(|p| p.len()))
        }
    }
}
