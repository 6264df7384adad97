//! Read/write model JSON files.
//!
//! A model file holds the nine parameters plus enough provenance to know how
//! they were produced (tool, timestamp, fit method and quality). The schema is
//! defined by `domain::ModelFile`; hand-written files only need `model`, given
//! either as named parameters or as a 9-element array in storage order. An
//! array of the wrong length is a `Dimension` error, as at the adapter.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use serde_json::Value;

use crate::adapter::model_from_slice;
use crate::domain::{FitMethod, FitQuality, ModelFile, TripodBsm};
use crate::error::{ErrorKind, FitError};

pub const TOOL_NAME: &str = "lcfit";

/// Build a model file stamped with the current local time.
pub fn model_file(model: TripodBsm, method: Option<FitMethod>, fit_quality: Option<FitQuality>) -> ModelFile {
    ModelFile {
        tool: TOOL_NAME.to_string(),
        created_at: Local::now().to_rfc3339(),
        method,
        model,
        fit_quality,
    }
}

pub fn write_model_json(path: &Path, file: &ModelFile) -> Result<(), FitError> {
    let out = File::create(path).map_err(|e| {
        FitError::new(
            ErrorKind::Io,
            format!("Failed to create model JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| FitError::new(ErrorKind::Io, format!("Failed to write model JSON: {e}")))
}

pub fn read_model_json(path: &Path) -> Result<ModelFile, FitError> {
    let file = File::open(path).map_err(|e| {
        FitError::new(
            ErrorKind::Io,
            format!("Failed to open model JSON '{}': {e}", path.display()),
        )
    })?;
    let mut value: Value = serde_json::from_reader(file)
        .map_err(|e| FitError::new(ErrorKind::Io, format!("Invalid model JSON: {e}")))?;

    if let Some(slot) = value.get_mut("model") {
        let from_array = match slot.as_array() {
            Some(items) => Some(model_from_values(items)?),
            None => None,
        };
        if let Some(model) = from_array {
            *slot = serde_json::to_value(model)
                .map_err(|e| FitError::new(ErrorKind::Io, format!("Invalid model JSON: {e}")))?;
        }
    }

    let parsed: ModelFile = serde_json::from_value(value)
        .map_err(|e| FitError::new(ErrorKind::Io, format!("Invalid model JSON: {e}")))?;
    Ok(parsed)
}

fn model_from_values(items: &[Value]) -> Result<TripodBsm, FitError> {
    let values = items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64().ok_or_else(|| {
                FitError::new(ErrorKind::Io, format!("Invalid model JSON: `model[{i}]` is not a number"))
            })
        })
        .collect::<Result<Vec<f64>, FitError>>()?;
    model_from_slice(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lcfit_{}_{name}", std::process::id()))
    }

    #[test]
    fn model_file_round_trip() {
        let m = TripodBsm::new([1500.0, 120.0, 90.0, 40.0], [1.0, 0.01, 0.6, 1.2, 0.02]);
        let quality = FitQuality {
            sse: 0.25,
            rmse: 0.125,
            n: 16,
        };
        let path = temp_path("model.json");
        write_model_json(&path, &model_file(m, Some(FitMethod::Rescale), Some(quality))).unwrap();

        let back = read_model_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.tool, TOOL_NAME);
        assert_eq!(back.model, m);
        assert_eq!(back.method, Some(FitMethod::Rescale));
        assert_eq!(back.fit_quality, Some(quality));
        assert!(chrono::DateTime::parse_from_rfc3339(&back.created_at).is_ok());
    }

    #[test]
    fn hand_written_file_needs_only_the_model() {
        let path = temp_path("minimal.json");
        std::fs::write(
            &path,
            r#"{ "model": { "n00": 100, "n01": 5, "n10": 4, "n11": 2,
                             "r": 1, "b": 0.01, "t": 0.5, "rx": 1, "bx": 0.01 } }"#,
        )
        .unwrap();
        let back = read_model_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.model.n01, 5.0);
        assert_eq!(back.model.t, 0.5);
        assert!(back.method.is_none());
        assert!(back.fit_quality.is_none());
    }

    #[test]
    fn bad_json_is_io_error() {
        let path = temp_path("bad.json");
        std::fs::write(&path, "{ \"model\": { \"n00\": 1 ").unwrap();
        let err = read_model_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.status(), 5);
    }

    #[test]
    fn array_model_is_length_checked() {
        let path = temp_path("short_array.json");
        std::fs::write(&path, "{ \"model\": [1, 2, 3] }").unwrap();
        let err = read_model_json(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.kind(), ErrorKind::Dimension);
        assert_eq!(err.status(), 19);

        let path = temp_path("full_array.json");
        std::fs::write(&path, "{ \"model\": [100, 5, 4, 2, 1, 0.01, 0.5, 1, 0.02] }").unwrap();
        let back = read_model_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.model.to_array(), [100.0, 5.0, 4.0, 2.0, 1.0, 0.01, 0.5, 1.0, 0.02]);
    }
}
