use serde_json::Value;

use crate::CameraError;

/// Quality used when the caller does not ask for one.
pub const DEFAULT_QUALITY: u8 = 80;

const MAX_QUALITY: u8 = 100;

/// Format of the picture returned from a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DestinationType {
    /// Base64 encoded image data.
    #[default]
    DataUrl = 0,
    /// URI of the image file on the device.
    FileUri = 1,
}

impl DestinationType {
    /// Integer value sent over the bridge.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for DestinationType {
    type Error = CameraError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::DataUrl),
            1 => Ok(Self::FileUri),
            other => Err(CameraError::UnknownDestinationType(other)),
        }
    }
}

/// Where the picture comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceType {
    /// Pick an image from the photo library.
    PhotoLibrary = 0,
    /// Take a picture with the camera.
    #[default]
    Camera = 1,
    /// Pick an image from the saved photo album.
    SavedPhotoAlbum = 2,
}

impl SourceType {
    /// Integer value sent over the bridge.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for SourceType {
    type Error = CameraError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::PhotoLibrary),
            1 => Ok(Self::Camera),
            2 => Ok(Self::SavedPhotoAlbum),
            other => Err(CameraError::UnknownSourceType(other)),
        }
    }
}

/// Options for a single capture.
///
/// Defaults: quality 80, [`DestinationType::DataUrl`], [`SourceType::Camera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraOptions {
    /// JPEG quality, 0 to 100.
    pub quality: u8,
    /// Format of the returned picture.
    pub destination_type: DestinationType,
    /// Where the picture comes from.
    pub source_type: SourceType,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            destination_type: DestinationType::default(),
            source_type: SourceType::default(),
        }
    }
}

impl CameraOptions {
    /// Create options with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quality. Values above 100 are clamped.
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(MAX_QUALITY);
        self
    }

    /// Set the destination type.
    #[must_use]
    pub const fn with_destination(mut self, destination_type: DestinationType) -> Self {
        self.destination_type = destination_type;
        self
    }

    /// Set the source type.
    #[must_use]
    pub const fn with_source(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }

    /// Read options from a loosely typed object as handed over by web content.
    ///
    /// Every field falls back to its default on its own:
    /// - `quality` is used when truthy and numeric. It is truncated and
    ///   clamped into 0..=100. A result of `0` counts as missing.
    /// - `destinationType` is used when truthy and a known value.
    /// - `sourceType` is used whenever it is a known number, `0` included.
    ///
    /// Anything that is not an object yields the defaults.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut options = Self::default();
        let Some(fields) = value.as_object() else {
            if !value.is_null() {
                log::warn!("camera options are not an object ({value}); using defaults");
            }
            return options;
        };

        if let Some(quality) = fields.get("quality").filter(|v| is_truthy(v)) {
            match quality.as_f64() {
                Some(q) => options.quality = normalize_quality(q),
                None => log::warn!("ignoring non-numeric camera quality {quality}"),
            }
        }

        if let Some(destination) = fields.get("destinationType").filter(|v| is_truthy(v)) {
            match as_integer(destination).map(DestinationType::try_from) {
                Some(Ok(d)) => options.destination_type = d,
                Some(Err(err)) => log::warn!("ignoring camera destinationType: {err}"),
                None => log::warn!("ignoring non-numeric camera destinationType {destination}"),
            }
        }

        if let Some(source) = fields.get("sourceType").filter(|v| v.is_number()) {
            match as_integer(source).map(SourceType::try_from) {
                Some(Ok(s)) => options.source_type = s,
                Some(Err(err)) => log::warn!("ignoring camera sourceType: {err}"),
                None => log::warn!("ignoring fractional camera sourceType {source}"),
            }
        }

        options
    }

    /// Positional bridge arguments: `[quality, destinationType, sourceType]`.
    #[must_use]
    pub fn args(&self) -> [i64; 3] {
        [
            i64::from(self.quality),
            self.destination_type.as_i64(),
            self.source_type.as_i64(),
        ]
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_quality(quality: f64) -> u8 {
    let clamped = quality.trunc().clamp(0.0, f64::from(MAX_QUALITY));
    if clamped < 1.0 {
        log::warn!("camera quality {quality} is below 1; using {DEFAULT_QUALITY}");
        return DEFAULT_QUALITY;
    }
    if (clamped - quality).abs() >= 1.0 {
        log::warn!("camera quality {quality} out of range; using {clamped}");
    }
    clamped as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let options = CameraOptions::default();
        assert_eq!(options.quality, 80);
        assert_eq!(options.destination_type, DestinationType::DataUrl);
        assert_eq!(options.source_type, SourceType::Camera);
        assert_eq!(options.args(), [80, 0, 1]);
    }

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(CameraOptions::from_value(&json!({})), CameraOptions::default());
        assert_eq!(CameraOptions::from_value(&json!(null)), CameraOptions::default());
        assert_eq!(CameraOptions::from_value(&json!("hd")), CameraOptions::default());
    }

    #[test]
    fn numeric_quality_is_kept() {
        for q in [1, 25, 50, 99, 100] {
            let options = CameraOptions::from_value(&json!({ "quality": q }));
            assert_eq!(i64::from(options.quality), q);
        }
    }

    #[test]
    fn falsy_quality_uses_default() {
        for value in [json!(0), json!(null), json!(false), json!("")] {
            let options = CameraOptions::from_value(&json!({ "quality": value }));
            assert_eq!(options.quality, DEFAULT_QUALITY);
        }
    }

    #[test]
    fn odd_quality_is_normalized() {
        assert_eq!(CameraOptions::from_value(&json!({ "quality": 150 })).quality, 100);
        assert_eq!(CameraOptions::from_value(&json!({ "quality": 42.9 })).quality, 42);
        assert_eq!(CameraOptions::from_value(&json!({ "quality": "high" })).quality, 80);
    }

    #[test]
    fn quality_below_one_uses_default() {
        for q in [0.5, 0.99, -0.5, -5.0] {
            let options = CameraOptions::from_value(&json!({ "quality": q }));
            assert_eq!(options.quality, DEFAULT_QUALITY, "quality {q}");
            assert_eq!(options.args(), [80, 0, 1]);
        }
    }

    #[test]
    fn destination_type() {
        let options = CameraOptions::from_value(&json!({ "destinationType": 1 }));
        assert_eq!(options.destination_type, DestinationType::FileUri);

        let options = CameraOptions::from_value(&json!({ "destinationType": 0 }));
        assert_eq!(options.destination_type, DestinationType::DataUrl);

        let options = CameraOptions::from_value(&json!({ "destinationType": 7 }));
        assert_eq!(options.destination_type, DestinationType::DataUrl);
    }

    #[test]
    fn source_type_must_be_numeric() {
        let options = CameraOptions::from_value(&json!({ "sourceType": 0 }));
        assert_eq!(options.source_type, SourceType::PhotoLibrary);

        let options = CameraOptions::from_value(&json!({ "sourceType": 2.0 }));
        assert_eq!(options.source_type, SourceType::SavedPhotoAlbum);

        for value in [json!("0"), json!("CAMERA"), json!(true), json!([0])] {
            let options = CameraOptions::from_value(&json!({ "sourceType": value }));
            assert_eq!(options.source_type, SourceType::Camera);
        }
    }

    #[test]
    fn builder_clamps_quality() {
        let options = CameraOptions::new()
            .with_quality(250)
            .with_destination(DestinationType::FileUri)
            .with_source(SourceType::PhotoLibrary);
        assert_eq!(options.args(), [100, 1, 0]);
    }

    #[test]
    fn enum_round_trip_through_integers() {
        assert_eq!(DestinationType::try_from(1), Ok(DestinationType::FileUri));
        assert_eq!(
            DestinationType::try_from(2),
            Err(CameraError::UnknownDestinationType(2))
        );
        assert_eq!(SourceType::try_from(3), Err(CameraError::UnknownSourceType(3)));
    }
}
