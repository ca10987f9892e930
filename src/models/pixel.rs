use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A change to a single pixel on the shared wall.
///
/// Decoded fresh from every inbound frame and discarded after
/// broadcast. Coordinates, color and brightness are relayed opaquely:
/// no bounds check, no color format check, no brightness clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelUpdate {
    pub x: i32,
    pub y: i32,
    pub color: String,
    pub brightness: f64,
}

impl PixelUpdate {
    /// Decode a wire frame into an update.
    ///
    /// All four fields are required and must carry the right types;
    /// extra fields are ignored.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    #[test]
    fn test_decode_valid_update() {
        let update =
            PixelUpdate::decode(br##"{"x":3,"y":4,"color":"#ff0000","brightness":0.8}"##).unwrap();

        assert_eq!(
            update,
            PixelUpdate {
                x: 3,
                y: 4,
                color: "#ff0000".to_string(),
                brightness: 0.8,
            }
        );
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let update =
            PixelUpdate::decode(br##"{"x":1,"y":2,"color":"#fff","brightness":1.0,"ttl":30}"##)
                .unwrap();

        assert_eq!(update.x, 1);
        assert_eq!(update.y, 2);
    }

    #[test]
    fn test_decode_missing_field_is_an_error() {
        let err =
            PixelUpdate::decode(br##"{"y":4,"color":"#ff0000","brightness":0.8}"##).unwrap_err();
        assert!(matches!(err, RelayError::Decode(_)));
    }

    #[test]
    fn test_decode_wrong_type_is_an_error() {
        let err =
            PixelUpdate::decode(br##"{"x":3,"y":4,"color":"#ff0000","brightness":"bright"}"##)
                .unwrap_err();
        assert!(matches!(err, RelayError::Decode(_)));
    }

    #[test]
    fn test_wire_format_is_exactly_four_fields() {
        let update = PixelUpdate {
            x: 3,
            y: 4,
            color: "#ff0000".to_string(),
            brightness: 0.8,
        };

        let value = serde_json::to_value(&update).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(object["x"], 3);
        assert_eq!(object["y"], 4);
        assert_eq!(object["color"], "#ff0000");
        assert_eq!(object["brightness"], 0.8);
    }
}
