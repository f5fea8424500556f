use crate::domain::ports::IdCodec;
use bson::oid::ObjectId;

/// Identifier strings are the 24-character hex form of an [`ObjectId`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HexObjectIdCodec;

impl IdCodec for HexObjectIdCodec {
    fn string_to_id(&self, value: &str) -> Result<ObjectId, String> {
        ObjectId::parse_str(value).map_err(|e| e.to_string())
    }

    fn id_to_string(&self, id: &ObjectId) -> String {
        id.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let codec = HexObjectIdCodec;
        let id = ObjectId::new();
        let text = codec.id_to_string(&id);
        assert_eq!(text.len(), 24);
        assert_eq!(codec.string_to_id(&text).unwrap(), id);
    }

    #[test]
    fn test_rejects_malformed_hex() {
        let codec = HexObjectIdCodec;
        assert!(codec.string_to_id("").is_err());
        assert!(codec.string_to_id("zzzzzzzzzzzzzzzzzzzzzzzz").is_err());
        assert!(codec.string_to_id("5f1d").is_err());
    }
}
