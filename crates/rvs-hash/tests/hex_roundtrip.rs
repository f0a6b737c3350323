use proptest::prelude::*;
use rvs_hash::hex::{hex_decode, hex_to_string};
use rvs_hash::ObjectId;

proptest! {
    #[test]
    fn encode_then_decode_is_identity(bytes in proptest::collection::vec(any::<u8>(), 20)) {
        let hex = hex_to_string(&bytes);
        prop_assert_eq!(hex.len(), 40);
        let mut decoded = [0u8; 20];
        hex_decode(&hex, &mut decoded).unwrap();
        prop_assert_eq!(decoded.to_vec(), bytes);
    }

    #[test]
    fn oid_hex_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 20)) {
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        let oid = ObjectId::from_bytes(arr);
        let parsed = ObjectId::from_hex(&oid.to_hex()).unwrap();
        prop_assert_eq!(parsed, oid);
    }

    #[test]
    fn uppercase_decodes_to_same_oid(bytes in proptest::collection::vec(any::<u8>(), 20)) {
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        let oid = ObjectId::from_bytes(arr);
        let upper = oid.to_hex().to_uppercase();
        prop_assert_eq!(ObjectId::from_hex(&upper).unwrap(), oid);
    }
}
