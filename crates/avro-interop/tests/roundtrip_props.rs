use avro_interop::{
    from_avro_datum, to_avro_datum, EncoderConfig, Schema, SchemaDecoder, SchemaEncoder, Value,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ints_and_longs_round_trip(n in any::<i32>(), m in any::<i64>()) {
        let bytes = to_avro_datum(&Schema::Int, &Value::Int(n)).unwrap();
        prop_assert!(bytes.len() <= 5);
        prop_assert_eq!(from_avro_datum(&Schema::Int, &bytes).unwrap(), Value::Int(n));

        let bytes = to_avro_datum(&Schema::Long, &Value::Long(m)).unwrap();
        prop_assert!(bytes.len() <= 10);
        prop_assert_eq!(from_avro_datum(&Schema::Long, &bytes).unwrap(), Value::Long(m));
    }

    #[test]
    fn int_and_long_encodings_agree(n in any::<i32>()) {
        prop_assert_eq!(
            to_avro_datum(&Schema::Int, &Value::Int(n)).unwrap(),
            to_avro_datum(&Schema::Long, &Value::Long(i64::from(n))).unwrap()
        );
    }

    #[test]
    fn strings_keep_their_utf8_bytes(s in any::<String>()) {
        let bytes = to_avro_datum(&Schema::String, &Value::Str(s.clone())).unwrap();
        prop_assert!(bytes.ends_with(s.as_bytes()));
        prop_assert_eq!(from_avro_datum(&Schema::String, &bytes).unwrap(), Value::Str(s));
    }

    #[test]
    fn doubles_are_bit_exact(bits in any::<u64>()) {
        let value = Value::Double(f64::from_bits(bits));
        let bytes = to_avro_datum(&Schema::Double, &value).unwrap();
        prop_assert_eq!(&bytes[..], &bits.to_le_bytes()[..]);
        prop_assert_eq!(from_avro_datum(&Schema::Double, &bytes).unwrap(), value);
    }

    #[test]
    fn arrays_round_trip_for_any_block_size(
        items in prop::collection::vec(any::<i64>(), 0..64),
        block_size in 1usize..10,
    ) {
        let schema = Schema::array(Schema::Long);
        let value = Value::Array(items.into_iter().map(Value::Long).collect());
        let encoder = SchemaEncoder::with_config(
            &schema,
            &EncoderConfig { block_size: Some(block_size) },
        )
        .unwrap();
        let bytes = encoder.encode_to_vec(&value).unwrap();
        let decoder = SchemaDecoder::new(&schema).unwrap();
        prop_assert_eq!(decoder.decode_slice(&bytes).unwrap(), value);
    }

    #[test]
    fn ints_promote_into_the_first_wider_branch(n in any::<i32>()) {
        let schema = Schema::Union(vec![Schema::String, Schema::Long, Schema::Double]);
        let bytes = to_avro_datum(&schema, &Value::Int(n)).unwrap();
        prop_assert_eq!(
            from_avro_datum(&schema, &bytes).unwrap(),
            Value::union(1, Value::Long(i64::from(n)))
        );
    }
}
