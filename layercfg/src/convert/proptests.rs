//! Property-based tests for literal conversion.

use std::time::Duration;

use proptest::prelude::*;

use super::{format_duration, parse_duration, Converter, MainConverter, TypeDescriptor, Value};

fn duration_strategy() -> impl Strategy<Value = Duration> {
    (0u64..=10_000_000_000, 0u32..1_000_000_000).prop_map(|(s, n)| Duration::new(s, n))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // The composite rendering always parses back to the same span.
    #[test]
    fn duration_format_parses_back(duration in duration_strategy()) {
        let rendered = format_duration(duration);
        prop_assert_eq!(parse_duration(&rendered).unwrap(), duration);
    }

    // Segment order never changes the sum.
    #[test]
    fn duration_segments_commute(h in 0u64..1000, m in 0u64..1000, s in 0u64..1000) {
        let forward = parse_duration(&format!("{h}hours{m}mins{s}secs")).unwrap();
        let backward = parse_duration(&format!("{s}secs{m}mins{h}hours")).unwrap();
        prop_assert_eq!(forward, backward);
        prop_assert_eq!(forward, Duration::from_secs(h * 3600 + m * 60 + s));
    }

    // Decimal and hexadecimal spellings decode to the same long.
    #[test]
    fn long_hex_and_decimal_agree(n in any::<i64>().prop_filter("magnitude fits", |n| *n != i64::MIN)) {
        let main = MainConverter::default();
        let hex = if n < 0 { format!("-0x{:x}", -n) } else { format!("0x{n:x}") };
        prop_assert_eq!(
            main.from_literal(&TypeDescriptor::Long, &hex).unwrap(),
            Value::Long(n)
        );
        prop_assert_eq!(
            main.from_literal(&TypeDescriptor::Long, &n.to_string()).unwrap(),
            Value::Long(n)
        );
    }

    // Rendering a double and converting it back is lossless.
    #[test]
    fn double_round_trip(x in any::<f64>().prop_filter("finite", |x| x.is_finite())) {
        let main = MainConverter::default();
        let rendered = main.to_literal(&TypeDescriptor::Double, &Value::Double(x)).unwrap();
        prop_assert_eq!(
            main.from_literal(&TypeDescriptor::Double, &rendered).unwrap(),
            Value::Double(x)
        );
    }

    // Sets of ints render sorted and unique whatever the input order.
    #[test]
    fn int_set_is_canonical(items in prop::collection::vec(-1000i32..1000, 0..20)) {
        let main = MainConverter::default();
        let ty = TypeDescriptor::Set(Box::new(TypeDescriptor::Int));
        let literal = items.iter().map(i32::to_string).collect::<Vec<_>>().join(",");
        let value = main.from_literal(&ty, &literal).unwrap();

        let mut expected = items.clone();
        expected.sort_unstable();
        expected.dedup();
        let expected_literal = expected.iter().map(i32::to_string).collect::<Vec<_>>().join(",");
        prop_assert_eq!(main.to_literal(&ty, &value).unwrap(), expected_literal);
    }
}
