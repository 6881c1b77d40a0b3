//! Basic tests - insert, query, and the documented edge cases

use shapebloom::{fixed_encode, ByteOrder, FilterConfig, ShapeBloomError, ShapeBloomFilter};

struct Record {
    a: i32,
    b: u64,
}
fixed_encode!(Record { a, b });

#[test]
fn test_record_lands_in_twelve_byte_bucket() {
    let filter = ShapeBloomFilter::new();
    filter.insert(&Record { a: 10, b: 300 }).unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(&10i32.to_le_bytes());
    expected.extend_from_slice(&300u64.to_le_bytes());

    assert_eq!(filter.bucket_lengths(), vec![12]);
    assert_eq!(filter.bitfield(12), Some(expected));
    assert!(filter.possibly_contains(&Record { a: 10, b: 300 }).unwrap());
    assert_eq!(filter.len(), 1);
}

#[test]
fn test_i64_found_and_fresh_filter_empty() {
    let filter = ShapeBloomFilter::new();
    filter.insert(&3i64).unwrap();
    assert!(filter.possibly_contains(&3i64).unwrap());

    let fresh = ShapeBloomFilter::new();
    assert!(
        !fresh.possibly_contains(&3i64).unwrap(),
        "Fresh filter must answer false"
    );
}

#[test]
fn test_no_false_negatives() {
    let filter = ShapeBloomFilter::new();

    for i in 0..1_000u64 {
        filter.insert(&i).unwrap();
    }

    for i in 0..1_000u64 {
        assert!(filter.possibly_contains(&i).unwrap(), "False negative for {}", i);
    }
}

#[test]
fn test_unseen_length_is_negative() {
    let filter = ShapeBloomFilter::new();
    filter.insert(&u64::MAX).unwrap();

    // Saturated 8-byte bucket, but nothing of length 1, 2, 4 or 16.
    assert!(!filter.possibly_contains(&u8::MAX).unwrap());
    assert!(!filter.possibly_contains(&u16::MAX).unwrap());
    assert!(!filter.possibly_contains(&u32::MAX).unwrap());
    assert!(!filter.possibly_contains(&u128::MAX).unwrap());
    assert!(filter.possibly_contains(&12345u64).unwrap());
}

#[test]
fn test_counter_counts_every_success() {
    let filter = ShapeBloomFilter::new();
    filter.insert(&1u8).unwrap();
    filter.insert(&1u8).unwrap();
    filter.insert(&[1u16, 2, 3]).unwrap();
    let _ = filter.insert(&String::from("rejected"));
    filter.possibly_contains(&1u8).unwrap();

    assert_eq!(filter.len(), 3);
}

#[test]
fn test_cross_length_independence() {
    let filter = ShapeBloomFilter::new();
    filter.insert(&0xFFu8).unwrap();
    filter.insert(&0x0001u16).unwrap();

    assert_eq!(filter.bitfield(1), Some(vec![0xFF]));
    assert_eq!(filter.bitfield(2), Some(vec![0x01, 0x00]));
    assert!(!filter.possibly_contains(&0x0100u16).unwrap());
}

#[test]
fn test_union_false_positive_is_expected() {
    let filter = ShapeBloomFilter::new();
    filter.insert(&0b0101u8).unwrap();
    filter.insert(&0b1010u8).unwrap();

    // Never inserted, covered by the union of the two above.
    assert!(filter.possibly_contains(&0b1111u8).unwrap());
    assert!(filter.possibly_contains(&0b0000u8).unwrap());
    assert!(!filter.possibly_contains(&0b1_0000u8).unwrap());
}

#[test]
fn test_rejected_types() {
    let filter = ShapeBloomFilter::new();

    for err in [
        filter.insert(&1usize).unwrap_err(),
        filter.insert(&-1isize).unwrap_err(),
        filter.insert("str").unwrap_err(),
        filter.insert(&String::from("string")).unwrap_err(),
    ] {
        assert!(matches!(err, ShapeBloomError::Encoding { .. }));
    }

    assert!(filter.is_empty());
    assert_eq!(filter.bucket_count(), 0);
}

#[test]
fn test_empty_collections_of_rejected_types() {
    let filter = ShapeBloomFilter::new();

    assert!(filter.insert(&Vec::<usize>::new()).unwrap_err().is_encoding());
    assert!(filter.insert(&Vec::<String>::new()).unwrap_err().is_encoding());
    assert!(filter.insert(&[0usize; 0]).unwrap_err().is_encoding());
    assert!(filter
        .possibly_contains(&Vec::<isize>::new())
        .unwrap_err()
        .is_encoding());

    // No zero-length bucket was created along the way.
    assert_eq!(filter.len(), 0);
    assert_eq!(filter.bucket_count(), 0);
    assert!(!filter.possibly_contains(&()).unwrap());
}

#[test]
fn test_fixed_byte_array_encodes_text() {
    let filter = ShapeBloomFilter::new();
    filter.insert(b"user-42\0").unwrap();
    assert!(filter.possibly_contains(b"user-42\0").unwrap());
    assert_eq!(filter.bucket_lengths(), vec![8]);
}

#[test]
fn test_vec_length_is_part_of_shape() {
    let filter = ShapeBloomFilter::new();
    filter.insert(&vec![1u32, 2]).unwrap();

    assert!(filter.possibly_contains(&vec![1u32, 2]).unwrap());
    assert!(!filter.possibly_contains(&vec![1u32, 2, 3]).unwrap());
    assert_eq!(filter.bucket_lengths(), vec![8]);
}

#[test]
fn test_big_endian_filter() {
    let filter = ShapeBloomFilter::with_config(FilterConfig {
        byte_order: ByteOrder::Big,
        ..FilterConfig::default()
    })
    .unwrap();
    filter.insert(&Record { a: 10, b: 300 }).unwrap();

    let bits = filter.bitfield(12).unwrap();
    assert_eq!(&bits[..4], &10i32.to_be_bytes());
    assert_eq!(&bits[4..], &300u64.to_be_bytes());
}

#[test]
fn test_batch_operations() {
    let filter = ShapeBloomFilter::optimistic();
    let items = [7u32, 11, 13];

    assert_eq!(filter.insert_batch(&items).unwrap(), 3);

    for item in &items {
        assert!(filter.possibly_contains(item).unwrap(), "Should find {}", item);
    }
    assert_eq!(filter.contains_batch(&[7u32, 11]).unwrap(), vec![true, true]);
}
