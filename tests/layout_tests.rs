use ziplist::{ZipList, ZipListError};

/// `[0x01, 0x02]` followed by `[0x03]`.
fn two_entry_bytes() -> Vec<u8> {
    vec![
        18, 0, 0, 0, 14, 0, 0, 0, 2, 0, 0x00, 0xC2, 0x01, 0x02, 0x04, 0xC1, 0x03, 0xFF,
    ]
}

#[test]
fn test_from_bytes_round_trip() {
    let list = ZipList::from_bytes(&two_entry_bytes()).unwrap();

    assert_eq!(list.len().unwrap(), 2);
    assert_eq!(list.get(0).unwrap(), &[0x01, 0x02]);
    assert_eq!(list.get(1).unwrap(), &[0x03]);
    assert_eq!(list.as_bytes().unwrap(), two_entry_bytes().as_slice());
}

#[test]
fn test_from_bytes_empty_list() {
    let list = ZipList::from_bytes(&[11, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF]).unwrap();
    assert!(list.is_empty().unwrap());
    assert_eq!(list.capacity().unwrap(), 128);
}

#[test]
fn test_from_bytes_then_mutate() {
    let mut list = ZipList::from_bytes(&two_entry_bytes()).unwrap();
    list.push(b"new").unwrap();
    list.delete(0).unwrap();

    let items: Vec<_> = list.iter().unwrap().collect();
    let expected: &[&[u8]] = &[&[0x03], b"new"];
    assert_eq!(items, expected);
}

#[test]
fn test_from_bytes_rejects_short_region() {
    assert_eq!(
        ZipList::from_bytes(&[11, 0, 0]).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "region is shorter than an empty list"
        }
    );
}

#[test]
fn test_from_bytes_rejects_total_size_mismatch() {
    let mut bytes = two_entry_bytes();
    bytes[0] = 19;
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "total-size does not match the region length"
        }
    );
}

#[test]
fn test_from_bytes_rejects_missing_terminator() {
    let mut bytes = two_entry_bytes();
    bytes[17] = 0x00;
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "missing terminator"
        }
    );
}

#[test]
fn test_from_bytes_rejects_count_mismatch() {
    let mut bytes = two_entry_bytes();
    bytes[8] = 3;
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "entry-count does not match the entries"
        }
    );

    bytes[8] = 0xFF;
    bytes[9] = 0xFF;
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "negative header field"
        }
    );
}

#[test]
fn test_from_bytes_rejects_tail_mismatch() {
    let mut bytes = two_entry_bytes();
    bytes[4] = 10;
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "tail-offset does not point at the last entry"
        }
    );
}

#[test]
fn test_from_bytes_rejects_prevlen_mismatch() {
    let mut bytes = two_entry_bytes();
    bytes[14] = 5;
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "previous-length does not match the preceding entry"
        }
    );
}

#[test]
fn test_from_bytes_rejects_wide_prevlen_for_small_value() {
    // First entry spells its zero previous-length with the 5-byte escape.
    let bytes = vec![
        21, 0, 0, 0, 17, 0, 0, 0, 2, 0, // header
        0xFE, 0, 0, 0, 0, 0xC1, b'x', // entry 0
        7, 0xC1, b'y', // entry 1
        0xFF,
    ];
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "previous-length uses a non-canonical width"
        }
    );
}

#[test]
fn test_from_bytes_rejects_wide_length_encoding() {
    // A 1-byte payload written in the 5-byte length form.
    let bytes = vec![
        18, 0, 0, 0, 10, 0, 0, 0, 1, 0, // header
        0x00, 0x80, 1, 0, 0, 0, b'z', // entry 0
        0xFF,
    ];
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidLayout {
            reason: "length encoding uses a non-canonical width"
        }
    );
}

#[test]
fn test_from_bytes_rejects_invalid_encoding() {
    let mut bytes = two_entry_bytes();
    bytes[11] = 0x40;
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::InvalidEncoding {
            offset: 11,
            byte: 0x40
        }
    );
}

#[test]
fn test_from_bytes_rejects_truncated_entry() {
    let mut bytes = two_entry_bytes();
    // Claims a 6-byte payload that runs into the terminator.
    bytes[11] = 0xC6;
    assert_eq!(
        ZipList::from_bytes(&bytes).unwrap_err(),
        ZipListError::Truncated { offset: 12 }
    );
}

#[test]
fn test_header_tracks_used_length() {
    let mut list = ZipList::new();
    for i in 0..30u8 {
        list.push(&vec![i; usize::from(i) * 2]).unwrap();
        assert_eq!(list.total_size().unwrap(), list.as_bytes().unwrap().len());
    }
    for _ in 0..10 {
        list.delete(3).unwrap();
        assert_eq!(list.total_size().unwrap(), list.as_bytes().unwrap().len());
        assert_eq!(list.as_bytes().unwrap().last(), Some(&0xFF));
    }
    assert_eq!(list.len().unwrap(), 20);
    assert!(ZipList::from_bytes(list.as_bytes().unwrap()).is_ok());
}
