// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! End-to-end scenarios, against the public `Driver` API, for the boundary
//! behaviors the unit tests colocated with each module don't individually
//! cover.

use vcf_chunk_parse::{Column, ConfigBuilder, Driver, StorageType};

fn driver_for(input: &'static [u8]) -> Driver<&'static [u8]> {
    let _ = env_logger::try_init();
    let cfg = ConfigBuilder::new(2, 2)
        .chunk_length(2)
        .chrom(8)
        .pos()
        .alt(8, 3)
        .qual()
        .filter("PASS")
        .filter("q10")
        .info("DP", StorageType::Int32, 1)
        .gt(StorageType::Int8)
        .build()
        .unwrap();
    Driver::new(input, cfg).unwrap()
}

/// Two fully-specified records fill exactly one chunk.
#[test]
fn two_records_fill_one_chunk() {
    let input: &[u8] = b"20\t14370\trs6\tG\tA\t29\tPASS\tDP=14\tGT\t0|0\t1|0\n\
                          20\t17330\t.\tT\tA\t3\tq10\tDP=11\tGT\t0|0\t0|1\n";
    let mut driver = driver_for(input);
    let chunk = driver.next_chunk().unwrap().unwrap();
    assert_eq!(chunk.len, 2);

    match chunk.get("variants/CHROM").unwrap() {
        Column::Bytes(a) => {
            assert_eq!(a.slot(&[0]), b"20\0\0\0\0\0\0");
            assert_eq!(a.slot(&[1]), b"20\0\0\0\0\0\0");
        }
        _ => panic!("expected bytes column"),
    }
    match chunk.get("variants/ALT").unwrap() {
        Column::Bytes(a) => {
            assert_eq!(&a.slot(&[0, 0])[..1], b"A");
            assert_eq!(&a.slot(&[1, 0])[..1], b"A");
        }
        _ => panic!("expected bytes column"),
    }
    match chunk.get("calldata/GT").unwrap() {
        Column::I8(a) => assert_eq!(a.data(), &[0, 0, 1, 0, 0, 0, 0, 1]),
        _ => panic!("expected int8 column"),
    }

    assert!(driver.next_chunk().unwrap().is_none());
}

/// Missing QUAL keeps the fill value (NaN), neighbors unaffected.
#[test]
fn missing_qual_keeps_fill_value() {
    let input: &[u8] = b"20\t1\t.\tG\tA\t29\tPASS\t.\tGT\t0|0\t0|0\n\
                          20\t2\t.\tG\tA\t.\tPASS\t.\tGT\t0|0\t0|0\n";
    let mut driver = driver_for(input);
    let chunk = driver.next_chunk().unwrap().unwrap();
    match chunk.get("variants/QUAL").unwrap() {
        Column::F32(a) => {
            assert_eq!(a.get(&[0]), 29.0);
            assert!(a.get(&[1]).is_nan());
        }
        _ => panic!("expected float column"),
    }
}

/// An unconfigured INFO key is skipped without error; configured keys on
/// the same record still materialize.
#[test]
fn unknown_info_key_is_skipped() {
    let input: &[u8] = b"20\t1\t.\tG\tA\t.\t.\tDP=5;FOO=bar;AF=0.1\tGT\t0|0\t0|0\n\
                          20\t2\t.\tG\tA\t.\t.\t.\tGT\t0|0\t0|0\n";
    let mut driver = driver_for(input);
    let chunk = driver.next_chunk().unwrap().unwrap();
    match chunk.get("variants/DP").unwrap() {
        Column::I32(a) => assert_eq!(a.get(&[0]), 5),
        _ => panic!("expected int32 column"),
    }
}

/// ALT with more alternates than `number` keeps only the first `number`.
#[test]
fn alt_overflow_drops_extra_alternates() {
    let input: &[u8] = b"20\t1\t.\tG\tA,C,G,T\t.\t.\t.\tGT\t0|0\t0|0\n\
                          20\t2\t.\tG\tA\t.\t.\t.\tGT\t0|0\t0|0\n";
    let mut driver = driver_for(input);
    let chunk = driver.next_chunk().unwrap().unwrap();
    match chunk.get("variants/ALT").unwrap() {
        Column::Bytes(a) => {
            assert_eq!(&a.slot(&[0, 0])[..1], b"A");
            assert_eq!(&a.slot(&[0, 1])[..1], b"C");
            assert_eq!(&a.slot(&[0, 2])[..1], b"G");
        }
        _ => panic!("expected bytes column"),
    }
}

/// A triploid genotype parsed against `ploidy = 2` keeps the first two
/// alleles.
#[test]
fn triploid_genotype_truncated_to_ploidy() {
    let input: &[u8] = b"20\t1\t.\tG\tA\t.\t.\t.\tGT\t0|1|2\t0|0\n\
                          20\t2\t.\tG\tA\t.\t.\t.\tGT\t0|0\t0|0\n";
    let mut driver = driver_for(input);
    let chunk = driver.next_chunk().unwrap().unwrap();
    match chunk.get("calldata/GT").unwrap() {
        Column::I8(a) => {
            assert_eq!(a.get(&[0, 0, 0]), 0);
            assert_eq!(a.get(&[0, 0, 1]), 1);
        }
        _ => panic!("expected int8 column"),
    }
}

/// Three records with `chunk_length = 2` emit a length-2 chunk followed by
/// a length-1 tail; every array in the tail has leading dimension 1.
#[test]
fn three_records_emit_two_chunks_with_partial_tail() {
    let input: &[u8] = b"20\t1\t.\tG\tA\t.\t.\t.\tGT\t0|0\t0|0\n\
                          20\t2\t.\tG\tA\t.\t.\t.\tGT\t0|0\t0|0\n\
                          20\t3\t.\tG\tA\t.\t.\t.\tGT\t0|0\t0|0\n";
    let mut driver = driver_for(input);
    let first = driver.next_chunk().unwrap().unwrap();
    assert_eq!(first.len, 2);
    let tail = driver.next_chunk().unwrap().unwrap();
    assert_eq!(tail.len, 1);
    match tail.get("variants/POS").unwrap() {
        Column::I32(a) => {
            assert_eq!(a.shape().dims(), &[1]);
            assert_eq!(a.get(&[0]), 3);
        }
        _ => panic!("expected int32 column"),
    }
    match tail.get("calldata/GT").unwrap() {
        Column::I8(a) => assert_eq!(a.shape().dims(), &[1, 2, 2]),
        _ => panic!("expected int8 column"),
    }
    assert!(driver.next_chunk().unwrap().is_none());
}

/// With `n_samples == 0` there is no FORMAT column or sample data at all:
/// INFO is the record's last field, terminated by NEWLINE rather than TAB.
#[test]
fn zero_samples_info_is_last_field() {
    let cfg = ConfigBuilder::new(0, 1)
        .chunk_length(2)
        .pos()
        .info("DP", StorageType::Int32, 1)
        .build()
        .unwrap();
    let input: &[u8] = b"20\t14370\trs6\tG\tA\t29\tPASS\tDP=14\n\
                          20\t17330\t.\tT\tA\t3\tq10\tDP=11\n";
    let mut driver = Driver::new(input, cfg).unwrap();
    let chunk = driver.next_chunk().unwrap().unwrap();
    assert_eq!(chunk.len, 2);
    match chunk.get("variants/POS").unwrap() {
        Column::I32(a) => assert_eq!(a.data(), &[14370, 17330]),
        _ => panic!("expected int32 column"),
    }
    match chunk.get("variants/DP").unwrap() {
        Column::I32(a) => assert_eq!(a.data(), &[14, 11]),
        _ => panic!("expected int32 column"),
    }
    assert!(driver.next_chunk().unwrap().is_none());
}

/// Exactly `n * chunk_length` records leave no partial tail chunk.
#[test]
fn exact_multiple_of_chunk_length_has_no_tail() {
    let input: &[u8] = b"20\t1\t.\tG\tA\t.\t.\t.\tGT\t0|0\t0|0\n\
                          20\t2\t.\tG\tA\t.\t.\t.\tGT\t0|0\t0|0\n";
    let mut driver = driver_for(input);
    assert!(driver.next_chunk().unwrap().is_some());
    assert!(driver.next_chunk().unwrap().is_none());
}
