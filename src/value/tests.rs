/*
 * Created on Fri Feb 16 2024
 *
 * This file is a part of Skyresp
 * Skyresp is a free and open-source RESP (REdis Serialization Protocol)
 * value engine written by Sayan Nandan ("the Author") with the vision to
 * provide a compact, zero-copy representation for protocol values without
 * compromising on performance or correctness.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

use {
    super::{RespValue, Storage},
    crate::{
        error::RespError,
        tag::{RespVersion, Tag},
    },
};

// factories

#[test]
fn byte_storage_transitions() {
    let empty = RespValue::of_bytes(Tag::BlobString, b"").unwrap();
    assert!(matches!(empty.storage(), Storage::Empty));
    for len in [1usize, 11, 12] {
        let payload = vec![b'x'; len];
        let v = RespValue::of_bytes(Tag::BlobString, &payload).unwrap();
        assert!(
            matches!(v.storage(), Storage::Inline(i) if i.len() == len),
            "{len} byte payload should inline"
        );
    }
    let payload = vec![b'x'; 13];
    let v = RespValue::of_bytes(Tag::BlobString, &payload).unwrap();
    assert!(matches!(v.storage(), Storage::Slice(s) if s.len() == 13));
}

#[test]
fn null_tag_empty_line_is_null() {
    let v = RespValue::of_bytes(Tag::Null, b"").unwrap();
    assert!(v.is_null());
    assert_eq!(v, RespValue::null());
}

#[test]
fn aggregate_tags_rejected_by_leaf_factories() {
    assert_eq!(
        RespValue::of_bytes(Tag::Array, b"nope").unwrap_err(),
        RespError::Argument
    );
    assert_eq!(
        RespValue::of_i64(Tag::Map, 1).unwrap_err(),
        RespError::Argument
    );
    assert_eq!(
        RespValue::of_str(Tag::Set, "nope").unwrap_err(),
        RespError::Argument
    );
    assert_eq!(
        RespValue::of_f64(Tag::Push, 1.0).unwrap_err(),
        RespError::Argument
    );
}

#[test]
fn of_pieces_classification() {
    let inline = RespValue::of_pieces(Tag::SimpleString, &[b"abc", b"def"]).unwrap();
    assert!(matches!(inline.storage(), Storage::Inline(i) if i.as_slice() == b"abcdef"));
    let single: &[&[u8]] = &[b"a single long payload"];
    let v = RespValue::of_pieces(Tag::SimpleString, single).unwrap();
    assert!(matches!(v.storage(), Storage::Slice(_)));
    let split: &[&[u8]] = &[b"a single long", b" payload"];
    let v = RespValue::of_pieces(Tag::SimpleString, split).unwrap();
    assert!(matches!(v.storage(), Storage::Rope(_)));
    assert_eq!(
        v,
        RespValue::of_bytes(Tag::SimpleString, b"a single long payload").unwrap()
    );
}

#[test]
fn of_pieces_rejects_empty_pieces() {
    let degenerate: &[&[u8]] = &[b"only one of these has conten", b"", b"t"];
    assert_eq!(
        RespValue::of_pieces(Tag::SimpleString, degenerate).unwrap_err(),
        RespError::UnknownSequenceVariety
    );
}

#[test]
fn string_factories() {
    let short = RespValue::of_str(Tag::SimpleString, "hey").unwrap();
    assert!(matches!(short.storage(), Storage::Inline(_)));
    let long = RespValue::of_str(Tag::SimpleString, "a considerably longer line").unwrap();
    assert!(matches!(long.storage(), Storage::Str(_)));
    let owned = RespValue::of_string(Tag::SimpleString, "a considerably longer line".into())
        .unwrap();
    assert!(matches!(owned.storage(), Storage::Text(_)));
    assert_eq!(long, owned);
}

#[test]
fn aggregate_arity_checks() {
    assert_eq!(
        RespValue::aggregate(Tag::Number, vec![]).unwrap_err(),
        RespError::Argument
    );
    let one = RespValue::of_bytes(Tag::BlobString, b"k").unwrap();
    assert_eq!(
        RespValue::aggregate(Tag::Map, vec![one]).unwrap_err(),
        RespError::ArgumentOutOfRange
    );
}

#[test]
fn empty_aggregate_allocates_nothing() {
    let v = RespValue::aggregate(Tag::Array, vec![]).unwrap();
    assert!(matches!(v.storage(), Storage::Empty));
    assert_eq!(v.sub_items().unwrap().len(), 0);
}

// the unit-aggregate wrap

#[test]
fn unit_aggregate_wraps_inline_child() {
    let child = RespValue::of_bytes(Tag::BlobString, b"PING").unwrap();
    assert!(child.can_wrap());
    let parent = RespValue::aggregate(Tag::Array, vec![child.clone()]).unwrap();
    assert_eq!(parent.tag(), Tag::Array);
    assert_eq!(parent.subtag(), Tag::BlobString);
    assert!(parent.can_unwrap());
    assert_eq!(parent.unwrap_unit().unwrap(), child);
}

#[test]
fn wrap_unwrap_inverts_for_scalars() {
    for child in [
        RespValue::of_i64(Tag::Number, -42).unwrap(),
        RespValue::of_u32(Tag::Number, u32::MAX).unwrap(),
        RespValue::of_f64(Tag::Double, 1.5).unwrap(),
        RespValue::of_bytes(Tag::SimpleString, b"twelve bytes").unwrap(),
    ] {
        for parent_tag in [Tag::Array, Tag::Set, Tag::Push] {
            let wrapped = RespValue::aggregate(parent_tag, vec![child.clone()]).unwrap();
            assert_eq!(wrapped.tag(), parent_tag);
            assert_eq!(wrapped.unwrap_unit().unwrap(), child);
        }
    }
}

#[test]
fn unit_aggregate_with_external_child_is_not_wrapped() {
    let child = RespValue::of_bytes(Tag::BlobString, b"thirteen byte").unwrap();
    assert!(!child.can_wrap());
    let parent = RespValue::aggregate(Tag::Array, vec![child]).unwrap();
    assert_eq!(parent.subtag(), Tag::Unknown);
    assert!(matches!(parent.storage(), Storage::Items(items) if items.len() == 1));
}

#[test]
fn sub_items_is_wrap_transparent() {
    let child = RespValue::of_bytes(Tag::BlobString, b"PING").unwrap();
    let parent = RespValue::aggregate(Tag::Array, vec![child.clone()]).unwrap();
    let items = parent.sub_items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0], child);
}

#[test]
fn sub_items_rejects_leaves() {
    let v = RespValue::of_i64(Tag::Number, 7).unwrap();
    assert_eq!(v.sub_items().unwrap_err(), RespError::Argument);
}

// equality

#[test]
fn scalars_compare_through_their_rendering() {
    assert_eq!(
        RespValue::of_i64(Tag::Number, 5).unwrap(),
        RespValue::of_bytes(Tag::Number, b"5").unwrap()
    );
    assert_eq!(
        RespValue::of_f64(Tag::Double, 1.5).unwrap(),
        RespValue::of_bytes(Tag::Double, b"1.5").unwrap()
    );
    assert_ne!(
        RespValue::of_i64(Tag::Number, 5).unwrap(),
        RespValue::of_i64(Tag::Number, 6).unwrap()
    );
}

#[test]
fn tags_differentiate_values() {
    assert_ne!(
        RespValue::of_bytes(Tag::SimpleString, b"5").unwrap(),
        RespValue::of_bytes(Tag::Number, b"5").unwrap()
    );
}

#[test]
fn nulls_compare_equal_across_tags() {
    assert_eq!(RespValue::typed_null(Tag::BlobString), RespValue::null());
    assert_eq!(RespValue::typed_null(Tag::Array), RespValue::typed_null(Tag::Map));
    assert_ne!(
        RespValue::null(),
        RespValue::of_bytes(Tag::BlobString, b"").unwrap()
    );
}

#[test]
fn ascii_case_insensitive_fast_path() {
    let a = RespValue::of_bytes(Tag::BlobString, b"PING").unwrap();
    let b = RespValue::of_bytes(Tag::BlobString, b"ping").unwrap();
    assert!(matches!(a.storage(), Storage::Inline(_)));
    assert!(a.eq_ignore_ascii_case(&b));
    let c = RespValue::of_bytes(Tag::BlobString, b"pong").unwrap();
    assert!(!a.eq_ignore_ascii_case(&c));
    let shorter = RespValue::of_bytes(Tag::BlobString, b"pin").unwrap();
    assert!(!a.eq_ignore_ascii_case(&shorter));
}

#[test]
fn ascii_case_insensitive_materialized_path() {
    let a = RespValue::of_bytes(Tag::BlobString, b"SUBSCRIBE-TO-THIS").unwrap();
    let b = RespValue::of_bytes(Tag::BlobString, b"subscribe-to-this").unwrap();
    assert!(a.eq_ignore_ascii_case(&b));
    // mixed inline/external representations take the slow path too
    let inline = RespValue::of_bytes(Tag::Number, b"5").unwrap();
    let scalar = RespValue::of_i64(Tag::Number, 5).unwrap();
    assert!(inline.eq_ignore_ascii_case(&scalar));
}

// preservation

#[test]
fn preserve_copies_borrowed_bytes() {
    let payload = b"a payload that will not inline".to_vec();
    let preserved = {
        let v = RespValue::of_bytes(Tag::BlobString, &payload).unwrap();
        assert!(matches!(v.storage(), Storage::Slice(_)));
        v.preserve().unwrap()
    };
    assert!(matches!(preserved.storage(), Storage::Buf(_)));
    assert_eq!(
        preserved,
        RespValue::of_bytes(Tag::BlobString, &payload).unwrap()
    );
}

#[test]
fn preserve_is_idempotent() {
    let payload = b"a payload that will not inline".to_vec();
    let v = RespValue::of_bytes(Tag::BlobString, &payload).unwrap();
    let once = v.preserve().unwrap();
    let twice = once.preserve().unwrap();
    assert_eq!(once, twice);
    assert!(matches!(twice.storage(), Storage::Buf(_)));
}

#[test]
fn preserve_is_transitive_for_aggregates() {
    let long = b"another payload that will not inline".to_vec();
    let preserved = {
        let borrowed = RespValue::of_bytes(Tag::BlobString, &long).unwrap();
        let short = RespValue::of_bytes(Tag::BlobString, b"ok").unwrap();
        let tree = RespValue::aggregate(Tag::Array, vec![borrowed, short]).unwrap();
        tree.preserve().unwrap()
    };
    let items = preserved.sub_items().unwrap();
    assert!(matches!(items[0].storage(), Storage::Buf(_)));
    assert!(matches!(items[1].storage(), Storage::Inline(_)));
}

#[test]
fn preserve_keeps_inline_and_null() {
    let v = RespValue::of_bytes(Tag::SimpleString, b"hi").unwrap();
    assert_eq!(v.preserve().unwrap(), v);
    assert!(RespValue::null().preserve().unwrap().is_null());
}

#[test]
fn uninitialized_values_cannot_be_preserved_or_written() {
    let uninit = RespValue::default();
    assert!(matches!(
        uninit.preserve().unwrap_err(),
        RespError::StorageKindNotImplemented(_)
    ));
    let mut sink = Vec::new();
    assert!(matches!(
        uninit.write(&mut sink, RespVersion::Resp3).unwrap_err(),
        RespError::StorageKindNotImplemented(_)
    ));
    assert!(sink.is_empty());
}

// commands and conveniences

#[test]
fn command_is_a_wrapped_unary_array() {
    let cmd = RespValue::command("PING").unwrap();
    assert_eq!(cmd.tag(), Tag::Array);
    assert_eq!(cmd.subtag(), Tag::BlobString);
    let items = cmd.sub_items().unwrap();
    assert_eq!(items[0], RespValue::of_bytes(Tag::BlobString, b"PING").unwrap());
}

#[test]
fn command_rejects_non_ascii() {
    assert_eq!(RespValue::command("pïng").unwrap_err(), RespError::Argument);
    assert_eq!(RespValue::command("").unwrap_err(), RespError::Argument);
}

#[test]
fn booleans() {
    assert_eq!(
        RespValue::boolean(true),
        RespValue::of_bytes(Tag::Boolean, b"t").unwrap()
    );
    assert_eq!(
        RespValue::boolean(false),
        RespValue::of_bytes(Tag::Boolean, b"f").unwrap()
    );
}

// rendering and error surfacing

#[test]
fn display_rendering() {
    assert_eq!(
        RespValue::of_bytes(Tag::SimpleString, b"hello").unwrap().to_string(),
        "hello"
    );
    assert_eq!(RespValue::of_i64(Tag::Number, -7).unwrap().to_string(), "-7");
    assert_eq!(
        RespValue::of_f64(Tag::Double, f64::INFINITY).unwrap().to_string(),
        "+inf"
    );
    assert_eq!(
        RespValue::of_f64(Tag::Double, f64::NAN).unwrap().to_string(),
        "nan"
    );
    assert_eq!(RespValue::null().to_string(), "");
    let tree = RespValue::aggregate(
        Tag::Array,
        vec![
            RespValue::of_bytes(Tag::BlobString, b"GET").unwrap(),
            RespValue::of_bytes(Tag::BlobString, b"key").unwrap(),
        ],
    )
    .unwrap();
    assert_eq!(tree.to_string(), "[GET,key]");
}

#[test]
fn error_values_surface() {
    let err = RespValue::of_bytes(Tag::SimpleError, b"ERR no such key").unwrap();
    assert_eq!(
        err.throw_if_error().unwrap_err(),
        RespError::Resp("ERR no such key".to_owned())
    );
    let blob_err = RespValue::of_bytes(Tag::BlobError, b"SYNTAX").unwrap();
    assert!(blob_err.throw_if_error().is_err());
    let fine = RespValue::of_bytes(Tag::BlobString, b"OK").unwrap();
    assert!(fine.throw_if_error().is_ok());
}
