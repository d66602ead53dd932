/*
 * Created on Fri Feb 23 2024
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
    super::MAX_DEPTH,
    crate::{
        error::{RespError, RespResult},
        mem::IntegerRepr,
        tag::{RespVersion, Tag, TagFamily},
        value::{RespValue, Storage},
    },
    bytes::BufMut,
    log::trace,
};

/// # The frame encoder
///
/// Encodes a value tree into a [`BufMut`] sink, one frame per
/// [`Writer::write_value`] call. The sink vends writable spans on demand
/// and the copy loop spills across them as needed, so the encoder never
/// needs a single span large enough for a whole frame.
///
/// The target [`RespVersion`] is fixed at construction. Below RESP3 the
/// richer tags are rewritten through [`Tag::downgrade`] and nulls take the
/// `<tag>-1\r\n` form; at RESP3 every null is the typed `_\r\n`
pub struct Writer<'a, B: BufMut> {
    sink: &'a mut B,
    version: RespVersion,
    total: usize,
}

impl<'a, B: BufMut> Writer<'a, B> {
    pub fn new(sink: &'a mut B, version: RespVersion) -> Self {
        Self {
            sink,
            version,
            total: 0,
        }
    }
    pub const fn version(&self) -> RespVersion {
        self.version
    }
    /// The number of bytes pushed into the sink by this writer
    pub fn finish(self) -> usize {
        self.total
    }
    /// Encode one frame
    pub fn write_value(&mut self, value: &RespValue<'_>) -> RespResult<()> {
        self.write_frame(value, 0)
    }

    fn put(&mut self, bytes: &[u8]) {
        self.sink.put_slice(bytes);
        self.total += bytes.len();
    }
    fn put_symbol(&mut self, tag: Tag) {
        self.put(&[tag.symbol()]);
    }
    fn put_crlf(&mut self) {
        self.put(b"\r\n");
    }
    fn put_count(&mut self, count: usize) {
        let repr = IntegerRepr::from_u64(count as u64);
        self.put(repr.as_bytes());
    }

    fn write_frame(&mut self, value: &RespValue<'_>, depth: usize) -> RespResult<()> {
        if depth > MAX_DEPTH {
            trace!("rejecting value: aggregates nested beyond {MAX_DEPTH} levels");
            return Err(RespError::Invalid("aggregate nesting too deep"));
        }
        match value.storage() {
            Storage::Uninit => {
                return Err(RespError::StorageKindNotImplemented("uninitialized"))
            }
            Storage::Null => {
                self.write_null(value.tag());
                return Ok(());
            }
            Storage::Empty => {
                self.write_empty(value.tag().downgrade(self.version));
                return Ok(());
            }
            _ => {}
        }
        if value.tag().is_aggregate() {
            self.write_aggregate(value, depth)
        } else {
            self.write_leaf(value);
            Ok(())
        }
    }
    /// At RESP3 every null collapses to the typed `_\r\n`; below it the
    /// downgraded tag carries a `-1` length, with the bare [`Tag::Null`]
    /// encoded as a BlobString null. Neither form has a payload CRLF
    fn write_null(&mut self, original: Tag) {
        if self.version >= RespVersion::Resp3 {
            self.put_symbol(Tag::Null);
        } else {
            let tag = if original == Tag::Null {
                Tag::BlobString
            } else {
                original.downgrade(self.version)
            };
            self.put_symbol(tag);
            self.put(b"-1");
        }
        self.put_crlf();
    }
    fn write_empty(&mut self, tag: Tag) {
        self.put_symbol(tag);
        match tag.family() {
            TagFamily::Blob => {
                self.put(b"0");
                self.put_crlf();
                self.put_crlf();
            }
            TagFamily::Aggregate(_) => {
                self.put(b"0");
                self.put_crlf();
            }
            _ => self.put_crlf(),
        }
    }
    fn write_leaf(&mut self, value: &RespValue<'_>) {
        let tag = value.tag().downgrade(self.version);
        self.put_symbol(tag);
        if tag.is_blob() {
            // scalars materialize through a short stack buffer, which also
            // yields the exact byte length for the prefix
            value.with_payload_bytes(|pieces| {
                let len: usize = pieces.iter().map(|piece| piece.len()).sum();
                self.put_count(len);
                self.put_crlf();
                for piece in pieces {
                    self.put(piece);
                }
            });
        } else {
            value.with_payload_bytes(|pieces| {
                for piece in pieces {
                    self.put(piece);
                }
            });
        }
        self.put_crlf();
    }
    fn write_aggregate(&mut self, value: &RespValue<'_>, depth: usize) -> RespResult<()> {
        let tag = value.tag().downgrade(self.version);
        if value.can_unwrap() {
            // the unit-aggregate compression: a one-element header, then
            // the folded child rebuilt from the parent's own storage
            self.put_symbol(tag);
            self.put(b"1");
            self.put_crlf();
            let child = value.unwrap_unit()?;
            return self.write_frame(&child, depth + 1);
        }
        let children = value.sub_items()?;
        // the wire count is in the downgraded tag's arity: a Map written as
        // an Array counts raw children
        let count = children.len() / tag.arity();
        self.put_symbol(tag);
        self.put_count(count);
        self.put_crlf();
        for child in children.iter() {
            self.write_frame(child, depth + 1)?;
        }
        Ok(())
    }
}
