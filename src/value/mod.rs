/*
 * Created on Wed Feb 14 2024
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

//! # The value model
//!
//! A [`RespValue`] is an immutable record of a [`Tag`] plus its payload. The
//! payload lives in exactly one [`Storage`] arm: packed into the value
//! itself when it is small (at most [`INLINE_SIZE`] bytes, or a scalar),
//! borrowed from the parse buffer when the parser produced it, or held
//! through a shared owner when it must outlive its source. Values produced
//! by the parser borrow; call [`RespValue::preserve`] before reusing the
//! receive buffer.
//!
//! A single-child aggregate whose child fits inline is compressed into its
//! parent: the parent keeps the child's storage and records the child's tag
//! in its subtag slot. The device is invisible from the outside, since
//! [`RespValue::sub_items`] rebuilds the child on the fly

use {
    crate::{
        error::{RespError, RespResult},
        mem::{FloatRepr, Inline, IntegerRepr, Lease, LinePayload, INLINE_SIZE},
        protocol::Writer,
        tag::{RespVersion, Tag},
    },
    bytes::{BufMut, Bytes},
    core::{fmt, ops::Deref},
    std::sync::Arc,
};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq)]
/// Where a value's payload lives
pub enum Storage<'a> {
    /// default-constructed; never appears in parser output
    Uninit,
    /// semantically null, distinct from an empty payload
    Null,
    /// a zero-length payload or a zero-child aggregate; nothing is allocated
    Empty,
    /// up to [`INLINE_SIZE`] bytes packed into the value itself
    Inline(Inline),
    /// an inline unsigned 32-bit scalar
    UInt32(u32),
    /// an inline signed 64-bit scalar
    Int64(i64),
    /// an inline double scalar
    Double(f64),
    /// a borrowed single-segment payload; valid only while the source
    /// buffer is, see [`RespValue::preserve`]
    Slice(&'a [u8]),
    /// a borrowed payload that crosses segment boundaries
    Rope(Box<[&'a [u8]]>),
    /// borrowed text
    Str(&'a str),
    /// owned (shared) contiguous bytes
    Buf(Bytes),
    /// owned (shared) text
    Text(Arc<str>),
    /// aggregate children
    Items(Arc<[RespValue<'a>]>),
}

impl<'a> Storage<'a> {
    /// True for the storage kinds that live entirely inside the value; only
    /// these participate in the unit-aggregate wrap
    pub fn is_inlined(&self) -> bool {
        matches!(
            self,
            Self::Inline(_) | Self::UInt32(_) | Self::Int64(_) | Self::Double(_)
        )
    }
}

#[derive(Debug, Clone)]
/// An immutable RESP value. See the module documentation
pub struct RespValue<'a> {
    tag: Tag,
    subtag: Tag,
    storage: Storage<'a>,
}

/// A block of aggregate children. For a wrapped unit aggregate the single
/// child is reconstructed on the fly, so callers never observe the
/// compression
#[derive(Debug)]
pub enum SubItems<'v, 'a> {
    Block(&'v [RespValue<'a>]),
    Unit(RespValue<'a>),
}

impl<'v, 'a> SubItems<'v, 'a> {
    pub fn as_slice(&self) -> &[RespValue<'a>] {
        match self {
            Self::Block(block) => block,
            Self::Unit(only) => core::slice::from_ref(only),
        }
    }
}

impl<'v, 'a> Deref for SubItems<'v, 'a> {
    type Target = [RespValue<'a>];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

// constructors
impl<'a> RespValue<'a> {
    const fn assemble(tag: Tag, subtag: Tag, storage: Storage<'a>) -> Self {
        Self {
            tag,
            subtag,
            storage,
        }
    }
    /// The canonical null
    pub const fn null() -> RespValue<'static> {
        RespValue::typed_null(Tag::Null)
    }
    /// A null carrying a specific tag; round-trips as `$-1\r\n` and kin on
    /// a RESP2 wire
    pub const fn typed_null(tag: Tag) -> RespValue<'static> {
        RespValue::assemble(tag, Tag::Unknown, Storage::Null)
    }
    fn leaf_guard(tag: Tag) -> RespResult<()> {
        if tag.is_aggregate() || tag == Tag::Unknown {
            Err(RespError::Argument)
        } else {
            Ok(())
        }
    }
    fn of_short(tag: Tag, payload: &[u8]) -> Self {
        debug_assert!(payload.len() <= INLINE_SIZE);
        match payload.len() {
            0 if tag == Tag::Null => Self::assemble(tag, Tag::Unknown, Storage::Null),
            0 => Self::assemble(tag, Tag::Unknown, Storage::Empty),
            _ => Self::assemble(tag, Tag::Unknown, Storage::Inline(Inline::from_slice(payload))),
        }
    }
    /// A leaf value borrowing `payload`. Zero-length payloads become
    /// [`Storage::Empty`] (or the null for [`Tag::Null`]); payloads up to
    /// [`INLINE_SIZE`] are packed inline; anything larger is borrowed
    pub fn of_bytes(tag: Tag, payload: &'a [u8]) -> RespResult<Self> {
        Self::leaf_guard(tag)?;
        Ok(if payload.len() <= INLINE_SIZE {
            Self::of_short(tag, payload)
        } else {
            Self::assemble(tag, Tag::Unknown, Storage::Slice(payload))
        })
    }
    /// Like [`Self::of_bytes`] over a discontiguous payload. Zero-length
    /// pieces make the owner shape unclassifiable and are rejected
    pub fn of_pieces(tag: Tag, pieces: &[&'a [u8]]) -> RespResult<Self> {
        Self::leaf_guard(tag)?;
        let total: usize = pieces.iter().map(|piece| piece.len()).sum();
        if total != 0 && pieces.iter().any(|piece| piece.is_empty()) {
            return Err(RespError::UnknownSequenceVariety);
        }
        Ok(if total <= INLINE_SIZE {
            let mut inline = Inline::empty();
            for piece in pieces {
                inline.extend_from_slice(piece);
            }
            Self::of_short(tag, inline.as_slice())
        } else if let [one] = pieces {
            Self::assemble(tag, Tag::Unknown, Storage::Slice(*one))
        } else {
            Self::assemble(
                tag,
                Tag::Unknown,
                Storage::Rope(pieces.to_vec().into_boxed_slice()),
            )
        })
    }
    /// A leaf value taking ownership of `payload`
    pub fn of_owned(tag: Tag, payload: Bytes) -> RespResult<RespValue<'static>> {
        Self::leaf_guard(tag)?;
        Ok(if payload.len() <= INLINE_SIZE {
            RespValue::of_short(tag, &payload)
        } else {
            RespValue::assemble(tag, Tag::Unknown, Storage::Buf(payload))
        })
    }
    /// A leaf value borrowing text. The inline threshold applies to the
    /// UTF-8 byte length
    pub fn of_str(tag: Tag, payload: &'a str) -> RespResult<Self> {
        Self::leaf_guard(tag)?;
        Ok(if payload.len() <= INLINE_SIZE {
            Self::of_short(tag, payload.as_bytes())
        } else {
            Self::assemble(tag, Tag::Unknown, Storage::Str(payload))
        })
    }
    /// A leaf value taking ownership of text
    pub fn of_string(tag: Tag, payload: String) -> RespResult<RespValue<'static>> {
        Self::leaf_guard(tag)?;
        Ok(if payload.len() <= INLINE_SIZE {
            RespValue::of_short(tag, payload.as_bytes())
        } else {
            RespValue::assemble(tag, Tag::Unknown, Storage::Text(Arc::from(payload)))
        })
    }
    pub fn of_i64(tag: Tag, v: i64) -> RespResult<RespValue<'static>> {
        Self::leaf_guard(tag)?;
        Ok(RespValue::assemble(tag, Tag::Unknown, Storage::Int64(v)))
    }
    pub fn of_u32(tag: Tag, v: u32) -> RespResult<RespValue<'static>> {
        Self::leaf_guard(tag)?;
        Ok(RespValue::assemble(tag, Tag::Unknown, Storage::UInt32(v)))
    }
    pub fn of_f64(tag: Tag, v: f64) -> RespResult<RespValue<'static>> {
        Self::leaf_guard(tag)?;
        Ok(RespValue::assemble(tag, Tag::Unknown, Storage::Double(v)))
    }
    /// The `#t`/`#f` boolean
    pub fn boolean(v: bool) -> RespValue<'static> {
        RespValue::of_short(Tag::Boolean, if v { b"t" } else { b"f" })
    }
    /// An aggregate over `children`. The child count must be a multiple of
    /// the tag's arity. A single wrap-eligible child is folded into the
    /// parent's own storage instead of allocating a one-element block
    pub fn aggregate(tag: Tag, mut children: Vec<RespValue<'a>>) -> RespResult<Self> {
        let arity = tag.arity();
        if arity == 0 {
            return Err(RespError::Argument);
        }
        if children.len() % arity != 0 {
            return Err(RespError::ArgumentOutOfRange);
        }
        if children.is_empty() {
            return Ok(Self::assemble(tag, Tag::Unknown, Storage::Empty));
        }
        if children.len() == 1 && children[0].can_wrap() {
            if let Some(only) = children.pop() {
                return Ok(only.wrap(tag));
            }
        }
        Ok(Self::assemble(
            tag,
            Tag::Unknown,
            Storage::Items(Arc::from(children)),
        ))
    }
    /// Pre-encode a short fixed command: an Array of one BlobString. The
    /// name must be ASCII
    pub fn command(name: &str) -> RespResult<RespValue<'static>> {
        if name.is_empty() || !name.is_ascii() {
            return Err(RespError::Argument);
        }
        let blob = if name.len() <= INLINE_SIZE {
            RespValue::of_short(Tag::BlobString, name.as_bytes())
        } else {
            RespValue::assemble(
                Tag::BlobString,
                Tag::Unknown,
                Storage::Buf(Bytes::copy_from_slice(name.as_bytes())),
            )
        };
        RespValue::aggregate(Tag::Array, vec![blob])
    }
    /// Lease a scratch buffer of `len` bytes from the shared pool; see
    /// [`Lease`]
    pub fn lease(len: usize) -> Lease {
        Lease::new(len)
    }
    pub(crate) fn of_inline(tag: Tag, inline: Inline) -> Self {
        Self::assemble(tag, Tag::Unknown, Storage::Inline(inline))
    }
    pub(crate) const fn of_empty(tag: Tag) -> Self {
        Self::assemble(tag, Tag::Unknown, Storage::Empty)
    }
    pub(crate) fn of_line(tag: Tag, line: LinePayload<'a>) -> RespResult<Self> {
        match line {
            LinePayload::Contig(one) => Self::of_bytes(tag, one),
            LinePayload::Split(pieces) => {
                if pieces.iter().map(|piece| piece.len()).sum::<usize>() <= INLINE_SIZE {
                    Self::of_pieces(tag, &pieces)
                } else {
                    // keep the borrowed pieces as they are
                    Ok(Self::assemble(tag, Tag::Unknown, Storage::Rope(pieces)))
                }
            }
        }
    }
}

// the unit-aggregate wrap
impl<'a> RespValue<'a> {
    /// True if this value can be folded into an arity-1 parent: the payload
    /// lives inline and the subtag slot is free
    pub fn can_wrap(&self) -> bool {
        self.storage.is_inlined() && self.subtag == Tag::Unknown
    }
    /// True if this value is a wrapped unit aggregate
    pub fn can_unwrap(&self) -> bool {
        self.storage.is_inlined() && self.subtag != Tag::Unknown
    }
    /// Fold this value into `parent`. Calling this on a value that is not
    /// wrap-eligible is a caller bug
    pub(crate) fn wrap(self, parent: Tag) -> Self {
        debug_assert!(self.can_wrap() && parent.arity() == 1);
        Self::assemble(parent, self.tag, self.storage)
    }
    /// Rebuild the single child of a wrapped unit aggregate
    pub fn unwrap_unit(&self) -> RespResult<RespValue<'a>> {
        if self.can_unwrap() {
            Ok(Self::assemble(
                self.subtag,
                Tag::Unknown,
                self.storage.clone(),
            ))
        } else {
            Err(RespError::Invalid("not a wrapped unit aggregate"))
        }
    }
}

// accessors
impl<'a> RespValue<'a> {
    pub const fn tag(&self) -> Tag {
        self.tag
    }
    /// [`Tag::Unknown`] unless this is a wrapped unit aggregate, in which
    /// case it records the folded child's tag
    pub const fn subtag(&self) -> Tag {
        self.subtag
    }
    pub const fn storage(&self) -> &Storage<'a> {
        &self.storage
    }
    pub fn is_null(&self) -> bool {
        matches!(self.storage, Storage::Null)
    }
    pub fn is_empty_payload(&self) -> bool {
        matches!(self.storage, Storage::Empty)
    }
    /// The children of an aggregate. Null and empty aggregates yield an
    /// empty block; a wrapped unit aggregate yields its reconstructed
    /// child. Not defined for leaves
    pub fn sub_items(&self) -> RespResult<SubItems<'_, 'a>> {
        if !self.tag.is_aggregate() {
            return Err(RespError::Argument);
        }
        match &self.storage {
            Storage::Null | Storage::Empty => Ok(SubItems::Block(&[])),
            Storage::Items(items) => Ok(SubItems::Block(items)),
            _ if self.can_unwrap() => Ok(SubItems::Unit(self.unwrap_unit()?)),
            _ => Err(RespError::StorageKindNotImplemented("aggregate storage")),
        }
    }
    /// Surface a [`RespError::Resp`] if this value carries a protocol-level
    /// error
    pub fn throw_if_error(&self) -> RespResult<()> {
        if self.tag.is_error() {
            Err(RespError::Resp(self.to_string()))
        } else {
            Ok(())
        }
    }
    /// Encode this value for a peer speaking `version`, returning the
    /// number of bytes pushed into the sink
    pub fn write<B: BufMut>(&self, sink: &mut B, version: RespVersion) -> RespResult<usize> {
        let mut writer = Writer::new(sink, version);
        writer.write_value(self)?;
        Ok(writer.finish())
    }
}

// payload plumbing
impl<'a> RespValue<'a> {
    /// Hand `f` the payload as a list of byte pieces. Scalars materialize
    /// through their ASCII rendering; null, empty and aggregate storages
    /// yield no pieces
    pub(crate) fn with_payload_bytes<T>(&self, f: impl FnOnce(&[&[u8]]) -> T) -> T {
        match &self.storage {
            Storage::Uninit | Storage::Null | Storage::Empty | Storage::Items(_) => f(&[]),
            Storage::Inline(inline) => f(&[inline.as_slice()]),
            Storage::UInt32(v) => {
                let repr = IntegerRepr::from_u32(*v);
                f(&[repr.as_bytes()])
            }
            Storage::Int64(v) => {
                let repr = IntegerRepr::from_i64(*v);
                f(&[repr.as_bytes()])
            }
            Storage::Double(v) => {
                let repr = FloatRepr::new(*v);
                f(&[repr.as_bytes()])
            }
            Storage::Slice(one) => f(&[one]),
            Storage::Rope(pieces) => f(&pieces[..]),
            Storage::Str(text) => f(&[text.as_bytes()]),
            Storage::Buf(buf) => f(&[buf.as_ref()]),
            Storage::Text(text) => f(&[text.as_bytes()]),
        }
    }
    fn payload_len(&self) -> usize {
        self.with_payload_bytes(|pieces| pieces.iter().map(|piece| piece.len()).sum())
    }
    /// ASCII case-insensitive payload equality, with a fast path when both
    /// payloads are packed inline. Defined only for ASCII payloads
    pub fn eq_ignore_ascii_case(&self, other: &RespValue<'_>) -> bool {
        if let (Storage::Inline(a), Storage::Inline(b)) = (&self.storage, &other.storage) {
            return a.len() == b.len()
                && a.raw()
                    .iter()
                    .zip(b.raw().iter())
                    .all(|(x, y)| (x | 0x20) == (y | 0x20));
        }
        self.payload_len() == other.payload_len()
            && self.with_payload_bytes(|a| {
                other.with_payload_bytes(|b| {
                    let left = a.iter().flat_map(|piece| piece.iter().copied());
                    let right = b.iter().flat_map(|piece| piece.iter().copied());
                    left.zip(right).all(|(x, y)| (x | 0x20) == (y | 0x20))
                })
            })
    }
    /// Detach this value from any borrowed buffers so it outlives them.
    /// Borrowed payloads are copied into owned storage; owned storage is
    /// shared, not copied; aggregate children are preserved transitively.
    /// Preserving twice copies nothing further
    pub fn preserve(&self) -> RespResult<RespValue<'static>> {
        let storage: Storage<'static> = match &self.storage {
            Storage::Uninit => {
                return Err(RespError::StorageKindNotImplemented("uninitialized"))
            }
            Storage::Null => Storage::Null,
            Storage::Empty => Storage::Empty,
            Storage::Inline(inline) => Storage::Inline(*inline),
            Storage::UInt32(v) => Storage::UInt32(*v),
            Storage::Int64(v) => Storage::Int64(*v),
            Storage::Double(v) => Storage::Double(*v),
            Storage::Slice(one) => Storage::Buf(Bytes::copy_from_slice(one)),
            Storage::Rope(pieces) => {
                let mut buf = Vec::with_capacity(pieces.iter().map(|piece| piece.len()).sum());
                for piece in pieces.iter() {
                    buf.extend_from_slice(piece);
                }
                Storage::Buf(Bytes::from(buf))
            }
            Storage::Str(text) => Storage::Text(Arc::from(*text)),
            Storage::Buf(buf) => Storage::Buf(buf.clone()),
            Storage::Text(text) => Storage::Text(text.clone()),
            Storage::Items(items) => {
                let mut owned = Vec::with_capacity(items.len());
                for child in items.iter() {
                    owned.push(child.preserve()?);
                }
                Storage::Items(Arc::from(owned))
            }
        };
        Ok(RespValue::assemble(self.tag, self.subtag, storage))
    }
}

impl<'a> Default for RespValue<'a> {
    /// The uninitialized value. It must never appear in parser output and
    /// cannot be written or preserved
    fn default() -> Self {
        Self::assemble(Tag::Unknown, Tag::Unknown, Storage::Uninit)
    }
}

impl<'a, 'b> PartialEq<RespValue<'b>> for RespValue<'a> {
    /// Structural equality. Nulls compare equal whatever their tags, so
    /// the RESP3 null collapse round-trips; scalars compare through their
    /// ASCII rendering, so a parsed `:5` equals a value built from the
    /// integer 5; the unit-aggregate wrap is invisible
    fn eq(&self, other: &RespValue<'b>) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() && other.is_null();
        }
        if self.tag != other.tag {
            return false;
        }
        if self.tag.is_aggregate() {
            return match (self.sub_items(), other.sub_items()) {
                (Ok(a), Ok(b)) => a.as_slice() == b.as_slice(),
                _ => false,
            };
        }
        self.with_payload_bytes(|a| {
            other.with_payload_bytes(|b| {
                let left = a.iter().flat_map(|piece| piece.iter());
                let right = b.iter().flat_map(|piece| piece.iter());
                left.eq(right)
            })
        })
    }
}

impl<'a> fmt::Display for RespValue<'a> {
    /// Best-effort text rendering: text passes through, bytes render as
    /// lossy UTF-8, scalars as decimal (doubles with the `+inf`/`-inf`/
    /// `nan` sentinels), nulls as nothing, aggregates as their bracketed
    /// children
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return Ok(());
        }
        if self.tag.is_aggregate() {
            let items = self.sub_items().map_err(|_| fmt::Error)?;
            f.write_str("[")?;
            for (idx, item) in items.iter().enumerate() {
                if idx != 0 {
                    f.write_str(",")?;
                }
                write!(f, "{item}")?;
            }
            return f.write_str("]");
        }
        match &self.storage {
            Storage::Str(text) => f.write_str(text),
            Storage::Text(text) => f.write_str(text),
            _ => self.with_payload_bytes(|pieces| {
                for piece in pieces {
                    f.write_str(&String::from_utf8_lossy(piece))?;
                }
                Ok(())
            }),
        }
    }
}
