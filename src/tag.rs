/*
 * Created on Wed Feb 07 2024
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

//! The RESP type taxonomy: every value carries one [`Tag`], and every tag
//! belongs to exactly one [`TagFamily`] which decides its wire framing.
//! [`RespVersion`] selects between the RESP2 and RESP3 dialects; RESP3-only
//! tags are mapped onto their closest RESP2 relatives by [`Tag::downgrade`]

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
/// A RESP type tag. The discriminant of each variant is the wire-level
/// prefix byte
pub enum Tag {
    /// never present on the wire; the subtag slot of a value that is not a
    /// wrapped unit aggregate
    Unknown = 0,
    /// `$`: a length-prefixed binary string
    BlobString = b'$',
    /// `!`: a length-prefixed error payload (RESP3)
    BlobError = b'!',
    /// `=`: a length-prefixed verbatim string (RESP3). The inner three-char
    /// format prefix (`txt:`, `mkd:`, ...) travels inside the payload bytes
    /// and is not interpreted here
    VerbatimString = b'=',
    /// `+`: a line-terminated string
    SimpleString = b'+',
    /// `-`: a line-terminated error
    SimpleError = b'-',
    /// `:`: a line-terminated signed integer
    Number = b':',
    /// `,`: a line-terminated double (RESP3)
    Double = b',',
    /// `#`: a line-terminated boolean, `t` or `f` (RESP3)
    Boolean = b'#',
    /// `(`: a line-terminated big number (RESP3)
    BigNumber = b'(',
    /// `_`: the typed null (RESP3)
    Null = b'_',
    /// `*`: an array of child frames
    Array = b'*',
    /// `~`: a set of child frames (RESP3)
    Set = b'~',
    /// `>`: an out-of-band push frame (RESP3)
    Push = b'>',
    /// `%`: a map; the wire count is in pairs (RESP3)
    Map = b'%',
    /// `|`: an attribute map attached to the next frame (RESP3)
    Attribute = b'|',
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// The framing family of a [`Tag`]
pub enum TagFamily {
    /// `<tag><len>\r\n<payload>\r\n`
    Blob,
    /// `<tag><payload>\r\n`
    Line,
    /// `<tag><count>\r\n` followed by `count * arity` child frames. The
    /// field is the arity: the wire count is multiplied by it to get the
    /// number of child values the frame carries
    Aggregate(usize),
    /// never framed
    Sentinel,
}

impl Tag {
    /// The wire prefix byte for this tag
    pub const fn symbol(self) -> u8 {
        self as u8
    }
    /// Map a wire prefix byte back to a tag. The [`Tag::Unknown`] sentinel
    /// is deliberately unreachable from here
    pub const fn from_symbol(symbol: u8) -> Option<Tag> {
        Some(match symbol {
            b'$' => Self::BlobString,
            b'!' => Self::BlobError,
            b'=' => Self::VerbatimString,
            b'+' => Self::SimpleString,
            b'-' => Self::SimpleError,
            b':' => Self::Number,
            b',' => Self::Double,
            b'#' => Self::Boolean,
            b'(' => Self::BigNumber,
            b'_' => Self::Null,
            b'*' => Self::Array,
            b'~' => Self::Set,
            b'>' => Self::Push,
            b'%' => Self::Map,
            b'|' => Self::Attribute,
            _ => return None,
        })
    }
    pub const fn family(self) -> TagFamily {
        match self {
            Self::BlobString | Self::BlobError | Self::VerbatimString => TagFamily::Blob,
            Self::SimpleString
            | Self::SimpleError
            | Self::Number
            | Self::Double
            | Self::Boolean
            | Self::BigNumber
            | Self::Null => TagFamily::Line,
            Self::Array | Self::Set | Self::Push => TagFamily::Aggregate(1),
            Self::Map | Self::Attribute => TagFamily::Aggregate(2),
            Self::Unknown => TagFamily::Sentinel,
        }
    }
    /// The wire-count multiplier; 0 for anything that is not an aggregate
    pub const fn arity(self) -> usize {
        match self.family() {
            TagFamily::Aggregate(n) => n,
            _ => 0,
        }
    }
    pub const fn is_aggregate(self) -> bool {
        matches!(self.family(), TagFamily::Aggregate(_))
    }
    pub const fn is_blob(self) -> bool {
        matches!(self.family(), TagFamily::Blob)
    }
    pub const fn is_line(self) -> bool {
        matches!(self.family(), TagFamily::Line)
    }
    /// True for the two error-carrying tags
    pub const fn is_error(self) -> bool {
        matches!(self, Self::SimpleError | Self::BlobError)
    }
    /// Map this tag to the closest one the peer's protocol version can
    /// frame. Identity at RESP3. Below RESP3 the richer types collapse:
    /// booleans, doubles and big numbers become simple strings, verbatim
    /// strings become blobs, and every RESP3 aggregate becomes a plain
    /// array (counted in raw children). Downgrading is idempotent
    pub const fn downgrade(self, version: RespVersion) -> Tag {
        if version as u8 >= RespVersion::Resp3 as u8 {
            return self;
        }
        match self {
            Self::Boolean | Self::Double | Self::BigNumber => Self::SimpleString,
            Self::VerbatimString => Self::BlobString,
            Self::Push | Self::Map | Self::Set | Self::Attribute => Self::Array,
            tag => tag,
        }
    }
}

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
/// The protocol dialect spoken by the peer
pub enum RespVersion {
    Resp2 = 2,
    Resp3 = 3,
}
