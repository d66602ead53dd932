/*
 * Created on Thu Feb 08 2024
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

//! Low-level carriers shared by the value model, the parser and the writer:
//! the inline payload area, stack formatting of scalars, the segmented read
//! cursor and the scratch-buffer pool

mod inline;
mod numbuf;
mod pool;
mod rope;

pub use {
    inline::{Inline, INLINE_SIZE},
    numbuf::{FloatRepr, IntegerRepr},
    pool::Lease,
    rope::{LinePayload, LineScan, RopeCursor},
};
